//! Normalized representation of a translated `find` query

use serde_json::{Number, Value};
use std::fmt;

/// The root of the AST: everything needed to render one SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub collection: Identifier,
    /// Fields to select; empty means `*`
    pub projection: Vec<ProjectionField>,
    /// Top-level predicates, combined with an implicit AND
    pub filter: Vec<PredicateNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(name.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A field listed in the SELECT clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionField {
    pub name: Identifier,
}

/// A node of the predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateNode {
    /// `<field> <op> <operand>`, a leaf of the tree
    Comparison {
        field: Identifier,
        op: CompOp,
        operand: Operand,
    },
    /// An `$and`/`$or` group; always holds at least one child
    Logical {
        op: LogicalOp,
        children: Vec<PredicateNode>,
    },
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,    // =
    NotEq, // !=
    Gt,    // >
    Lt,    // <
    Gte,   // >=
    Lte,   // <=
    In,    // IN
}

impl CompOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompOp::Eq => "=",
            CompOp::NotEq => "!=",
            CompOp::Gt => ">",
            CompOp::Lt => "<",
            CompOp::Gte => ">=",
            CompOp::Lte => "<=",
            CompOp::In => "IN",
        }
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// What a Mongo operator token maps to on the SQL side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperator {
    Comparison(CompOp),
    Logical(LogicalOp),
}

/// Mongo operator tokens and their SQL counterparts
pub const OPERATOR_TABLE: &[(&str, SqlOperator)] = &[
    ("$or", SqlOperator::Logical(LogicalOp::Or)),
    ("$and", SqlOperator::Logical(LogicalOp::And)),
    ("$lt", SqlOperator::Comparison(CompOp::Lt)),
    ("$lte", SqlOperator::Comparison(CompOp::Lte)),
    ("$gt", SqlOperator::Comparison(CompOp::Gt)),
    ("$gte", SqlOperator::Comparison(CompOp::Gte)),
    ("$ne", SqlOperator::Comparison(CompOp::NotEq)),
    ("$in", SqlOperator::Comparison(CompOp::In)),
    ("$eq", SqlOperator::Comparison(CompOp::Eq)),
];

/// Looks up a Mongo operator token such as `$gte`
pub fn lookup_operator(token: &str) -> Option<SqlOperator> {
    OPERATOR_TABLE
        .iter()
        .find(|(mongo, _)| *mongo == token)
        .map(|(_, sql)| *sql)
}

/// The right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Literal),
    /// Only valid with `IN`
    List(Vec<Literal>),
}

/// Scalar literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Boolean(bool),
}

impl Literal {
    /// Converts a parsed scalar; arrays, objects and null have no literal form
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Number(n) => Some(Literal::Number(n.clone())),
            Value::Bool(b) => Some(Literal::Boolean(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_table_lookup() {
        assert_eq!(lookup_operator("$gte"), Some(SqlOperator::Comparison(CompOp::Gte)));
        assert_eq!(lookup_operator("$ne"), Some(SqlOperator::Comparison(CompOp::NotEq)));
        assert_eq!(lookup_operator("$or"), Some(SqlOperator::Logical(LogicalOp::Or)));
        assert_eq!(lookup_operator("$nin"), None);
        assert_eq!(lookup_operator("gte"), None);
    }

    #[test]
    fn test_sql_tokens() {
        let tokens: Vec<_> = OPERATOR_TABLE
            .iter()
            .map(|(_, op)| match op {
                SqlOperator::Comparison(c) => c.as_sql(),
                SqlOperator::Logical(l) => l.as_sql(),
            })
            .collect();
        assert_eq!(tokens, vec!["OR", "AND", "<", "<=", ">", ">=", "!=", "IN", "="]);
    }

    #[test]
    fn test_literal_from_value() {
        assert_eq!(Literal::from_value(&json!("a")), Some(Literal::String("a".to_string())));
        assert_eq!(Literal::from_value(&json!(7)), Some(Literal::Number(7i64.into())));
        assert_eq!(Literal::from_value(&json!(false)), Some(Literal::Boolean(false)));
        assert_eq!(Literal::from_value(&json!(null)), None);
        assert_eq!(Literal::from_value(&json!([1])), None);
        assert_eq!(Literal::from_value(&json!({"a": 1})), None);
    }
}
