//! SQL compiler that renders a `FindQuery` AST into a single SELECT statement.
//!
//! The statement skeleton (column list, FROM, WHERE) is assembled with
//! sea-query; the predicate text is rendered here because its literal and
//! grouping rules are fixed: strings are quoted verbatim, every logical group
//! is parenthesized, and identifiers are never quoted.

use crate::ast::{FindQuery, Identifier, Literal, Operand, PredicateNode, ProjectionField};
use log::debug;
use sea_query::{Asterisk, Expr, Iden, PostgresQueryBuilder, Quote, SelectStatement};
use serde_json::Number;
use std::fmt::{self, Write};

/// Name Mongo uses for the primary key
pub const MONGO_ID: &str = "_id";
/// Name `_id` is rendered as when renaming is enabled
pub const SQL_ID: &str = "id";

/// Largest integer an f64 holds exactly (2^53)
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Collection identifier, rendered unquoted
#[derive(Debug, Clone)]
pub struct TableName(pub String);

impl Iden for TableName {
    fn prepare(&self, s: &mut dyn fmt::Write, _q: Quote) {
        self.unquoted(s);
    }

    fn unquoted(&self, s: &mut dyn fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// Column identifier, rendered unquoted
#[derive(Debug, Clone)]
pub struct ColumnName(pub String);

impl Iden for ColumnName {
    fn prepare(&self, s: &mut dyn fmt::Write, _q: Quote) {
        self.unquoted(s);
    }

    fn unquoted(&self, s: &mut dyn fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// Renders `FindQuery` ASTs to SQL text
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCompiler {
    /// Render `_id` as `id` in SELECT and WHERE positions
    rename_id: bool,
}

impl SqlCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rename_id(rename_id: bool) -> Self {
        Self { rename_id }
    }

    pub fn rename_id(&self) -> bool {
        self.rename_id
    }

    /// Compiles a query into `SELECT … FROM … [WHERE …];`
    pub fn compile(&self, query: &FindQuery) -> String {
        let mut select = SelectStatement::new();

        if query.projection.is_empty() {
            select.column(Asterisk);
        } else {
            select.columns(self.select_columns(&query.projection));
        }

        select.from(TableName(query.collection.0.clone()));

        if !query.filter.is_empty() {
            select.and_where(Expr::cust(self.compile_where(&query.filter)));
        }

        let (mut sql, _values) = select.build(PostgresQueryBuilder);
        sql.push(';');

        debug!("Compiled SQL: {}", sql);
        sql
    }

    /// Maps projection fields to columns, applying the `_id` rename
    fn select_columns(&self, projection: &[ProjectionField]) -> Vec<ColumnName> {
        projection
            .iter()
            .map(|field| ColumnName(self.column_name(&field.name).to_string()))
            .collect()
    }

    /// Renders the top-level predicates joined with AND
    pub fn compile_where(&self, filter: &[PredicateNode]) -> String {
        let mut out = String::new();
        for (i, node) in filter.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            self.compile_predicate(node, &mut out);
        }
        out
    }

    fn compile_predicate(&self, node: &PredicateNode, out: &mut String) {
        match node {
            PredicateNode::Comparison { field, op, operand } => {
                out.push_str(self.column_name(field));
                out.push(' ');
                out.push_str(op.as_sql());
                out.push(' ');
                write_operand(operand, out);
            }
            PredicateNode::Logical { op, children } => {
                out.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                        out.push_str(op.as_sql());
                        out.push(' ');
                    }
                    self.compile_predicate(child, out);
                }
                out.push(')');
            }
        }
    }

    fn column_name<'a>(&self, field: &'a Identifier) -> &'a str {
        if self.rename_id && field.as_str() == MONGO_ID {
            SQL_ID
        } else {
            field.as_str()
        }
    }
}

fn write_operand(operand: &Operand, out: &mut String) {
    match operand {
        Operand::Scalar(literal) => write_literal(literal, out),
        Operand::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(item, out);
            }
            out.push(')');
        }
    }
}

fn write_literal(literal: &Literal, out: &mut String) {
    match literal {
        // Quoted verbatim, embedded quotes are not escaped
        Literal::String(s) => {
            out.push('\'');
            out.push_str(s);
            out.push('\'');
        }
        Literal::Number(n) => write_number(n, out),
        Literal::Boolean(b) => {
            let _ = write!(out, "{}", b);
        }
    }
}

fn write_number(n: &Number, out: &mut String) {
    let _ = match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_INT => {
            write!(out, "{}", f as i64)
        }
        Some(f) if n.is_f64() => write!(out, "{}", f),
        _ => write!(out, "{}", n),
    };
}
