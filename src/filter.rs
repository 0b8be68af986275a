//! Builds the predicate tree from decomposed filter parts
//!
//! ```text
//! build_filter(parts)
//!   └─ build_node(part)            one node per top-level part
//!        ├─ field present → comparison
//!        │                   ├─ operator table lookup
//!        │                   └─ operand check (IN ⇒ list, else scalar)
//!        └─ field absent  → logical group
//!                            └─ build_sub_filter(doc) for each array element
//!                                 └─ decompose_filter → build_node (recursion)
//! ```
//!
//! Logical groups nest at most `MAX_GROUP_DEPTH` levels.

use crate::ast::{lookup_operator, CompOp, Identifier, Literal, LogicalOp, Operand, PredicateNode, SqlOperator};
use crate::decompose::{decompose_filter, RawPart};
use crate::error::{Result, TranslationError};
use serde_json::Value;

/// Deepest `$and`/`$or` nesting accepted
pub const MAX_GROUP_DEPTH: usize = 64;

/// Builds one predicate node per top-level part, in source order
pub fn build_filter(parts: &[RawPart]) -> Result<Vec<PredicateNode>> {
    build_level(parts, 0)
}

/// `depth` is the number of logical groups enclosing `parts`
fn build_level(parts: &[RawPart], depth: usize) -> Result<Vec<PredicateNode>> {
    parts.iter().map(|part| build_node(part, depth)).collect()
}

fn build_node(part: &RawPart, depth: usize) -> Result<PredicateNode> {
    match &part.field {
        Some(field) => build_comparison(field, &part.operator, &part.operand),
        None => build_group(&part.operator, &part.operand, depth + 1),
    }
}

fn build_comparison(field: &str, token: &str, operand: &Value) -> Result<PredicateNode> {
    let op = match lookup_operator(token) {
        Some(SqlOperator::Comparison(op)) => op,
        _ => return Err(TranslationError::UnsupportedOperator(token.to_string())),
    };

    let operand = match (op, operand) {
        (CompOp::In, Value::Array(items)) => items
            .iter()
            .map(Literal::from_value)
            .collect::<Option<Vec<_>>>()
            .map(Operand::List),
        (CompOp::In, _) => None,
        (_, value) => Literal::from_value(value).map(Operand::Scalar),
    }
    .ok_or_else(|| TranslationError::UnsupportedOperator(token.to_string()))?;

    Ok(PredicateNode::Comparison {
        field: Identifier(field.to_string()),
        op,
        operand,
    })
}

fn build_group(token: &str, operand: &Value, depth: usize) -> Result<PredicateNode> {
    let op = match lookup_operator(token) {
        Some(SqlOperator::Logical(op)) => op,
        _ => return Err(TranslationError::UnsupportedOperator(token.to_string())),
    };
    if depth > MAX_GROUP_DEPTH {
        return Err(TranslationError::malformed(format!(
            "logical operators nested deeper than {} levels",
            MAX_GROUP_DEPTH
        )));
    }

    let sub_filters = match operand {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) => {
            return Err(TranslationError::malformed(format!("{} requires a non-empty array", token)))
        }
        _ => return Err(TranslationError::malformed(format!("{} requires an array", token))),
    };

    let children = sub_filters
        .iter()
        .map(|sub_filter| build_sub_filter(token, sub_filter, depth))
        .collect::<Result<Vec<_>>>()?;

    Ok(PredicateNode::Logical { op, children })
}

/// Builds exactly one node from a sub-filter of a logical group.
/// Several entries in one sub-filter are grouped with an implicit AND.
fn build_sub_filter(token: &str, sub_filter: &Value, depth: usize) -> Result<PredicateNode> {
    let Value::Object(doc) = sub_filter else {
        return Err(TranslationError::malformed(format!("{} elements must be documents", token)));
    };

    let mut nodes = build_level(&decompose_filter(doc), depth)?;
    match nodes.len() {
        0 => Err(TranslationError::malformed(format!("{} contains an empty document", token))),
        1 => Ok(nodes.remove(0)),
        _ => Ok(PredicateNode::Logical {
            op: LogicalOp::And,
            children: nodes,
        }),
    }
}
