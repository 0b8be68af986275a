//! Extracts the SELECT field list from decomposed projection parts

use crate::ast::{Identifier, ProjectionField};
use crate::decompose::RawPart;
use serde_json::Value;

/// Keeps the fields whose value is `1`, in source order.
///
/// Exclusions (`0`) are dropped and duplicates are passed through.
pub fn extract_projection(parts: &[RawPart]) -> Vec<ProjectionField> {
    parts
        .iter()
        .filter(|part| is_inclusion(&part.operand))
        .filter_map(|part| part.field.as_deref())
        .map(|name| ProjectionField { name: Identifier(name.to_string()) })
        .collect()
}

fn is_inclusion(operand: &Value) -> bool {
    operand.as_f64() == Some(1.0)
}
