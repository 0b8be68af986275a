//! Flattens parsed Mongo documents into `{field, operator, operand}` parts

use serde_json::{Map, Value};

/// Operator used for bare values such as `{title: 'john'}`
pub const IMPLICIT_EQ: &str = "$eq";

/// One entry of a decomposed document.
///
/// `field` is `None` exactly when the part is a logical group (`$and`, `$or`,
/// ...); its operand is then the raw array of sub-filters.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPart {
    pub field: Option<String>,
    pub operator: String,
    pub operand: Value,
}

impl RawPart {
    fn field(field: &str, operator: &str, operand: &Value) -> Self {
        Self {
            field: Some(field.to_string()),
            operator: operator.to_string(),
            operand: operand.clone(),
        }
    }
}

/// Decomposes a filter document in source order.
///
/// `{field: {$op: v, ...}}` yields one part per operator, any other value is
/// an implicit `$eq`, and `$`-prefixed keys yield field-less logical parts.
pub fn decompose_filter(filter: &Map<String, Value>) -> Vec<RawPart> {
    let mut parts = Vec::with_capacity(filter.len());

    for (key, value) in filter {
        if key.starts_with('$') {
            parts.push(RawPart {
                field: None,
                operator: key.clone(),
                operand: value.clone(),
            });
            continue;
        }

        match operator_document(value) {
            Some(operators) => {
                parts.extend(operators.iter().map(|(op, operand)| RawPart::field(key, op, operand)))
            }
            None => parts.push(RawPart::field(key, IMPLICIT_EQ, value)),
        }
    }

    parts
}

/// Decomposes a projection document; every key becomes one part
pub fn decompose_projection(projection: &Map<String, Value>) -> Vec<RawPart> {
    projection
        .iter()
        .map(|(key, value)| RawPart::field(key, IMPLICIT_EQ, value))
        .collect()
}

/// Returns the object if it is a non-empty map whose keys are all operators
fn operator_document(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => Some(map),
        _ => None,
    }
}
