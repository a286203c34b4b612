//! Structured filter/query expressions.
//!
//! Small enough to evaluate against a serialized record, rich enough for the
//! expression-mapping extension to have something to rewrite.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A structured filter over a record's top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterExpr {
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
}

impl FilterExpr {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    /// Evaluate against a serialized record. Missing fields never match.
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            FilterExpr::Compare { field, op, value } => record
                .get(field)
                .is_some_and(|actual| compare(*op, actual, value)),
            FilterExpr::And(parts) => parts.iter().all(|p| p.matches(record)),
            FilterExpr::Or(parts) => parts.iter().any(|p| p.matches(record)),
            FilterExpr::Not(inner) => !inner.matches(record),
        }
    }
}

fn compare(op: CompareOp, actual: &Value, expected: &Value) -> bool {
    match op {
        CompareOp::Eq => actual == expected,
        CompareOp::Ne => actual != expected,
        CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
            let Some(ordering) = ordering(actual, expected) else {
                return false;
            };
            match op {
                CompareOp::Gt => ordering.is_gt(),
                CompareOp::Gte => ordering.is_ge(),
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::Lte => ordering.is_le(),
                CompareOp::Eq | CompareOp::Ne => false,
            }
        }
    }
}

/// Ordering for homogeneous number/string pairs; anything else is unordered.
fn ordering(actual: &Value, expected: &Value) -> Option<core::cmp::Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}
