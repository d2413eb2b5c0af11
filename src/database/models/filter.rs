//! Per-field query predicates.
//!
//! A read passes a document only if it satisfies every predicate (logical
//! AND). Operators the engine does not understand let every document through.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "array-contains")]
    ArrayContains,
    /// Anything else; matches every document.
    #[serde(other)]
    Unsupported,
}

impl FilterOp {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "array-contains" => Self::ArrayContains,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::ArrayContains => "array-contains",
            Self::Unsupported => "unsupported",
        }
    }
}

/// A `(field, operator, value)` predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for an equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Evaluate this predicate against one document.
    pub fn matches(&self, doc: &Document) -> bool {
        let actual = doc.get(&self.field);

        match self.operator {
            FilterOp::Eq => actual.is_some_and(|v| values_equal(&v, &self.value)),
            FilterOp::Ne => !actual.is_some_and(|v| values_equal(&v, &self.value)),
            FilterOp::Gt => ordering(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Lt => ordering(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Gte => matches!(
                ordering(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                ordering(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::ArrayContains => match actual {
                Some(Value::Array(items)) => items.iter().any(|i| values_equal(i, &self.value)),
                _ => false,
            },
            FilterOp::Unsupported => true,
        }
    }
}

/// True when `doc` satisfies every filter.
pub fn matches_all(filters: &[Filter], doc: &Document) -> bool {
    filters.iter().all(|f| f.matches(doc))
}

/// Keep the documents that pass all filters, preserving order.
pub fn apply_filters(docs: Vec<Document>, filters: &[Filter]) -> Vec<Document> {
    if filters.is_empty() {
        return docs;
    }
    docs.into_iter().filter(|d| matches_all(filters, d)).collect()
}

/// JSON equality where `1` and `1.0` are the same number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Numbers order numerically, strings lexicographically; mixed kinds don't order.
fn ordering(actual: Option<Value>, expected: &Value) -> Option<Ordering> {
    match (actual?, expected) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.as_str().cmp(y.as_str())),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
