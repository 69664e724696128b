//! Typed classification of normalized payloads.

use serde_json::Value;

/// A normalized payload, classified into the closed set of shapes the
/// rendering templates distinguish between.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadKind {
    /// No content to render.
    Empty,
    /// Tabular content: optional column headers plus row data.
    Table {
        columns: Option<Vec<Value>>,
        rows: Vec<Value>,
    },
    /// A flat list of records.
    List(Vec<Value>),
    /// A single primitive value.
    Scalar(Value),
    /// Structured content with no recognized shape; rendered generically.
    Opaque(Value),
}

impl PayloadKind {
    /// Classify a value produced by [`crate::normalize`].
    ///
    /// Classification is shape-based and infallible; content that matches
    /// no known shape lands in [`PayloadKind::Opaque`].
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Array(items) => Self::List(items.clone()),
            Value::Object(obj) => {
                if let Some(Value::Array(rows)) = obj.get("rows") {
                    let columns = match obj.get("columns") {
                        Some(Value::Array(cols)) => Some(cols.clone()),
                        _ => None,
                    };
                    return Self::Table {
                        columns,
                        rows: rows.clone(),
                    };
                }
                Self::Opaque(value.clone())
            }
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Self::Scalar(value.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
