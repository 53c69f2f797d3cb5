//! Dynamic value types for submission metadata
//!
//! Games attach free-form metadata to a score submission (`time`, `speed`,
//! secret triggers, ...). Values deserialize untagged so they read naturally
//! from JSON request bodies and RON fixtures alike.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A metadata value as sent by a game client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(ValueMap),
}

/// Submission metadata, in the order the client sent it
pub type ValueMap = IndexMap<String, Value>;

impl Value {
    /// Read this value as a number
    ///
    /// Integers widen to floats; numeric strings are parsed, since some
    /// clients serialize form fields as text.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether a flag-style value counts as set
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Float(3.5).as_float(), Some(3.5));
        assert_eq!(Value::Int(42).as_float(), Some(42.0));
        assert_eq!(Value::String(" 12.5".into()).as_float(), Some(12.5));
        assert_eq!(Value::String("fast".into()).as_float(), None);
        assert_eq!(Value::Bool(true).as_float(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(1).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::List(vec![Value::Null]).is_truthy());
    }

    #[test]
    fn test_untagged_json_metadata() {
        let metadata: ValueMap =
            serde_json::from_str(r#"{"time": 24.5, "moves": 31, "secret": true, "mode": "hard"}"#).unwrap();
        assert_eq!(metadata["time"], Value::Float(24.5));
        assert_eq!(metadata["moves"], Value::Int(31));
        assert_eq!(metadata["secret"], Value::Bool(true));
        assert_eq!(metadata["mode"], Value::String("hard".into()));
    }
}
