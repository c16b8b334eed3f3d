use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single scalar value a row field may hold.
///
/// Rows are schemaless JSON-like maps; this is the closed set of scalar
/// shapes a field can carry. There is no nested array/object variant because
/// the engine never needs one: every value that reaches a row comes from a
/// single SQL literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    /// All numeric literals are carried as `f64`, matching the JSON-number
    /// semantics the source relies on (`float64` is the only numeric type
    /// produced by unmarshaling a literal).
    Float(f64),
    String(String),
}

impl Value {
    /// Parses `self` as a float if it already is one, or if it is a string
    /// that parses cleanly as a float. Used by comparison lowering, which
    /// classifies a field's *runtime* type before picking a comparison mode.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value the way a SQL literal's textual form would read,
    /// for lexicographic string comparison and for the stable-hash digest.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
            Value::String(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// A schemaless field→value mapping, the unit of storage. `BTreeMap` gives a
/// deterministic sorted-key iteration order for free, which the stable row
/// hash (see [`crate::hash::stable_row_hash`]) depends on.
pub type Row = BTreeMap<String, Value>;
