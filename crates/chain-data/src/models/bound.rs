use serde::{Deserialize, Serialize};

use super::preferences::ValidatorPrefs;

/// Normalized value held by a binder session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    /// Decimal string of a numeric wrapper
    Scalar(String),

    /// Ordered sequence of canonical strings
    Sequence(Vec<String>),

    /// Structured record passed through unchanged
    Preferences(ValidatorPrefs),

    /// Unrecognized shape, stored as delivered
    Opaque(serde_json::Value),
}

impl BoundValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[String]> {
        match self {
            Self::Sequence(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_preferences(&self) -> Option<&ValidatorPrefs> {
        match self {
            Self::Preferences(prefs) => Some(prefs),
            _ => None,
        }
    }
}

impl From<&str> for BoundValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}
