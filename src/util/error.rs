//! Error types for feature access.

use thiserror::Error;

use super::FeatureKind;

/// Main error type for feature access.
///
/// Value types that map to no feature kind never reach this enum: they are
/// rejected at compile time because they do not implement
/// [`FeatureValue`](super::FeatureValue).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Read-only lookup of a key that is not in the record or feature lists
    #[error("Feature not found: {0}")]
    KeyNotFound(String),

    /// Feature exists but holds a different list kind than requested.
    ///
    /// `key` is empty when the error comes from a feature-level call.
    #[error("Wrong feature kind{}: expected {expected}, got {actual}", key_clause(.key))]
    WrongVariant {
        key: String,
        expected: FeatureKind,
        actual: FeatureKind,
    },
}

impl Error {
    /// Create a key-not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound(key.into())
    }

    /// Attach a key to a `WrongVariant` raised at feature level.
    pub(crate) fn with_key(self, key: &str) -> Self {
        match self {
            Self::WrongVariant { expected, actual, .. } => Self::WrongVariant {
                key: key.to_string(),
                expected,
                actual,
            },
            other => other,
        }
    }
}

fn key_clause(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!(" for '{}'", key)
    }
}

/// Result type alias for feature access.
pub type Result<T> = std::result::Result<T, Error>;
