//! Error types for policy evaluation.

use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur while validating input or evaluating a policy.
///
/// All variants are local validation failures. Nothing here is transient,
/// so callers should not retry a refused evaluation with the same input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("invalid policy: {0:?} (expected threshold, reactive or conservative)")]
    InvalidPolicy(String),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        reason: &'static str,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid trace at line {line}: {reason}")]
    InvalidTrace { line: usize, reason: String },
}

impl PolicyError {
    pub fn parameter(name: &'static str, value: i64, reason: &'static str) -> Self {
        PolicyError::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    pub fn is_invalid_policy(&self) -> bool {
        matches!(self, PolicyError::InvalidPolicy(_))
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, PolicyError::InvalidParameter { .. })
    }
}
