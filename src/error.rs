//! Error type for the orbit engine.
//!
//! Numeric evaluation is total: defaults and zero-denominator guards cover
//! every finite input. Errors surface only for values that are not numbers
//! at all (non-finite floats, wrong JSON types) and never trigger retries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput { field, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject NaN and infinities for a named numeric field.
pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(field, format!("expected a finite number, got {value}")))
    }
}
