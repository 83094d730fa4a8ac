//! Shared error type.
//!
//! Sub-crates define their own error enums and convert `CoreError` into them
//! via `From` impls.

use thiserror::Error;

/// Errors common to every `ev-*` crate.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A caller-supplied quantity was negative or not a number.
    #[error("invalid {what}: {value} (must be a non-negative number)")]
    InvalidInput { what: &'static str, value: f64 },
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Reject negative and NaN quantities.  Positive infinity is accepted.
///
/// ```
/// use ev_core::ensure_non_negative;
///
/// assert_eq!(ensure_non_negative("range", 12.5), Ok(12.5));
/// assert!(ensure_non_negative("range", -1.0).is_err());
/// ```
pub fn ensure_non_negative(what: &'static str, value: f64) -> CoreResult<f64> {
    if value.is_nan() || value < 0.0 {
        Err(CoreError::InvalidInput { what, value })
    } else {
        Ok(value)
    }
}
