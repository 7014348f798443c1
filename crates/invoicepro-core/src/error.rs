//! # Error Types
//!
//! Domain-specific error types for invoicepro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  invoicepro-core (this file)                                           │
//! │  └── ValidationError  - Caller-side form rule failures                 │
//! │                                                                         │
//! │  invoicepro-store                                                      │
//! │  └── StoreError       - Local store failures                           │
//! │                                                                         │
//! │  invoicepro-data                                                       │
//! │  └── DataError        - Remote/local routing failures                  │
//! │                                                                         │
//! │  Flow: ValidationError → DataError → UI                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Storage never raises these on its own; they come from the helpers in
/// [`crate::validation`] which the UI runs before saving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a `Required` error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a `MustBePositive` error for the given field.
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Result type for validation helpers.
pub type ValidationResult<T = ()> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
