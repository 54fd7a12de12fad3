//! Error types and error code constants for sharpen.
//!
//! This module provides a unified error type (`SharpenError`) that the
//! domain-specific errors of each subsystem (return type resolution, patch
//! building, descriptor parsing, configuration) are bridged into.
//!
//! ## Design
//!
//! - **Unified type**: `SharpenError` is the single error type callers need to match on
//! - **Bridging**: `impl From<X> for SharpenError` lives next to each domain error
//! - **Code mapping**: `ErrorCode` provides stable integer codes
//!
//! Both fatal conditions of the analyzer (an unknown built-in function and a
//! multi-variable property declaration) are caller-contract violations and
//! map to their own codes so the surrounding checker can report them as bugs.

use std::fmt;

use thiserror::Error;

use crate::patch::EditError;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Malformed input (descriptor strings, configuration, source text).
    InvalidInput = 2,
    /// A built-in function was resolved that the signature table does not know.
    UnknownFunction = 3,
    /// A property declaration cannot be patched.
    InvalidDeclaration = 4,
    /// Edits conflict or do not fit the source.
    EditConflict = 5,
    /// Internal errors (bugs, unexpected state).
    Internal = 10,
}

impl ErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type.
#[derive(Debug, Error)]
pub enum SharpenError {
    /// Malformed input.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Function id missing from the signature table.
    #[error("function {function_id} was not found in the signature table")]
    UnknownFunction { function_id: String },

    /// Property declaration that cannot be patched.
    #[error("cannot patch property {property_id}: {reason}")]
    InvalidDeclaration { property_id: String, reason: String },

    /// Edit conflict.
    #[error("edit conflict: {0}")]
    EditConflict(#[from] EditError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<&SharpenError> for ErrorCode {
    fn from(err: &SharpenError) -> Self {
        match err {
            SharpenError::InvalidInput { .. } => ErrorCode::InvalidInput,
            SharpenError::UnknownFunction { .. } => ErrorCode::UnknownFunction,
            SharpenError::InvalidDeclaration { .. } => ErrorCode::InvalidDeclaration,
            SharpenError::EditConflict(_) => ErrorCode::EditConflict,
            SharpenError::Internal { .. } => ErrorCode::Internal,
        }
    }
}

impl SharpenError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SharpenError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SharpenError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }

    /// True for errors that indicate a bug in the caller rather than bad input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SharpenError::UnknownFunction { .. } | SharpenError::InvalidDeclaration { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
