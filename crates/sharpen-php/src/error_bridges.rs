//! Error bridge implementations.
//!
//! `impl From<X> for SharpenError` conversions from the errors of this
//! crate's subsystems to the unified `SharpenError` type.

use sharpen_core::error::SharpenError;

use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::property_patch::PatchError;
use crate::resolver::ResolveError;
use crate::signatures::SignatureError;

// ============================================================================
// Bridge: ResolveError -> SharpenError
// ============================================================================

impl From<ResolveError> for SharpenError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownFunction { function_id } => {
                SharpenError::UnknownFunction { function_id }
            }
            ResolveError::Descriptor(err) => err.into(),
        }
    }
}

// ============================================================================
// Bridge: input errors -> SharpenError::InvalidInput
// ============================================================================

impl From<DescriptorError> for SharpenError {
    fn from(err: DescriptorError) -> Self {
        SharpenError::invalid_input(err.to_string())
    }
}

impl From<SignatureError> for SharpenError {
    fn from(err: SignatureError) -> Self {
        SharpenError::invalid_input(err.to_string())
    }
}

impl From<ConfigError> for SharpenError {
    fn from(err: ConfigError) -> Self {
        SharpenError::invalid_input(err.to_string())
    }
}

// ============================================================================
// Bridge: PatchError -> SharpenError
// ============================================================================

impl From<PatchError> for SharpenError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::MultipleProperties { property_id, count } => {
                SharpenError::InvalidDeclaration {
                    property_id,
                    reason: format!("statement declares {} properties", count),
                }
            }
            PatchError::MalformedDeclaration {
                property_id,
                reason,
            } => SharpenError::InvalidDeclaration {
                property_id,
                reason,
            },
            PatchError::Edit(err) => SharpenError::EditConflict(err),
            PatchError::Source { .. } => SharpenError::invalid_input(err.to_string()),
            PatchError::StaleHandle { .. } | PatchError::UnknownHandle => {
                SharpenError::internal(err.to_string())
            }
        }
    }
}
