//! PHP analysis engines for sharpen.
//!
//! This crate provides:
//! - A type model of unions, atomics and taint metadata
//! - Return types of built-in function calls, sharpened from their argument types
//! - Taint propagation through built-in string functions
//! - Text edits that update a property's type hint and docblock tags
//!
//! Supporting modules cover the built-in signature table, type descriptor
//! parsing, class hierarchy lookup, configuration and source access.

pub mod config;
pub mod context;
pub mod descriptor;
pub mod docblock;
pub mod error_bridges;
pub mod hierarchy;
pub mod property_patch;
pub mod resolver;
pub mod signatures;
pub mod source;
pub mod taint_flow;
pub mod types;

pub use config::AnalysisConfig;
pub use context::{CallArgument, CallingContext, ExprId};
pub use descriptor::{DescriptorParser, TypeDescriptorParser};
pub use property_patch::{DesiredType, PatchError, PatchHandle, PatchRegistry, PropertyDeclaration};
pub use resolver::{Refinement, ResolveError, ReturnTypeResolver};
pub use signatures::{SignatureLookup, SignatureTable};
pub use types::{Atomic, TaintKind, TaintSet, Union};
