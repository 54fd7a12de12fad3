//! Core infrastructure for sharpen.
//!
//! This crate provides language-agnostic infrastructure:
//! - Byte spans and text edits against untouched original sources
//! - Ordering, conflict detection and application of edit lists
//! - Text utilities for offsets, lines and indentation
//! - Unified error type and error codes

pub mod error;
pub mod patch;
pub mod text;
