//! Patch IR: spans, text edits and edit lists.
//!
//! Edits are always expressed against the original, unmodified bytes of a
//! file. An edit list is valid when its spans are in bounds and pairwise
//! non-overlapping; zero-width insertions may touch the boundary of a
//! neighbouring edit but never fall strictly inside it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Core Types
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Create a span, returning `None` when `start > end`.
    pub fn checked(start: usize, end: usize) -> Option<Self> {
        (start <= end).then_some(Span { start, end })
    }

    /// Zero-width span at `offset`.
    pub fn empty_at(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Two spans overlap if they share any byte positions.
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    /// A zero-width span overlaps a span only if it lies strictly inside it.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A single text change against the original bytes of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// The original byte range being replaced.
    pub span: Span,
    /// The replacement text (empty for deletions).
    pub text: String,
}

impl TextEdit {
    /// Replace the bytes in `span` with `text`.
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        TextEdit {
            span,
            text: text.into(),
        }
    }

    /// Insert `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        TextEdit {
            span: Span::empty_at(offset),
            text: text.into(),
        }
    }

    /// Delete the bytes in `span`.
    pub fn delete(span: Span) -> Self {
        TextEdit {
            span,
            text: String::new(),
        }
    }

    /// Start offset of the edit.
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// End offset of the edit.
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// True if applying this edit can never change the file.
    pub fn is_noop(&self) -> bool {
        self.span.is_empty() && self.text.is_empty()
    }
}

// ============================================================================
// Conflict Detection
// ============================================================================

/// A detected overlap or out-of-bounds span that prevents apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    /// Two edits have overlapping spans.
    OverlappingSpans { first: Span, second: Span },

    /// Span is out of bounds for the source.
    SpanOutOfBounds { span: Span, source_len: usize },
}

/// Error type for edit list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Two edits have overlapping spans.
    #[error("overlapping edits: {first} and {second}")]
    OverlappingEdits { first: Span, second: Span },

    /// An edit span extends beyond source length.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    SpanOutOfBounds { span: Span, source_len: usize },

    /// A span ends before it starts.
    #[error("span {span} ends before it starts")]
    InvertedSpan { span: Span },

    /// A span boundary splits a multi-byte character.
    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },
}

impl From<Conflict> for EditError {
    fn from(conflict: Conflict) -> Self {
        match conflict {
            Conflict::OverlappingSpans { first, second } => {
                EditError::OverlappingEdits { first, second }
            }
            Conflict::SpanOutOfBounds { span, source_len } => {
                EditError::SpanOutOfBounds { span, source_len }
            }
        }
    }
}

/// Sort edits in deterministic order: by span start, then zero-width
/// insertions before edits that consume bytes at the same offset, then by
/// span end.
pub fn sort_edits(edits: &mut [TextEdit]) {
    edits.sort_by(|a, b| match a.span.start.cmp(&b.span.start) {
        Ordering::Equal => match (a.span.is_empty(), b.span.is_empty()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.span.end.cmp(&b.span.end),
        },
        other => other,
    });
}

/// Detect conflicts within an edit list.
///
/// Returns a list of all detected conflicts. An empty list means the edits
/// can be applied together.
#[must_use]
pub fn detect_conflicts(edits: &[TextEdit]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for i in 0..edits.len() {
        for j in (i + 1)..edits.len() {
            let span_i = edits[i].span;
            let span_j = edits[j].span;

            if span_i.overlaps(&span_j) || (span_i == span_j && !span_i.is_empty()) {
                conflicts.push(Conflict::OverlappingSpans {
                    first: span_i,
                    second: span_j,
                });
            }
        }
    }

    conflicts
}

/// Check that `edits` are well-formed, in bounds for a source of
/// `source_len` bytes and pairwise non-overlapping.
pub fn validate_edits(edits: &[TextEdit], source_len: usize) -> Result<(), EditError> {
    if let Some(edit) = edits.iter().find(|e| e.span.start > e.span.end) {
        return Err(EditError::InvertedSpan { span: edit.span });
    }

    if let Some(edit) = edits.iter().find(|e| e.span.end > source_len) {
        return Err(EditError::SpanOutOfBounds {
            span: edit.span,
            source_len,
        });
    }

    match detect_conflicts(edits).into_iter().next() {
        Some(conflict) => Err(conflict.into()),
        None => Ok(()),
    }
}

/// Apply an edit list to the original source and return the new text.
///
/// Edits are applied in reverse position order so every span keeps
/// addressing the original bytes. Insertions at the same offset keep their
/// input order.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    validate_edits(edits, source.len())?;

    for edit in edits {
        if !source.is_char_boundary(edit.span.start) || !source.is_char_boundary(edit.span.end) {
            return Err(EditError::NotCharBoundary { span: edit.span });
        }
    }

    let mut ordered = edits.to_vec();
    sort_edits(&mut ordered);

    let mut result = source.to_string();
    for edit in ordered.iter().rev() {
        result.replace_range(edit.span.start..edit.span.end, &edit.text);
    }

    tracing::trace!(edits = edits.len(), "applied edit list");
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================
