//! Text position utilities for byte offsets, lines and indentation.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count bytes, matching the byte-offset based patch IR

// ============================================================================
// Position Conversions
// ============================================================================

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds content length, returns position at end of content.
pub fn byte_offset_to_position(content: &[u8], offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for &byte in &content[..offset] {
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// 1-indexed line containing `offset`.
pub fn line_of_offset(content: &[u8], offset: usize) -> u32 {
    byte_offset_to_position(content, offset).0
}

// ============================================================================
// Line Utilities
// ============================================================================

/// Byte offset of the first byte of the line containing `offset`.
///
/// This is the position just after the nearest preceding `\n`, or 0 when
/// `offset` is on the first line.
pub fn line_start_before(content: &[u8], offset: usize) -> usize {
    let offset = offset.min(content.len());
    content[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0)
}

/// The whitespace that precedes `offset` on its line.
///
/// Takes the text between the previous line break and `offset` and returns
/// its leading run of spaces and tabs. For `"    public $x"` with `offset`
/// at `public`, this is `"    "`.
pub fn leading_indentation(content: &str, offset: usize) -> &str {
    let offset = offset.min(content.len());
    let start = line_start_before(content.as_bytes(), offset);
    let Some(line_prefix) = content.get(start..offset) else {
        return "";
    };
    let trimmed = line_prefix.trim_start_matches([' ', '\t']);
    &line_prefix[..line_prefix.len() - trimmed.len()]
}

// ============================================================================
// Tests
// ============================================================================
