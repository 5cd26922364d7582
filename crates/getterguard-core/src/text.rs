//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count **bytes**, not characters, so a column maps back to a
//!   byte offset without re-decoding the line
//! - Byte offsets are **0-indexed**
//! - Line/column values of 0 are treated as 1

use crate::patch::Span;

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds content length, returns the position at end of content.
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

/// Convert 1-indexed line and column to byte offset.
///
/// A column past the end of its line clamps to the line end. A line past the
/// end of the content returns the content length.
pub fn position_to_byte_offset(content: &[u8], line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let Some(line_start) = line_start_offset(content, line) else {
        return content.len();
    };

    let line_end = content[line_start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| line_start + p)
        .unwrap_or(content.len());
    let offset_in_line = (col as usize).saturating_sub(1);
    line_start + offset_in_line.min(line_end - line_start)
}

/// Get the byte offset of the start of a 1-indexed line.
///
/// Returns `None` if the content has fewer lines.
pub fn line_start_offset(content: &[u8], line: u32) -> Option<usize> {
    if line <= 1 {
        return Some(0);
    }

    let mut current_line = 1u32;
    for (i, &byte) in content.iter().enumerate() {
        if byte == b'\n' {
            current_line += 1;
            if current_line == line {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Extract the text content of a span as a string.
///
/// Returns `None` if the span extends beyond content bounds or splits a character.
pub fn extract_span_str<'a>(content: &'a str, span: &Span) -> Option<&'a str> {
    content.get(span.start..span.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_position_simple() {
        let content = b"line1\nline2\nline3\n";
        assert_eq!(byte_offset_to_position(content, 0), (1, 1));
        assert_eq!(byte_offset_to_position(content, 4), (1, 5));
        assert_eq!(byte_offset_to_position(content, 5), (1, 6));
        assert_eq!(byte_offset_to_position(content, 6), (2, 1));
        assert_eq!(byte_offset_to_position(content, 12), (3, 1));
    }

    #[test]
    fn columns_count_bytes() {
        let content = "s := \"é\"; m.Name".as_bytes();
        let offset = content.len() - "m.Name".len();
        assert_eq!(byte_offset_to_position(content, offset), (1, 12));
    }

    #[test]
    fn position_to_offset_simple() {
        let content = b"line1\nline2\nline3\n";
        assert_eq!(position_to_byte_offset(content, 1, 1), 0);
        assert_eq!(position_to_byte_offset(content, 1, 5), 4);
        assert_eq!(position_to_byte_offset(content, 2, 1), 6);
        assert_eq!(position_to_byte_offset(content, 3, 1), 12);
    }

    #[test]
    fn roundtrip_byte_based() {
        let content = b"func f() {\n\t_ = m.Name\n}\n";
        for offset in 0..content.len() {
            let (line, col) = byte_offset_to_position(content, offset);
            assert_eq!(position_to_byte_offset(content, line, col), offset);
        }
    }

    #[test]
    fn beyond_content_clamps() {
        let content = b"short";
        assert_eq!(byte_offset_to_position(content, 100), (1, 6));
        assert_eq!(position_to_byte_offset(content, 100, 1), 5);
        assert_eq!(position_to_byte_offset(content, 1, 100), 5);
    }

    #[test]
    fn line_start_offsets() {
        let content = b"a\nbb\n\nc";
        assert_eq!(line_start_offset(content, 1), Some(0));
        assert_eq!(line_start_offset(content, 2), Some(2));
        assert_eq!(line_start_offset(content, 3), Some(5));
        assert_eq!(line_start_offset(content, 4), Some(6));
        assert_eq!(line_start_offset(content, 5), None);
    }

    #[test]
    fn extract_span_text() {
        let content = "x := msg.Name";
        assert_eq!(extract_span_str(content, &Span::new(5, 13)), Some("msg.Name"));
        assert_eq!(extract_span_str(content, &Span::new(5, 30)), None);
    }
}
