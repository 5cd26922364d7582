//! Spans and text edits.
//!
//! A [`TextEdit`] replaces the bytes of one [`Span`] with new text. Edits for
//! one file are applied together by [`apply_edits`], which refuses to apply
//! anything when two edits overlap: a fix is either applied exactly or not
//! at all.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Span
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

    /// Smallest span covering both `self` and `other`.
    pub fn cover(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Two spans overlap if they share any byte positions.
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if a byte offset falls inside this span.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Edits
// ============================================================================

/// Replace the bytes in `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// The exact byte range to replace.
    pub span: Span,
    /// The replacement text.
    pub new_text: String,
}

impl TextEdit {
    /// Create a replace edit.
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        TextEdit {
            span,
            new_text: new_text.into(),
        }
    }
}

/// Reasons a set of edits cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Two edits touch the same bytes.
    #[error("edits overlap: {first} and {second}")]
    OverlappingEdits { first: Span, second: Span },

    /// An edit reaches past the end of the content.
    #[error("edit span {span} is out of bounds for content of {len} bytes")]
    OutOfBounds { span: Span, len: usize },

    /// An edit boundary splits a UTF-8 character.
    #[error("edit span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },
}

/// Find overlapping pairs among `edits`.
///
/// Edits are compared in span order, so each conflict is reported once with
/// the earlier span first.
#[must_use]
pub fn detect_conflicts(edits: &[TextEdit]) -> Vec<(Span, Span)> {
    let mut spans: Vec<Span> = edits.iter().map(|e| e.span).collect();
    spans.sort();

    let mut conflicts = Vec::new();
    let mut reach: Option<Span> = None;
    for span in spans {
        if let Some(prev) = reach {
            if prev.overlaps(&span) {
                conflicts.push((prev, span));
            }
            if span.end > prev.end {
                reach = Some(span);
            }
        } else {
            reach = Some(span);
        }
    }
    conflicts
}

/// Apply all `edits` to `content`.
///
/// Either every edit applies or none does. Edits are applied in reverse
/// offset order so earlier spans stay valid.
pub fn apply_edits(content: &str, edits: &[TextEdit]) -> Result<String, PatchError> {
    if let Some((first, second)) = detect_conflicts(edits).into_iter().next() {
        return Err(PatchError::OverlappingEdits { first, second });
    }

    for edit in edits {
        if edit.span.end > content.len() {
            return Err(PatchError::OutOfBounds {
                span: edit.span,
                len: content.len(),
            });
        }
        if !content.is_char_boundary(edit.span.start) || !content.is_char_boundary(edit.span.end)
        {
            return Err(PatchError::NotCharBoundary { span: edit.span });
        }
    }

    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut result = content.to_string();
    for edit in ordered {
        result.replace_range(edit.span.start..edit.span.end, &edit.new_text);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_overlap_and_containment() {
        let outer = Span::new(0, 10);
        let inner = Span::new(2, 5);
        let adjacent = Span::new(10, 12);

        assert!(outer.overlaps(&inner));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.overlaps(&adjacent));
        assert!(outer.contains_offset(9));
        assert!(!outer.contains_offset(10));
    }

    #[test]
    fn span_cover() {
        let a = Span::new(4, 6);
        let b = Span::new(1, 5);
        assert_eq!(a.cover(&b), Span::new(1, 6));
    }

    #[test]
    #[should_panic(expected = "must be <= end")]
    fn span_rejects_inverted_range() {
        let _ = Span::new(5, 1);
    }

    #[test]
    fn apply_single_replacement() {
        let content = "x := msg.Name\n";
        let edits = vec![TextEdit::replace(Span::new(5, 13), "msg.GetName()")];
        assert_eq!(apply_edits(content, &edits).unwrap(), "x := msg.GetName()\n");
    }

    #[test]
    fn apply_multiple_replacements_in_any_order() {
        let content = "a.B + c.D";
        let edits = vec![
            TextEdit::replace(Span::new(6, 9), "c.GetD()"),
            TextEdit::replace(Span::new(0, 3), "a.GetB()"),
        ];
        assert_eq!(apply_edits(content, &edits).unwrap(), "a.GetB() + c.GetD()");
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let content = "a.B.C";
        let edits = vec![
            TextEdit::replace(Span::new(0, 5), "a.GetB().GetC()"),
            TextEdit::replace(Span::new(0, 3), "a.GetB()"),
        ];
        let err = apply_edits(content, &edits).unwrap_err();
        assert_eq!(
            err,
            PatchError::OverlappingEdits {
                first: Span::new(0, 3),
                second: Span::new(0, 5),
            }
        );
    }

    #[test]
    fn detect_conflicts_reports_transitive_reach() {
        let edits = vec![
            TextEdit::replace(Span::new(0, 10), ""),
            TextEdit::replace(Span::new(2, 3), ""),
            TextEdit::replace(Span::new(5, 6), ""),
        ];
        assert_eq!(detect_conflicts(&edits).len(), 2);
    }

    #[test]
    fn out_of_bounds_edit_is_rejected() {
        let edits = vec![TextEdit::replace(Span::new(2, 40), "")];
        assert!(matches!(
            apply_edits("short", &edits),
            Err(PatchError::OutOfBounds { len: 5, .. })
        ));
    }

    #[test]
    fn non_char_boundary_is_rejected() {
        let edits = vec![TextEdit::replace(Span::new(1, 2), "x")];
        assert!(matches!(
            apply_edits("é", &edits),
            Err(PatchError::NotCharBoundary { .. })
        ));
    }
}
