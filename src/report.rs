//! Output adapters: embedded diagnostics and structured issues.

use serde::{Deserialize, Serialize};

use getterguard_core::text::position_to_byte_offset;
use getterguard_core::{Position, Span, TextEdit};
use getterguard_syntax::SourceFile;

use crate::finding::Finding;

/// Message shared by both output modes.
pub fn format_message(from: &str, to: &str) -> String {
    format!("avoid direct access to proto field {:?} use {:?}", from, to)
}

/// Message of the fix that only swaps the field name for the accessor.
pub const FIELD_FIX_MESSAGE: &str = "replace only the field name";

/// A set of edits that resolves a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFix {
    pub message: String,
    pub edits: Vec<TextEdit>,
}

/// A diagnostic reported to a host driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub span: Span,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_fixes: Vec<SuggestedFix>,
}

impl Diagnostic {
    /// The first fix replaces the whole selector. When the rewrite only
    /// touches the field name, a second fix carries that narrower edit.
    pub fn from_finding(file: &SourceFile, finding: &Finding) -> Self {
        let message = format_message(&finding.from, &finding.to);
        let mut suggested_fixes = vec![SuggestedFix {
            message: message.clone(),
            edits: vec![TextEdit::replace(finding.span, finding.to.clone())],
        }];
        if let Some(edit) = &finding.field_edit {
            suggested_fixes.push(SuggestedFix {
                message: FIELD_FIX_MESSAGE.to_string(),
                edits: vec![edit.clone()],
            });
        }
        Diagnostic {
            file: file.name.clone(),
            span: finding.span,
            message,
            suggested_fixes,
        }
    }

    /// A diagnostic for a node the rule failed to process.
    pub fn error(file: &SourceFile, span: Span, cause: impl std::fmt::Display) -> Self {
        Diagnostic {
            file: file.name.clone(),
            span,
            message: format!("error: {}", cause),
            suggested_fixes: Vec::new(),
        }
    }

    /// Edits of the first suggested fix. Alternatives overlap it, so only
    /// one fix per diagnostic is ever applied.
    pub fn edits(&self) -> impl Iterator<Item = &TextEdit> {
        self.suggested_fixes.iter().take(1).flat_map(|fix| fix.edits.iter())
    }
}

/// Receives diagnostics in embedded mode.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Single-line replacement in the shape lint aggregators apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFix {
    /// Zero-based byte column where the replacement starts.
    pub start_col: usize,
    /// Number of bytes replaced.
    pub length: usize,
    pub new_string: String,
}

/// A finding in structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub pos: Position,
    pub message: String,
    pub inline_fix: InlineFix,
}

impl Issue {
    pub fn from_finding(file: &SourceFile, finding: &Finding) -> Self {
        let pos = Position::at_offset(file.name.as_str(), &file.source, finding.span.start);
        Issue {
            message: format_message(&finding.from, &finding.to),
            inline_fix: InlineFix {
                start_col: pos.column as usize - 1,
                length: finding.from.len(),
                new_string: finding.to.clone(),
            },
            pos,
        }
    }

    /// The inline fix as a byte-range edit on `content`.
    pub fn to_text_edit(&self, content: &str) -> TextEdit {
        let line_start = position_to_byte_offset(content.as_bytes(), self.pos.line, 1);
        let start = line_start + self.inline_fix.start_col;
        TextEdit::replace(
            Span::new(start, start + self.inline_fix.length),
            self.inline_fix.new_string.clone(),
        )
    }
}
