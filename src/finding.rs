//! Finding synthesizer: turns an accepted selector into the original text,
//! its replacement and the edit ranges.

use thiserror::Error;

use getterguard_core::{Span, TextEdit};
use getterguard_syntax::{
    print_expr_with, CodegenError, RewriteHook, SelectorExpr, SelectorRewrite, SelectorRole,
    SourceFile,
};

use crate::classify::{classify, Candidate, NodeClass};
use crate::oracle::CapabilityOracle;

/// One detection and its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Byte range of the selector in its file.
    pub span: Span,
    /// Source text of `span`.
    pub from: String,
    /// Replacement text.
    pub to: String,
    /// Narrower edit replacing only the field identifier, when that is all
    /// the rewrite changes.
    pub field_edit: Option<TextEdit>,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("span {span} is outside the source of {file}")]
    SourceOutOfRange { file: String, span: Span },
}

/// Rewrites the nested selectors of a base expression the same way the
/// analyzer would report them.
struct NestedAccessors<'o> {
    oracle: &'o CapabilityOracle<'o>,
    rewrote: bool,
}

impl RewriteHook for NestedAccessors<'_> {
    fn rewrite_selector(&mut self, node: &SelectorExpr, role: SelectorRole) -> SelectorRewrite {
        match classify(&Candidate::Selector { node, role }) {
            NodeClass::SkipSubtree => SelectorRewrite::KeepSubtree,
            NodeClass::SkipNodeOnly => SelectorRewrite::Keep,
            NodeClass::Inspect if self.oracle.is_unsafe_direct_read(node) => {
                self.rewrote = true;
                SelectorRewrite::Accessor(self.oracle.accessor_name(&node.sel.name))
            }
            NodeClass::Inspect => SelectorRewrite::Keep,
        }
    }
}

pub struct Synthesizer<'o> {
    oracle: &'o CapabilityOracle<'o>,
}

impl<'o> Synthesizer<'o> {
    pub fn new(oracle: &'o CapabilityOracle<'o>) -> Self {
        Synthesizer { oracle }
    }

    /// Build the finding for `node`, which the oracle has accepted.
    pub fn synthesize(
        &self,
        file: &SourceFile,
        node: &SelectorExpr,
    ) -> Result<Finding, SynthesisError> {
        let out_of_range = || SynthesisError::SourceOutOfRange {
            file: file.name.clone(),
            span: node.span,
        };
        let from = file.text(node.span).ok_or_else(out_of_range)?;

        let mut hook = NestedAccessors {
            oracle: self.oracle,
            rewrote: false,
        };
        let base = print_expr_with(&node.x, &mut hook)?;
        let accessor = format!("{}()", self.oracle.accessor_name(&node.sel.name));
        let to = format!("{}.{}", base, accessor);

        let field_offset = node.sel.span.start - node.span.start;
        let head = from.get(..field_offset).ok_or_else(out_of_range)?;
        let field_edit = if !hook.rewrote && format!("{}{}", head, accessor) == to {
            Some(TextEdit::replace(node.sel.span, accessor))
        } else {
            None
        };

        Ok(Finding {
            span: node.span,
            from: from.to_string(),
            to,
            field_edit,
        })
    }
}
