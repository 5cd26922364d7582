//! Node classifier: decides per syntax node whether it is reportable,
//! exempt with its whole subtree, or exempt on its own.
//!
//! The analyzer consults it while walking, and the finding synthesizer
//! consults it for selectors nested inside a reported base expression, so
//! both agree on which positions are exempt.

use getterguard_core::Span;
use getterguard_syntax::{
    AssignStmt, CallExpr, Expr, IncDecStmt, SelectorExpr, SelectorRole, UnaryExpr, UnaryOp,
    VisitResult,
};

/// Classification of one candidate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// Nothing in this node's subtree is reported.
    SkipSubtree,
    /// The node itself is not reported; its children are still inspected.
    SkipNodeOnly,
    /// The node is a field read to check against the oracle.
    Inspect,
}

impl NodeClass {
    /// How a walk should proceed after classifying a node this way.
    pub fn visit_result(self) -> VisitResult {
        match self {
            NodeClass::SkipSubtree => VisitResult::SkipChildren,
            NodeClass::SkipNodeOnly | NodeClass::Inspect => VisitResult::Continue,
        }
    }
}

/// A node kind the analyzer stops at.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Assign(&'a AssignStmt),
    IncDec(&'a IncDecStmt),
    Unary(&'a UnaryExpr),
    Call(&'a CallExpr),
    Selector {
        node: &'a SelectorExpr,
        role: SelectorRole,
    },
}

impl Candidate<'_> {
    pub fn span(&self) -> Span {
        match self {
            Candidate::Assign(node) => node.span,
            Candidate::IncDec(node) => node.span,
            Candidate::Unary(node) => node.span,
            Candidate::Call(node) => node.span,
            Candidate::Selector { node, .. } => node.span,
        }
    }
}

fn is_selector(expr: &Expr) -> bool {
    matches!(expr.unparen(), Expr::Selector(_))
}

pub fn classify(candidate: &Candidate<'_>) -> NodeClass {
    match candidate {
        // Writing a field, not reading it.
        Candidate::Assign(assign) => {
            if assign.lhs.iter().any(is_selector) {
                NodeClass::SkipSubtree
            } else {
                NodeClass::SkipNodeOnly
            }
        }
        Candidate::IncDec(inc_dec) => {
            if is_selector(&inc_dec.x) {
                NodeClass::SkipSubtree
            } else {
                NodeClass::SkipNodeOnly
            }
        }
        // An accessor result is not addressable.
        Candidate::Unary(unary) => {
            if unary.op == UnaryOp::Addr && is_selector(&unary.x) {
                NodeClass::SkipSubtree
            } else {
                NodeClass::SkipNodeOnly
            }
        }
        Candidate::Call(_) => NodeClass::SkipNodeOnly,
        Candidate::Selector { role, .. } => match role {
            SelectorRole::Read => NodeClass::Inspect,
            SelectorRole::Callee => NodeClass::SkipNodeOnly,
            SelectorRole::AddressOperand => NodeClass::SkipSubtree,
        },
    }
}
