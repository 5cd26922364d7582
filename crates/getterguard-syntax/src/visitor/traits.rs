// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait definition.

use crate::nodes::{
    AssignStmt, BadNode, BasicLit, BinaryExpr, Block, BranchStmt, CallExpr, CallStmt,
    CaseClause, CommClause, CompositeLit, Decl, Expr, ForStmt, FuncDecl, FuncLit, Ident,
    IfStmt, IncDecStmt, IndexExpr, IndexListExpr, KeyValueExpr, LabeledStmt, ParenExpr,
    RangeStmt, ReturnStmt, SelectStmt, SelectorExpr, SendStmt, SliceExpr, SourceFile, Stmt,
    SwitchStmt, TypeAssertExpr, TypeCaseClause, TypeDecl, TypeSwitchStmt, UnaryExpr, VarDecl,
};

/// Result of visiting a node; controls how the walker proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    ///
    /// After visiting children, `leave_*` will be called for this node.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// `leave_*` is still called for this node.
    SkipChildren,

    /// Stop traversal entirely.
    ///
    /// No further `visit_*` or `leave_*` methods are called.
    Stop,
}

/// Generates `visit_*`/`leave_*` pairs with default implementations.
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $node_type:ty
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`", stringify!($node_type), "`] node.")]
                #[doc = ""]
                #[doc = "Called before descending into children."]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, node: &'a $node_type) -> VisitResult {
                    VisitResult::Continue
                }

                $(#[$meta])*
                #[doc = concat!("Leave a [`", stringify!($node_type), "`] node.")]
                #[doc = ""]
                #[doc = "Called after children, even if `SkipChildren` was returned."]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, node: &'a $node_type) {}
            )*
        }
    };
}

/// Immutable visitor over a parsed [`SourceFile`].
///
/// Node references carry the tree's lifetime so implementations can keep
/// them past the callback.
///
/// Enum nodes (`Decl`, `Stmt`, `Expr`) get their own callback before the
/// callback of the concrete variant, so a visitor can act on every
/// expression in one place or on one kind of expression only.
pub trait Visitor<'a> {
    visitor_methods! {
        source_file: SourceFile,
        decl: Decl,
        func_decl: FuncDecl,
        type_decl: TypeDecl,
        var_decl: VarDecl,
        block: Block,
        stmt: Stmt,
        assign_stmt: AssignStmt,
        inc_dec_stmt: IncDecStmt,
        send_stmt: SendStmt,
        return_stmt: ReturnStmt,
        if_stmt: IfStmt,
        for_stmt: ForStmt,
        range_stmt: RangeStmt,
        switch_stmt: SwitchStmt,
        case_clause: CaseClause,
        type_switch_stmt: TypeSwitchStmt,
        type_case_clause: TypeCaseClause,
        select_stmt: SelectStmt,
        comm_clause: CommClause,
        /// `go` and `defer` statements.
        call_stmt: CallStmt,
        labeled_stmt: LabeledStmt,
        branch_stmt: BranchStmt,
        expr: Expr,
        ident: Ident,
        basic_lit: BasicLit,
        composite_lit: CompositeLit,
        func_lit: FuncLit,
        selector_expr: SelectorExpr,
        call_expr: CallExpr,
        index_expr: IndexExpr,
        index_list_expr: IndexListExpr,
        slice_expr: SliceExpr,
        type_assert_expr: TypeAssertExpr,
        key_value_expr: KeyValueExpr,
        unary_expr: UnaryExpr,
        binary_expr: BinaryExpr,
        paren_expr: ParenExpr,
        /// Declarations, statements and expressions that failed to parse.
        bad: BadNode,
    }
}
