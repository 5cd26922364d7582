// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions driving a [`Visitor`] over the tree.
//!
//! Each `walk_*` calls `visit_*`, descends into children unless told not
//! to, then calls `leave_*`. A `Stop` from any callback unwinds the whole
//! walk without further callbacks.

use super::traits::{VisitResult, Visitor};
use crate::nodes::*;

/// Run `visit`, the children closure and `leave` with the usual control flow.
macro_rules! walk_node {
    ($visitor:ident, $node:ident, $visit:ident, $leave:ident, |$v:ident| $children:block) => {{
        match $visitor.$visit($node) {
            VisitResult::Stop => return VisitResult::Stop,
            VisitResult::SkipChildren => {}
            VisitResult::Continue => {
                let $v: &mut V = $visitor;
                let result: VisitResult = $children;
                if result == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
        }
        $visitor.$leave($node);
        VisitResult::Continue
    }};
}

/// Walk each item in order, stopping at the first `Stop`.
fn walk_all<'a, T, V, F>(
    visitor: &mut V,
    items: impl IntoIterator<Item = &'a T>,
    mut walk: F,
) -> VisitResult
where
    T: 'a,
    V: Visitor<'a>,
    F: FnMut(&mut V, &'a T) -> VisitResult,
{
    for item in items {
        if walk(visitor, item) == VisitResult::Stop {
            return VisitResult::Stop;
        }
    }
    VisitResult::Continue
}

// ============================================================================
// File and declarations
// ============================================================================

/// Walk a [`SourceFile`]: every top-level declaration in order.
pub fn walk_source_file<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SourceFile) -> VisitResult {
    walk_node!(visitor, node, visit_source_file, leave_source_file, |v| {
        walk_all(v, &node.decls, walk_decl)
    })
}

pub fn walk_decl<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Decl) -> VisitResult {
    walk_node!(visitor, node, visit_decl, leave_decl, |v| {
        match node {
            Decl::Type(t) => walk_type_decl(v, t),
            Decl::Func(f) => walk_func_decl(v, f),
            Decl::Var(d) | Decl::Const(d) => walk_var_decl(v, d),
            Decl::Bad(b) => walk_bad(v, b),
        }
    })
}

/// Walk a [`FuncDecl`]. Only the body holds expressions.
pub fn walk_func_decl<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a FuncDecl) -> VisitResult {
    walk_node!(visitor, node, visit_func_decl, leave_func_decl, |v| {
        match &node.body {
            Some(body) => walk_block(v, body),
            None => VisitResult::Continue,
        }
    })
}

pub fn walk_type_decl<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a TypeDecl) -> VisitResult {
    walk_node!(visitor, node, visit_type_decl, leave_type_decl, |v| {
        let _ = v;
        VisitResult::Continue
    })
}

/// Walk a [`VarDecl`] of a `var` or `const` declaration.
pub fn walk_var_decl<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a VarDecl) -> VisitResult {
    walk_node!(visitor, node, visit_var_decl, leave_var_decl, |v| {
        match walk_all(v, &node.names, walk_ident) {
            VisitResult::Stop => VisitResult::Stop,
            _ => walk_all(v, &node.values, walk_expr),
        }
    })
}

pub fn walk_bad<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a BadNode) -> VisitResult {
    walk_node!(visitor, node, visit_bad, leave_bad, |v| {
        let _ = v;
        VisitResult::Continue
    })
}

// ============================================================================
// Statements
// ============================================================================

pub fn walk_block<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Block) -> VisitResult {
    walk_node!(visitor, node, visit_block, leave_block, |v| {
        walk_all(v, &node.stmts, walk_stmt)
    })
}

/// Walk a [`Stmt`], dispatching to the concrete statement walk.
pub fn walk_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Stmt) -> VisitResult {
    walk_node!(visitor, node, visit_stmt, leave_stmt, |v| {
        match node {
            Stmt::Expr(e) => walk_expr(v, e),
            Stmt::Assign(s) => walk_assign_stmt(v, s),
            Stmt::IncDec(s) => walk_inc_dec_stmt(v, s),
            Stmt::Send(s) => walk_send_stmt(v, s),
            Stmt::Var(s) | Stmt::Const(s) => walk_var_decl(v, s),
            Stmt::Type(s) => walk_type_decl(v, s),
            Stmt::Return(s) => walk_return_stmt(v, s),
            Stmt::If(s) => walk_if_stmt(v, s),
            Stmt::For(s) => walk_for_stmt(v, s),
            Stmt::Range(s) => walk_range_stmt(v, s),
            Stmt::Switch(s) => walk_switch_stmt(v, s),
            Stmt::TypeSwitch(s) => walk_type_switch_stmt(v, s),
            Stmt::Select(s) => walk_select_stmt(v, s),
            Stmt::Go(s) | Stmt::Defer(s) => walk_call_stmt(v, s),
            Stmt::Labeled(s) => walk_labeled_stmt(v, s),
            Stmt::Branch(s) => walk_branch_stmt(v, s),
            Stmt::Block(b) => walk_block(v, b),
            Stmt::Bad(b) => walk_bad(v, b),
        }
    })
}

pub fn walk_assign_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a AssignStmt) -> VisitResult {
    walk_node!(visitor, node, visit_assign_stmt, leave_assign_stmt, |v| {
        match walk_all(v, &node.lhs, walk_expr) {
            VisitResult::Stop => VisitResult::Stop,
            _ => walk_all(v, &node.rhs, walk_expr),
        }
    })
}

pub fn walk_inc_dec_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a IncDecStmt) -> VisitResult {
    walk_node!(visitor, node, visit_inc_dec_stmt, leave_inc_dec_stmt, |v| {
        walk_expr(v, &node.x)
    })
}

pub fn walk_send_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SendStmt) -> VisitResult {
    walk_node!(visitor, node, visit_send_stmt, leave_send_stmt, |v| {
        if walk_expr(v, &node.chan) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_expr(v, &node.value)
    })
}

pub fn walk_return_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a ReturnStmt) -> VisitResult {
    walk_node!(visitor, node, visit_return_stmt, leave_return_stmt, |v| {
        walk_all(v, &node.results, walk_expr)
    })
}

/// Walk an [`IfStmt`]: init, condition, then-block, else branch.
pub fn walk_if_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a IfStmt) -> VisitResult {
    walk_node!(visitor, node, visit_if_stmt, leave_if_stmt, |v| {
        if let Some(init) = &node.init {
            if walk_stmt(v, init) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        if walk_expr(v, &node.cond) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        if walk_block(v, &node.then) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        match &node.els {
            Some(els) => walk_stmt(v, els),
            None => VisitResult::Continue,
        }
    })
}

/// Walk a [`ForStmt`]: init, condition, post, body.
pub fn walk_for_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a ForStmt) -> VisitResult {
    walk_node!(visitor, node, visit_for_stmt, leave_for_stmt, |v| {
        if let Some(init) = &node.init {
            if walk_stmt(v, init) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        if let Some(cond) = &node.cond {
            if walk_expr(v, cond) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        if let Some(post) = &node.post {
            if walk_stmt(v, post) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        walk_block(v, &node.body)
    })
}

/// Walk a [`RangeStmt`]: key, value, ranged expression, body.
pub fn walk_range_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a RangeStmt) -> VisitResult {
    walk_node!(visitor, node, visit_range_stmt, leave_range_stmt, |v| {
        if walk_all(v, node.key.iter().chain(node.value.iter()), walk_expr) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_block(v, &node.body)
    })
}

/// Walk a [`SwitchStmt`]: init, tag, then each clause.
pub fn walk_switch_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SwitchStmt) -> VisitResult {
    walk_node!(visitor, node, visit_switch_stmt, leave_switch_stmt, |v| {
        if let Some(init) = &node.init {
            if walk_stmt(v, init) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        if let Some(tag) = &node.tag {
            if walk_expr(v, tag) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        walk_all(v, &node.clauses, walk_case_clause)
    })
}

pub fn walk_case_clause<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a CaseClause) -> VisitResult {
    walk_node!(visitor, node, visit_case_clause, leave_case_clause, |v| {
        if walk_all(v, &node.values, walk_expr) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_all(v, &node.body, walk_stmt)
    })
}

/// Walk a [`TypeSwitchStmt`]: init, the guard operand, then each clause.
/// The bound name is not walked.
pub fn walk_type_switch_stmt<'a, V: Visitor<'a>>(
    visitor: &mut V,
    node: &'a TypeSwitchStmt,
) -> VisitResult {
    walk_node!(visitor, node, visit_type_switch_stmt, leave_type_switch_stmt, |v| {
        if let Some(init) = &node.init {
            if walk_stmt(v, init) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_all(v, &node.clauses, walk_type_case_clause)
    })
}

pub fn walk_type_case_clause<'a, V: Visitor<'a>>(
    visitor: &mut V,
    node: &'a TypeCaseClause,
) -> VisitResult {
    walk_node!(visitor, node, visit_type_case_clause, leave_type_case_clause, |v| {
        walk_all(v, &node.body, walk_stmt)
    })
}

pub fn walk_select_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SelectStmt) -> VisitResult {
    walk_node!(visitor, node, visit_select_stmt, leave_select_stmt, |v| {
        walk_all(v, &node.clauses, walk_comm_clause)
    })
}

pub fn walk_comm_clause<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a CommClause) -> VisitResult {
    walk_node!(visitor, node, visit_comm_clause, leave_comm_clause, |v| {
        if let Some(comm) = &node.comm {
            if walk_stmt(v, comm) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        walk_all(v, &node.body, walk_stmt)
    })
}

pub fn walk_call_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a CallStmt) -> VisitResult {
    walk_node!(visitor, node, visit_call_stmt, leave_call_stmt, |v| {
        walk_expr(v, &node.call)
    })
}

pub fn walk_labeled_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a LabeledStmt) -> VisitResult {
    walk_node!(visitor, node, visit_labeled_stmt, leave_labeled_stmt, |v| {
        match &node.stmt {
            Some(stmt) => walk_stmt(v, stmt),
            None => VisitResult::Continue,
        }
    })
}

pub fn walk_branch_stmt<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a BranchStmt) -> VisitResult {
    walk_node!(visitor, node, visit_branch_stmt, leave_branch_stmt, |v| {
        let _ = v;
        VisitResult::Continue
    })
}

// ============================================================================
// Expressions
// ============================================================================

/// Walk an [`Expr`], dispatching to the concrete expression walk.
///
/// Types in operand position are leaves; array lengths inside them are not
/// walked.
pub fn walk_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Expr) -> VisitResult {
    walk_node!(visitor, node, visit_expr, leave_expr, |v| {
        match node {
            Expr::Ident(i) => walk_ident(v, i),
            Expr::BasicLit(l) => walk_basic_lit(v, l),
            Expr::Composite(c) => walk_composite_lit(v, c),
            Expr::FuncLit(f) => walk_func_lit(v, f),
            Expr::Selector(s) => walk_selector_expr(v, s),
            Expr::Call(c) => walk_call_expr(v, c),
            Expr::Index(i) => walk_index_expr(v, i),
            Expr::IndexList(i) => walk_index_list_expr(v, i),
            Expr::Slice(s) => walk_slice_expr(v, s),
            Expr::TypeAssert(t) => walk_type_assert_expr(v, t),
            Expr::KeyValue(kv) => walk_key_value_expr(v, kv),
            Expr::Unary(u) => walk_unary_expr(v, u),
            Expr::Binary(b) => walk_binary_expr(v, b),
            Expr::Paren(p) => walk_paren_expr(v, p),
            Expr::Type(_) => VisitResult::Continue,
            Expr::Bad(b) => walk_bad(v, b),
        }
    })
}

pub fn walk_ident<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Ident) -> VisitResult {
    walk_node!(visitor, node, visit_ident, leave_ident, |v| {
        let _ = v;
        VisitResult::Continue
    })
}

pub fn walk_basic_lit<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a BasicLit) -> VisitResult {
    walk_node!(visitor, node, visit_basic_lit, leave_basic_lit, |v| {
        let _ = v;
        VisitResult::Continue
    })
}

/// Walk a [`CompositeLit`]: its elements in order. The type is not walked.
pub fn walk_composite_lit<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a CompositeLit) -> VisitResult {
    walk_node!(visitor, node, visit_composite_lit, leave_composite_lit, |v| {
        walk_all(v, &node.elts, walk_expr)
    })
}

pub fn walk_func_lit<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a FuncLit) -> VisitResult {
    walk_node!(visitor, node, visit_func_lit, leave_func_lit, |v| {
        walk_block(v, &node.body)
    })
}

/// Walk a [`SelectorExpr`]: the operand, then the selected identifier.
pub fn walk_selector_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SelectorExpr) -> VisitResult {
    walk_node!(visitor, node, visit_selector_expr, leave_selector_expr, |v| {
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_ident(v, &node.sel)
    })
}

/// Walk a [`CallExpr`]: the callee, then arguments.
pub fn walk_call_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a CallExpr) -> VisitResult {
    walk_node!(visitor, node, visit_call_expr, leave_call_expr, |v| {
        if walk_expr(v, &node.fun) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_all(v, &node.args, walk_expr)
    })
}

pub fn walk_index_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a IndexExpr) -> VisitResult {
    walk_node!(visitor, node, visit_index_expr, leave_index_expr, |v| {
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_expr(v, &node.index)
    })
}

pub fn walk_index_list_expr<'a, V: Visitor<'a>>(
    visitor: &mut V,
    node: &'a IndexListExpr,
) -> VisitResult {
    walk_node!(visitor, node, visit_index_list_expr, leave_index_list_expr, |v| {
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_all(v, &node.indices, walk_expr)
    })
}

/// Walk a [`SliceExpr`]: the operand, then the present bounds.
pub fn walk_slice_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a SliceExpr) -> VisitResult {
    walk_node!(visitor, node, visit_slice_expr, leave_slice_expr, |v| {
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        let bounds = [&node.low, &node.high, &node.max];
        walk_all(v, bounds.into_iter().flatten().map(|b| b.as_ref()), walk_expr)
    })
}

pub fn walk_type_assert_expr<'a, V: Visitor<'a>>(
    visitor: &mut V,
    node: &'a TypeAssertExpr,
) -> VisitResult {
    walk_node!(visitor, node, visit_type_assert_expr, leave_type_assert_expr, |v| {
        walk_expr(v, &node.x)
    })
}

pub fn walk_key_value_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a KeyValueExpr) -> VisitResult {
    walk_node!(visitor, node, visit_key_value_expr, leave_key_value_expr, |v| {
        if walk_expr(v, &node.key) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_expr(v, &node.value)
    })
}

pub fn walk_unary_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a UnaryExpr) -> VisitResult {
    walk_node!(visitor, node, visit_unary_expr, leave_unary_expr, |v| {
        walk_expr(v, &node.x)
    })
}

pub fn walk_binary_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a BinaryExpr) -> VisitResult {
    walk_node!(visitor, node, visit_binary_expr, leave_binary_expr, |v| {
        if walk_expr(v, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        walk_expr(v, &node.y)
    })
}

pub fn walk_paren_expr<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a ParenExpr) -> VisitResult {
    walk_node!(visitor, node, visit_paren_expr, leave_paren_expr, |v| {
        walk_expr(v, &node.x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;

    const SOURCE: &str = "package p\n\
        func f(m *T) {\n\
        \tm.Count++\n\
        \tif m.Name != \"\" {\n\
        \t\tuse(m.Inner.Name)\n\
        \t}\n\
        }\n";

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip_calls: bool,
        stop_at: Option<&'static str>,
    }

    impl<'a> Visitor<'a> for Recorder {
        fn visit_selector_expr(&mut self, node: &'a SelectorExpr) -> VisitResult {
            self.events.push(format!("visit .{}", node.sel.name));
            if self.stop_at == Some(node.sel.name.as_str()) {
                return VisitResult::Stop;
            }
            VisitResult::Continue
        }

        fn leave_selector_expr(&mut self, node: &'a SelectorExpr) {
            self.events.push(format!("leave .{}", node.sel.name));
        }

        fn visit_call_expr(&mut self, _node: &'a CallExpr) -> VisitResult {
            self.events.push("visit call".to_string());
            if self.skip_calls {
                VisitResult::SkipChildren
            } else {
                VisitResult::Continue
            }
        }

        fn leave_call_expr(&mut self, _node: &'a CallExpr) {
            self.events.push("leave call".to_string());
        }
    }

    #[test]
    fn pre_and_post_order() {
        let file = parse_file("t.go", SOURCE).unwrap();
        let mut recorder = Recorder::default();
        assert_eq!(walk_source_file(&mut recorder, &file), VisitResult::Continue);
        assert_eq!(
            recorder.events,
            vec![
                "visit .Count",
                "leave .Count",
                "visit .Name",
                "leave .Name",
                "visit call",
                "visit .Name",
                "visit .Inner",
                "leave .Inner",
                "leave .Name",
                "leave call",
            ]
        );
    }

    #[test]
    fn skip_children_still_leaves() {
        let file = parse_file("t.go", SOURCE).unwrap();
        let mut recorder = Recorder {
            skip_calls: true,
            ..Default::default()
        };
        walk_source_file(&mut recorder, &file);
        let tail: Vec<_> = recorder.events.iter().rev().take(2).cloned().collect();
        assert_eq!(tail, vec!["leave call", "visit call"]);
        assert!(!recorder.events.iter().any(|e| e == "visit .Inner"));
    }

    #[test]
    fn stop_halts_traversal() {
        let file = parse_file("t.go", SOURCE).unwrap();
        let mut recorder = Recorder {
            stop_at: Some("Name"),
            ..Default::default()
        };
        assert_eq!(walk_source_file(&mut recorder, &file), VisitResult::Stop);
        assert_eq!(recorder.events.last().map(String::as_str), Some("visit .Name"));
        assert!(!recorder.events.iter().any(|e| e == "leave .Name"));
    }

    #[test]
    fn identifiers_include_selected_names() {
        struct Idents(Vec<String>);
        impl<'a> Visitor<'a> for Idents {
            fn visit_ident(&mut self, node: &'a Ident) -> VisitResult {
                self.0.push(node.name.clone());
                VisitResult::Continue
            }
        }
        let file = parse_file("t.go", "package p\nfunc f() {\n_ = a.B\n}\n").unwrap();
        let mut idents = Idents(Vec::new());
        walk_source_file(&mut idents, &file);
        assert_eq!(idents.0, vec!["_", "a", "B"]);
    }

    #[test]
    fn reaches_selectors_in_every_statement_form() {
        struct Selectors(Vec<String>);
        impl<'a> Visitor<'a> for Selectors {
            fn visit_selector_expr(&mut self, node: &'a SelectorExpr) -> VisitResult {
                self.0.push(node.sel.name.clone());
                VisitResult::Continue
            }
        }
        let source = "package p\n\
            const c = a.C\n\
            func f() {\n\
            \tswitch b.Tag {\n\
            \tcase b.Case:\n\
            \t\tgo func() { use(b.Go) }()\n\
            \t}\n\
            \tswitch v := b.Any.(type) {\n\
            \tcase *T:\n\
            \t\t_ = v.Typed\n\
            \t}\n\
            \tselect {\n\
            \tcase ch <- b.Sent:\n\
            \t}\n\
            \t_ = T{Key: b.Value}\n\
            \t_ = buf[b.Low:]\n\
            loop:\n\
            \tdefer b.Deferred()\n\
            }\n";
        let file = parse_file("t.go", source).unwrap();
        assert!(file.errors.is_empty(), "{:?}", file.errors);
        let mut selectors = Selectors(Vec::new());
        walk_source_file(&mut selectors, &file);
        assert_eq!(
            selectors.0,
            vec![
                "C", "Tag", "Case", "Go", "Any", "Typed", "Sent", "Value", "Low", "Deferred"
            ]
        );
    }

    #[test]
    fn bad_nodes_are_visited() {
        struct Bad(usize);
        impl<'a> Visitor<'a> for Bad {
            fn visit_bad(&mut self, _node: &'a BadNode) -> VisitResult {
                self.0 += 1;
                VisitResult::Continue
            }
        }
        let file = parse_file("t.go", "package p\nfunc f() {\n\tif {\n\t}\n\t_ = )\n}\n").unwrap();
        let mut bad = Bad(0);
        walk_source_file(&mut bad, &file);
        assert_eq!(bad.0, 2);
    }
}
