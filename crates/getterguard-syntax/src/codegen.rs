// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expression printer.
//!
//! Prints expressions in canonical form using gofmt's spacing rules for
//! binary operators: blanks around an operator are dropped when a
//! higher-precedence operator would otherwise read as loosely bound as a
//! lower one (`a*b + c`, but `a + b` and `x[i+1]`).
//!
//! A [`RewriteHook`] sees every selector with the syntactic role it occupies
//! and may replace it with an accessor call.

use thiserror::Error;

use crate::nodes::{
    BinaryExpr, BinaryOp, ChanDir, CompositeLit, Expr, Param, SelectorExpr, SliceExpr, Span,
    TypeExpr, UnaryOp,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("cannot print malformed expression at {span}")]
    BadExpr { span: Span },
}

/// Syntactic position of a selector inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRole {
    /// Value read.
    Read,
    /// Function position of a call: `x.M(...)`.
    Callee,
    /// Operand of `&`.
    AddressOperand,
}

/// What to print for one selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorRewrite {
    /// Print as written, still consulting the hook for the operand.
    Keep,
    /// Print the whole selector as written without consulting the hook again.
    KeepSubtree,
    /// Print `x.<name>()` in place of `x.sel`.
    Accessor(String),
}

pub trait RewriteHook {
    fn rewrite_selector(&mut self, node: &SelectorExpr, role: SelectorRole) -> SelectorRewrite;
}

/// Print `expr` canonically.
pub fn print_expr(expr: &Expr) -> Result<String, CodegenError> {
    let mut printer = Printer::new(None);
    printer.expr(expr)?;
    Ok(printer.finish())
}

/// Print `expr`, letting `hook` rewrite selectors.
pub fn print_expr_with(expr: &Expr, hook: &mut dyn RewriteHook) -> Result<String, CodegenError> {
    let mut printer = Printer::new(Some(hook));
    printer.expr(expr)?;
    Ok(printer.finish())
}

pub struct Printer<'h> {
    out: String,
    hook: Option<&'h mut dyn RewriteHook>,
    /// Nonzero while printing a subtree the hook asked to keep verbatim.
    verbatim: u32,
}

impl<'h> Printer<'h> {
    pub fn new(hook: Option<&'h mut dyn RewriteHook>) -> Self {
        Printer {
            out: String::new(),
            hook,
            verbatim: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// Print a top-level expression.
    pub fn expr(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        self.expr1(expr, 1, SelectorRole::Read)
    }

    fn expr1(
        &mut self,
        expr: &Expr,
        depth: u32,
        role: SelectorRole,
    ) -> Result<(), CodegenError> {
        match expr {
            Expr::Ident(ident) => self.out.push_str(&ident.name),
            Expr::BasicLit(lit) => self.out.push_str(&lit.value),
            Expr::Selector(sel) => self.selector(sel, depth, role)?,
            Expr::Call(call) => {
                self.expr1(&call.fun, depth, SelectorRole::Callee)?;
                let depth = if call.args.len() > 1 { depth + 1 } else { depth };
                self.out.push('(');
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr1(arg, depth, SelectorRole::Read)?;
                }
                self.out.push(')');
            }
            Expr::Index(index) => {
                self.expr1(&index.x, 1, SelectorRole::Read)?;
                self.out.push('[');
                self.expr1(&index.index, depth + 1, SelectorRole::Read)?;
                self.out.push(']');
            }
            Expr::Unary(unary) => {
                self.out.push_str(unary.op.as_str());
                let role = if unary.op == UnaryOp::Addr {
                    SelectorRole::AddressOperand
                } else {
                    SelectorRole::Read
                };
                self.expr1(&unary.x, depth, role)?;
            }
            Expr::Binary(binary) => {
                let cutoff = cutoff(binary, depth.max(1));
                self.binary(binary, cutoff, depth.max(1))?;
            }
            Expr::Paren(paren) => {
                self.out.push('(');
                let depth = if depth > 1 { depth - 1 } else { depth };
                self.expr1(&paren.x, depth, role)?;
                self.out.push(')');
            }
            Expr::Composite(lit) => self.composite(lit)?,
            Expr::FuncLit(lit) => self.out.push_str(&lit.text),
            Expr::IndexList(list) => {
                self.expr1(&list.x, 1, SelectorRole::Read)?;
                self.out.push('[');
                for (i, index) in list.indices.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr1(index, depth + 1, SelectorRole::Read)?;
                }
                self.out.push(']');
            }
            Expr::Slice(slice) => self.slice(slice, depth)?,
            Expr::TypeAssert(assert) => {
                self.expr1(&assert.x, depth, SelectorRole::Read)?;
                self.out.push_str(".(");
                match &assert.ty {
                    Some(ty) => self.ty(ty)?,
                    None => self.out.push_str("type"),
                }
                self.out.push(')');
            }
            Expr::KeyValue(kv) => {
                self.expr1(&kv.key, 1, SelectorRole::Read)?;
                self.out.push_str(": ");
                self.expr1(&kv.value, 1, SelectorRole::Read)?;
            }
            Expr::Type(ty) => self.ty(ty)?,
            Expr::Bad(bad) => return Err(CodegenError::BadExpr { span: bad.span }),
        }
        Ok(())
    }

    fn selector(
        &mut self,
        sel: &SelectorExpr,
        depth: u32,
        role: SelectorRole,
    ) -> Result<(), CodegenError> {
        let rewrite = match (&mut self.hook, self.verbatim) {
            (Some(hook), 0) => hook.rewrite_selector(sel, role),
            _ => SelectorRewrite::Keep,
        };

        match rewrite {
            SelectorRewrite::Keep => {
                self.expr1(&sel.x, depth, SelectorRole::Read)?;
                self.out.push('.');
                self.out.push_str(&sel.sel.name);
            }
            SelectorRewrite::KeepSubtree => {
                self.verbatim += 1;
                let result = self.expr1(&sel.x, depth, SelectorRole::Read);
                self.verbatim -= 1;
                result?;
                self.out.push('.');
                self.out.push_str(&sel.sel.name);
            }
            SelectorRewrite::Accessor(name) => {
                self.expr1(&sel.x, depth, SelectorRole::Read)?;
                self.out.push('.');
                self.out.push_str(&name);
                self.out.push_str("()");
            }
        }
        Ok(())
    }

    fn composite(&mut self, lit: &CompositeLit) -> Result<(), CodegenError> {
        if let Some(ty) = &lit.ty {
            self.ty(ty)?;
        }
        self.out.push('{');
        for (i, elt) in lit.elts.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr1(elt, 1, SelectorRole::Read)?;
        }
        self.out.push('}');
        Ok(())
    }

    /// `x[low:high:max]`. Colons get blanks when several bounds are present
    /// and one of them is a binary expression.
    fn slice(&mut self, node: &SliceExpr, depth: u32) -> Result<(), CodegenError> {
        self.expr1(&node.x, 1, SelectorRole::Read)?;
        let mut bounds = vec![node.low.as_deref(), node.high.as_deref()];
        if let Some(max) = node.max.as_deref() {
            bounds.push(Some(max));
        }
        let present = bounds.iter().flatten().count();
        let binaries = bounds.iter().flatten().any(|b| matches!(b, Expr::Binary(_)));
        let blanks = depth <= 1 && present > 1 && binaries;

        self.out.push('[');
        for (i, bound) in bounds.iter().enumerate() {
            if i > 0 {
                if blanks && bounds[i - 1].is_some() {
                    self.out.push(' ');
                }
                self.out.push(':');
                if blanks && bound.is_some() {
                    self.out.push(' ');
                }
            }
            if let Some(bound) = bound {
                self.expr1(bound, depth + 1, SelectorRole::Read)?;
            }
        }
        self.out.push(']');
        Ok(())
    }

    /// Print a type in operand position.
    fn ty(&mut self, ty: &TypeExpr) -> Result<(), CodegenError> {
        match ty {
            TypeExpr::Name { package, name } => {
                if let Some(package) = package {
                    self.out.push_str(&package.name);
                    self.out.push('.');
                }
                self.out.push_str(&name.name);
            }
            TypeExpr::Generic { base, args, .. } => {
                self.ty(base)?;
                self.out.push('[');
                self.types(args)?;
                self.out.push(']');
            }
            TypeExpr::Pointer { elem, .. } => {
                self.out.push('*');
                self.ty(elem)?;
            }
            TypeExpr::Slice { elem, .. } => {
                self.out.push_str("[]");
                self.ty(elem)?;
            }
            TypeExpr::Array { len, elem, .. } => {
                self.out.push('[');
                match len {
                    Some(len) => self.expr1(len, 1, SelectorRole::Read)?,
                    None => self.out.push_str("..."),
                }
                self.out.push(']');
                self.ty(elem)?;
            }
            TypeExpr::Map { key, value, .. } => {
                self.out.push_str("map[");
                self.ty(key)?;
                self.out.push(']');
                self.ty(value)?;
            }
            TypeExpr::Chan { dir, elem, .. } => {
                self.out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.ty(elem)?;
            }
            TypeExpr::Func {
                params, results, ..
            } => {
                self.out.push_str("func");
                self.params(params)?;
                match results.as_slice() {
                    [] => {}
                    [single] => {
                        self.out.push(' ');
                        self.ty(single)?;
                    }
                    several => {
                        self.out.push_str(" (");
                        self.types(several)?;
                        self.out.push(')');
                    }
                }
            }
            TypeExpr::Struct { fields, .. } => {
                self.out.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    self.out.push_str(if i > 0 { "; " } else { " " });
                    let names: Vec<_> = field.names.iter().map(|n| n.name.as_str()).collect();
                    if !names.is_empty() {
                        self.out.push_str(&names.join(", "));
                        self.out.push(' ');
                    }
                    self.ty(&field.ty)?;
                    if let Some(tag) = &field.tag {
                        self.out.push(' ');
                        self.out.push_str(tag);
                    }
                }
                if !fields.is_empty() {
                    self.out.push(' ');
                }
                self.out.push('}');
            }
            TypeExpr::Interface { text, .. } => self.out.push_str(text),
        }
        Ok(())
    }

    fn types(&mut self, types: &[TypeExpr]) -> Result<(), CodegenError> {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.ty(ty)?;
        }
        Ok(())
    }

    fn params(&mut self, params: &[Param]) -> Result<(), CodegenError> {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if let Some(name) = &param.name {
                self.out.push_str(&name.name);
                self.out.push(' ');
            }
            self.ty(&param.ty)?;
        }
        self.out.push(')');
        Ok(())
    }

    fn binary(
        &mut self,
        node: &BinaryExpr,
        cutoff: u8,
        depth: u32,
    ) -> Result<(), CodegenError> {
        let prec = node.op.precedence();
        let blank = prec < cutoff;

        self.expr1(&node.x, depth + diff_prec(&node.x, prec), SelectorRole::Read)?;
        if blank {
            self.out.push(' ');
        }
        self.out.push_str(node.op.as_str());
        if blank {
            self.out.push(' ');
        }
        self.expr1(&node.y, depth + 1, SelectorRole::Read)
    }
}

fn diff_prec(expr: &Expr, prec: u8) -> u32 {
    match expr {
        Expr::Binary(b) if b.op.precedence() == prec => 0,
        _ => 1,
    }
}

/// Precedence at or above which operators are printed without blanks.
fn cutoff(node: &BinaryExpr, depth: u32) -> u8 {
    let (has4, has5, max_problem) = walk_binary(node);
    if max_problem > 0 {
        return max_problem + 1;
    }
    match (has4 && has5, depth == 1) {
        (true, true) => 5,
        (true, false) => 4,
        (false, true) => 6,
        (false, false) => 4,
    }
}

fn walk_binary(node: &BinaryExpr) -> (bool, bool, u8) {
    let prec = node.op.precedence();
    let mut has4 = prec == 4;
    let mut has5 = prec == 5;
    let mut max_problem = 0;

    if let Expr::Binary(left) = node.x.as_ref() {
        if left.op.precedence() >= prec {
            let (h4, h5, mp) = walk_binary(left);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }
    }

    match node.y.as_ref() {
        Expr::Binary(right) if right.op.precedence() > prec => {
            let (h4, h5, mp) = walk_binary(right);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }
        // Without blanks these would lex as a different token: `a /*b`,
        // `a&&b`, `a&^b`, `a--b`, `a++b`.
        Expr::Unary(unary) => match (node.op, unary.op) {
            (BinaryOp::Quo, UnaryOp::Deref)
            | (BinaryOp::And, UnaryOp::Addr)
            | (BinaryOp::And, UnaryOp::Xor) => max_problem = 5,
            (BinaryOp::Sub, UnaryOp::Neg) | (BinaryOp::Add, UnaryOp::Pos) => {
                max_problem = max_problem.max(4)
            }
            _ => {}
        },
        _ => {}
    }

    (has4, has5, max_problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Decl, Stmt};
    use crate::parser::parse_file;

    fn parse_expr(source: &str) -> Expr {
        let file = parse_file("t.go", &format!("package p\nfunc f() {{\n_ = {}\n}}\n", source))
            .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        match &func.body.as_ref().unwrap().stmts[0] {
            Stmt::Assign(assign) => assign.rhs[0].clone(),
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    fn print(source: &str) -> String {
        print_expr(&parse_expr(source)).unwrap()
    }

    #[test]
    fn canonical_spacing() {
        assert_eq!(print("a+b"), "a + b");
        assert_eq!(print("a*b+c"), "a*b + c");
        assert_eq!(print("x[i+1]"), "x[i+1]");
        assert_eq!(print("f(a,b)"), "f(a, b)");
        assert_eq!(print("f(a+b, c)"), "f(a+b, c)");
        assert_eq!(print("f(a+b)"), "f(a + b)");
        assert_eq!(print("a == b && c != d"), "a == b && c != d");
        assert_eq!(print("a - -b"), "a - -b");
        assert_eq!(print("( m.Name )"), "(m.Name)");
        assert_eq!(print("&m.Items[0].Name"), "&m.Items[0].Name");
        assert_eq!(print("\"x\" + m.Name"), "\"x\" + m.Name");
    }

    /// Rewrites every read of a selector named `Name` or `Inner`.
    struct FieldsToGetters {
        seen: Vec<(String, SelectorRole)>,
    }

    impl RewriteHook for FieldsToGetters {
        fn rewrite_selector(&mut self, node: &SelectorExpr, role: SelectorRole) -> SelectorRewrite {
            self.seen.push((node.sel.name.clone(), role));
            match role {
                SelectorRole::AddressOperand => SelectorRewrite::KeepSubtree,
                SelectorRole::Callee => SelectorRewrite::Keep,
                SelectorRole::Read if node.sel.name == "Name" || node.sel.name == "Inner" => {
                    SelectorRewrite::Accessor(format!("Get{}", node.sel.name))
                }
                SelectorRole::Read => SelectorRewrite::Keep,
            }
        }
    }

    #[test]
    fn hook_rewrites_nested_selectors() {
        let expr = parse_expr("m.Inner.Name");
        let mut hook = FieldsToGetters { seen: Vec::new() };
        assert_eq!(print_expr_with(&expr, &mut hook).unwrap(), "m.GetInner().GetName()");
    }

    #[test]
    fn hook_sees_roles() {
        let expr = parse_expr("use(m.Inner.Size(), &m.Name)");
        let mut hook = FieldsToGetters { seen: Vec::new() };
        let printed = print_expr_with(&expr, &mut hook).unwrap();
        assert_eq!(printed, "use(m.GetInner().Size(), &m.Name)");
        assert_eq!(
            hook.seen,
            vec![
                ("Size".to_string(), SelectorRole::Callee),
                ("Inner".to_string(), SelectorRole::Read),
                ("Name".to_string(), SelectorRole::AddressOperand),
            ]
        );
    }

    #[test]
    fn keep_subtree_suppresses_hook() {
        let expr = parse_expr("&m.Inner.Name");
        let mut hook = FieldsToGetters { seen: Vec::new() };
        assert_eq!(print_expr_with(&expr, &mut hook).unwrap(), "&m.Inner.Name");
        assert_eq!(hook.seen.len(), 1);
    }

    #[test]
    fn unary_operands_that_would_merge_tokens_keep_blanks() {
        assert_eq!(print("a&&b"), "a && b");
        assert_eq!(print("a & &b"), "a & &b");
        assert_eq!(print("a & ^b"), "a & ^b");
        assert_eq!(print("a + +b"), "a + +b");
        assert_eq!(print("a / *b"), "a / *b");
        assert_eq!(print("a*b + c&d"), "a*b + c&d");
    }

    #[test]
    fn literals_slices_and_assertions() {
        assert_eq!(
            print("pb.User{Name: m.Name,Tags: []string{\"a\"}}"),
            "pb.User{Name: m.Name, Tags: []string{\"a\"}}"
        );
        assert_eq!(print("[]*T{{A: 1}, nil}"), "[]*T{{A: 1}, nil}");
        assert_eq!(print("map[string]int{}"), "map[string]int{}");
        assert_eq!(print("buf[lo:hi]"), "buf[lo:hi]");
        assert_eq!(print("buf[lo+1:hi]"), "buf[lo+1 : hi]");
        assert_eq!(print("buf[:n+1]"), "buf[:n+1]");
        assert_eq!(print("buf[a:b:c]"), "buf[a:b:c]");
        assert_eq!(print("v.(*pb.User).Name"), "v.(*pb.User).Name");
        assert_eq!(print("Pair[int,string]"), "Pair[int, string]");
        assert_eq!(print("make(chan<- int, n)"), "make(chan<- int, n)");
        assert_eq!(print("func(v any) any { return v }"), "func(v any) any { return v }");
        assert_eq!(print("struct{}{}"), "struct{}{}");
    }

    #[test]
    fn hook_reaches_literal_elements() {
        let expr = parse_expr("[]string{m.Name, m.Inner.Size()}");
        let mut hook = FieldsToGetters { seen: Vec::new() };
        assert_eq!(
            print_expr_with(&expr, &mut hook).unwrap(),
            "[]string{m.GetName(), m.GetInner().Size()}"
        );
    }

    #[test]
    fn bad_expression_fails() {
        let expr = parse_expr(").Name");
        let err = print_expr(&expr).unwrap_err();
        assert!(matches!(err, CodegenError::BadExpr { .. }));
        assert!(err.to_string().starts_with("cannot print malformed expression"));
    }
}
