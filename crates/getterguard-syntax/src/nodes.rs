// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree node types.
//!
//! Every node carries the byte [`Span`] it was parsed from. Identifiers also
//! carry a [`NodeId`], assigned in source order, which the type resolver uses
//! to record what each identifier use refers to.

pub use getterguard_core::Span;

// ============================================================================
// Node identity
// ============================================================================

/// Identifier assigned to each [`Ident`] in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Hands out sequential [`NodeId`]s.
#[derive(Debug, Default)]
pub struct NodeIdGenerator {
    next: u32,
}

impl NodeIdGenerator {
    /// Create a generator starting at `NodeId(0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub node_id: NodeId,
}

impl Ident {
    /// The blank identifier `_`.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// A comment with its markers removed.
///
/// For line comments the `//` and one following space are stripped; for
/// block comments the `/*` and `*/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

impl Comment {
    /// Build a comment from its raw source text.
    pub fn from_raw(raw: &str, span: Span) -> Self {
        let text = if let Some(line) = raw.strip_prefix("//") {
            line.strip_prefix(' ').unwrap_or(line)
        } else {
            raw.strip_prefix("/*")
                .and_then(|body| body.strip_suffix("*/"))
                .map(str::trim)
                .unwrap_or(raw)
        };
        Comment {
            text: text.trim_end().to_string(),
            span,
        }
    }
}

// ============================================================================
// File and declarations
// ============================================================================

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path or display name of the file.
    pub name: String,
    /// The full source text the spans refer to.
    pub source: String,
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    pub comments: Vec<Comment>,
    /// Syntax errors the parser recovered from, in source order. The
    /// affected declarations and statements are [`Decl::Bad`] and
    /// [`Stmt::Bad`] nodes.
    pub errors: Vec<crate::ParseError>,
}

impl SourceFile {
    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> Option<&str> {
        getterguard_core::text::extract_span_str(&self.source, &span)
    }

    /// True if any comment in the file starts with `marker`.
    ///
    /// Code generators announce themselves with a comment such as
    /// `// Code generated by protoc-gen-go. DO NOT EDIT.`
    pub fn is_generated(&self, marker: &str) -> bool {
        self.comments.iter().any(|c| c.text.starts_with(marker))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name, `.` or `_` included.
    pub name: Option<Ident>,
    /// Import path without quotes.
    pub path: String,
    pub span: Span,
}

/// A top-level declaration. Grouped `var (...)`, `const (...)` and
/// `type (...)` declarations contribute one entry per spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
    Var(VarDecl),
    /// Constants share the shape of variables.
    Const(VarDecl),
    Bad(BadNode),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Type(d) => d.span,
            Decl::Func(d) => d.span,
            Decl::Var(d) | Decl::Const(d) => d.span,
            Decl::Bad(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: Ident,
    /// True for `type A = B`.
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T` or `pkg.T`.
    Name {
        package: Option<Ident>,
        name: Ident,
    },
    /// `T[A, B]`
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
        span: Span,
    },
    Pointer {
        elem: Box<TypeExpr>,
        span: Span,
    },
    Slice {
        elem: Box<TypeExpr>,
        span: Span,
    },
    /// `[N]T`, or `[...]T` when `len` is `None`.
    Array {
        len: Option<Box<Expr>>,
        elem: Box<TypeExpr>,
        span: Span,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
        span: Span,
    },
    Func {
        params: Vec<Param>,
        results: Vec<TypeExpr>,
        span: Span,
    },
    Struct {
        fields: Vec<FieldDecl>,
        span: Span,
    },
    /// Method and type-set elements are kept as source text.
    Interface {
        text: String,
        span: Span,
    },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Name { package, name } => match package {
                Some(pkg) => pkg.span.cover(&name.span),
                None => name.span,
            },
            TypeExpr::Generic { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Slice { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Chan { span, .. }
            | TypeExpr::Func { span, .. }
            | TypeExpr::Struct { span, .. }
            | TypeExpr::Interface { span, .. } => *span,
        }
    }
}

/// A struct field. Embedded fields have no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
    pub span: Span,
}

/// A parameter or receiver. A variadic `...T` parameter has type `[]T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub recv: Option<Param>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// Placeholder for a declaration, statement or expression that failed to
/// parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadNode {
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Assign(AssignStmt),
    IncDec(IncDecStmt),
    Send(SendStmt),
    Var(VarDecl),
    Const(VarDecl),
    Type(TypeDecl),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    Select(SelectStmt),
    Go(CallStmt),
    Defer(CallStmt),
    Labeled(LabeledStmt),
    Branch(BranchStmt),
    Block(Block),
    Bad(BadNode),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(e) => e.span(),
            Stmt::Assign(s) => s.span,
            Stmt::IncDec(s) => s.span,
            Stmt::Send(s) => s.span,
            Stmt::Var(s) | Stmt::Const(s) => s.span,
            Stmt::Type(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Range(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::TypeSwitch(s) => s.span,
            Stmt::Select(s) => s.span,
            Stmt::Go(s) | Stmt::Defer(s) => s.span,
            Stmt::Labeled(s) => s.span,
            Stmt::Branch(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::Bad(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Quo => "/=",
            AssignOp::Rem => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::AndNot => "&^=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub op: AssignOp,
    pub rhs: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncDecOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncDecStmt {
    pub x: Expr,
    pub op: IncDecOp,
    pub span: Span,
}

/// `ch <- value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStmt {
    pub chan: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: Block,
    /// Either another `Stmt::If` or a `Stmt::Block`.
    pub els: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
    pub span: Span,
}

/// `for key, value := range x { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// True for `:=`, false for `=`.
    pub define: bool,
    pub x: Expr,
    pub body: Block,
    pub span: Span,
}

/// Expression switch. A missing tag switches on `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub tag: Option<Expr>,
    pub clauses: Vec<CaseClause>,
    pub span: Span,
}

/// `case a, b:` or `default:` with the statements that follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    /// Empty for `default`.
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `switch v := x.(type) { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub binding: Option<Ident>,
    /// The operand of `.(type)`.
    pub x: Expr,
    pub clauses: Vec<TypeCaseClause>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCaseClause {
    /// Empty for `default`.
    pub types: Vec<TypeExpr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt {
    pub clauses: Vec<CommClause>,
    pub span: Span,
}

/// `case v := <-ch:`, `case ch <- v:` or `default:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommClause {
    /// `None` for `default`.
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// The call of a `go` or `defer` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStmt {
    pub call: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledStmt {
    pub label: Ident,
    /// `None` for a label right before a closing brace.
    pub stmt: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStmt {
    pub kind: BranchKind,
    pub label: Option<Ident>,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    Composite(CompositeLit),
    FuncLit(FuncLit),
    Selector(SelectorExpr),
    Call(CallExpr),
    Index(IndexExpr),
    IndexList(IndexListExpr),
    Slice(SliceExpr),
    TypeAssert(TypeAssertExpr),
    KeyValue(KeyValueExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Paren(ParenExpr),
    /// A type in operand position: `[]byte(s)`, `make(map[string]int)`.
    Type(TypeExpr),
    Bad(BadNode),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.span,
            Expr::BasicLit(e) => e.span,
            Expr::Composite(e) => e.span,
            Expr::FuncLit(e) => e.span,
            Expr::Selector(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::IndexList(e) => e.span,
            Expr::Slice(e) => e.span,
            Expr::TypeAssert(e) => e.span,
            Expr::KeyValue(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Type(t) => t.span(),
            Expr::Bad(e) => e.span,
        }
    }

    /// The selector if this expression is one.
    pub fn as_selector(&self) -> Option<&SelectorExpr> {
        match self {
            Expr::Selector(sel) => Some(sel),
            _ => None,
        }
    }

    /// The expression with any enclosing parentheses removed.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren(paren) = expr {
            expr = &paren.x;
        }
        expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Literal text as written, including quotes for strings and runes.
    pub value: String,
    pub span: Span,
}

/// `T{a, k: v}`. Elided element types inside another literal leave `ty`
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLit {
    pub ty: Option<TypeExpr>,
    pub elts: Vec<Expr>,
    pub span: Span,
}

/// `func(params) results { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncLit {
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
    pub body: Block,
    /// Source text of the whole literal.
    pub text: String,
    pub span: Span,
}

/// `x.sel`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorExpr {
    pub x: Box<Expr>,
    pub sel: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
    /// True when the last argument is spread with `...`.
    pub ellipsis: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub x: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

/// Instantiation with several type arguments: `f[A, B]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexListExpr {
    pub x: Box<Expr>,
    pub indices: Vec<Expr>,
    pub span: Span,
}

/// `x[low:high]` or `x[low:high:max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceExpr {
    pub x: Box<Expr>,
    pub low: Option<Box<Expr>>,
    pub high: Option<Box<Expr>>,
    pub max: Option<Box<Expr>>,
    pub span: Span,
}

/// `x.(T)`, or `x.(type)` in a type switch guard when `ty` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAssertExpr {
    pub x: Box<Expr>,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

/// `key: value` inside a composite literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `&`
    Addr,
    /// `*`
    Deref,
    /// `+`
    Pos,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `^`
    Xor,
    /// `<-`
    Recv,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Addr => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Recv => "<-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub x: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Quo,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::LogOr => "||",
            BinaryOp::LogAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Quo => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::AndNot => "&^",
        }
    }

    /// Go operator precedence, 1 (lowest) to 5.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::LogOr => 1,
            BinaryOp::LogAnd => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Quo
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }

    /// True for operators that produce a boolean.
    pub fn is_comparison(&self) -> bool {
        self.precedence() <= 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub x: Box<Expr>,
    pub op: BinaryOp,
    pub y: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenExpr {
    pub x: Box<Expr>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_markers_are_stripped() {
        let line = Comment::from_raw("// Code generated by protoc-gen-go. DO NOT EDIT.", Span::new(0, 48));
        assert_eq!(line.text, "Code generated by protoc-gen-go. DO NOT EDIT.");

        let block = Comment::from_raw("/* Code generated */", Span::new(0, 20));
        assert_eq!(block.text, "Code generated");

        let tight = Comment::from_raw("//go:build linux", Span::new(0, 16));
        assert_eq!(tight.text, "go:build linux");
    }

    #[test]
    fn node_ids_are_sequential() {
        let mut ids = NodeIdGenerator::new();
        assert_eq!(ids.next_id(), NodeId(0));
        assert_eq!(ids.next_id(), NodeId(1));
        assert_eq!(ids.count(), 2);
    }

    #[test]
    fn comparison_operators_bind_looser_than_arithmetic() {
        assert!(BinaryOp::Eq.precedence() < BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() < BinaryOp::Mul.precedence());
        assert!(BinaryOp::LogOr.precedence() < BinaryOp::LogAnd.precedence());
        assert!(BinaryOp::Ge.is_comparison());
        assert!(!BinaryOp::Rem.is_comparison());
    }
}
