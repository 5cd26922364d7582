//! Static types for the checked sources.
//!
//! [`TypeTable`] is built from every parsed file of a run (generated files
//! included, since they declare the message types). It records:
//!
//! - struct fields per named type
//! - method sets per named type, value and pointer receivers merged
//! - result types of top-level functions and types of package variables
//! - the type bound to every identifier use, by [`NodeId`]
//!
//! Identifier types come from a binder that walks each function with a
//! scope stack: receiver, parameters, `var`, `const`, `:=` and `range`
//! variables, function literal parameters and type switch bindings.
//! Expression types are then derived structurally by [`TypeTable::type_of`].
//!
//! Package qualifiers are dropped: `pb.User` and `User` name the same type.

use std::collections::HashMap;
use std::fmt;

use getterguard_syntax::visitor::{
    walk_block, walk_expr, walk_source_file, walk_stmt, VisitResult, Visitor,
};
use getterguard_syntax::{
    AssignOp, AssignStmt, Block, CallExpr, CaseClause, CommClause, Decl, Expr, ForStmt, FuncDecl,
    FuncLit, Ident, IfStmt, LitKind, NodeId, RangeStmt, SelectorExpr, SourceFile, SwitchStmt,
    TypeExpr, TypeSwitchStmt, UnaryOp, VarDecl,
};

use crate::oracle::TypeInfo;

const BASIC_TYPES: &[&str] = &[
    "bool", "byte", "error", "float32", "float64", "int", "int8", "int16", "int32", "int64",
    "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr", "any",
];

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A declared type, by name.
    Named(String),
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    /// A predeclared type such as `string` or `int`.
    Basic(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn pointer_to(elem: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(elem))
    }

    /// Convert a syntactic type. Anonymous struct and interface types have
    /// no name to hang fields or methods on and resolve to `None`, as do
    /// channel and function types. Arrays are treated as slices and generic
    /// instantiations as their base type.
    pub fn from_type_expr(ty: &TypeExpr) -> Option<TypeRef> {
        match ty {
            TypeExpr::Name { name, .. } => {
                if BASIC_TYPES.contains(&name.name.as_str()) {
                    Some(TypeRef::Basic(name.name.clone()))
                } else {
                    Some(TypeRef::Named(name.name.clone()))
                }
            }
            TypeExpr::Generic { base, .. } => Self::from_type_expr(base),
            TypeExpr::Pointer { elem, .. } => Self::from_type_expr(elem).map(Self::pointer_to),
            TypeExpr::Slice { elem, .. } | TypeExpr::Array { elem, .. } => {
                Self::from_type_expr(elem).map(|e| TypeRef::Slice(Box::new(e)))
            }
            TypeExpr::Map { key, value, .. } => {
                let key = Self::from_type_expr(key)?;
                let value = Self::from_type_expr(value)?;
                Some(TypeRef::Map(Box::new(key), Box::new(value)))
            }
            TypeExpr::Chan { .. }
            | TypeExpr::Func { .. }
            | TypeExpr::Struct { .. }
            | TypeExpr::Interface { .. } => None,
        }
    }

    /// Strip one pointer level, if any.
    pub fn strip_pointer(&self) -> &TypeRef {
        match self {
            TypeRef::Pointer(elem) => elem,
            other => other,
        }
    }

    /// Name of the declared type, looking through one pointer level.
    pub fn base_name(&self) -> Option<&str> {
        match self.strip_pointer() {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) | TypeRef::Basic(name) => write!(f, "{}", name),
            TypeRef::Pointer(elem) => write!(f, "*{}", elem),
            TypeRef::Slice(elem) => write!(f, "[]{}", elem),
            TypeRef::Map(key, value) => write!(f, "map[{}]{}", key, value),
        }
    }
}

/// Type facts for one run.
#[derive(Debug, Default)]
pub struct TypeTable {
    /// Field name to field type, per struct type.
    fields: HashMap<String, HashMap<String, TypeRef>>,
    /// Underlying type of non-struct type declarations (`type Users []*User`).
    underlying: HashMap<String, TypeRef>,
    /// Method name to result types, per receiver base type.
    methods: HashMap<String, HashMap<String, Vec<TypeRef>>>,
    /// Result types of top-level functions.
    funcs: HashMap<String, Vec<TypeRef>>,
    /// Package-level variables.
    globals: HashMap<String, TypeRef>,
    /// Type bound to each identifier.
    bindings: HashMap<NodeId, TypeRef>,
}

impl TypeTable {
    /// Build the table from all files of a run.
    ///
    /// Files should have been parsed with a shared id generator
    /// (see [`getterguard_syntax::parse_files`]) so identifier ids don't collide.
    pub fn build(files: &[SourceFile]) -> Self {
        let mut table = TypeTable::default();
        for file in files {
            table.collect_declarations(file);
        }
        for file in files {
            let mut binder = Binder {
                table: &mut table,
                scopes: Vec::new(),
            };
            walk_source_file(&mut binder, file);
        }
        table
    }

    fn collect_declarations(&mut self, file: &SourceFile) {
        for decl in &file.decls {
            match decl {
                Decl::Type(ty) => match &ty.ty {
                    TypeExpr::Struct { fields, .. } => {
                        let entry = self.fields.entry(ty.name.name.clone()).or_default();
                        for field in fields {
                            let Some(field_ty) = TypeRef::from_type_expr(&field.ty) else {
                                continue;
                            };
                            if field.names.is_empty() {
                                // Embedded field, named after its type.
                                if let Some(name) = field_ty.base_name() {
                                    entry.insert(name.to_string(), field_ty.clone());
                                }
                            }
                            for name in &field.names {
                                entry.insert(name.name.clone(), field_ty.clone());
                            }
                        }
                    }
                    other => {
                        if let Some(underlying) = TypeRef::from_type_expr(other) {
                            self.underlying.insert(ty.name.name.clone(), underlying);
                        }
                    }
                },
                Decl::Func(func) => {
                    let results: Vec<TypeRef> =
                        func.results.iter().filter_map(TypeRef::from_type_expr).collect();
                    match func
                        .recv
                        .as_ref()
                        .and_then(|recv| TypeRef::from_type_expr(&recv.ty))
                    {
                        Some(recv) => {
                            if let Some(base) = recv.base_name() {
                                self.methods
                                    .entry(base.to_string())
                                    .or_default()
                                    .insert(func.name.name.clone(), results);
                            }
                        }
                        None if func.recv.is_none() => {
                            self.funcs.insert(func.name.name.clone(), results);
                        }
                        None => {}
                    }
                }
                Decl::Var(var) | Decl::Const(var) => {
                    if let Some(ty) = var.ty.as_ref().and_then(TypeRef::from_type_expr) {
                        for name in &var.names {
                            self.globals.insert(name.name.clone(), ty.clone());
                        }
                    }
                }
                Decl::Bad(_) => {}
            }
        }
    }

    /// Type of field `name` on `ty`, looking through pointers and named
    /// non-struct types.
    pub fn field_type(&self, ty: &TypeRef, name: &str) -> Option<TypeRef> {
        let base = self.resolve(ty.strip_pointer());
        let TypeRef::Named(type_name) = base.strip_pointer() else {
            return None;
        };
        self.fields.get(type_name)?.get(name).cloned()
    }

    /// Result types of method `name` on `ty`.
    pub fn method_results(&self, ty: &TypeRef, name: &str) -> Option<&[TypeRef]> {
        let base = ty.base_name()?;
        self.methods.get(base)?.get(name).map(Vec::as_slice)
    }

    /// Type bound to an identifier by the binder.
    pub fn binding(&self, id: NodeId) -> Option<&TypeRef> {
        self.bindings.get(&id)
    }

    /// Follow `type X Y` declarations to the first non-alias type.
    fn resolve(&self, ty: &TypeRef) -> TypeRef {
        let mut current = ty.clone();
        for _ in 0..8 {
            match &current {
                TypeRef::Named(name) => match self.underlying.get(name) {
                    Some(next) => current = next.clone(),
                    None => break,
                },
                _ => break,
            }
        }
        current
    }

    fn call_result(&self, call: &CallExpr) -> Option<TypeRef> {
        let results = match call.fun.unparen() {
            Expr::Ident(func) => self.funcs.get(&func.name)?.as_slice(),
            Expr::Selector(sel) => match self.type_of_expr(&sel.x) {
                Some(recv) => self.method_results(&recv, &sel.sel.name)?,
                // Package-qualified function: `pb.NewUser()`.
                None if matches!(sel.x.as_ref(), Expr::Ident(_)) => {
                    self.funcs.get(&sel.sel.name)?.as_slice()
                }
                None => return None,
            },
            // Conversion: `[]byte(s)`.
            Expr::Type(ty) => return TypeRef::from_type_expr(ty),
            _ => return None,
        };
        results.first().cloned()
    }

    fn selector_type(&self, sel: &SelectorExpr) -> Option<TypeRef> {
        let base = self.type_of_expr(&sel.x)?;
        self.field_type(&base, &sel.sel.name)
    }

    fn type_of_expr(&self, expr: &Expr) -> Option<TypeRef> {
        match expr {
            Expr::Ident(ident) => self.bindings.get(&ident.node_id).cloned(),
            Expr::BasicLit(lit) => Some(TypeRef::Basic(
                match lit.kind {
                    LitKind::Int => "int",
                    LitKind::Float => "float64",
                    LitKind::Imag => "complex128",
                    LitKind::Char => "rune",
                    LitKind::String => "string",
                }
                .to_string(),
            )),
            Expr::Selector(sel) => self.selector_type(sel),
            Expr::Call(call) => self.call_result(call),
            Expr::Index(index) => match self.resolve(&self.type_of_expr(&index.x)?) {
                TypeRef::Slice(elem) => Some(*elem),
                TypeRef::Map(_, value) => Some(*value),
                _ => None,
            },
            Expr::Unary(unary) => {
                let inner = self.type_of_expr(&unary.x)?;
                match unary.op {
                    UnaryOp::Addr => Some(TypeRef::pointer_to(inner)),
                    UnaryOp::Deref => match inner {
                        TypeRef::Pointer(elem) => Some(*elem),
                        _ => None,
                    },
                    UnaryOp::Pos | UnaryOp::Neg | UnaryOp::Not | UnaryOp::Xor => Some(inner),
                    UnaryOp::Recv => None,
                }
            }
            Expr::Binary(binary) => {
                if binary.op.is_comparison() {
                    Some(TypeRef::Basic("bool".to_string()))
                } else {
                    self.type_of_expr(&binary.x)
                }
            }
            Expr::Paren(paren) => self.type_of_expr(&paren.x),
            Expr::Composite(lit) => lit.ty.as_ref().and_then(TypeRef::from_type_expr),
            Expr::TypeAssert(assert) => assert.ty.as_ref().and_then(TypeRef::from_type_expr),
            Expr::Slice(slice) => self.type_of_expr(&slice.x),
            Expr::FuncLit(_)
            | Expr::IndexList(_)
            | Expr::KeyValue(_)
            | Expr::Type(_)
            | Expr::Bad(_) => None,
        }
    }
}

impl TypeInfo for TypeTable {
    fn type_of(&self, expr: &Expr) -> Option<TypeRef> {
        self.type_of_expr(expr)
    }

    fn has_method(&self, ty: &TypeRef, method: &str) -> bool {
        self.method_results(ty, method).is_some()
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Records the type of every identifier use while tracking lexical scopes.
struct Binder<'t> {
    table: &'t mut TypeTable,
    scopes: Vec<HashMap<String, TypeRef>>,
}

impl Binder<'_> {
    fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.table.globals.get(name))
            .cloned()
    }

    /// Declare `ident` in the innermost scope, or as a package variable
    /// outside any function.
    fn declare(&mut self, ident: &Ident, ty: Option<TypeRef>) {
        if ident.is_blank() {
            return;
        }
        let Some(ty) = ty else {
            // An untyped redeclaration still shadows the outer name.
            if let Some(scope) = self.scopes.last_mut() {
                scope.remove(&ident.name);
            }
            self.table.bindings.remove(&ident.node_id);
            return;
        };
        self.table.bindings.insert(ident.node_id, ty.clone());
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(ident.name.clone(), ty);
            }
            None => {
                self.table.globals.insert(ident.name.clone(), ty);
            }
        }
    }

    fn declare_expr(&mut self, target: &Expr, ty: Option<TypeRef>) {
        if let Expr::Ident(ident) = target {
            self.declare(ident, ty);
        }
    }
}

impl<'a> Visitor<'a> for Binder<'_> {
    fn visit_func_decl(&mut self, node: &'a FuncDecl) -> VisitResult {
        self.push();
        for param in node.recv.iter().chain(node.params.iter()) {
            if let Some(name) = &param.name {
                self.declare(name, TypeRef::from_type_expr(&param.ty));
            }
        }
        VisitResult::Continue
    }

    fn leave_func_decl(&mut self, _node: &'a FuncDecl) {
        self.pop();
    }

    fn visit_func_lit(&mut self, node: &'a FuncLit) -> VisitResult {
        self.push();
        for param in &node.params {
            if let Some(name) = &param.name {
                self.declare(name, TypeRef::from_type_expr(&param.ty));
            }
        }
        VisitResult::Continue
    }

    fn leave_func_lit(&mut self, _node: &'a FuncLit) {
        self.pop();
    }

    fn visit_block(&mut self, _node: &'a Block) -> VisitResult {
        self.push();
        VisitResult::Continue
    }

    fn leave_block(&mut self, _node: &'a Block) {
        self.pop();
    }

    fn visit_if_stmt(&mut self, _node: &'a IfStmt) -> VisitResult {
        self.push();
        VisitResult::Continue
    }

    fn leave_if_stmt(&mut self, _node: &'a IfStmt) {
        self.pop();
    }

    fn visit_for_stmt(&mut self, _node: &'a ForStmt) -> VisitResult {
        self.push();
        VisitResult::Continue
    }

    fn leave_for_stmt(&mut self, _node: &'a ForStmt) {
        self.pop();
    }

    fn visit_switch_stmt(&mut self, _node: &'a SwitchStmt) -> VisitResult {
        self.push();
        VisitResult::Continue
    }

    fn leave_switch_stmt(&mut self, _node: &'a SwitchStmt) {
        self.pop();
    }

    fn visit_case_clause(&mut self, _node: &'a CaseClause) -> VisitResult {
        self.push();
        VisitResult::Continue
    }

    fn leave_case_clause(&mut self, _node: &'a CaseClause) {
        self.pop();
    }

    fn visit_comm_clause(&mut self, _node: &'a CommClause) -> VisitResult {
        self.push();
        VisitResult::Continue
    }

    fn leave_comm_clause(&mut self, _node: &'a CommClause) {
        self.pop();
    }

    /// Each clause binds the switch variable to the clause's type when it
    /// lists exactly one, and to the operand's type otherwise.
    fn visit_type_switch_stmt(&mut self, node: &'a TypeSwitchStmt) -> VisitResult {
        self.push();
        if let Some(init) = &node.init {
            if walk_stmt(self, init) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
        if walk_expr(self, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }

        let operand = self.table.type_of_expr(&node.x);
        for clause in &node.clauses {
            self.push();
            if let Some(binding) = &node.binding {
                let ty = match clause.types.as_slice() {
                    [TypeExpr::Name { package: None, name }] if name.name == "nil" => {
                        operand.clone()
                    }
                    [single] => TypeRef::from_type_expr(single),
                    _ => operand.clone(),
                };
                self.declare(binding, ty);
            }
            for stmt in &clause.body {
                if walk_stmt(self, stmt) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
            self.pop();
        }
        VisitResult::SkipChildren
    }

    fn leave_type_switch_stmt(&mut self, _node: &'a TypeSwitchStmt) {
        self.pop();
    }

    /// The ranged expression is bound before the loop variables exist, and
    /// the body after.
    fn visit_range_stmt(&mut self, node: &'a RangeStmt) -> VisitResult {
        self.push();
        if walk_expr(self, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }

        let ranged = self.table.type_of_expr(&node.x).map(|ty| self.table.resolve(&ty));
        let (key_ty, value_ty) = match ranged {
            Some(TypeRef::Slice(elem)) => (Some(TypeRef::Basic("int".to_string())), Some(*elem)),
            Some(TypeRef::Map(key, value)) => (Some(*key), Some(*value)),
            _ => (None, None),
        };

        if node.define {
            if let Some(key) = &node.key {
                self.declare_expr(key, key_ty);
            }
            if let Some(value) = &node.value {
                self.declare_expr(value, value_ty);
            }
        } else {
            for target in node.key.iter().chain(node.value.iter()) {
                if walk_expr(self, target) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
        }

        if walk_block(self, &node.body) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        VisitResult::SkipChildren
    }

    fn leave_range_stmt(&mut self, _node: &'a RangeStmt) {
        self.pop();
    }

    fn leave_assign_stmt(&mut self, node: &'a AssignStmt) {
        if node.op != AssignOp::Define {
            return;
        }
        if node.lhs.len() == node.rhs.len() {
            for (target, value) in node.lhs.iter().zip(&node.rhs) {
                let ty = self.table.type_of_expr(value);
                self.declare_expr(target, ty);
            }
        } else if let [Expr::TypeAssert(_) | Expr::Index(_)] = node.rhs.as_slice() {
            // `v, ok := x.(T)` and `v, ok := m[k]`.
            let ty = self.table.type_of_expr(&node.rhs[0]);
            for (i, target) in node.lhs.iter().enumerate() {
                let ty = match i {
                    0 => ty.clone(),
                    _ => Some(TypeRef::Basic("bool".to_string())),
                };
                self.declare_expr(target, ty);
            }
        } else if let [Expr::Call(call)] = node.rhs.as_slice() {
            // `a, b := f()` takes the results in order.
            let results = match call.fun.unparen() {
                Expr::Ident(func) => self.table.funcs.get(&func.name).cloned(),
                Expr::Selector(sel) => self.table.type_of_expr(&sel.x).and_then(|recv| {
                    self.table
                        .method_results(&recv, &sel.sel.name)
                        .map(<[_]>::to_vec)
                }),
                _ => None,
            }
            .unwrap_or_default();
            for (i, target) in node.lhs.iter().enumerate() {
                self.declare_expr(target, results.get(i).cloned());
            }
        } else {
            for target in &node.lhs {
                self.declare_expr(target, None);
            }
        }
    }

    fn leave_var_decl(&mut self, node: &'a VarDecl) {
        let declared = node.ty.as_ref().and_then(TypeRef::from_type_expr);
        for (i, name) in node.names.iter().enumerate() {
            let ty = declared
                .clone()
                .or_else(|| node.values.get(i).and_then(|v| self.table.type_of_expr(v)));
            self.declare(name, ty);
        }
    }

    /// Only the operand of a selector is a variable use.
    fn visit_selector_expr(&mut self, node: &'a SelectorExpr) -> VisitResult {
        if walk_expr(self, &node.x) == VisitResult::Stop {
            return VisitResult::Stop;
        }
        VisitResult::SkipChildren
    }

    fn visit_ident(&mut self, node: &'a Ident) -> VisitResult {
        if let Some(ty) = self.lookup(&node.name) {
            self.table.bindings.insert(node.node_id, ty);
        }
        VisitResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use getterguard_syntax::{parse_files, Stmt};

    const MESSAGES: &str = "package pb\n\
        type User struct {\n\
        \tName *string\n\
        \tProfile *Profile\n\
        \tTags []string\n\
        \tFriends []*User\n\
        \tAttrs map[string]*Profile\n\
        }\n\
        type Profile struct {\n\
        \tBio string\n\
        }\n\
        type Users []*User\n\
        func (x *User) GetName() string { return \"\" }\n\
        func (User) ProtoMessage() {}\n\
        func NewUser() *User { return nil }\n";

    fn build(body: &str) -> (Vec<SourceFile>, TypeTable) {
        let consumer = format!("package svc\nfunc f(u *pb.User, all pb.Users) {{\n{}\n}}\n", body);
        let files = parse_files([("user.pb.go", MESSAGES), ("svc.go", consumer.as_str())]).unwrap();
        let table = TypeTable::build(&files);
        (files, table)
    }

    /// The expression on the right of the last `_ = expr` in the body.
    fn last_discarded(files: &[SourceFile]) -> &Expr {
        let Decl::Func(func) = &files[1].decls[0] else {
            panic!("expected func");
        };
        func.body
            .as_ref()
            .unwrap()
            .stmts
            .iter()
            .rev()
            .find_map(|stmt| match stmt {
                Stmt::Assign(assign) if assign.op == AssignOp::Assign => Some(&assign.rhs[0]),
                _ => None,
            })
            .unwrap()
    }

    fn type_of(body: &str) -> Option<String> {
        let (files, table) = build(body);
        let expr = last_discarded(&files).clone();
        table.type_of(&expr).map(|t| t.to_string())
    }

    #[test]
    fn parameters_and_fields() {
        assert_eq!(type_of("_ = u").as_deref(), Some("*User"));
        assert_eq!(type_of("_ = u.Name").as_deref(), Some("*string"));
        assert_eq!(type_of("_ = u.Profile.Bio").as_deref(), Some("string"));
        assert_eq!(type_of("_ = u.Missing"), None);
    }

    #[test]
    fn index_and_deref() {
        assert_eq!(type_of("_ = u.Friends[0]").as_deref(), Some("*User"));
        assert_eq!(type_of("_ = u.Attrs[\"k\"].Bio").as_deref(), Some("string"));
        assert_eq!(type_of("_ = all[1].Profile").as_deref(), Some("*Profile"));
        assert_eq!(type_of("_ = *u.Name").as_deref(), Some("string"));
        assert_eq!(type_of("_ = &u.Tags").as_deref(), Some("*[]string"));
    }

    #[test]
    fn calls_use_result_types() {
        assert_eq!(type_of("_ = u.GetName()").as_deref(), Some("string"));
        assert_eq!(type_of("_ = pb.NewUser().Profile").as_deref(), Some("*Profile"));
        assert_eq!(type_of("_ = len(u.Tags)"), None);
    }

    #[test]
    fn local_bindings() {
        assert_eq!(type_of("p := u.Profile\n_ = p").as_deref(), Some("*Profile"));
        assert_eq!(type_of("var v *pb.User\n_ = v.Profile").as_deref(), Some("*Profile"));
        assert_eq!(type_of("w := pb.NewUser()\n_ = w").as_deref(), Some("*User"));
        assert_eq!(
            type_of("for _, friend := range u.Friends {\n_ = friend\n}\n_ = friend"),
            None
        );
    }

    #[test]
    fn range_variables_are_scoped_to_the_loop() {
        let (files, table) = build("for i, friend := range u.Friends {\n_ = friend.Profile\n_ = i\n}");
        let Decl::Func(func) = &files[1].decls[0] else {
            panic!("expected func");
        };
        let Stmt::Range(range) = &func.body.as_ref().unwrap().stmts[0] else {
            panic!("expected range");
        };
        let Stmt::Assign(first) = &range.body.stmts[0] else {
            panic!("expected assignment");
        };
        let Stmt::Assign(second) = &range.body.stmts[1] else {
            panic!("expected assignment");
        };
        assert_eq!(table.type_of(&first.rhs[0]).unwrap().to_string(), "*Profile");
        assert_eq!(table.type_of(&second.rhs[0]).unwrap().to_string(), "int");
    }

    #[test]
    fn shadowing_inner_scope() {
        let body = "p := u.Profile\nif p := u.Name; p != nil {\n_ = p\n}";
        let (files, table) = build(body);
        let Decl::Func(func) = &files[1].decls[0] else {
            panic!("expected func");
        };
        let Stmt::If(if_stmt) = &func.body.as_ref().unwrap().stmts[1] else {
            panic!("expected if");
        };
        let Stmt::Assign(inner) = &if_stmt.then.stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(table.type_of(&inner.rhs[0]).unwrap().to_string(), "*string");
    }

    #[test]
    fn method_sets_merge_receivers() {
        let (_, table) = build("_ = u");
        let user = TypeRef::named("User");
        assert!(table.has_method(&user, "GetName"));
        assert!(table.has_method(&TypeRef::pointer_to(user.clone()), "ProtoMessage"));
        assert!(!table.has_method(&user, "ProtoReflect"));
        assert!(!table.has_method(&TypeRef::Basic("string".into()), "GetName"));
    }

    #[test]
    fn literals_assertions_and_conversions() {
        assert_eq!(type_of("_ = pb.User{}.Profile").as_deref(), Some("*Profile"));
        assert_eq!(type_of("_ = &pb.User{}").as_deref(), Some("*User"));
        assert_eq!(type_of("var x any\n_ = x.(*pb.User).Profile").as_deref(), Some("*Profile"));
        assert_eq!(type_of("_ = u.Tags[1:]").as_deref(), Some("[]string"));
        assert_eq!(type_of("_ = []byte(\"x\")").as_deref(), Some("[]byte"));
        assert_eq!(type_of("_ = 'a'").as_deref(), Some("rune"));
        assert_eq!(type_of("_ = 1.5").as_deref(), Some("float64"));
    }

    #[test]
    fn comma_ok_forms() {
        assert_eq!(
            type_of("var x any\np, ok := x.(*pb.Profile)\n_ = p").as_deref(),
            Some("*Profile")
        );
        assert_eq!(type_of("p, ok := u.Attrs[\"k\"]\n_ = ok").as_deref(), Some("bool"));
    }

    #[test]
    fn function_literal_parameters() {
        let body = "each(func(friend *pb.User) {\n_ = friend.Profile\n})\n_ = friend";
        let (files, table) = build(body);
        assert_eq!(table.type_of(last_discarded(&files)), None);
        let Decl::Func(func) = &files[1].decls[0] else {
            panic!("expected func");
        };
        let Stmt::Expr(Expr::Call(call)) = &func.body.as_ref().unwrap().stmts[0] else {
            panic!("expected call");
        };
        let Expr::FuncLit(lit) = &call.args[0] else {
            panic!("expected func literal");
        };
        let Stmt::Assign(inner) = &lit.body.stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(table.type_of(&inner.rhs[0]).unwrap().to_string(), "*Profile");
    }

    #[test]
    fn type_switch_binds_per_clause() {
        let body = "var x any\n\
            switch v := x.(type) {\n\
            case *pb.User:\n\
            \t_ = v.Profile\n\
            case *pb.Profile, nil:\n\
            \t_ = v\n\
            }";
        let (files, table) = build(body);
        let Decl::Func(func) = &files[1].decls[0] else {
            panic!("expected func");
        };
        let Stmt::TypeSwitch(switch) = &func.body.as_ref().unwrap().stmts[1] else {
            panic!("expected type switch");
        };
        let Stmt::Assign(first) = &switch.clauses[0].body[0] else {
            panic!("expected assignment");
        };
        let Stmt::Assign(second) = &switch.clauses[1].body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(table.type_of(&first.rhs[0]).unwrap().to_string(), "*Profile");
        assert_eq!(table.type_of(&second.rhs[0]).unwrap().to_string(), "any");
    }

    #[test]
    fn switch_clause_variables_stay_in_their_clause() {
        let body = "switch {\ncase true:\n\tp := u.Profile\n\t_ = p\n}\n_ = p";
        assert_eq!(type_of(body), None);
    }

    #[test]
    fn package_constants_are_typed() {
        let files = parse_files([(
            "consts.go",
            "package p\nconst (\n\tA Role = 0\n\tB = \"b\"\n)\nfunc f() {\n_ = A\n_ = B\n}\n",
        )])
        .unwrap();
        let table = TypeTable::build(&files);
        let Decl::Func(func) = &files[0].decls[2] else {
            panic!("expected func");
        };
        let body = &func.body.as_ref().unwrap().stmts;
        let types: Vec<_> = body
            .iter()
            .map(|stmt| match stmt {
                Stmt::Assign(assign) => table.type_of(&assign.rhs[0]).map(|t| t.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(types, vec![Some("Role".to_string()), Some("string".to_string())]);
    }
}
