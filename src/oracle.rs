//! Capability oracle: is this selector a direct read of a field that has a
//! safe accessor?
//!
//! The oracle only sees types through [`TypeInfo`], so it can be driven by
//! the [`TypeTable`](crate::types::TypeTable) or by a mock in tests.

use getterguard_syntax::{Expr, SelectorExpr};

use crate::config::GuardConfig;
use crate::types::TypeRef;

/// Read-only type facts for one run.
pub trait TypeInfo {
    /// Static type of `expr`, if known.
    fn type_of(&self, expr: &Expr) -> Option<TypeRef>;

    /// Whether `ty` (or, for a pointer, its element type) declares `method`.
    fn has_method(&self, ty: &TypeRef, method: &str) -> bool;
}

pub struct CapabilityOracle<'t> {
    types: &'t dyn TypeInfo,
    config: &'t GuardConfig,
}

impl<'t> CapabilityOracle<'t> {
    pub fn new(types: &'t dyn TypeInfo, config: &'t GuardConfig) -> Self {
        CapabilityOracle { types, config }
    }

    /// Name of the accessor for `field`: `Name` -> `GetName`.
    pub fn accessor_name(&self, field: &str) -> String {
        format!("{}{}", self.config.accessor_prefix, field)
    }

    /// True when `node` reads a field of a managed object whose accessor
    /// exists.
    pub fn is_unsafe_direct_read(&self, node: &SelectorExpr) -> bool {
        let field = node.sel.name.as_str();
        if field.starts_with(&self.config.accessor_prefix) {
            return false;
        }

        let Some(base) = self.types.type_of(&node.x) else {
            return false;
        };
        let base = base.strip_pointer();

        self.is_managed(base) && self.types.has_method(base, &self.accessor_name(field))
    }

    /// Whether `ty` belongs to a generated family whose accessors are
    /// nil-safe.
    pub fn is_managed(&self, ty: &TypeRef) -> bool {
        let markers = &self.config.markers;
        if self.types.has_method(ty, &markers.reflect) {
            return true;
        }
        self.types.has_method(ty, &markers.legacy)
            && !self.types.has_method(ty, &markers.unsafe_generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use getterguard_syntax::{parse_file, print_expr, Decl, Stmt};

    /// Types keyed by printed expression text.
    #[derive(Default)]
    struct MockTypes {
        exprs: HashMap<String, TypeRef>,
        methods: HashMap<String, Vec<&'static str>>,
    }

    impl MockTypes {
        fn with_expr(mut self, text: &str, ty: TypeRef) -> Self {
            self.exprs.insert(text.to_string(), ty);
            self
        }

        fn with_methods(mut self, type_name: &str, methods: &[&'static str]) -> Self {
            self.methods.insert(type_name.to_string(), methods.to_vec());
            self
        }
    }

    impl TypeInfo for MockTypes {
        fn type_of(&self, expr: &Expr) -> Option<TypeRef> {
            self.exprs.get(&print_expr(expr).ok()?).cloned()
        }

        fn has_method(&self, ty: &TypeRef, method: &str) -> bool {
            ty.base_name()
                .and_then(|name| self.methods.get(name))
                .is_some_and(|methods| methods.iter().any(|m| *m == method))
        }
    }

    fn selector(source: &str) -> SelectorExpr {
        let file = parse_file("t.go", &format!("package p\nfunc f() {{\n_ = {}\n}}\n", source))
            .unwrap();
        let Decl::Func(func) = &file.decls[0] else {
            panic!("expected func");
        };
        let Stmt::Assign(assign) = &func.body.as_ref().unwrap().stmts[0] else {
            panic!("expected assignment");
        };
        assign.rhs[0].as_selector().unwrap().clone()
    }

    fn v2_user() -> MockTypes {
        MockTypes::default()
            .with_expr("msg", TypeRef::pointer_to(TypeRef::named("User")))
            .with_methods("User", &["ProtoReflect", "GetName", "GetId"])
    }

    #[test]
    fn reflect_marker_with_accessor() {
        let types = v2_user();
        let config = GuardConfig::default();
        let oracle = CapabilityOracle::new(&types, &config);
        assert!(oracle.is_unsafe_direct_read(&selector("msg.Name")));
        assert!(oracle.is_unsafe_direct_read(&selector("msg.Id")));
    }

    #[test]
    fn missing_accessor_is_not_reported() {
        let types = v2_user();
        let config = GuardConfig::default();
        let oracle = CapabilityOracle::new(&types, &config);
        assert!(!oracle.is_unsafe_direct_read(&selector("msg.state")));
    }

    #[test]
    fn prefixed_field_is_never_reported() {
        let types = v2_user().with_methods("User", &["ProtoReflect", "GetGetter"]);
        let config = GuardConfig::default();
        let oracle = CapabilityOracle::new(&types, &config);
        assert!(!oracle.is_unsafe_direct_read(&selector("msg.Getter")));
    }

    #[test]
    fn unknown_type_is_a_scope_miss() {
        let types = v2_user();
        let config = GuardConfig::default();
        let oracle = CapabilityOracle::new(&types, &config);
        assert!(!oracle.is_unsafe_direct_read(&selector("other.Name")));
    }

    #[test]
    fn legacy_marker_families() {
        let types = MockTypes::default()
            .with_expr("v1", TypeRef::named("Legacy"))
            .with_expr("gogo", TypeRef::named("Gogo"))
            .with_methods("Legacy", &["ProtoMessage", "GetName"])
            .with_methods("Gogo", &["ProtoMessage", "MarshalToSizedBuffer", "GetName"]);
        let config = GuardConfig::default();
        let oracle = CapabilityOracle::new(&types, &config);
        assert!(oracle.is_unsafe_direct_read(&selector("v1.Name")));
        assert!(!oracle.is_unsafe_direct_read(&selector("gogo.Name")));
    }

    #[test]
    fn plain_struct_is_not_managed() {
        let types = MockTypes::default()
            .with_expr("cfg", TypeRef::named("Config"))
            .with_methods("Config", &["GetName"]);
        let config = GuardConfig::default();
        let oracle = CapabilityOracle::new(&types, &config);
        assert!(!oracle.is_unsafe_direct_read(&selector("cfg.Name")));
    }

    #[test]
    fn configured_prefix_and_markers() {
        let types = MockTypes::default()
            .with_expr("m", TypeRef::named("Thing"))
            .with_methods("Thing", &["Reflect", "FetchName"]);
        let mut config = GuardConfig::default();
        config.accessor_prefix = "Fetch".to_string();
        config.markers.reflect = "Reflect".to_string();
        let oracle = CapabilityOracle::new(&types, &config);
        assert_eq!(oracle.accessor_name("Name"), "FetchName");
        assert!(oracle.is_unsafe_direct_read(&selector("m.Name")));
    }
}
