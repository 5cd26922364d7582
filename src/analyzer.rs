//! Analyzer driver.
//!
//! Walks every non-generated file in depth-first pre-order and runs each
//! candidate node through classifier, oracle, registry and synthesizer,
//! then hands the finding to the output adapter selected by [`Mode`].
//!
//! Like a Go file set, the driver gives each file a distinct base offset
//! so that a single registry covers the whole run.

use std::collections::HashSet;

use tracing::{debug, info, trace};

use getterguard_core::Span;
use getterguard_syntax::visitor::{walk_source_file, VisitResult, Visitor};
use getterguard_syntax::{
    AssignStmt, CallExpr, Expr, IncDecStmt, SelectorExpr, SelectorRole, SourceFile, UnaryExpr,
};

use crate::classify::{classify, Candidate, NodeClass};
use crate::config::GuardConfig;
use crate::filter::ReplacedSpanRegistry;
use crate::finding::Synthesizer;
use crate::oracle::{CapabilityOracle, TypeInfo};
use crate::report::{Diagnostic, DiagnosticSink, Issue};

/// How findings are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Report each finding to the sink with a suggested fix.
    #[default]
    Diagnostic,
    /// Return findings as [`Issue`]s.
    Issues,
}

pub struct Analyzer<'c> {
    config: &'c GuardConfig,
    mode: Mode,
}

impl<'c> Analyzer<'c> {
    pub fn new(config: &'c GuardConfig, mode: Mode) -> Self {
        Analyzer { config, mode }
    }

    /// Run the rule over `files`.
    ///
    /// Diagnostics, including `error: ...` reports for nodes that could not
    /// be synthesized, go to `sink`. In [`Mode::Issues`] findings are
    /// returned instead, in traversal order.
    pub fn run(
        &self,
        files: &[SourceFile],
        types: &dyn TypeInfo,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<Issue> {
        let oracle = CapabilityOracle::new(types, self.config);
        let synthesizer = Synthesizer::new(&oracle);
        let mut registry = ReplacedSpanRegistry::new();
        let mut issues = Vec::new();
        let mut findings = 0usize;
        let mut base = 0usize;

        for file in files {
            let file_base = base;
            base += file.source.len() + 1;

            if file.is_generated(&self.config.generated_marker) {
                debug!(file = %file.name, "skipping generated file");
                continue;
            }

            let mut pass = FilePass {
                file,
                base: file_base,
                mode: self.mode,
                oracle: &oracle,
                synthesizer: &synthesizer,
                registry: &mut registry,
                callees: HashSet::new(),
                sink: &mut *sink,
                issues: &mut issues,
                findings: 0,
            };
            walk_source_file(&mut pass, file);
            debug!(file = %file.name, findings = pass.findings, "checked file");
            findings += pass.findings;
        }

        info!(files = files.len(), findings, "analysis complete");
        issues
    }
}

/// Per-file traversal state.
struct FilePass<'r, 'o> {
    file: &'r SourceFile,
    /// Offset of this file in the run-wide position space.
    base: usize,
    mode: Mode,
    oracle: &'o CapabilityOracle<'o>,
    synthesizer: &'o Synthesizer<'o>,
    registry: &'r mut ReplacedSpanRegistry,
    /// Spans of selectors in call position.
    callees: HashSet<Span>,
    sink: &'r mut dyn DiagnosticSink,
    issues: &'r mut Vec<Issue>,
    findings: usize,
}

impl FilePass<'_, '_> {
    fn global(&self, span: Span) -> Span {
        Span::new(self.base + span.start, self.base + span.end)
    }

    fn analyse(&mut self, candidate: Candidate<'_>) -> VisitResult {
        let span = self.global(candidate.span());
        if self.registry.is_filtered(span.start) {
            return VisitResult::SkipChildren;
        }

        let class = classify(&candidate);
        let Candidate::Selector { node, .. } = candidate else {
            return class.visit_result();
        };
        if class != NodeClass::Inspect || !self.oracle.is_unsafe_direct_read(node) {
            return class.visit_result();
        }

        let finding = match self.synthesizer.synthesize(self.file, node) {
            Ok(finding) => finding,
            Err(err) => {
                self.sink.report(Diagnostic::error(self.file, node.span, err));
                return VisitResult::Continue;
            }
        };

        if self.registry.is_already_replaced(span) {
            return VisitResult::Continue;
        }
        self.registry.register(span);
        self.findings += 1;
        trace!(file = %self.file.name, from = %finding.from, to = %finding.to, "finding");

        match self.mode {
            Mode::Diagnostic => self
                .sink
                .report(Diagnostic::from_finding(self.file, &finding)),
            Mode::Issues => self.issues.push(Issue::from_finding(self.file, &finding)),
        }
        VisitResult::Continue
    }
}

impl<'a> Visitor<'a> for FilePass<'_, '_> {
    fn visit_assign_stmt(&mut self, node: &'a AssignStmt) -> VisitResult {
        self.analyse(Candidate::Assign(node))
    }

    fn visit_inc_dec_stmt(&mut self, node: &'a IncDecStmt) -> VisitResult {
        self.analyse(Candidate::IncDec(node))
    }

    fn visit_unary_expr(&mut self, node: &'a UnaryExpr) -> VisitResult {
        self.analyse(Candidate::Unary(node))
    }

    fn visit_call_expr(&mut self, node: &'a CallExpr) -> VisitResult {
        if let Expr::Selector(callee) = node.fun.unparen() {
            self.callees.insert(callee.span);
        }
        self.analyse(Candidate::Call(node))
    }

    fn visit_selector_expr(&mut self, node: &'a SelectorExpr) -> VisitResult {
        let role = if self.callees.contains(&node.span) {
            SelectorRole::Callee
        } else {
            SelectorRole::Read
        };
        self.analyse(Candidate::Selector { node, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use getterguard_syntax::parse_files;

    use crate::types::TypeTable;

    const MESSAGES: &str = "// Code generated by protoc-gen-go. DO NOT EDIT.\n\
        package pb\n\
        type User struct {\n\
        \tName string\n\
        \tProfile *Profile\n\
        \tFriends []*User\n\
        }\n\
        func (x *User) GetName() string { return \"\" }\n\
        func (x *User) GetProfile() *Profile { return nil }\n\
        func (x *User) GetFriends() []*User { return nil }\n\
        func (x *User) ProtoReflect() {}\n\
        func (x *User) Name() string { return x.Name }\n\
        type Profile struct {\n\
        \tBio string\n\
        }\n\
        func (x *Profile) GetBio() string { return \"\" }\n\
        func (x *Profile) ProtoReflect() {}\n";

    fn run(body: &str, mode: Mode) -> (Vec<Diagnostic>, Vec<Issue>) {
        let consumer = format!("package svc\nfunc f(u *pb.User) {{\n{}\n}}\n", body);
        let files = parse_files([("user.pb.go", MESSAGES), ("svc.go", consumer.as_str())]).unwrap();
        let table = TypeTable::build(&files);
        let config = GuardConfig::default();
        let mut diagnostics = Vec::new();
        let issues = Analyzer::new(&config, mode).run(&files, &table, &mut diagnostics);
        (diagnostics, issues)
    }

    fn messages(body: &str) -> Vec<String> {
        run(body, Mode::Diagnostic)
            .0
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn reports_field_read() {
        assert_eq!(
            messages("x := u.Name"),
            vec!["avoid direct access to proto field \"u.Name\" use \"u.GetName()\""]
        );
    }

    #[test]
    fn generated_file_is_skipped() {
        // The generated file reads x.Name itself; only svc.go is checked.
        assert!(messages("_ = 1").is_empty());
    }

    #[test]
    fn exempt_positions() {
        assert!(messages("u.Name = \"x\"").is_empty());
        assert!(messages("u.Profile.Bio = u.Name").is_empty());
        assert!(messages("p := &u.Profile").is_empty());
        assert!(messages("u.GetProfile().GetBio()").is_empty());
    }

    #[test]
    fn method_receiver_is_still_inspected() {
        assert_eq!(
            messages("_ = u.Profile.String()"),
            vec!["avoid direct access to proto field \"u.Profile\" use \"u.GetProfile()\""]
        );
    }

    #[test]
    fn outer_access_wins() {
        let msgs = messages("_ = u.Profile.Bio");
        assert_eq!(
            msgs,
            vec![
                "avoid direct access to proto field \"u.Profile.Bio\" use \"u.GetProfile().GetBio()\""
            ]
        );
    }

    #[test]
    fn issues_mode_returns_issues() {
        let (diagnostics, issues) = run("x := u.Name\ny := u.Profile", Mode::Issues);
        assert!(diagnostics.is_empty());
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].pos.file, "svc.go");
        assert_eq!(issues[0].pos.line, 3);
        assert_eq!(issues[0].inline_fix.start_col, 5);
        assert_eq!(issues[1].inline_fix.new_string, "u.GetProfile()");
    }

    #[test]
    fn malformed_base_does_not_stop_the_walk() {
        let msgs = messages("_ = ).Name\n_ = u.Name");
        assert_eq!(
            msgs,
            vec!["avoid direct access to proto field \"u.Name\" use \"u.GetName()\""]
        );
    }

    #[test]
    fn malformed_index_reports_error_and_keeps_inner_findings() {
        let body = "_ = u.Friends[)].Name\n_ = u.Name";
        assert_eq!(
            messages(body),
            vec![
                "error: cannot print malformed expression at [47, 48)",
                "avoid direct access to proto field \"u.Friends\" use \"u.GetFriends()\"",
                "avoid direct access to proto field \"u.Name\" use \"u.GetName()\"",
            ]
        );

        let (diagnostics, issues) = run(body, Mode::Issues);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("error: "));
        assert!(diagnostics[0].suggested_fixes.is_empty());
        let fixes: Vec<_> = issues.iter().map(|i| i.inline_fix.new_string.as_str()).collect();
        assert_eq!(fixes, vec!["u.GetFriends()", "u.GetName()"]);
    }

    #[test]
    fn reads_inside_switches_and_closures_are_reported() {
        let body = "switch {\n\
            case u == nil:\n\
            \treturn\n\
            case u.Profile != nil:\n\
            \tgo func() { _ = u.Name }()\n\
            }\n\
            _ = pb.User{Profile: nil}.Name";
        assert_eq!(
            messages(body),
            vec![
                "avoid direct access to proto field \"u.Profile\" use \"u.GetProfile()\"",
                "avoid direct access to proto field \"u.Name\" use \"u.GetName()\"",
                "avoid direct access to proto field \"pb.User{Profile: nil}.Name\" \
                 use \"pb.User{Profile: nil}.GetName()\"",
            ]
        );
    }

    #[test]
    fn findings_in_several_files_share_one_registry() {
        let a = "package svc\nfunc f(u *pb.User) {\n_ = u.Name\n}\n";
        let b = "package svc\nfunc g(u *pb.User) {\n_ = u.Name\n}\n";
        let files = parse_files([("user.pb.go", MESSAGES), ("a.go", a), ("b.go", b)]).unwrap();
        let table = TypeTable::build(&files);
        let config = GuardConfig::default();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        Analyzer::new(&config, Mode::Diagnostic).run(&files, &table, &mut diagnostics);
        let names: Vec<_> = diagnostics.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
    }
}
