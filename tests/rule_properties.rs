//! Rule-level tests over the Go fixtures in `tests/fixtures/`.
//!
//! These drive the library directly (`cli::run_check` and the analyzer) and
//! check the properties every run must hold: exempt positions stay quiet,
//! reported spans never overlap, and applying the fixes leaves nothing to
//! report.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use getterguard::cli::{collect_go_files, parse_sources, run_check, CheckOptions, CheckOutcome};
use getterguard::{Analyzer, Diagnostic, GuardConfig, Mode, TypeTable};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy the fixture tree into a fresh temp directory.
fn fixture_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    copy_tree(&fixtures_dir(), dir.path());
    dir
}

fn copy_tree(from: &Path, to: &Path) {
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            fs::create_dir_all(&target).unwrap();
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn check(root: &Path, mode: Mode, fix: bool) -> CheckOutcome {
    run_check(&CheckOptions {
        paths: vec![root.to_path_buf()],
        mode,
        fix,
        config: GuardConfig::default(),
    })
    .unwrap()
}

fn froms(outcome: &CheckOutcome) -> Vec<String> {
    outcome
        .diagnostics
        .iter()
        .map(|d| {
            let file = outcome.files.iter().find(|f| f.name == d.file).unwrap();
            file.text(d.span).unwrap().to_string()
        })
        .collect()
}

// ============================================================================
// Detection
// ============================================================================

#[test]
fn fixture_findings_in_traversal_order() {
    let outcome = check(&fixtures_dir(), Mode::Diagnostic, false);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(
        froms(&outcome),
        vec![
            "u.Name",
            "u.Profile.Bio",
            "u.Friends[0].Name",
            "u.Friends",
            "friend.Name",
            "l.Title",
        ]
    );
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn nested_chain_reports_one_outer_finding() {
    let outcome = check(&fixtures_dir(), Mode::Diagnostic, false);
    let chain: Vec<&Diagnostic> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.message.contains("Profile"))
        .collect();
    assert_eq!(chain.len(), 1);
    assert_eq!(
        chain[0].message,
        "avoid direct access to proto field \"u.Profile.Bio\" use \"u.GetProfile().GetBio()\""
    );
}

#[test]
fn generated_files_are_not_checked() {
    let outcome = check(&fixtures_dir(), Mode::Diagnostic, false);
    assert!(outcome
        .diagnostics
        .iter()
        .all(|d| d.file.ends_with("users.go")));
    // Both generated files were still parsed for their types.
    assert_eq!(outcome.files.len(), 3);
}

#[test]
fn unsafe_generator_family_is_excluded() {
    let outcome = check(&fixtures_dir(), Mode::Diagnostic, false);
    let messages: Vec<&str> = outcome.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("\"l.Title\"")));
    assert!(!messages.iter().any(|m| m.contains("\"g.Title\"")));
    assert!(!messages.iter().any(|m| m.contains("\"p.Name\"")));
}

#[test]
fn reported_spans_are_disjoint() {
    let outcome = check(&fixtures_dir(), Mode::Diagnostic, false);
    let spans: Vec<_> = outcome.diagnostics.iter().map(|d| d.span).collect();
    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            assert!(!a.overlaps(b), "{} overlaps {}", a, b);
        }
    }
}

#[test]
fn analyzer_runs_are_independent() {
    let collected = collect_go_files(&[fixtures_dir()]).unwrap();
    assert!(collected.errors.is_empty());
    let (files, errors) = parse_sources(&collected.sources);
    assert!(errors.is_empty());
    let types = TypeTable::build(&files);
    let config = GuardConfig::default();
    let analyzer = Analyzer::new(&config, Mode::Diagnostic);

    let mut first = Vec::new();
    analyzer.run(&files, &types, &mut first);
    let mut second = Vec::new();
    analyzer.run(&files, &types, &mut second);
    assert_eq!(first, second);
}

// ============================================================================
// Fixes
// ============================================================================

#[test]
fn fixes_are_idempotent() {
    let dir = fixture_workspace();
    let fixed = check(dir.path(), Mode::Diagnostic, true);
    assert_eq!(fixed.fixed.len(), 1);

    let source = fs::read_to_string(dir.path().join("svc/users.go")).unwrap();
    assert!(source.contains("name := u.GetName()"));
    assert!(source.contains("bio := u.GetProfile().GetBio()"));
    assert!(source.contains("first := u.GetFriends()[0].GetName()"));
    assert!(source.contains("range u.GetFriends()"));
    assert!(source.contains("name = name + friend.GetName()"));
    assert!(source.contains("u.Name = \"renamed\""));
    assert!(source.contains("u.Id++"));
    assert!(source.contains("ptr := &u.Profile"));
    assert!(source.contains("l.GetTitle() + g.Title + p.Name"));

    let rerun = check(dir.path(), Mode::Diagnostic, false);
    assert!(rerun.diagnostics.is_empty(), "{:?}", rerun.diagnostics);
    assert_eq!(rerun.exit_code(), 0);
}

#[test]
fn issue_fixes_match_diagnostic_fixes() {
    let by_diagnostic = fixture_workspace();
    check(by_diagnostic.path(), Mode::Diagnostic, true);

    let by_issue = fixture_workspace();
    let outcome = check(by_issue.path(), Mode::Issues, true);
    assert_eq!(outcome.issues.len(), 6);
    assert!(outcome.diagnostics.is_empty());

    let read = |dir: &TempDir| fs::read_to_string(dir.path().join("svc/users.go")).unwrap();
    assert_eq!(read(&by_diagnostic), read(&by_issue));
}

#[test]
fn issue_inline_fix_points_at_the_selector() {
    let outcome = check(&fixtures_dir(), Mode::Issues, false);
    let first = &outcome.issues[0];
    assert_eq!(first.pos.line, 12);
    assert_eq!(first.pos.column, 10);
    assert_eq!(first.inline_fix.start_col, 9);
    assert_eq!(first.inline_fix.length, "u.Name".len());
    assert_eq!(first.inline_fix.new_string, "u.GetName()");
}
