//! CLI front door: collect sources, run the rule, render and apply.
//!
//! `main.rs` parses arguments and owns process concerns (tracing, exit
//! status). Everything that touches the rule lives here so the integration
//! tests can drive it without spawning the binary.
//!
//! ## Error Handling
//!
//! Failures that stop the whole run (missing path, bad config, a fix that
//! cannot be applied) are returned as [`GuardError`]. A file that cannot be
//! read or parsed does not stop the run; it is logged and listed under
//! `errors` in the response. Files the parser recovered from are still
//! analyzed.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use getterguard_core::error::GuardError;
use getterguard_core::output::{ErrorInfo, Position, SCHEMA_VERSION};
use getterguard_core::patch::{apply_edits, TextEdit};
use getterguard_syntax::{parse_file_with_ids, NodeIdGenerator, SourceFile};

use crate::analyzer::{Analyzer, Mode};
use crate::config::GuardConfig;
use crate::report::{Diagnostic, Issue};
use crate::types::TypeTable;

/// Extension of the sources the rule checks.
const SOURCE_EXTENSION: &str = "go";

/// Inputs to one `check` run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Files or directories to check.
    pub paths: Vec<PathBuf>,
    pub mode: Mode,
    /// Apply the suggested edits to the files on disk.
    pub fix: bool,
    pub config: GuardConfig,
}

/// Result of one `check` run.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    /// Parsed sources, in path order.
    pub files: Vec<SourceFile>,
    pub diagnostics: Vec<Diagnostic>,
    pub issues: Vec<Issue>,
    /// Files that could not be read or parsed cleanly.
    pub errors: Vec<ErrorInfo>,
    /// Files rewritten by `--fix`.
    pub fixed: Vec<String>,
}

/// JSON envelope for `check --mode issues`.
#[derive(Debug, Serialize)]
pub struct CheckResponse<'a> {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub files_checked: usize,
    pub issues: &'a [Issue],
    #[serde(skip_serializing_if = "is_empty")]
    pub diagnostics: &'a [Diagnostic],
    pub errors: &'a [ErrorInfo],
    #[serde(skip_serializing_if = "is_empty")]
    pub fixed: &'a [String],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl CheckOutcome {
    /// Number of reported findings, including `error:` diagnostics.
    pub fn finding_count(&self) -> usize {
        self.diagnostics.len() + self.issues.len()
    }

    /// Process exit status: 0 clean, 1 findings, 3 when the only problems
    /// are files that failed to parse.
    pub fn exit_code(&self) -> u8 {
        if self.finding_count() > 0 {
            1
        } else if !self.errors.is_empty() {
            3
        } else {
            0
        }
    }

    pub fn response(&self) -> CheckResponse<'_> {
        CheckResponse {
            status: "ok",
            schema_version: SCHEMA_VERSION,
            files_checked: self.files.len(),
            issues: &self.issues,
            diagnostics: &self.diagnostics,
            errors: &self.errors,
            fixed: &self.fixed,
        }
    }

    /// Write diagnostics as `path:line:col: message` lines.
    pub fn write_diagnostics(&self, out: &mut impl Write) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            let source = self
                .files
                .iter()
                .find(|file| file.name == diagnostic.file)
                .map(|file| file.source.as_str())
                .unwrap_or_default();
            let pos = Position::at_offset(diagnostic.file.as_str(), source, diagnostic.span.start);
            writeln!(out, "{}:{}:{}: {}", pos.file, pos.line, pos.column, diagnostic.message)?;
        }
        for error in &self.errors {
            writeln!(out, "{}", error.message)?;
        }
        Ok(())
    }
}

/// Sources gathered for one run.
#[derive(Debug, Default)]
pub struct CollectedSources {
    /// `(path, contents)` pairs, sorted by path.
    pub sources: Vec<(String, String)>,
    /// Entries that could not be listed or read as UTF-8.
    pub errors: Vec<ErrorInfo>,
}

impl CollectedSources {
    fn read(&mut self, path: &Path) {
        let name = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(source) => self.sources.push((name, source)),
            Err(err) => self.skip(name, err),
        }
    }

    fn skip(&mut self, name: String, err: impl std::fmt::Display) {
        warn!(file = %name, error = %err, "skipping unreadable file");
        self.errors
            .push(ErrorInfo::from_error(&GuardError::read(name, err.to_string())));
    }
}

/// Collect `.go` files under `paths`, sorted by path.
///
/// A path that is a file is taken as-is whatever its extension. Only a
/// missing path is fatal; entries that cannot be walked or decoded are
/// logged and listed in [`CollectedSources::errors`].
pub fn collect_go_files(paths: &[PathBuf]) -> Result<CollectedSources, GuardError> {
    let mut collected = CollectedSources::default();
    for root in paths {
        if !root.exists() {
            return Err(GuardError::file_not_found(root));
        }
        if root.is_file() {
            collected.read(root);
            continue;
        }

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let name = err.path().unwrap_or(root.as_path()).display().to_string();
                    collected.skip(name, err);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION)
            {
                continue;
            }
            collected.read(path);
        }
    }

    collected.sources.sort_by(|(a, _), (b, _)| a.cmp(b));
    collected.sources.dedup_by(|(a, _), (b, _)| a == b);
    collected.errors.dedup_by(|a, b| a.message == b.message);
    Ok(collected)
}

/// Parse every source with one id generator so node ids stay unique
/// across the run.
///
/// A file without a package clause is reported and dropped. A file the
/// parser recovered from is reported once, at its first error, and still
/// analyzed.
pub fn parse_sources(sources: &[(String, String)]) -> (Vec<SourceFile>, Vec<ErrorInfo>) {
    let mut ids = NodeIdGenerator::new();
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for (name, source) in sources {
        match parse_file_with_ids(name, source, &mut ids) {
            Ok(file) => {
                if let Some(first) = file.errors.first() {
                    let pos = Position::at_offset(name.as_str(), source, first.offset());
                    warn!(
                        file = %name,
                        line = pos.line,
                        column = pos.column,
                        count = file.errors.len(),
                        error = %first,
                        "recovered from syntax errors"
                    );
                    let message = format!("{}:{}:{}: {}", name, pos.line, pos.column, first);
                    errors.push(ErrorInfo::from_error(&GuardError::parse(name.as_str(), message)));
                }
                files.push(file);
            }
            Err(err) => {
                let pos = Position::at_offset(name.as_str(), source, err.offset());
                warn!(file = %name, line = pos.line, column = pos.column, error = %err, "skipping unparseable file");
                let message = format!("{}:{}:{}: {}", name, pos.line, pos.column, err);
                errors.push(ErrorInfo::from_error(&GuardError::parse(name.as_str(), message)));
            }
        }
    }
    (files, errors)
}

/// Run `check` over the configured paths.
pub fn run_check(options: &CheckOptions) -> Result<CheckOutcome, GuardError> {
    let CollectedSources {
        sources,
        mut errors,
    } = collect_go_files(&options.paths)?;
    debug!(count = sources.len(), unreadable = errors.len(), "collected sources");

    let (files, parse_errors) = parse_sources(&sources);
    errors.extend(parse_errors);
    let types = TypeTable::build(&files);

    let mut diagnostics = Vec::new();
    let issues = Analyzer::new(&options.config, options.mode).run(&files, &types, &mut diagnostics);

    let mut outcome = CheckOutcome {
        files,
        diagnostics,
        issues,
        errors,
        fixed: Vec::new(),
    };
    if options.fix {
        outcome.fixed = apply_fixes(&outcome)?;
        info!(files = outcome.fixed.len(), "applied fixes");
    }
    Ok(outcome)
}

/// Apply every suggested edit and write the changed files back.
fn apply_fixes(outcome: &CheckOutcome) -> Result<Vec<String>, GuardError> {
    let mut edits: BTreeMap<&str, Vec<TextEdit>> = BTreeMap::new();
    for diagnostic in &outcome.diagnostics {
        edits
            .entry(diagnostic.file.as_str())
            .or_default()
            .extend(diagnostic.edits().cloned());
    }

    let sources: BTreeMap<&str, &str> = outcome
        .files
        .iter()
        .map(|file| (file.name.as_str(), file.source.as_str()))
        .collect();
    for issue in &outcome.issues {
        let Some(source) = sources.get(issue.pos.file.as_str()) else {
            continue;
        };
        edits
            .entry(issue.pos.file.as_str())
            .or_default()
            .push(issue.to_text_edit(source));
    }

    let mut fixed = Vec::new();
    for (name, file_edits) in edits {
        if file_edits.is_empty() {
            continue;
        }
        let source = sources
            .get(name)
            .ok_or_else(|| GuardError::internal(format!("no source loaded for {}", name)))?;
        let patched = apply_edits(source, &file_edits).map_err(|e| GuardError::apply(name, e))?;
        write_file(Path::new(name), &patched)?;
        debug!(file = name, edits = file_edits.len(), "rewrote file");
        fixed.push(name.to_string());
    }
    Ok(fixed)
}

fn write_file(path: &Path, content: &str) -> Result<(), GuardError> {
    fs::write(path, content).map_err(|e| GuardError::ApplyError {
        message: format!("failed to write {}: {}", path.display(), e),
        file: Some(path.display().to_string()),
    })
}
