//! Binary entry point for the getterguard CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Report direct field reads as path:line:col lines
//! getterguard check ./...
//!
//! # Structured issues with inline fixes, as JSON
//! getterguard check --mode issues svc/
//!
//! # Rewrite the files in place
//! getterguard check --fix svc/
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use getterguard::cli::{run_check, CheckOptions};
use getterguard::config::Config;
use getterguard::error::{GuardError, OutputErrorCode};
use getterguard::output::{emit_response, ErrorResponse};
use getterguard::Mode;

// ============================================================================
// CLI Structure
// ============================================================================

/// Flags direct field reads on generated message types.
#[derive(Parser, Debug)]
#[command(name = "getterguard", version, about = "Use accessors, not fields, on generated messages")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// How findings are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    /// `path:line:col: message` lines (default).
    #[default]
    Diagnostic,
    /// JSON envelope with one issue and inline fix per finding.
    Issues,
}

impl From<OutputMode> for Mode {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Diagnostic => Mode::Diagnostic,
            OutputMode::Issues => Mode::Issues,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Check Go sources for direct field reads on generated messages.
    Check {
        /// Files or directories to check.
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output mode.
        #[arg(long, value_enum, default_value = "diagnostic")]
        mode: OutputMode,

        /// Apply the suggested fixes in place.
        #[arg(long)]
        fix: bool,

        /// Configuration file (default: ./getterguard.toml when present).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::new(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command, returning the exit status on success.
fn execute(cli: Cli) -> Result<u8, GuardError> {
    match cli.command {
        Command::Check {
            paths,
            mode,
            fix,
            config,
        } => execute_check(paths, mode, fix, config),
    }
}

fn execute_check(
    paths: Vec<PathBuf>,
    mode: OutputMode,
    fix: bool,
    config_path: Option<PathBuf>,
) -> Result<u8, GuardError> {
    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::load_from_dir(&std::env::current_dir()?)?,
    };

    let options = CheckOptions {
        paths,
        mode: mode.into(),
        fix,
        config: config.getterguard,
    };
    let outcome = run_check(&options)?;

    let mut stdout = io::stdout();
    match mode {
        OutputMode::Diagnostic => outcome.write_diagnostics(&mut stdout)?,
        OutputMode::Issues => emit_response(&outcome.response(), &mut stdout)?,
    }
    let _ = stdout.flush();

    Ok(outcome.exit_code())
}
