//! Error types and error code constants for getterguard.
//!
//! `GuardError` is the single error type rendered by the CLI. Errors from the
//! subsystems (edit application, parsing, configuration) are bridged into it
//! with `From` impls or explicit constructors.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (file not found, file does not parse)
//! - `4`: Apply errors (failed to apply fixes)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::patch::PatchError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed configuration).
    InvalidArguments = 2,
    /// Resolution errors (file not found, unparseable source).
    ResolutionError = 3,
    /// Apply errors (failed to write fixes).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Configuration file could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Source file failed to parse.
    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// Source file could not be listed or read as UTF-8.
    #[error("cannot read {file}: {message}")]
    Read { file: String, message: String },

    /// Failed to apply fixes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl From<&GuardError> for OutputErrorCode {
    fn from(err: &GuardError) -> Self {
        match err {
            GuardError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            GuardError::Config { .. } => OutputErrorCode::InvalidArguments,
            GuardError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            GuardError::Parse { .. } => OutputErrorCode::ResolutionError,
            GuardError::Read { .. } => OutputErrorCode::ResolutionError,
            GuardError::ApplyError { .. } => OutputErrorCode::ApplyError,
            GuardError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<GuardError> for OutputErrorCode {
    fn from(err: GuardError) -> Self {
        OutputErrorCode::from(&err)
    }
}

impl From<PatchError> for GuardError {
    fn from(err: PatchError) -> Self {
        GuardError::ApplyError {
            message: err.to_string(),
            file: None,
        }
    }
}

impl From<std::io::Error> for GuardError {
    fn from(err: std::io::Error) -> Self {
        GuardError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl GuardError {
    /// Create an invalid-arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        GuardError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file-not-found error.
    pub fn file_not_found(path: &Path) -> Self {
        GuardError::FileNotFound {
            path: path.display().to_string(),
        }
    }

    /// Create a parse error for a file.
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        GuardError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a read error for a file.
    pub fn read(file: impl Into<String>, message: impl Into<String>) -> Self {
        GuardError::Read {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an apply error attributed to a file.
    pub fn apply(file: impl Into<String>, err: PatchError) -> Self {
        GuardError::ApplyError {
            message: err.to_string(),
            file: Some(file.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        GuardError::InternalError {
            message: message.into(),
        }
    }
}
