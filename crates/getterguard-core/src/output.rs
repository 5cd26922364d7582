//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as its first field
//! 2. **Deterministic:** Same input produces the same output (field order, array ordering)
//! 3. **Nullable vs absent:** Optional fields are omitted when not applicable
//! 4. **Versioned:** Schema version in every response

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, OutputErrorCode};
use crate::text::byte_offset_to_position;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// A position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// File path as given on the command line.
    pub file: String,
    /// Byte offset from file start.
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, UTF-8 bytes).
    pub column: u32,
}

impl Position {
    pub fn new(file: impl Into<String>, offset: usize, line: u32, column: u32) -> Self {
        Position {
            file: file.into(),
            offset,
            line,
            column,
        }
    }

    /// Position of `offset` within `content`.
    pub fn at_offset(file: impl Into<String>, content: &str, offset: usize) -> Self {
        let (line, column) = byte_offset_to_position(content.as_bytes(), offset);
        Position::new(file, offset.min(content.len()), line, column)
    }
}

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a GuardError.
    pub fn from_error(err: &GuardError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let details = match err {
            GuardError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            GuardError::Parse { file, .. } | GuardError::Read { file, .. } => {
                Some(serde_json::json!({ "file": file }))
            }
            GuardError::ApplyError {
                file: Some(file), ..
            } => Some(serde_json::json!({ "file": file })),
            _ => None,
        };
        ErrorInfo {
            code,
            message: err.to_string(),
            details,
        }
    }
}

/// Response emitted when a command fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// What went wrong.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Build an error response for `err`.
    pub fn new(err: &GuardError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Write a response as pretty-printed JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Write a response as single-line JSON followed by a newline.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
