//! Core infrastructure for getterguard.
//!
//! This crate provides the language-agnostic pieces shared by the syntax
//! crate and the analyzer:
//! - Byte spans and text edits, with conflict-checked edit application
//! - Byte offset to line:column conversion
//! - The unified error type and its exit codes
//! - JSON output envelope types for CLI responses

pub mod error;
pub mod output;
pub mod patch;
pub mod text;

pub use error::{GuardError, OutputErrorCode};
pub use output::Position;
pub use patch::{apply_edits, PatchError, Span, TextEdit};
