//! getterguard: flags direct field reads on generated message types and
//! rewrites them to accessor calls.
//!
//! ```text
//! name := msg.Name              // reported
//! name := msg.GetName()         // suggested
//! ```
//!
//! Accessors on generated messages are nil-safe; direct field reads are
//! not. The rule walks Go sources parsed by `getterguard-syntax`, asks the
//! [`TypeTable`] what each selector's base is, and reports reads of fields
//! that have an accessor, either as [`Diagnostic`]s carrying a suggested
//! fix or as [`Issue`]s with a single-line inline fix.

// Core infrastructure, re-exported from getterguard-core
pub use getterguard_core::error;
pub use getterguard_core::output;
pub use getterguard_core::patch;
pub use getterguard_core::text;

// The rule
pub mod analyzer;
pub mod classify;
pub mod filter;
pub mod finding;
pub mod oracle;
pub mod report;

// Collaborators and front door
pub mod cli;
pub mod config;
pub mod types;

pub use analyzer::{Analyzer, Mode};
pub use config::{Config, GuardConfig};
pub use finding::Finding;
pub use oracle::TypeInfo;
pub use report::{Diagnostic, DiagnosticSink, Issue};
pub use types::TypeTable;
