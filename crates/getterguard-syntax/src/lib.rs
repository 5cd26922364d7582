// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax layer for getterguard.
//!
//! Parses Go source into a span-carrying tree, walks it with a [`Visitor`],
//! and prints expressions back to source text with optional selector
//! rewrites. Syntax errors after the package clause are recovered from and
//! listed in [`SourceFile::errors`].
//!
//! ```ignore
//! use getterguard_syntax::parse_file;
//!
//! let file = parse_file("user.go", "package svc\nfunc f(m *pb.User) { _ = m.Name }\n")?;
//! assert_eq!(file.package.name, "svc");
//! ```

pub mod codegen;
pub mod nodes;
pub mod parser;
pub mod tokenizer;
pub mod visitor;

pub use codegen::{print_expr, print_expr_with, CodegenError, RewriteHook, SelectorRewrite};
pub use codegen::{Printer, SelectorRole};
pub use nodes::*;
pub use parser::{parse_file, parse_file_with_ids, parse_files, ParseError};
pub use visitor::{walk_expr, walk_source_file, walk_stmt, VisitResult, Visitor};
