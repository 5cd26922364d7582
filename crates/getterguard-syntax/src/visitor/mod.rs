// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only traversal of syntax trees.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order
//!
//! ```ignore
//! use getterguard_syntax::visitor::{walk_source_file, Visitor, VisitResult};
//! use getterguard_syntax::SelectorExpr;
//!
//! struct SelectorCounter {
//!     count: usize,
//! }
//!
//! impl<'a> Visitor<'a> for SelectorCounter {
//!     fn visit_selector_expr(&mut self, _node: &'a SelectorExpr) -> VisitResult {
//!         self.count += 1;
//!         VisitResult::Continue
//!     }
//! }
//! ```

mod dispatch;
mod traits;

pub use dispatch::*;
pub use traits::{VisitResult, Visitor};
