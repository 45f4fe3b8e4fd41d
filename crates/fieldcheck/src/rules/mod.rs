//! Rule predicates used by the evaluator.
//!
//! This module contains both synchronous and asynchronous rules.

mod async_rules;
mod sync_rules;

pub use async_rules::*;
pub use sync_rules::*;
