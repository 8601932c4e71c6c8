//! Call-style fixers — token-stream rewrites.
//!
//! Fixers rewrite a file's token stream in place and are idempotent: a
//! second pass over already-fixed output is a no-op. A call site whose
//! static shape is uncertain (spread arguments, named arguments,
//! unbalanced grouping) is skipped entirely; partial rewrites are never
//! produced, since they could change program behavior.

mod arg_separator;

pub use arg_separator::{CallTarget, SpecifyArgSeparatorFixer};

use crate::token::TokenStream;

/// A single token-stream rewrite rule.
pub trait Fixer: Send + Sync {
    /// Stable rule name, for host reporting.
    fn name(&self) -> &'static str;

    /// Rewrite the stream in place. Returns whether anything changed.
    fn fix(&self, tokens: &mut TokenStream) -> bool;
}
