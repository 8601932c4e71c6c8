//! Interfaces must carry the `Interface` suffix.

use super::super::{Diagnostic, Sniff, SniffContext};
use crate::resolve::{DeclKind, Declaration};

const REQUIRED_SUFFIX: &str = "Interface";

/// Requires interface short names to end with `Interface`.
///
/// The declaration name is run through the resolver, which returns the
/// bare short name for interface declarations, so the suffix check sees no
/// namespace prefix.
pub struct InterfaceNameSniff;

impl Sniff for InterfaceNameSniff {
    fn name(&self) -> &'static str {
        "naming.interface_name"
    }

    fn applies(&self, declaration: &Declaration) -> bool {
        declaration.kind == DeclKind::Interface
    }

    fn check(&self, declaration: &Declaration, ctx: &SniffContext<'_>) -> Option<Diagnostic> {
        let resolved = ctx.resolver.resolve(ctx.tokens, declaration.name_token);
        if resolved.ends_with(REQUIRED_SUFFIX) {
            return None;
        }
        Some(Diagnostic::new(
            declaration.line,
            format!("Interface should have suffix \"{REQUIRED_SUFFIX}\"."),
        ))
    }
}
