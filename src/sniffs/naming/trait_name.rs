//! Traits must carry the `Trait` suffix.

use super::super::{Diagnostic, Sniff, SniffContext};
use crate::resolve::{DeclKind, Declaration};

const REQUIRED_SUFFIX: &str = "Trait";

/// Requires trait short names to end with `Trait`.
pub struct TraitNameSniff;

impl Sniff for TraitNameSniff {
    fn name(&self) -> &'static str {
        "naming.trait_name"
    }

    fn applies(&self, declaration: &Declaration) -> bool {
        declaration.kind == DeclKind::Trait
    }

    fn check(&self, declaration: &Declaration, _ctx: &SniffContext<'_>) -> Option<Diagnostic> {
        if declaration.name.ends_with(REQUIRED_SUFFIX) {
            return None;
        }
        Some(Diagnostic::new(
            declaration.line,
            format!("Trait should have suffix \"{REQUIRED_SUFFIX}\"."),
        ))
    }
}
