//! Abstract classes must carry the `Abstract` prefix.

use super::super::{Diagnostic, Sniff, SniffContext};
use crate::resolve::{DeclKind, Declaration};

const REQUIRED_PREFIX: &str = "Abstract";

/// Requires `abstract class` short names to start with `Abstract`.
///
/// Non-abstract classes, interfaces, and traits are not checked.
pub struct AbstractClassNameSniff;

impl Sniff for AbstractClassNameSniff {
    fn name(&self) -> &'static str {
        "naming.abstract_class_name"
    }

    fn applies(&self, declaration: &Declaration) -> bool {
        declaration.kind == DeclKind::Class && declaration.is_abstract
    }

    fn check(&self, declaration: &Declaration, _ctx: &SniffContext<'_>) -> Option<Diagnostic> {
        if declaration.name.starts_with(REQUIRED_PREFIX) {
            return None;
        }
        Some(Diagnostic::new(
            declaration.line,
            format!("Abstract class should have prefix \"{REQUIRED_PREFIX}\"."),
        ))
    }
}
