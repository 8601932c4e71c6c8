//! Naming sniffs over resolved declarations.
//!
//! Each sniff is an independent, stateless rule: a predicate saying which
//! declarations it applies to, and an evaluator producing at most one
//! diagnostic per declaration. Sniffs are held in an explicit registry
//! owned by the [`Verifier`] and invoked directly; there is no discovery
//! mechanism. Rule configuration is passed at construction and never
//! mutated afterwards.

mod diagnostic;
pub mod naming;

pub use diagnostic::{Diagnostic, DiagnosticCollector, to_line_map};
pub use naming::{
    AbstractClassNameSniff, ClassNameSuffixByParentSniff, InterfaceNameSniff,
    SuffixByParentConfig, TraitNameSniff,
};

use crate::resolve::{Declaration, FileSymbolTable, Resolver};
use crate::token::TokenStream;

/// Everything a sniff may consult while evaluating one declaration.
pub struct SniffContext<'a> {
    pub tokens: &'a TokenStream,
    pub table: &'a FileSymbolTable,
    pub resolver: &'a Resolver<'a>,
}

/// A single naming rule.
///
/// Implementations must be pure functions of the declaration, the resolved
/// names reachable through the context, and their own configuration; they
/// never fail for well-formed declarations.
pub trait Sniff: Send + Sync {
    /// Stable rule name, for host reporting.
    fn name(&self) -> &'static str;

    /// Whether this sniff has anything to say about the declaration.
    fn applies(&self, declaration: &Declaration) -> bool;

    /// Evaluate one declaration, producing at most one diagnostic.
    fn check(&self, declaration: &Declaration, ctx: &SniffContext<'_>) -> Option<Diagnostic>;
}

/// Runs a registry of sniffs over one file at a time.
pub struct Verifier {
    sniffs: Vec<Box<dyn Sniff>>,
}

impl Verifier {
    /// Create a verifier with an empty registry.
    pub fn new() -> Self {
        Self { sniffs: Vec::new() }
    }

    /// Create a verifier with the standard naming sniffs registered.
    pub fn with_defaults(config: SuffixByParentConfig) -> Self {
        let mut verifier = Self::new();
        verifier.register(Box::new(AbstractClassNameSniff));
        verifier.register(Box::new(ClassNameSuffixByParentSniff::new(config)));
        verifier.register(Box::new(InterfaceNameSniff));
        verifier.register(Box::new(TraitNameSniff));
        verifier
    }

    /// Register an additional sniff.
    pub fn register(&mut self, sniff: Box<dyn Sniff>) {
        self.sniffs.push(sniff);
    }

    /// Registered sniffs, in registration order.
    pub fn sniffs(&self) -> &[Box<dyn Sniff>] {
        &self.sniffs
    }

    /// Check one file, returning diagnostics ordered by ascending line.
    ///
    /// Builds the file's symbol table and resolver, then evaluates every
    /// registered sniff against every declaration.
    pub fn check(&self, tokens: &TokenStream) -> Vec<Diagnostic> {
        let table = FileSymbolTable::build(tokens);
        let resolver = Resolver::new(&table);
        let ctx = SniffContext {
            tokens,
            table: &table,
            resolver: &resolver,
        };

        let mut collector = DiagnosticCollector::new();
        for declaration in table.declarations() {
            for sniff in &self.sniffs {
                if !sniff.applies(declaration) {
                    continue;
                }
                if let Some(diagnostic) = sniff.check(declaration, &ctx) {
                    tracing::debug!(
                        file = %tokens.file(),
                        sniff = sniff.name(),
                        line = diagnostic.line,
                        "naming violation"
                    );
                    collector.add(diagnostic);
                }
            }
        }
        collector.finish()
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::with_defaults(SuffixByParentConfig::default())
    }
}
