//! Diagnostics — line-addressed sniff findings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single naming violation.
///
/// The line is 1-indexed and addresses the violating declaration; the
/// message is a fixed, deterministic sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Collects diagnostics during verification.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All diagnostics, ordered by ascending line.
    ///
    /// The sort is stable, so diagnostics on the same line keep their
    /// collection order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.line);
        self.diagnostics
    }
}

/// Render diagnostics as a line → message map, one entry per line.
///
/// This is the shape reporting hosts consume. Later diagnostics on an
/// already-occupied line are dropped.
pub fn to_line_map(diagnostics: &[Diagnostic]) -> std::collections::BTreeMap<u32, String> {
    let mut map = std::collections::BTreeMap::new();
    for diagnostic in diagnostics {
        map.entry(diagnostic.line)
            .or_insert_with(|| diagnostic.message.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_sorts_by_line() {
        let mut collector = DiagnosticCollector::new();
        collector.add(Diagnostic::new(15, "later"));
        collector.add(Diagnostic::new(5, "earlier"));

        let diagnostics = collector.finish();
        assert_eq!(diagnostics[0].line, 5);
        assert_eq!(diagnostics[1].line, 15);
    }

    #[test]
    fn test_line_map_keeps_first_entry_per_line() {
        let diagnostics = vec![
            Diagnostic::new(5, "first"),
            Diagnostic::new(5, "second"),
            Diagnostic::new(7, "third"),
        ];

        let map = to_line_map(&diagnostics);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&5], "first");
        assert_eq!(map[&7], "third");
    }
}
