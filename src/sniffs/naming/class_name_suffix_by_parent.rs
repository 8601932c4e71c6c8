//! Class names must echo the parent they extend or implement.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::super::{Diagnostic, Sniff, SniffContext};
use crate::resolve::{DeclKind, Declaration, NAMESPACE_SEPARATOR};

/// Parent names whose children must carry a matching suffix.
///
/// The required suffix is derived from each name: an `Abstract` prefix and
/// an `Interface` suffix are dropped, so `AbstractController` and
/// `FixerInterface` require the suffixes `Controller` and `Fixer`.
const DEFAULT_PARENTS: &[&str] = &[
    "Command",
    "Controller",
    "EventSubscriber",
    "Exception",
    "FixerInterface",
    "Handler",
    "Presenter",
    "Repository",
    "Request",
    "Response",
    "Sniff",
];

/// Mapping from parent class/interface name to the suffix its children
/// must carry.
///
/// Keys may be short or fully-qualified names. The configuration is a
/// value: overriding the defaults means constructing a new map, never
/// mutating one already handed to a sniff.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuffixByParentConfig {
    map: IndexMap<SmolStr, SmolStr>,
}

impl SuffixByParentConfig {
    /// Build a config from parent names, deriving each suffix.
    pub fn from_parents<'a>(parents: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = IndexMap::new();
        for parent in parents {
            map.insert(SmolStr::new(parent), SmolStr::new(derive_suffix(parent)));
        }
        Self { map }
    }

    /// Build a config from explicit parent → suffix pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut map = IndexMap::new();
        for (parent, suffix) in pairs {
            map.insert(SmolStr::new(parent), SmolStr::new(suffix));
        }
        Self { map }
    }

    /// The suffix required by the first configured parent matching
    /// `resolved`, if any.
    ///
    /// A parent key matches by fully-qualified equality; keys ending in
    /// `Interface` also match by the resolved name's tail segment.
    pub fn matched_suffix(&self, resolved: &str) -> Option<&str> {
        let tail = resolved
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(resolved);
        for (parent, suffix) in &self.map {
            if resolved == parent.as_str() {
                return Some(suffix.as_str());
            }
            if parent.ends_with("Interface") && tail == parent.as_str() {
                return Some(suffix.as_str());
            }
        }
        None
    }

    /// Number of configured parents.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if no parents are configured.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for SuffixByParentConfig {
    fn default() -> Self {
        Self::from_parents(DEFAULT_PARENTS.iter().copied())
    }
}

fn derive_suffix(parent: &str) -> &str {
    let trimmed = parent.strip_prefix("Abstract").unwrap_or(parent);
    let trimmed = trimmed.strip_suffix("Interface").unwrap_or(trimmed);
    if trimmed.is_empty() { parent } else { trimmed }
}

/// Requires class short names to end with the suffix mapped from their
/// parent class or interface.
///
/// Parents are resolved to fully-qualified names before matching. The
/// first matching parent in declaration order (extends before implements)
/// decides; a class matching no configured parent is not checked.
pub struct ClassNameSuffixByParentSniff {
    config: SuffixByParentConfig,
}

impl ClassNameSuffixByParentSniff {
    /// Create the sniff with the given parent → suffix configuration.
    pub fn new(config: SuffixByParentConfig) -> Self {
        Self { config }
    }
}

impl Sniff for ClassNameSuffixByParentSniff {
    fn name(&self) -> &'static str {
        "naming.class_name_suffix_by_parent"
    }

    fn applies(&self, declaration: &Declaration) -> bool {
        declaration.kind == DeclKind::Class && !declaration.parents.is_empty()
    }

    fn check(&self, declaration: &Declaration, ctx: &SniffContext<'_>) -> Option<Diagnostic> {
        for parent in &declaration.parents {
            let resolved = ctx.resolver.resolve(ctx.tokens, parent.name_token);
            let Some(suffix) = self.config.matched_suffix(&resolved) else {
                continue;
            };
            // First matching parent decides, violation or not.
            if declaration.name.ends_with(suffix) {
                return None;
            }
            return Some(Diagnostic::new(
                declaration.line,
                format!(
                    "Class \"{}\" should have suffix \"{}\" by parent class/interface",
                    declaration.name, suffix
                ),
            ));
        }
        None
    }
}
