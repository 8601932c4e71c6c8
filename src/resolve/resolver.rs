//! Query-time name resolution over a file's symbol table.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::table::{DeclKind, FileSymbolTable};
use crate::base::FileId;
use crate::token::TokenStream;

/// The namespace separator of the analyzed language.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Strip only leading occurrences of `ch` from `s`.
///
/// Occurrences inside or at the end of the string are preserved, so
/// `\Fully\Qualified` becomes `Fully\Qualified` with its internal
/// separators intact.
pub fn trim_leading(s: &str, ch: char) -> &str {
    s.trim_start_matches(ch)
}

/// Resolves class-like name tokens to fully-qualified names.
///
/// One resolver serves one file. Results are memoized by
/// `(file, token index)`; a second resolution of the same position returns
/// the cached value without rescanning the stream. Resolution never fails:
/// a name with no import entry degrades to `namespace \ name`.
#[derive(Debug)]
pub struct Resolver<'a> {
    table: &'a FileSymbolTable,
    cache: RwLock<FxHashMap<(FileId, usize), Arc<str>>>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a file's symbol table.
    pub fn new(table: &'a FileSymbolTable) -> Self {
        Self {
            table,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Resolve the name run containing the token at `index`.
    ///
    /// `index` must designate a name-bearing token: a declaration name or
    /// a name in an `extends`/`implements` clause. The run may span
    /// several segment tokens and may carry leading separators.
    pub fn resolve(&self, tokens: &TokenStream, index: usize) -> Arc<str> {
        let key = (tokens.file(), index);

        // Fast path: already resolved (read lock)
        {
            let cache = self.cache.read();
            if let Some(resolved) = cache.get(&key) {
                return Arc::clone(resolved);
            }
        }

        let resolved = self.resolve_uncached(tokens, index);

        let mut cache = self.cache.write();
        Arc::clone(cache.entry(key).or_insert(resolved))
    }

    fn resolve_uncached(&self, tokens: &TokenStream, index: usize) -> Arc<str> {
        let (start, raw) = name_run(tokens, index);
        tracing::trace!(file = %tokens.file(), index, name = %raw, "resolving name");

        // A leading separator marks an already-fully-qualified reference.
        if raw.starts_with(NAMESPACE_SEPARATOR) {
            return Arc::from(trim_leading(&raw, NAMESPACE_SEPARATOR));
        }

        let mut segments = raw.split(NAMESPACE_SEPARATOR);
        let head = segments.next().unwrap_or(raw.as_str());

        if let Some(import) = self.table.imports().lookup(head) {
            let rest: Vec<&str> = segments.collect();
            if rest.is_empty() {
                return Arc::from(import.target.as_str());
            }
            // Sub-namespace reference under an imported name.
            let mut full = import.target.to_string();
            for segment in rest {
                full.push(NAMESPACE_SEPARATOR);
                full.push_str(segment);
            }
            return Arc::from(full);
        }

        if let Some(declaration) = self.table.declaration_at(start) {
            // Interface declarations resolve to their bare short name even
            // under a declared namespace; the interface naming sniff
            // depends on this.
            if declaration.kind == DeclKind::Interface {
                return Arc::from(declaration.name.as_str());
            }
            return self.qualify(&declaration.name);
        }

        // Not imported and not a self-declaration: relative to the
        // current namespace.
        self.qualify(&raw)
    }

    fn qualify(&self, name: &str) -> Arc<str> {
        match self.table.namespace() {
            Some(namespace) if !namespace.is_empty() => {
                Arc::from(format!("{namespace}{NAMESPACE_SEPARATOR}{name}"))
            }
            _ => Arc::from(name),
        }
    }
}

/// Locate the contiguous name run containing `index`.
///
/// Scans backward to the start of the run (so an index on any segment sees
/// a leading separator), then forward to its end. Returns the run's start
/// index and concatenated text.
fn name_run(tokens: &TokenStream, index: usize) -> (usize, String) {
    let mut start = index;
    while start > 0
        && tokens
            .get(start - 1)
            .is_some_and(|t| t.kind.is_name_part())
    {
        start -= 1;
    }

    let mut end = index;
    while tokens.get(end).is_some_and(|t| t.kind.is_name_part()) {
        end += 1;
    }

    let text = (start..end).map(|i| tokens[i].text.as_str()).collect();
    (start, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::lexer::tokenize;
    use crate::token::TokenKind;

    fn lex(source: &str) -> TokenStream {
        tokenize(FileId::new(0), source).expect("source should tokenize")
    }

    /// Index of the nth identifier token with the given text.
    fn position_of(tokens: &TokenStream, text: &str, occurrence: usize) -> usize {
        let mut seen = 0;
        for (i, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Identifier && token.text == text {
                seen += 1;
                if seen == occurrence {
                    return i;
                }
            }
        }
        panic!("token {text:?} (occurrence {occurrence}) not found");
    }

    fn resolve_at(source: &str, text: &str, occurrence: usize) -> String {
        let tokens = lex(source);
        let table = FileSymbolTable::build(&tokens);
        let resolver = Resolver::new(&table);
        let position = position_of(&tokens, text, occurrence);
        resolver.resolve(&tokens, position).to_string()
    }

    #[test]
    fn test_trim_leading_strips_only_leading_separators() {
        assert_eq!(trim_leading("\\Foo\\Bar\\Baz", '\\'), "Foo\\Bar\\Baz");
        assert_eq!(trim_leading("\\\\\\Foo\\Bar", '\\'), "Foo\\Bar");
        assert_eq!(trim_leading("Foo\\Bar\\", '\\'), "Foo\\Bar\\");
        assert_eq!(trim_leading("Foo\\Bar", '\\'), "Foo\\Bar");
        assert_eq!(trim_leading("", '\\'), "");
        assert_eq!(trim_leading("\\\\\\", '\\'), "");
    }

    #[test]
    fn test_self_declaration_resolves_under_namespace() {
        let resolved = resolve_at(
            "<?php\nnamespace App\\Service;\n\nclass UserService\n{\n}\n",
            "UserService",
            1,
        );
        assert_eq!(resolved, "App\\Service\\UserService");
    }

    #[test]
    fn test_self_declaration_without_namespace() {
        let resolved = resolve_at("<?php\n\nclass SimpleClass\n{\n}\n", "SimpleClass", 1);
        assert_eq!(resolved, "SimpleClass");
    }

    #[test]
    fn test_interface_declaration_resolves_to_bare_name() {
        let resolved = resolve_at(
            "<?php\nnamespace App\\Service;\n\ninterface UserServiceInterface\n{\n}\n",
            "UserServiceInterface",
            1,
        );
        assert_eq!(resolved, "UserServiceInterface");
    }

    #[test]
    fn test_imported_reference_resolves_to_import_target() {
        let source = "<?php\nnamespace App\\Service;\n\nuse App\\Repository\\UserRepository;\n\nclass UserService extends UserRepository\n{\n}\n";
        assert_eq!(
            resolve_at(source, "UserRepository", 2),
            "App\\Repository\\UserRepository"
        );
    }

    #[test]
    fn test_aliased_import_resolves_to_pre_alias_target() {
        let source = "<?php\nnamespace App\\Service;\n\nuse App\\Repository\\UserRepository as UserRepo;\n\nclass UserService extends UserRepo\n{\n}\n";
        assert_eq!(
            resolve_at(source, "UserRepo", 2),
            "App\\Repository\\UserRepository"
        );
    }

    #[test]
    fn test_leading_separator_reference_is_returned_verbatim() {
        let source = "<?php\nnamespace App\\Service;\n\nclass UserService extends \\Fully\\Qualified\\BaseService\n{\n}\n";
        assert_eq!(
            resolve_at(source, "Fully", 1),
            "Fully\\Qualified\\BaseService"
        );
    }

    #[test]
    fn test_unimported_reference_resolves_relative_to_namespace() {
        let source = "<?php\nnamespace App\\Service;\n\nclass UserService extends SomeClass\n{\n}\n";
        assert_eq!(resolve_at(source, "SomeClass", 1), "App\\Service\\SomeClass");
    }

    #[test]
    fn test_sub_namespace_under_imported_name() {
        let source = "<?php\nnamespace App;\n\nuse Vendor\\Pkg;\n\nclass Thing extends Pkg\\Base\n{\n}\n";
        assert_eq!(resolve_at(source, "Pkg", 2), "Vendor\\Pkg\\Base");
    }

    #[test]
    fn test_resolution_is_cached_per_position() {
        let source = "<?php\nnamespace App\\Service;\n\nuse App\\Repository\\UserRepository;\n\nclass UserService extends UserRepository\n{\n}\n";
        let tokens = lex(source);
        let table = FileSymbolTable::build(&tokens);
        let resolver = Resolver::new(&table);
        let position = position_of(&tokens, "UserRepository", 2);

        let first = resolver.resolve(&tokens, position);
        let second = resolver.resolve(&tokens, position);

        assert_eq!(first, second);
        // Same allocation: the second call hit the cache.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_consecutive_declarations_resolve_independently() {
        let source =
            "<?php\nnamespace App\\Service;\n\nclass FirstClass\n{\n}\n\nclass SecondClass\n{\n}\n";
        assert_eq!(resolve_at(source, "FirstClass", 1), "App\\Service\\FirstClass");
        assert_eq!(
            resolve_at(source, "SecondClass", 1),
            "App\\Service\\SecondClass"
        );
    }
}
