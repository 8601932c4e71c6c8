//! Per-file symbol table — namespace, imports, and type declarations.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::resolver::{NAMESPACE_SEPARATOR, trim_leading};
use crate::token::{TokenKind, TokenStream};

/// A single `use` import entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    /// Fully-qualified import target, without leading separator.
    pub target: SmolStr,
    /// Alias given with `use Target as Alias`, if any.
    pub alias: Option<SmolStr>,
}

/// Per-file mapping from imported short name to fully-qualified target.
///
/// Short names are looked up case-insensitively, matching how the host
/// language treats class names. When a short name is declared twice the
/// last declaration wins; detecting the redeclaration itself is the host's
/// concern.
#[derive(Clone, Debug, Default)]
pub struct ImportTable {
    /// Lowercased short name → import entry.
    entries: IndexMap<SmolStr, Import>,
}

impl ImportTable {
    fn insert(&mut self, short: &str, import: Import) {
        self.entries.insert(SmolStr::new(short.to_lowercase()), import);
    }

    /// Look up a short name, case-insensitively.
    pub fn lookup(&self, short: &str) -> Option<&Import> {
        self.entries.get(short.to_lowercase().as_str())
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Import)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of imported names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no imports were declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The kind of a type declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    Trait,
}

/// Which clause a parent reference appeared in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParentClause {
    Extends,
    Implements,
}

/// A parent type named in a declaration header.
///
/// `name_token` is the index of the first token of the (possibly qualified)
/// parent name; resolution reads the full run from there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentRef {
    pub clause: ParentClause,
    pub name_token: usize,
}

/// One class, interface, or trait definition site within a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Short name, without namespace prefix.
    pub name: SmolStr,
    /// Index of the declaration-name token.
    pub name_token: usize,
    /// 1-indexed line of the declaration keyword; diagnostics address it.
    pub line: u32,
    pub is_abstract: bool,
    /// Parent references in declaration order: extends first, then
    /// implements in source order.
    pub parents: Vec<ParentRef>,
}

/// Immutable namespace/import/declaration snapshot of one file.
///
/// Built once per file by [`FileSymbolTable::build`]; never mutated
/// afterwards, so it can be shared freely between resolution and
/// verification. Files never share tables, which keeps cross-file
/// parallelism coordination-free.
#[derive(Clone, Debug, Default)]
pub struct FileSymbolTable {
    namespace: Option<SmolStr>,
    imports: ImportTable,
    declarations: Vec<Declaration>,
}

impl FileSymbolTable {
    /// Scan a token stream into a symbol table.
    ///
    /// Unterminated constructs extend to end of stream; the scan itself
    /// never fails.
    pub fn build(tokens: &TokenStream) -> Self {
        let namespace = scan_namespace(tokens);
        let imports = scan_imports(tokens);
        let declarations = scan_declarations(tokens);

        tracing::debug!(
            file = %tokens.file(),
            namespace = namespace.as_deref().unwrap_or(""),
            imports = imports.len(),
            declarations = declarations.len(),
            "built file symbol table"
        );

        Self {
            namespace,
            imports,
            declarations,
        }
    }

    /// The file's declared namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The file's import table.
    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    /// All type declarations, in source order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// The declaration whose name token sits at `name_token`, if any.
    pub fn declaration_at(&self, name_token: usize) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name_token == name_token)
    }
}

/// Read a contiguous qualified-name run starting at `start`.
///
/// Returns the concatenated text and the index just past the run, or `None`
/// when the run contains no identifier segment.
fn read_name(tokens: &TokenStream, start: usize) -> Option<(String, usize)> {
    let mut end = start;
    let mut any_ident = false;
    while let Some(token) = tokens.get(end) {
        if !token.kind.is_name_part() {
            break;
        }
        any_ident |= token.kind == TokenKind::Identifier;
        end += 1;
    }
    if !any_ident {
        return None;
    }
    let text = (start..end).map(|i| tokens[i].text.as_str()).collect();
    Some((text, end))
}

/// Index just past the terminating semicolon, or end of stream.
fn skip_to_semicolon(tokens: &TokenStream, from: usize) -> usize {
    let mut i = from;
    while let Some(token) = tokens.get(i) {
        if token.kind == TokenKind::Semicolon {
            return i + 1;
        }
        i += 1;
    }
    tokens.len()
}

/// Capture the first namespace declaration's dotted path.
fn scan_namespace(tokens: &TokenStream) -> Option<SmolStr> {
    let mut i = 0;
    while let Some(idx) = tokens.next_significant(i) {
        if tokens[idx].kind == TokenKind::Namespace {
            // `namespace Foo\Bar;` — the `namespace\Foo` relative-reference
            // form has a separator next instead and is not a declaration.
            if let Some(name_idx) = tokens.next_significant(idx + 1) {
                if tokens[name_idx].kind == TokenKind::Identifier {
                    if let Some((name, _)) = read_name(tokens, name_idx) {
                        return Some(SmolStr::new(name));
                    }
                }
            }
        }
        i = idx + 1;
    }
    None
}

/// Collect every top-level `use` import statement.
fn scan_imports(tokens: &TokenStream) -> ImportTable {
    let mut table = ImportTable::default();
    let mut depth: u32 = 0;
    let mut i = 0;
    while let Some(token) = tokens.get(i) {
        match token.kind {
            TokenKind::OpenBrace => {
                depth += 1;
                i += 1;
            }
            TokenKind::CloseBrace => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            TokenKind::Use if depth == 0 => {
                i = parse_use(tokens, i, &mut table);
            }
            _ => i += 1,
        }
    }
    table
}

/// Parse one `use` statement, registering its class imports.
///
/// Returns the index to resume scanning from. Closure captures, group-use
/// braces, and `use function` / `use const` forms register nothing.
fn parse_use(tokens: &TokenStream, use_idx: usize, table: &mut ImportTable) -> usize {
    let Some(mut i) = tokens.next_significant(use_idx + 1) else {
        return tokens.len();
    };

    match tokens[i].kind {
        // `function (...) use ($x)` — a closure capture, not an import
        TokenKind::OpenParen => return use_idx + 1,
        TokenKind::Function | TokenKind::Const => return skip_to_semicolon(tokens, i),
        _ => {}
    }

    loop {
        let Some(start) = tokens.next_significant(i) else {
            return tokens.len();
        };
        let Some((raw, next)) = read_name(tokens, start) else {
            return skip_to_semicolon(tokens, start);
        };
        i = next;

        let mut alias = None;
        if let Some(after) = tokens.next_significant(i) {
            match tokens[after].kind {
                // group-use; its members are not plain class imports
                TokenKind::OpenBrace => return skip_to_semicolon(tokens, after),
                TokenKind::As => {
                    if let Some(alias_idx) = tokens.next_significant(after + 1) {
                        if tokens[alias_idx].kind == TokenKind::Identifier {
                            alias = Some(tokens[alias_idx].text.clone());
                            i = alias_idx + 1;
                        }
                    }
                }
                _ => {}
            }
        }

        let target = trim_leading(&raw, NAMESPACE_SEPARATOR);
        if !target.is_empty() {
            let short = alias
                .as_deref()
                .or_else(|| target.rsplit(NAMESPACE_SEPARATOR).next())
                .unwrap_or(target)
                .to_owned();
            table.insert(
                &short,
                Import {
                    target: SmolStr::new(target),
                    alias,
                },
            );
        }

        match tokens.next_significant(i) {
            Some(idx) if tokens[idx].kind == TokenKind::Comma => {
                i = idx + 1;
            }
            Some(idx) if tokens[idx].kind == TokenKind::Semicolon => return idx + 1,
            Some(idx) => return idx + 1,
            None => return tokens.len(),
        }
    }
}

/// Collect every class/interface/trait declaration, top to bottom.
fn scan_declarations(tokens: &TokenStream) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut i = 0;
    while let Some(token) = tokens.get(i) {
        let kind = match token.kind {
            TokenKind::Class => DeclKind::Class,
            TokenKind::Interface => DeclKind::Interface,
            TokenKind::Trait => DeclKind::Trait,
            _ => {
                i += 1;
                continue;
            }
        };

        // `Foo::class` constants and anonymous `new class` expressions
        // are not declarations.
        if let Some(prev) = tokens.prev_significant(i) {
            if matches!(tokens[prev].kind, TokenKind::DoubleColon | TokenKind::New) {
                i += 1;
                continue;
            }
        }

        let Some(name_idx) = tokens.next_significant(i + 1) else {
            break;
        };
        if tokens[name_idx].kind != TokenKind::Identifier {
            i += 1;
            continue;
        }

        let is_abstract = kind == DeclKind::Class && has_abstract_modifier(tokens, i);
        let (parents, resume) = scan_parents(tokens, name_idx + 1);

        declarations.push(Declaration {
            kind,
            name: tokens[name_idx].text.clone(),
            name_token: name_idx,
            line: token.line,
            is_abstract,
            parents,
        });
        i = resume;
    }
    declarations
}

/// Whether the declaration keyword at `decl_idx` carries `abstract`.
fn has_abstract_modifier(tokens: &TokenStream, decl_idx: usize) -> bool {
    let mut i = decl_idx;
    while let Some(prev) = tokens.prev_significant(i) {
        match tokens[prev].kind {
            TokenKind::Abstract => return true,
            TokenKind::Final | TokenKind::Readonly => i = prev,
            _ => break,
        }
    }
    false
}

/// Scan the extends/implements clauses of a declaration header.
///
/// Returns the parent references plus the index to resume at (just past
/// the header). A class has at most one `extends` name; interfaces may
/// extend several, and both are handled by the same comma loop.
fn scan_parents(tokens: &TokenStream, from: usize) -> (Vec<ParentRef>, usize) {
    let mut parents = Vec::new();
    let mut clause = None;
    let mut i = from;
    while let Some(idx) = tokens.next_significant(i) {
        match tokens[idx].kind {
            TokenKind::Extends => {
                clause = Some(ParentClause::Extends);
                i = idx + 1;
            }
            TokenKind::Implements => {
                clause = Some(ParentClause::Implements);
                i = idx + 1;
            }
            TokenKind::Comma => i = idx + 1,
            TokenKind::Identifier | TokenKind::NsSeparator => {
                if let Some(clause) = clause {
                    parents.push(ParentRef {
                        clause,
                        name_token: idx,
                    });
                }
                let mut end = idx;
                while tokens.get(end).is_some_and(|t| t.kind.is_name_part()) {
                    end += 1;
                }
                i = end;
            }
            _ => return (parents, idx + 1),
        }
    }
    (parents, tokens.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::lexer::tokenize;

    fn table_for(source: &str) -> FileSymbolTable {
        let tokens = tokenize(FileId::new(0), source).expect("source should tokenize");
        FileSymbolTable::build(&tokens)
    }

    #[test]
    fn test_namespace_capture() {
        let table = table_for("<?php\nnamespace Very\\Deep\\Nested\\Structure;\n");
        assert_eq!(table.namespace(), Some("Very\\Deep\\Nested\\Structure"));
    }

    #[test]
    fn test_no_namespace() {
        let table = table_for("<?php class Foo {}");
        assert_eq!(table.namespace(), None);
    }

    #[test]
    fn test_import_short_name_and_alias() {
        let table = table_for(
            "<?php\nnamespace App;\nuse App\\Repository\\UserRepository;\nuse App\\Contract\\ServiceInterface as Contract;\n",
        );

        let plain = table.imports().lookup("UserRepository").expect("plain import");
        assert_eq!(plain.target.as_str(), "App\\Repository\\UserRepository");
        assert_eq!(plain.alias, None);

        let aliased = table.imports().lookup("Contract").expect("aliased import");
        assert_eq!(aliased.target.as_str(), "App\\Contract\\ServiceInterface");
        assert_eq!(aliased.alias.as_deref(), Some("Contract"));

        // the pre-alias short name is not importable
        assert!(table.imports().lookup("ServiceInterface").is_none());
    }

    #[test]
    fn test_import_lookup_is_case_insensitive() {
        let table = table_for("<?php use App\\Service\\Mailer;\n");
        assert!(table.imports().lookup("mailer").is_some());
        assert!(table.imports().lookup("MAILER").is_some());
    }

    #[test]
    fn test_last_import_wins_for_duplicate_short_name() {
        let table = table_for("<?php\nuse First\\Mailer;\nuse Second\\Mailer;\n");
        let import = table.imports().lookup("Mailer").expect("import");
        assert_eq!(import.target.as_str(), "Second\\Mailer");
        assert_eq!(table.imports().len(), 1);
    }

    #[test]
    fn test_comma_separated_imports() {
        let table = table_for("<?php use App\\A, App\\B;\n");
        assert!(table.imports().lookup("A").is_some());
        assert!(table.imports().lookup("B").is_some());
    }

    #[test]
    fn test_function_and_const_imports_are_skipped() {
        let table = table_for("<?php\nuse function App\\helper;\nuse const App\\LIMIT;\n");
        assert!(table.imports().is_empty());
    }

    #[test]
    fn test_trait_use_inside_class_body_is_not_an_import() {
        let table = table_for("<?php\nclass Foo\n{\n    use SomeTrait;\n}\n");
        assert!(table.imports().is_empty());
    }

    #[test]
    fn test_closure_capture_is_not_an_import() {
        let table = table_for("<?php $f = function () use ($x) { return $x; };");
        assert!(table.imports().is_empty());
    }

    #[test]
    fn test_declaration_kinds_and_modifiers() {
        let table = table_for(
            "<?php\nnamespace App;\n\nabstract class Base {}\nfinal class Leaf {}\ninterface Contract {}\ntrait Helper {}\n",
        );
        let declarations = table.declarations();
        assert_eq!(declarations.len(), 4);

        assert_eq!(declarations[0].kind, DeclKind::Class);
        assert_eq!(declarations[0].name.as_str(), "Base");
        assert!(declarations[0].is_abstract);
        assert_eq!(declarations[0].line, 4);

        assert_eq!(declarations[1].kind, DeclKind::Class);
        assert!(!declarations[1].is_abstract);

        assert_eq!(declarations[2].kind, DeclKind::Interface);
        assert_eq!(declarations[3].kind, DeclKind::Trait);
    }

    #[test]
    fn test_parents_keep_declaration_order() {
        let table = table_for(
            "<?php class Foo extends Base implements First, Second {}",
        );
        let decl = &table.declarations()[0];
        assert_eq!(decl.parents.len(), 3);
        assert_eq!(decl.parents[0].clause, ParentClause::Extends);
        assert_eq!(decl.parents[1].clause, ParentClause::Implements);
        assert_eq!(decl.parents[2].clause, ParentClause::Implements);
    }

    #[test]
    fn test_class_constant_and_anonymous_class_are_not_declarations() {
        let table = table_for(
            "<?php\nclass Real {}\n$a = Real::class;\n$b = new class { };\n",
        );
        assert_eq!(table.declarations().len(), 1);
        assert_eq!(table.declarations()[0].name.as_str(), "Real");
    }

    #[test]
    fn test_unterminated_use_extends_to_end_of_stream() {
        let table = table_for("<?php use App\\Broken\\Import");
        let import = table.imports().lookup("Import").expect("import");
        assert_eq!(import.target.as_str(), "App\\Broken\\Import");
    }
}
