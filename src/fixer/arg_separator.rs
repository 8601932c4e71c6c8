//! Make the implicit argument separator of known calls explicit.
//!
//! `http_build_query()` takes its argument separator from the
//! `arg_separator.output` ini setting unless the third parameter is given,
//! so omitting it makes the generated query string configuration
//! dependent. The fixer pins the documented default.

use crate::token::{Token, TokenKind, TokenStream};

use super::Fixer;

/// A function known to accept an optional separator-like parameter with an
/// implicit default.
#[derive(Clone, Debug)]
pub struct CallTarget {
    /// Global function name, matched case-insensitively.
    pub function: &'static str,
    /// 1-based position of the separator parameter.
    pub separator_position: usize,
    /// Source text of the documented default separator literal.
    pub separator_literal: &'static str,
    /// Source text used to pad omitted parameters before the separator.
    pub padding_literal: &'static str,
}

/// The built-in registry.
pub const DEFAULT_TARGETS: &[CallTarget] = &[CallTarget {
    function: "http_build_query",
    separator_position: 3,
    separator_literal: "'&'",
    padding_literal: "''",
}];

/// Shape of one parsed argument list.
struct ArgList {
    /// Number of top-level arguments.
    count: usize,
    /// Index of the closing parenthesis.
    close_paren: usize,
    /// Whether a comma directly precedes the closing parenthesis.
    trailing_comma: bool,
}

/// Inserts explicit separator arguments into registry calls that rely on
/// the implicit default.
pub struct SpecifyArgSeparatorFixer {
    targets: Vec<CallTarget>,
}

impl SpecifyArgSeparatorFixer {
    /// Create the fixer with the built-in registry.
    pub fn new() -> Self {
        Self {
            targets: DEFAULT_TARGETS.to_vec(),
        }
    }

    /// Create the fixer with a custom registry.
    pub fn with_targets(targets: Vec<CallTarget>) -> Self {
        Self { targets }
    }

    fn target_for(&self, name: &str) -> Option<&CallTarget> {
        self.targets
            .iter()
            .find(|t| t.function.eq_ignore_ascii_case(name))
    }
}

impl Default for SpecifyArgSeparatorFixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixer for SpecifyArgSeparatorFixer {
    fn name(&self) -> &'static str {
        "fixer.specify_arg_separator"
    }

    fn fix(&self, tokens: &mut TokenStream) -> bool {
        let mut changed = false;
        let mut i = 0;
        while i < tokens.len() {
            let Some(target) = (tokens[i].kind == TokenKind::Identifier)
                .then(|| self.target_for(&tokens[i].text))
                .flatten()
            else {
                i += 1;
                continue;
            };

            if !is_global_call_position(tokens, i) {
                i += 1;
                continue;
            }
            let Some(open_paren) = tokens.next_significant(i + 1) else {
                break;
            };
            if tokens[open_paren].kind != TokenKind::OpenParen {
                i += 1;
                continue;
            }

            let Some(args) = parse_args(tokens, open_paren) else {
                // Uncertain call shape: leave the whole call untouched.
                i += 1;
                continue;
            };

            if args.count == 0 || args.count >= target.separator_position {
                i = args.close_paren + 1;
                continue;
            }

            let line = tokens[args.close_paren].line;
            let mut insert_at = args.close_paren;
            for position in args.count + 1..=target.separator_position {
                let first = position == args.count + 1;
                if !(first && args.trailing_comma) {
                    tokens.insert(insert_at, Token::new(TokenKind::Comma, ",", line));
                    insert_at += 1;
                }
                tokens.insert(insert_at, Token::new(TokenKind::Whitespace, " ", line));
                insert_at += 1;
                let literal = if position == target.separator_position {
                    target.separator_literal
                } else {
                    target.padding_literal
                };
                tokens.insert(
                    insert_at,
                    Token::new(TokenKind::SingleQuotedString, literal, line),
                );
                insert_at += 1;
            }

            tracing::debug!(
                file = %tokens.file(),
                function = target.function,
                line,
                supplied = args.count,
                "inserted explicit argument separator"
            );
            changed = true;
            i = insert_at + 1;
        }
        changed
    }
}

/// Whether the identifier at `index` sits in global-function call
/// position.
///
/// Method calls, static calls, function declarations, and instantiations
/// are rejected. A leading `\` is accepted as long as it is not itself
/// preceded by a name segment (which would make the reference relative).
fn is_global_call_position(tokens: &TokenStream, index: usize) -> bool {
    let Some(prev) = tokens.prev_significant(index) else {
        return true;
    };
    match tokens[prev].kind {
        TokenKind::Arrow
        | TokenKind::NullsafeArrow
        | TokenKind::DoubleColon
        | TokenKind::Function
        | TokenKind::New => false,
        // `\http_build_query` is absolute; `Helpers\http_build_query` is a
        // relative reference to some other function. The two differ only
        // in whether a name segment sits directly against the separator.
        TokenKind::NsSeparator => {
            prev == 0
                || tokens
                    .get(prev - 1)
                    .is_none_or(|t| t.kind != TokenKind::Identifier)
        }
        _ => true,
    }
}

/// Parse the argument list opened at `open_paren`.
///
/// Returns `None` for shapes the fixer must not rewrite: spread arguments,
/// named arguments, a leading comma, or grouping that never closes.
fn parse_args(tokens: &TokenStream, open_paren: usize) -> Option<ArgList> {
    let mut depth = 1usize;
    let mut count = 0;
    let mut in_argument = false;
    let mut trailing_comma = false;
    let mut i = open_paren + 1;

    while let Some(token) = tokens.get(i) {
        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                depth -= 1;
                if depth == 0 {
                    if token.kind != TokenKind::CloseParen {
                        return None;
                    }
                    if in_argument {
                        count += 1;
                    }
                    return Some(ArgList {
                        count,
                        close_paren: i,
                        trailing_comma,
                    });
                }
            }
            TokenKind::Comma if depth == 1 => {
                if !in_argument {
                    return None;
                }
                count += 1;
                in_argument = false;
                trailing_comma = true;
            }
            TokenKind::Ellipsis if depth == 1 => return None,
            TokenKind::Colon if depth == 1 => return None,
            kind if kind.is_trivia() => {}
            _ => {
                in_argument = true;
                trailing_comma = false;
            }
        }
        i += 1;
    }
    // Unbalanced grouping extends to end of stream; nothing safe to rewrite.
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::lexer::tokenize;

    fn fix(source: &str) -> String {
        let mut tokens = tokenize(FileId::new(0), source).expect("source should tokenize");
        SpecifyArgSeparatorFixer::new().fix(&mut tokens);
        tokens.to_source()
    }

    #[test]
    fn test_single_argument_call_gains_padding_and_separator() {
        assert_eq!(
            fix("<?php echo http_build_query($data);"),
            "<?php echo http_build_query($data, '', '&');"
        );
    }

    #[test]
    fn test_two_argument_call_gains_separator_only() {
        assert_eq!(
            fix("<?php echo http_build_query($data, 'pre_');"),
            "<?php echo http_build_query($data, 'pre_', '&');"
        );
    }

    #[test]
    fn test_explicit_call_is_untouched() {
        let source = "<?php echo http_build_query($data, '', '&');";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_other_functions_are_untouched() {
        let source = "<?php echo implode(',', $data);";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_nested_commas_are_not_argument_separators() {
        assert_eq!(
            fix("<?php echo http_build_query(array_merge($a, $b));"),
            "<?php echo http_build_query(array_merge($a, $b), '', '&');"
        );
    }

    #[test]
    fn test_nested_array_literal() {
        assert_eq!(
            fix("<?php echo http_build_query(['a' => 1, 'b' => 2]);"),
            "<?php echo http_build_query(['a' => 1, 'b' => 2], '', '&');"
        );
    }

    #[test]
    fn test_method_call_is_not_rewritten() {
        let source = "<?php echo $builder->http_build_query($data);";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_static_call_is_not_rewritten() {
        let source = "<?php echo Query::http_build_query($data);";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_function_declaration_is_not_rewritten() {
        let source = "<?php function http_build_query($data) { return ''; }";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_fully_qualified_global_call_is_rewritten() {
        assert_eq!(
            fix("<?php echo \\http_build_query($data);"),
            "<?php echo \\http_build_query($data, '', '&');"
        );
    }

    #[test]
    fn test_namespaced_call_is_not_rewritten() {
        let source = "<?php echo Helpers\\http_build_query($data);";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_spread_argument_is_skipped() {
        let source = "<?php echo http_build_query(...$args);";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_named_argument_is_skipped() {
        let source = "<?php echo http_build_query(data: $data);";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_zero_argument_call_is_skipped() {
        let source = "<?php echo http_build_query();";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_unbalanced_call_is_skipped() {
        let source = "<?php echo http_build_query($data";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_case_insensitive_function_match() {
        assert_eq!(
            fix("<?php echo HTTP_Build_Query($data);"),
            "<?php echo HTTP_Build_Query($data, '', '&');"
        );
    }

    #[test]
    fn test_multiple_calls_in_one_file() {
        assert_eq!(
            fix("<?php $a = http_build_query($x); $b = http_build_query($y, 'p');"),
            "<?php $a = http_build_query($x, '', '&'); $b = http_build_query($y, 'p', '&');"
        );
    }

    #[test]
    fn test_fix_is_idempotent() {
        let mut tokens =
            tokenize(FileId::new(0), "<?php echo http_build_query($data);").expect("tokenize");
        let fixer = SpecifyArgSeparatorFixer::new();

        assert!(fixer.fix(&mut tokens));
        let once = tokens.to_source();

        assert!(!fixer.fix(&mut tokens));
        assert_eq!(tokens.to_source(), once);
    }

    #[test]
    fn test_fix_returns_false_when_nothing_changes() {
        let mut tokens =
            tokenize(FileId::new(0), "<?php echo implode(',', $a);").expect("tokenize");
        assert!(!SpecifyArgSeparatorFixer::new().fix(&mut tokens));
    }
}
