//! Reference tokenizer for the PHP subset the analyses consume.
//!
//! Hosts embedding this crate normally supply their own token streams; the
//! reference lexer exists so tests and the batch driver can analyze raw
//! source text. Every input byte is preserved: concatenating the text of
//! the produced tokens reproduces the input exactly.
//!
//! Supported subset: one `<?php` open tag (leading text before it becomes a
//! single [`TokenKind::InlineHtml`] token), line/block/doc comments,
//! single- and double-quoted strings, numbers, variables, identifiers and
//! keywords (ASCII case-insensitive), and the punctuation the analyses
//! inspect. Heredocs and `#[...]` attribute syntax are outside the subset;
//! attributes lex as line comments. Unterminated strings and block comments
//! extend to end of input rather than failing.

use logos::Logos;
use text_size::TextSize;
use thiserror::Error;

use crate::base::{FileId, LineIndex};
use crate::token::{Token, TokenKind, TokenStream};

/// A character the tokenizer cannot classify.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized character {character:?} on line {line} (byte offset {offset})")]
pub struct LexError {
    /// Byte offset of the offending character.
    pub offset: usize,
    /// 1-indexed source line.
    pub line: u32,
    /// The character that could not be classified.
    pub character: char,
}

/// Consume a `/* ... */` comment, or to end of input when unterminated.
fn block_comment(lex: &mut logos::Lexer<RawToken>) {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(rest.len()),
    }
}

/// Consume a quoted string body, or to end of input when unterminated.
///
/// `\` escapes the following byte, so an escaped quote does not close the
/// string. Quote and backslash are ASCII, so byte scanning is UTF-8 safe.
fn quoted_string(lex: &mut logos::Lexer<RawToken>, quote: u8) {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b if b == quote => {
                lex.bump(i + 1);
                return;
            }
            _ => i += 1,
        }
    }
    lex.bump(rest.len());
}

fn single_quoted(lex: &mut logos::Lexer<RawToken>) {
    quoted_string(lex, b'\'');
}

fn double_quoted(lex: &mut logos::Lexer<RawToken>) {
    quoted_string(lex, b'"');
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[token("<?php")]
    OpenTag,

    #[regex(r"[ \t\r\n\x0B\x0C]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    #[regex(r"#[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("'", single_quoted)]
    SingleQuotedString,

    #[token("\"", double_quoted)]
    DoubleQuotedString,

    #[token("namespace", ignore(ascii_case))]
    Namespace,
    #[token("use", ignore(ascii_case))]
    Use,
    #[token("as", ignore(ascii_case))]
    As,
    #[token("class", ignore(ascii_case))]
    Class,
    #[token("interface", ignore(ascii_case))]
    Interface,
    #[token("trait", ignore(ascii_case))]
    Trait,
    #[token("extends", ignore(ascii_case))]
    Extends,
    #[token("implements", ignore(ascii_case))]
    Implements,
    #[token("abstract", ignore(ascii_case))]
    Abstract,
    #[token("final", ignore(ascii_case))]
    Final,
    #[token("readonly", ignore(ascii_case))]
    Readonly,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("const", ignore(ascii_case))]
    Const,
    #[token("new", ignore(ascii_case))]
    New,

    #[regex(r"[A-Za-z_\u{0080}-\u{10FFFF}][A-Za-z0-9_\u{0080}-\u{10FFFF}]*")]
    Identifier,

    #[regex(r"\$[A-Za-z_\u{0080}-\u{10FFFF}][A-Za-z0-9_\u{0080}-\u{10FFFF}]*")]
    Variable,

    #[token("\\")]
    NsSeparator,

    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,
    #[token("?->")]
    NullsafeArrow,
    #[token("...")]
    Ellipsis,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+\-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+\-]?[0-9]+")]
    Float,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*")]
    Integer,

    #[regex(r"[!%&*+\-./<=>?@^|~$`]+", priority = 0)]
    Op,
}

fn kind_of(raw: RawToken, text: &str) -> TokenKind {
    match raw {
        RawToken::OpenTag => TokenKind::OpenTag,
        RawToken::Whitespace => TokenKind::Whitespace,
        RawToken::LineComment => TokenKind::LineComment,
        RawToken::BlockComment => {
            if text.starts_with("/**") && text.len() >= 5 {
                TokenKind::DocComment
            } else {
                TokenKind::BlockComment
            }
        }
        RawToken::SingleQuotedString => TokenKind::SingleQuotedString,
        RawToken::DoubleQuotedString => TokenKind::DoubleQuotedString,
        RawToken::Namespace => TokenKind::Namespace,
        RawToken::Use => TokenKind::Use,
        RawToken::As => TokenKind::As,
        RawToken::Class => TokenKind::Class,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Trait => TokenKind::Trait,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Implements => TokenKind::Implements,
        RawToken::Abstract => TokenKind::Abstract,
        RawToken::Final => TokenKind::Final,
        RawToken::Readonly => TokenKind::Readonly,
        RawToken::Function => TokenKind::Function,
        RawToken::Const => TokenKind::Const,
        RawToken::New => TokenKind::New,
        RawToken::Identifier => TokenKind::Identifier,
        RawToken::Variable => TokenKind::Variable,
        RawToken::NsSeparator => TokenKind::NsSeparator,
        RawToken::OpenParen => TokenKind::OpenParen,
        RawToken::CloseParen => TokenKind::CloseParen,
        RawToken::OpenBracket => TokenKind::OpenBracket,
        RawToken::CloseBracket => TokenKind::CloseBracket,
        RawToken::OpenBrace => TokenKind::OpenBrace,
        RawToken::CloseBrace => TokenKind::CloseBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::DoubleColon => TokenKind::DoubleColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::NullsafeArrow => TokenKind::NullsafeArrow,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Float => TokenKind::Float,
        RawToken::Integer => TokenKind::Integer,
        RawToken::Op => TokenKind::Op,
    }
}

/// Tokenize PHP source text into a [`TokenStream`].
///
/// Token lines are 1-indexed, computed from byte offsets via [`LineIndex`].
pub fn tokenize(file: FileId, source: &str) -> Result<TokenStream, LexError> {
    let line_index = LineIndex::new(source);
    let mut tokens = Vec::new();

    // Text before the open tag is opaque to the analyses.
    let (php, base_offset) = match source.find("<?php") {
        Some(0) => (source, 0),
        Some(pos) => {
            tokens.push(Token::new(TokenKind::InlineHtml, &source[..pos], 1));
            (&source[pos..], pos)
        }
        None => {
            if !source.is_empty() {
                tokens.push(Token::new(TokenKind::InlineHtml, source, 1));
            }
            ("", source.len())
        }
    };

    let mut lexer = RawToken::lexer(php);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let offset = base_offset + span.start;
        let line = line_index
            .line_col(TextSize::from(offset as u32))
            .line_one_indexed();
        match result {
            Ok(raw) => {
                let text = lexer.slice();
                tokens.push(Token::new(kind_of(raw, text), text, line));
            }
            Err(()) => {
                let character = php[span.start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(LexError {
                    offset,
                    line,
                    character,
                });
            }
        }
    }

    tracing::trace!(file = %file, tokens = tokens.len(), "tokenized source");
    Ok(TokenStream::new(file, tokens))
}
