// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for Go source.
//!
//! Individual tokens are recognized with winnow combinators. The driver loop
//! tracks byte offsets, collects comments separately from tokens, and
//! performs Go's automatic semicolon insertion: a newline (or end of input)
//! after an identifier, literal, `break`, `continue`, `fallthrough`,
//! `return`, `++`, `--`, `)`, `]` or `}` produces a `;` token with an empty
//! span. A block comment that spans lines counts as a newline.
//!
//! Tokenizing never fails. A character that starts no token, or a string
//! that never ends, becomes an [`TokenKind::Illegal`] token and a
//! [`ParseError`] in [`Lexed::errors`]; the parser turns the token into a
//! bad node.

use winnow::combinator::{alt, opt, repeat};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_till, take_until, take_while};
use winnow::ModalResult;

use crate::nodes::{Comment, Span};
use crate::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    Imag(String),
    /// Rune literal text including its quotes.
    Char(String),
    /// String literal text including its quotes.
    Str(String),

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Ellipsis,
    Colon,

    // Assignment
    Assign,
    Define,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    Inc,
    Dec,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AndNot,
    Not,
    Tilde,
    Arrow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,

    /// Text that starts no token.
    Illegal(String),
    Eof,
}

impl TokenKind {
    fn from_word(word: &str) -> TokenKind {
        match word {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "chan" => TokenKind::Chan,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "defer" => TokenKind::Defer,
            "else" => TokenKind::Else,
            "fallthrough" => TokenKind::Fallthrough,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "go" => TokenKind::Go,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "package" => TokenKind::Package,
            "range" => TokenKind::Range,
            "return" => TokenKind::Return,
            "select" => TokenKind::Select,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "type" => TokenKind::Type,
            "var" => TokenKind::Var,
            _ => TokenKind::Ident(word.to_string()),
        }
    }

    /// Whether a newline after this token ends the statement.
    fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Char(_)
                | TokenKind::Str(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Int(value) | TokenKind::Float(value) | TokenKind::Imag(value) => {
                format!("number {}", value)
            }
            TokenKind::Char(value) => format!("rune {}", value),
            TokenKind::Str(value) => format!("string {}", value),
            TokenKind::Illegal(text) => format!("invalid text {:?}", text),
            TokenKind::Semicolon => "';' or newline".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Chan => "chan",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Defer => "defer",
            TokenKind::Else => "else",
            TokenKind::Fallthrough => "fallthrough",
            TokenKind::For => "for",
            TokenKind::Func => "func",
            TokenKind::Go => "go",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::Interface => "interface",
            TokenKind::Map => "map",
            TokenKind::Package => "package",
            TokenKind::Range => "range",
            TokenKind::Return => "return",
            TokenKind::Select => "select",
            TokenKind::Struct => "struct",
            TokenKind::Switch => "switch",
            TokenKind::Type => "type",
            TokenKind::Var => "var",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::Colon => ":",
            TokenKind::Assign => "=",
            TokenKind::Define => ":=",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::QuoAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::AndAssign => "&=",
            TokenKind::OrAssign => "|=",
            TokenKind::XorAssign => "^=",
            TokenKind::ShlAssign => "<<=",
            TokenKind::ShrAssign => ">>=",
            TokenKind::AndNotAssign => "&^=",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::Not => "!",
            TokenKind::Tilde => "~",
            TokenKind::Arrow => "<-",
            TokenKind::Eq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Imag(_)
            | TokenKind::Char(_)
            | TokenKind::Str(_)
            | TokenKind::Illegal(_)
            | TokenKind::Eof => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Output of [`tokenize`].
#[derive(Debug, Clone)]
pub struct Lexed {
    /// Tokens in source order, always terminated by [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    /// Problems found while tokenizing. Each has an `Illegal` token.
    pub errors: Vec<ParseError>,
}

/// Split `source` into tokens and comments.
pub fn tokenize(source: &str) -> Lexed {
    let mut input = source;
    let mut tokens: Vec<Token> = Vec::new();
    let mut comments = Vec::new();
    let mut errors = Vec::new();

    loop {
        let _ = blanks.parse_next(&mut input);
        let offset = source.len() - input.len();

        if input.is_empty() {
            insert_semicolon(&mut tokens, offset);
            break;
        }

        if let Some(rest) = input.strip_prefix('\n') {
            insert_semicolon(&mut tokens, offset);
            input = rest;
            continue;
        }

        if input.starts_with("//") || input.starts_with("/*") {
            match comment.parse_next(&mut input) {
                Ok(raw) => {
                    if raw.starts_with("/*") && raw.contains('\n') {
                        insert_semicolon(&mut tokens, offset);
                    }
                    comments.push(Comment::from_raw(raw, Span::new(offset, offset + raw.len())));
                }
                Err(_) => {
                    errors.push(ParseError::Unterminated {
                        what: "comment",
                        offset,
                    });
                    input = "";
                }
            }
            continue;
        }

        let kind = match token.parse_next(&mut input) {
            Ok(kind) => kind,
            Err(_) => {
                let (error, len) = lex_error(input, offset);
                errors.push(error);
                let (bad, rest) = input.split_at(len);
                input = rest;
                TokenKind::Illegal(bad.to_string())
            }
        };
        let end = source.len() - input.len();
        tokens.push(Token {
            kind,
            span: Span::new(offset, end),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(source.len(), source.len()),
    });

    Lexed {
        tokens,
        comments,
        errors,
    }
}

fn insert_semicolon(tokens: &mut Vec<Token>, offset: usize) {
    if tokens.last().is_some_and(|t| t.kind.ends_statement()) {
        tokens.push(Token {
            kind: TokenKind::Semicolon,
            span: Span::new(offset, offset),
        });
    }
}

/// The error at the start of `rest` and how many bytes to skip past it.
fn lex_error(rest: &str, offset: usize) -> (ParseError, usize) {
    match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let len = rest.find('\n').unwrap_or(rest.len());
            let what = if quote == '"' { "string literal" } else { "rune literal" };
            (ParseError::Unterminated { what, offset }, len)
        }
        Some('`') => (
            ParseError::Unterminated {
                what: "string literal",
                offset,
            },
            rest.len(),
        ),
        Some(ch) => (ParseError::UnexpectedChar { ch, offset }, ch.len_utf8()),
        None => (
            ParseError::Unterminated {
                what: "input",
                offset,
            },
            0,
        ),
    }
}

// ============================================================================
// Token parsers
// ============================================================================

fn blanks<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(0.., |c: char| c == ' ' || c == '\t' || c == '\r').parse_next(input)
}

fn comment<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        ("//", take_till(0.., '\n')).take(),
        ("/*", take_until(0.., "*/"), "*/").take(),
    ))
    .parse_next(input)
}

fn token(input: &mut &str) -> ModalResult<TokenKind> {
    alt((word, number, string_lit, raw_string_lit, rune_lit, punct)).parse_next(input)
}

fn word(input: &mut &str) -> ModalResult<TokenKind> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_'),
    )
        .take()
        .map(TokenKind::from_word)
        .parse_next(input)
}

fn digits<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_digit() || c == '_').parse_next(input)
}

fn exponent<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (one_of(['e', 'E', 'p', 'P']), opt(one_of(['+', '-'])), digits)
        .take()
        .parse_next(input)
}

/// `0x`, `0o` and `0b` literals. Hex floats keep their `p` exponent.
fn prefixed_number<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        '0',
        one_of(['x', 'X', 'o', 'O', 'b', 'B']),
        take_while(1.., |c: char| c.is_ascii_hexdigit() || c == '_' || c == '.'),
        opt(exponent),
    )
        .take()
        .parse_next(input)
}

fn decimal_number<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        (
            digits,
            opt(('.', take_while(0.., |c: char| c.is_ascii_digit() || c == '_'))),
            opt(exponent),
        )
            .take(),
        ('.', digits, opt(exponent)).take(),
    ))
    .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<TokenKind> {
    (alt((prefixed_number, decimal_number)), opt('i'))
        .take()
        .map(|text: &str| {
            let value = text.to_string();
            let hex = text.starts_with("0x") || text.starts_with("0X");
            if text.ends_with('i') {
                TokenKind::Imag(value)
            } else if text.contains('.')
                || (hex && text.contains(['p', 'P']))
                || (!hex && text.contains(['e', 'E']))
            {
                TokenKind::Float(value)
            } else {
                TokenKind::Int(value)
            }
        })
        .parse_next(input)
}

fn string_lit(input: &mut &str) -> ModalResult<TokenKind> {
    (
        '"',
        repeat::<_, _, (), _, _>(
            0..,
            alt((('\\', any).void(), none_of(['"', '\\', '\n']).void())),
        ),
        '"',
    )
        .take()
        .map(|s: &str| TokenKind::Str(s.to_string()))
        .parse_next(input)
}

fn rune_lit(input: &mut &str) -> ModalResult<TokenKind> {
    (
        '\'',
        repeat::<_, _, (), _, _>(
            1..,
            alt((('\\', any).void(), none_of(['\'', '\\', '\n']).void())),
        ),
        '\'',
    )
        .take()
        .map(|s: &str| TokenKind::Char(s.to_string()))
        .parse_next(input)
}

fn raw_string_lit(input: &mut &str) -> ModalResult<TokenKind> {
    ('`', take_till(0.., '`'), '`')
        .take()
        .map(|s: &str| TokenKind::Str(s.to_string()))
        .parse_next(input)
}

fn punct(input: &mut &str) -> ModalResult<TokenKind> {
    alt((
        alt((
            "<<=".value(TokenKind::ShlAssign),
            ">>=".value(TokenKind::ShrAssign),
            "&^=".value(TokenKind::AndNotAssign),
            "...".value(TokenKind::Ellipsis),
        )),
        alt((
            ":=".value(TokenKind::Define),
            "+=".value(TokenKind::AddAssign),
            "-=".value(TokenKind::SubAssign),
            "*=".value(TokenKind::MulAssign),
            "/=".value(TokenKind::QuoAssign),
            "%=".value(TokenKind::RemAssign),
            "&=".value(TokenKind::AndAssign),
            "|=".value(TokenKind::OrAssign),
            "^=".value(TokenKind::XorAssign),
            "++".value(TokenKind::Inc),
            "--".value(TokenKind::Dec),
        )),
        alt((
            "==".value(TokenKind::Eq),
            "!=".value(TokenKind::Ne),
            "<=".value(TokenKind::Le),
            ">=".value(TokenKind::Ge),
            "&&".value(TokenKind::AndAnd),
            "||".value(TokenKind::OrOr),
            "<-".value(TokenKind::Arrow),
            "<<".value(TokenKind::Shl),
            ">>".value(TokenKind::Shr),
            "&^".value(TokenKind::AndNot),
        )),
        alt((
            '('.value(TokenKind::LParen),
            ')'.value(TokenKind::RParen),
            '{'.value(TokenKind::LBrace),
            '}'.value(TokenKind::RBrace),
            '['.value(TokenKind::LBracket),
            ']'.value(TokenKind::RBracket),
            ','.value(TokenKind::Comma),
            ';'.value(TokenKind::Semicolon),
            '.'.value(TokenKind::Dot),
            ':'.value(TokenKind::Colon),
            '='.value(TokenKind::Assign),
        )),
        alt((
            '+'.value(TokenKind::Plus),
            '-'.value(TokenKind::Minus),
            '*'.value(TokenKind::Star),
            '/'.value(TokenKind::Slash),
            '%'.value(TokenKind::Percent),
            '&'.value(TokenKind::Amp),
            '|'.value(TokenKind::Pipe),
            '^'.value(TokenKind::Caret),
            '!'.value(TokenKind::Not),
            '~'.value(TokenKind::Tilde),
            '<'.value(TokenKind::Lt),
            '>'.value(TokenKind::Gt),
        )),
    ))
    .parse_next(input)
}
