// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive-descent parser producing [`SourceFile`] trees.
//!
//! Parsing only fails when the package clause is missing. Any other syntax
//! error is recorded in [`SourceFile::errors`] and the parser resumes at the
//! next statement (or, outside function bodies, the next declaration),
//! leaving a [`BadNode`] in place of the skipped tokens. A token that cannot
//! start an operand becomes a bad expression on the spot, so the rest of
//! its statement is still parsed.
//!
//! As in Go's own parser, a `{` directly after a type name in an `if`,
//! `for` or `switch` header opens the body, not a composite literal.

use thiserror::Error;

use crate::nodes::*;
use crate::tokenizer::{tokenize, Token, TokenKind};

/// Errors raised while tokenizing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character that starts no token.
    #[error("unexpected character {ch:?} at byte {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// A comment or string literal that never ends.
    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },

    /// The parser wanted one thing and found another.
    #[error("expected {expected}, found {found} at {span}")]
    Expected {
        expected: String,
        found: String,
        span: Span,
    },
}

impl ParseError {
    /// Byte offset where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedChar { offset, .. } | ParseError::Unterminated { offset, .. } => {
                *offset
            }
            ParseError::Expected { span, .. } => span.start,
        }
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parse one source file with its own identifier numbering.
pub fn parse_file(name: &str, source: &str) -> Result<SourceFile, ParseError> {
    parse_file_with_ids(name, source, &mut NodeIdGenerator::new())
}

/// Parse one source file, drawing identifier ids from `ids`.
///
/// Files parsed with the same generator have disjoint [`NodeId`]s, so
/// per-identifier facts from several files can share one table.
pub fn parse_file_with_ids(
    name: &str,
    source: &str,
    ids: &mut NodeIdGenerator,
) -> Result<SourceFile, ParseError> {
    let lexed = tokenize(source);
    let mut parser = Parser {
        source,
        tokens: lexed.tokens,
        pos: 0,
        ids,
        expr_lev: 0,
        errors: lexed.errors,
    };
    let package = parser.parse_package()?;
    let (imports, decls) = parser.parse_file_body();
    let mut errors = parser.errors;
    errors.sort_by_key(ParseError::offset);
    Ok(SourceFile {
        name: name.to_string(),
        source: source.to_string(),
        package,
        imports,
        decls,
        comments: lexed.comments,
        errors,
    })
}

/// Parse `(name, source)` pairs with one shared id generator.
pub fn parse_files<'s>(
    sources: impl IntoIterator<Item = (&'s str, &'s str)>,
) -> Result<Vec<SourceFile>, ParseError> {
    let mut ids = NodeIdGenerator::new();
    sources
        .into_iter()
        .map(|(name, source)| parse_file_with_ids(name, source, &mut ids))
        .collect()
}

/// Header of a `for` statement.
enum ForHeader {
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
    },
}

struct Parser<'s, 'g> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    ids: &'g mut NodeIdGenerator,
    /// Nesting of parentheses and brackets; negative inside control clause
    /// headers, where composite literals of named types are not allowed.
    expr_lev: i32,
    errors: Vec<ParseError>,
}

impl<'s, 'g> Parser<'s, 'g> {
    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    /// End of the last consumed token.
    fn prev_end(&self) -> usize {
        match self.pos {
            0 => 0,
            pos => self.tokens[pos - 1].span.end,
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(&kind) {
            Ok(self.bump())
        } else {
            Err(self.error(&kind.describe()))
        }
    }

    fn error(&self, expected: &str) -> ParseError {
        ParseError::Expected {
            expected: expected.to_string(),
            found: self.peek().describe(),
            span: self.span(),
        }
    }

    /// Statement terminator: `;`, or nothing before a closing `)`/`}`.
    fn expect_terminator(&mut self) -> PResult<()> {
        match self.peek() {
            TokenKind::Semicolon => {
                self.bump();
                Ok(())
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.error("';' or newline")),
        }
    }

    fn ident(&mut self) -> PResult<Ident> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                let span = self.bump().span;
                Ok(self.new_ident(name, span))
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn new_ident(&mut self, name: String, span: Span) -> Ident {
        Ident {
            name,
            span,
            node_id: self.ids.next_id(),
        }
    }

    fn string(&mut self) -> PResult<String> {
        match self.peek() {
            TokenKind::Str(value) => {
                let value = value.clone();
                self.bump();
                Ok(value)
            }
            _ => Err(self.error("string literal")),
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.source.get(start..end).unwrap_or_default().to_string()
    }

    /// Run `f` as a control clause header.
    fn control_clause<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let saved = self.expr_lev;
        self.expr_lev = -1;
        let result = f(self);
        self.expr_lev = saved;
        result
    }

    /// Run `f` one parenthesis level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.expr_lev += 1;
        let result = f(self);
        self.expr_lev -= 1;
        result
    }

    /// The token after the bracketed region that opens `n` tokens ahead.
    fn after_brackets(&self, mut n: usize) -> &TokenKind {
        let mut depth = 0usize;
        loop {
            match self.peek_at(n) {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.peek_at(n + 1);
                    }
                }
                TokenKind::Eof => return self.peek_at(n),
                _ => {}
            }
            n += 1;
        }
    }

    /// Skip a bracketed region starting at the current opening token.
    fn skip_brackets(&mut self) -> PResult<Span> {
        let start = self.span().start;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let end = self.bump().span.end;
                        return Ok(Span::new(start, end));
                    }
                }
                TokenKind::Eof => return Err(self.error("closing bracket")),
                _ => {}
            }
            self.bump();
        }
    }

    // ------------------------------------------------------------------
    // Error recovery
    // ------------------------------------------------------------------

    /// Span from the token at `start` to the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let from = self.tokens[start].span.start;
        Span::new(from, self.prev_end().max(from))
    }

    /// Skip to the end of the current statement: a `;` at nesting depth
    /// zero (consumed), or the `}` closing the enclosing block. Inside a
    /// switch or select clause a `case` or `default` also ends it.
    fn sync_stmt(&mut self, start: usize, in_clause: bool) -> Span {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::Case | TokenKind::Default if depth == 0 && in_clause => break,
                TokenKind::Semicolon if depth == 0 => {
                    self.bump();
                    break;
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
        self.span_from(start)
    }

    /// Skip to the next declaration keyword that starts a line at nesting
    /// depth zero.
    fn sync_decl(&mut self, start: usize) -> Span {
        if self.pos == start {
            self.bump();
        }
        let mut depth = 0usize;
        loop {
            let line_start = self.tokens[self.pos - 1].kind == TokenKind::Semicolon;
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Func
                | TokenKind::Type
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Import
                    if depth == 0 && line_start =>
                {
                    break
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
        self.span_from(start)
    }

    // ------------------------------------------------------------------
    // File and declarations
    // ------------------------------------------------------------------

    fn parse_package(&mut self) -> PResult<Ident> {
        self.expect(TokenKind::Package)?;
        let package = self.ident()?;
        if let Err(err) = self.expect_terminator() {
            self.errors.push(err);
        }
        Ok(package)
    }

    fn parse_file_body(&mut self) -> (Vec<ImportSpec>, Vec<Decl>) {
        let mut imports = Vec::new();
        let mut decls = Vec::new();
        while !self.at(&TokenKind::Eof) {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            let start = self.pos;
            let result = if self.at(&TokenKind::Import) {
                self.parse_import(&mut imports)
            } else {
                self.parse_decl(&mut decls)
            };
            if let Err(err) = result.and_then(|()| self.expect_terminator()) {
                self.errors.push(err);
                let span = self.sync_decl(start);
                decls.push(Decl::Bad(BadNode { span }));
            }
        }
        (imports, decls)
    }

    fn parse_import(&mut self, imports: &mut Vec<ImportSpec>) -> PResult<()> {
        let specs = self.parse_group(|p, start| p.parse_import_spec(start))?;
        imports.extend(specs);
        Ok(())
    }

    fn parse_import_spec(&mut self, start: usize) -> PResult<ImportSpec> {
        let name = match self.peek() {
            TokenKind::Ident(_) => Some(self.ident()?),
            TokenKind::Dot => {
                let span = self.bump().span;
                Some(self.new_ident(".".to_string(), span))
            }
            _ => None,
        };
        let quoted = self.string()?;
        let path = quoted.trim_matches(|c| c == '"' || c == '`').to_string();
        Ok(ImportSpec {
            name,
            path,
            span: Span::new(start, self.prev_end()),
        })
    }

    /// `kw spec` or `kw ( spec; ... )`. Ungrouped specs start at the
    /// keyword.
    fn parse_group<T>(
        &mut self,
        mut spec: impl FnMut(&mut Self, usize) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let start = self.bump().span.start;
        if !self.eat(&TokenKind::LParen) {
            return Ok(vec![spec(self, start)?]);
        }
        let mut specs = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            let spec_start = self.span().start;
            specs.push(spec(self, spec_start)?);
            self.expect_terminator()?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(specs)
    }

    fn parse_decl(&mut self, decls: &mut Vec<Decl>) -> PResult<()> {
        match self.peek() {
            TokenKind::Func => decls.push(Decl::Func(self.parse_func_decl()?)),
            TokenKind::Type => {
                let specs = self.parse_group(|p, start| p.parse_type_spec(start))?;
                decls.extend(specs.into_iter().map(Decl::Type));
            }
            TokenKind::Var => {
                let specs = self.parse_group(|p, start| p.parse_value_spec(start))?;
                decls.extend(specs.into_iter().map(Decl::Var));
            }
            TokenKind::Const => {
                let specs = self.parse_group(|p, start| p.parse_value_spec(start))?;
                decls.extend(specs.into_iter().map(Decl::Const));
            }
            _ => return Err(self.error("declaration")),
        }
        Ok(())
    }

    /// True when the `[` at the cursor opens a type parameter list rather
    /// than an array length.
    fn at_type_params(&self) -> bool {
        self.at(&TokenKind::LBracket)
            && matches!(self.peek_at(1), TokenKind::Ident(_))
            && matches!(
                self.peek_at(2),
                TokenKind::Ident(_)
                    | TokenKind::Comma
                    | TokenKind::Interface
                    | TokenKind::Tilde
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Func
            )
    }

    fn parse_type_spec(&mut self, start: usize) -> PResult<TypeDecl> {
        let name = self.ident()?;
        if self.at_type_params() {
            self.skip_brackets()?;
        }
        let alias = self.eat(&TokenKind::Assign);
        let ty = self.parse_type()?;
        let span = Span::new(start, ty.span().end);
        Ok(TypeDecl {
            name,
            alias,
            ty,
            span,
        })
    }

    /// `names [Type] [= values]`, shared by `var` and `const`.
    fn parse_value_spec(&mut self, start: usize) -> PResult<VarDecl> {
        let mut names = vec![self.ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.ident()?);
        }
        let ty = match self.peek() {
            TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen => None,
            _ => Some(self.parse_type()?),
        };
        let values = if self.eat(&TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(VarDecl {
            names,
            ty,
            values,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let start = self.span().start;
        match self.peek() {
            TokenKind::Ident(_) => self.parse_type_name(),
            TokenKind::Star => {
                self.bump();
                let elem = self.parse_type()?;
                let span = Span::new(start, elem.span().end);
                Ok(TypeExpr::Pointer {
                    elem: Box::new(elem),
                    span,
                })
            }
            TokenKind::LBracket => {
                self.bump();
                if self.eat(&TokenKind::RBracket) {
                    let elem = self.parse_type()?;
                    let span = Span::new(start, elem.span().end);
                    return Ok(TypeExpr::Slice {
                        elem: Box::new(elem),
                        span,
                    });
                }
                let len = if self.eat(&TokenKind::Ellipsis) {
                    None
                } else {
                    Some(Box::new(self.nested(|p| p.parse_expr())?))
                };
                self.expect(TokenKind::RBracket)?;
                let elem = self.parse_type()?;
                let span = Span::new(start, elem.span().end);
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(elem),
                    span,
                })
            }
            TokenKind::Map => {
                self.bump();
                self.expect(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                let span = Span::new(start, value.span().end);
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span,
                })
            }
            TokenKind::Chan | TokenKind::Arrow => {
                let dir = if self.eat(&TokenKind::Arrow) {
                    self.expect(TokenKind::Chan)?;
                    ChanDir::Recv
                } else {
                    self.bump();
                    if self.eat(&TokenKind::Arrow) {
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    }
                };
                let elem = self.parse_type()?;
                let span = Span::new(start, elem.span().end);
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(elem),
                    span,
                })
            }
            TokenKind::Func => {
                self.bump();
                let params = self.parse_params()?;
                let results = self.parse_results()?;
                Ok(TypeExpr::Func {
                    params,
                    results,
                    span: Span::new(start, self.prev_end()),
                })
            }
            TokenKind::Struct => {
                self.bump();
                self.expect(TokenKind::LBrace)?;
                let mut fields = Vec::new();
                while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                    if self.eat(&TokenKind::Semicolon) {
                        continue;
                    }
                    fields.push(self.parse_field()?);
                    self.expect_terminator()?;
                }
                let end = self.expect(TokenKind::RBrace)?.span.end;
                Ok(TypeExpr::Struct {
                    fields,
                    span: Span::new(start, end),
                })
            }
            TokenKind::Interface => {
                self.bump();
                if !self.at(&TokenKind::LBrace) {
                    return Err(self.error("'{'"));
                }
                let body = self.skip_brackets()?;
                Ok(TypeExpr::Interface {
                    text: self.text(start, body.end),
                    span: Span::new(start, body.end),
                })
            }
            TokenKind::LParen => {
                self.bump();
                let ty = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                Ok(ty)
            }
            _ => Err(self.error("type")),
        }
    }

    fn parse_type_name(&mut self) -> PResult<TypeExpr> {
        let first = self.ident()?;
        let name = if self.eat(&TokenKind::Dot) {
            let name = self.ident()?;
            TypeExpr::Name {
                package: Some(first),
                name,
            }
        } else {
            TypeExpr::Name {
                package: None,
                name: first,
            }
        };
        if !self.at(&TokenKind::LBracket) {
            return Ok(name);
        }
        self.bump();
        let mut args = Vec::new();
        while !self.at(&TokenKind::RBracket) {
            args.push(self.parse_type()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket)?.span.end;
        let span = Span::new(name.span().start, end);
        Ok(TypeExpr::Generic {
            base: Box::new(name),
            args,
            span,
        })
    }

    fn parse_field(&mut self) -> PResult<FieldDecl> {
        let start = self.span().start;
        let embedded = matches!(self.peek(), TokenKind::Star)
            || matches!(
                self.peek_at(1),
                TokenKind::Dot | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Str(_)
            );

        let mut names = Vec::new();
        if !embedded {
            names.push(self.ident()?);
            while self.eat(&TokenKind::Comma) {
                names.push(self.ident()?);
            }
        }
        let ty = self.parse_type()?;
        let tag = match self.peek() {
            TokenKind::Str(_) => Some(self.string()?),
            _ => None,
        };
        Ok(FieldDecl {
            names,
            ty,
            tag,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_func_decl(&mut self) -> PResult<FuncDecl> {
        let start = self.expect(TokenKind::Func)?.span.start;

        let recv = if self.at(&TokenKind::LParen) {
            let mut params = self.parse_params()?;
            if params.len() != 1 {
                return Err(self.error("single receiver"));
            }
            params.pop()
        } else {
            None
        };

        let name = self.ident()?;
        if self.at(&TokenKind::LBracket) {
            self.skip_brackets()?;
        }
        let params = self.parse_params()?;
        let results = self.parse_results()?;

        let body = if self.at(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            recv,
            name,
            params,
            results,
            body,
            span: Span::new(start, self.prev_end()),
        })
    }

    /// `( [name] Type {, [name] Type} )` with Go's grouping: in `a, b T`
    /// both names share `T`; a list of bare identifiers is a list of types.
    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();

        while !self.at(&TokenKind::RParen) {
            let bare_ident = matches!(self.peek(), TokenKind::Ident(_))
                && matches!(self.peek_at(1), TokenKind::Comma | TokenKind::RParen);
            // `a []T` names a parameter; `List[T],` is an unnamed generic type.
            let named = matches!(self.peek(), TokenKind::Ident(_))
                && match self.peek_at(1) {
                    TokenKind::Comma | TokenKind::RParen | TokenKind::Dot => false,
                    TokenKind::LBracket => !matches!(
                        self.after_brackets(1),
                        TokenKind::Comma | TokenKind::RParen
                    ),
                    _ => true,
                };

            if bare_ident {
                pending.push(self.ident()?);
            } else if named {
                let name = self.ident()?;
                let ty = self.parse_param_type()?;
                for grouped in pending.drain(..) {
                    params.push(Param {
                        name: Some(grouped),
                        ty: ty.clone(),
                    });
                }
                params.push(Param {
                    name: Some(name),
                    ty,
                });
            } else {
                let ty = self.parse_param_type()?;
                params.push(Param { name: None, ty });
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        for name in pending {
            params.push(Param {
                name: None,
                ty: TypeExpr::Name {
                    package: None,
                    name,
                },
            });
        }
        Ok(params)
    }

    /// A parameter type; `...T` becomes `[]T`.
    fn parse_param_type(&mut self) -> PResult<TypeExpr> {
        let start = self.span().start;
        if !self.eat(&TokenKind::Ellipsis) {
            return self.parse_type();
        }
        let elem = self.parse_type()?;
        let span = Span::new(start, elem.span().end);
        Ok(TypeExpr::Slice {
            elem: Box::new(elem),
            span,
        })
    }

    fn parse_results(&mut self) -> PResult<Vec<TypeExpr>> {
        match self.peek() {
            TokenKind::LParen => Ok(self.parse_params()?.into_iter().map(|p| p.ty).collect()),
            TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Arrow
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface
            | TokenKind::Ident(_) => Ok(vec![self.parse_type()?]),
            _ => Ok(Vec::new()),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_block(&mut self) -> PResult<Block> {
        let start = self.expect(TokenKind::LBrace)?.span.start;
        let stmts = self.parse_stmt_list(false);
        let end = if self.at(&TokenKind::RBrace) {
            self.bump().span.end
        } else {
            self.errors.push(self.error("'}'"));
            self.span().end
        };
        Ok(Block {
            stmts,
            span: Span::new(start, end),
        })
    }

    /// Statements up to the closing `}` or, inside a switch or select
    /// clause, the next `case` or `default`.
    fn parse_stmt_list(&mut self, in_clause: bool) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Case | TokenKind::Default if in_clause => break,
                TokenKind::Semicolon => {
                    self.bump();
                    continue;
                }
                _ => {}
            }
            let start = self.pos;
            let result = self
                .parse_stmt_into(&mut stmts)
                .and_then(|()| self.expect_terminator());
            if let Err(err) = result {
                self.errors.push(err);
                let span = self.sync_stmt(start, in_clause);
                stmts.push(Stmt::Bad(BadNode { span }));
            }
        }
        stmts
    }

    /// Parse one statement; a grouped declaration adds one per spec.
    fn parse_stmt_into(&mut self, stmts: &mut Vec<Stmt>) -> PResult<()> {
        match self.peek() {
            TokenKind::Var => {
                let specs = self.parse_group(|p, start| p.parse_value_spec(start))?;
                stmts.extend(specs.into_iter().map(Stmt::Var));
            }
            TokenKind::Const => {
                let specs = self.parse_group(|p, start| p.parse_value_spec(start))?;
                stmts.extend(specs.into_iter().map(Stmt::Const));
            }
            TokenKind::Type => {
                let specs = self.parse_group(|p, start| p.parse_type_spec(start))?;
                stmts.extend(specs.into_iter().map(Stmt::Type));
            }
            _ => stmts.push(self.parse_stmt()?),
        }
        Ok(())
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek() {
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if().map(Stmt::If),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Select => self.parse_select(),
            TokenKind::Go | TokenKind::Defer => self.parse_call_stmt(),
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                self.parse_branch()
            }
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Ident(_) if self.peek_at(1) == &TokenKind::Colon => self.parse_labeled(),
            TokenKind::Var | TokenKind::Const | TokenKind::Type => {
                let mut stmts = Vec::new();
                self.parse_stmt_into(&mut stmts)?;
                stmts.pop().ok_or_else(|| self.error("declaration"))
            }
            _ => self.parse_simple_stmt(),
        }
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let span = self.expect(TokenKind::Return)?.span;
        let results = match self.peek() {
            TokenKind::Semicolon | TokenKind::RBrace => Vec::new(),
            _ => self.parse_expr_list()?,
        };
        let end = results.last().map_or(span.end, |e| e.span().end);
        Ok(Stmt::Return(ReturnStmt {
            results,
            span: Span::new(span.start, end),
        }))
    }

    fn parse_call_stmt(&mut self) -> PResult<Stmt> {
        let keyword = self.bump();
        let call = self.parse_expr()?;
        if !matches!(call.unparen(), Expr::Call(_)) {
            return Err(ParseError::Expected {
                expected: "function call".to_string(),
                found: "expression".to_string(),
                span: call.span(),
            });
        }
        let stmt = CallStmt {
            span: Span::new(keyword.span.start, call.span().end),
            call,
        };
        Ok(match keyword.kind {
            TokenKind::Go => Stmt::Go(stmt),
            _ => Stmt::Defer(stmt),
        })
    }

    fn parse_branch(&mut self) -> PResult<Stmt> {
        let keyword = self.bump();
        let kind = match keyword.kind {
            TokenKind::Break => BranchKind::Break,
            TokenKind::Continue => BranchKind::Continue,
            TokenKind::Goto => BranchKind::Goto,
            _ => BranchKind::Fallthrough,
        };
        let label = match self.peek() {
            TokenKind::Ident(_) if kind != BranchKind::Fallthrough => Some(self.ident()?),
            _ => None,
        };
        Ok(Stmt::Branch(BranchStmt {
            kind,
            label,
            span: Span::new(keyword.span.start, self.prev_end()),
        }))
    }

    fn parse_labeled(&mut self) -> PResult<Stmt> {
        let label = self.ident()?;
        self.expect(TokenKind::Colon)?;
        let stmt = match self.peek() {
            TokenKind::RBrace => None,
            _ => Some(Box::new(self.parse_stmt()?)),
        };
        let span = Span::new(label.span.start, self.prev_end());
        Ok(Stmt::Labeled(LabeledStmt { label, stmt, span }))
    }

    fn parse_simple_stmt(&mut self) -> PResult<Stmt> {
        let lhs = self.parse_expr_list()?;
        self.finish_simple_stmt(lhs)
    }

    fn finish_simple_stmt(&mut self, mut lhs: Vec<Expr>) -> PResult<Stmt> {
        let start = lhs[0].span().start;
        if let Some(op) = assign_op(self.peek()) {
            self.bump();
            let rhs = self.parse_expr_list()?;
            let end = rhs.last().map_or(start, |e| e.span().end);
            return Ok(Stmt::Assign(AssignStmt {
                lhs,
                op,
                rhs,
                span: Span::new(start, end),
            }));
        }

        if lhs.len() != 1 {
            return Err(self.error("assignment operator"));
        }
        let x = lhs.remove(0);

        match self.peek() {
            TokenKind::Inc | TokenKind::Dec => {
                let op = if self.bump().kind == TokenKind::Inc {
                    IncDecOp::Inc
                } else {
                    IncDecOp::Dec
                };
                Ok(Stmt::IncDec(IncDecStmt {
                    x,
                    op,
                    span: Span::new(start, self.prev_end()),
                }))
            }
            TokenKind::Arrow => {
                self.bump();
                let value = self.parse_expr()?;
                let span = Span::new(start, value.span().end);
                Ok(Stmt::Send(SendStmt {
                    chan: x,
                    value,
                    span,
                }))
            }
            _ => Ok(Stmt::Expr(x)),
        }
    }

    fn parse_if(&mut self) -> PResult<IfStmt> {
        let start = self.expect(TokenKind::If)?.span.start;

        let (init, cond) = self.control_clause(|p| {
            let first = match p.peek() {
                TokenKind::Semicolon => None,
                TokenKind::LBrace => return Err(p.error("condition")),
                _ => Some(p.parse_simple_stmt()?),
            };
            if p.eat(&TokenKind::Semicolon) {
                let cond = p.parse_expr()?;
                return Ok((first.map(Box::new), cond));
            }
            match first {
                Some(Stmt::Expr(cond)) => Ok((None, cond)),
                _ => Err(p.error("condition")),
            }
        })?;

        let then = self.parse_block()?;
        let els = if self.eat(&TokenKind::Else) {
            let stmt = match self.peek() {
                TokenKind::If => Stmt::If(self.parse_if()?),
                TokenKind::LBrace => Stmt::Block(self.parse_block()?),
                _ => return Err(self.error("'if' or block")),
            };
            Some(Box::new(stmt))
        } else {
            None
        };

        Ok(IfStmt {
            init,
            cond,
            then,
            els,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::For)?.span.start;
        let header = self.control_clause(|p| p.parse_for_header())?;
        let body = self.parse_block()?;
        let span = Span::new(start, body.span.end);
        Ok(match header {
            ForHeader::Loop { init, cond, post } => Stmt::For(ForStmt {
                init,
                cond,
                post,
                body,
                span,
            }),
            ForHeader::Range {
                key,
                value,
                define,
                x,
            } => Stmt::Range(RangeStmt {
                key,
                value,
                define,
                x,
                body,
                span,
            }),
        })
    }

    fn parse_for_header(&mut self) -> PResult<ForHeader> {
        if self.at(&TokenKind::LBrace) {
            return Ok(ForHeader::Loop {
                init: None,
                cond: None,
                post: None,
            });
        }
        if self.eat(&TokenKind::Range) {
            let x = self.parse_expr()?;
            return Ok(ForHeader::Range {
                key: None,
                value: None,
                define: false,
                x,
            });
        }

        let mut init = None;
        if !self.at(&TokenKind::Semicolon) {
            let lhs = self.parse_expr_list()?;
            let op_then_range = matches!(self.peek(), TokenKind::Define | TokenKind::Assign)
                && self.peek_at(1) == &TokenKind::Range;
            if op_then_range {
                let define = self.bump().kind == TokenKind::Define;
                self.bump();
                let x = self.parse_expr()?;
                let mut lhs = lhs.into_iter();
                return Ok(ForHeader::Range {
                    key: lhs.next(),
                    value: lhs.next(),
                    define,
                    x,
                });
            }

            let stmt = self.finish_simple_stmt(lhs)?;
            if self.at(&TokenKind::LBrace) {
                return match stmt {
                    Stmt::Expr(cond) => Ok(ForHeader::Loop {
                        init: None,
                        cond: Some(cond),
                        post: None,
                    }),
                    _ => Err(self.error("loop condition")),
                };
            }
            init = Some(Box::new(stmt));
        }

        self.expect(TokenKind::Semicolon)?;
        let cond = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        let post = if self.at(&TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt()?))
        };
        Ok(ForHeader::Loop { init, cond, post })
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Switch)?.span.start;

        let (init, tag) = self.control_clause(|p| {
            if p.at(&TokenKind::LBrace) {
                return Ok((None, None));
            }
            let first = match p.peek() {
                TokenKind::Semicolon => None,
                _ => Some(p.parse_simple_stmt()?),
            };
            if !p.eat(&TokenKind::Semicolon) {
                return Ok((None, first));
            }
            let tag = match p.peek() {
                TokenKind::LBrace => None,
                _ => Some(p.parse_simple_stmt()?),
            };
            Ok((first.map(Box::new), tag))
        })?;

        let tag = match tag.map(into_type_switch_guard) {
            Some(Ok((binding, x))) => {
                let (clauses, end) = self.parse_clauses(|p| p.parse_type_case())?;
                return Ok(Stmt::TypeSwitch(TypeSwitchStmt {
                    init,
                    binding,
                    x,
                    clauses,
                    span: Span::new(start, end),
                }));
            }
            Some(Err(Stmt::Expr(tag))) => Some(tag),
            Some(Err(_)) => return Err(self.error("switch expression")),
            None => None,
        };

        let (clauses, end) = self.parse_clauses(|p| p.parse_case())?;
        Ok(Stmt::Switch(SwitchStmt {
            init,
            tag,
            clauses,
            span: Span::new(start, end),
        }))
    }

    fn parse_select(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Select)?.span.start;
        let (clauses, end) = self.parse_clauses(|p| p.parse_comm_case())?;
        Ok(Stmt::Select(SelectStmt {
            clauses,
            span: Span::new(start, end),
        }))
    }

    /// `{ clause... }` of a switch or select. Returns the clauses and the
    /// end of the closing brace.
    fn parse_clauses<T>(
        &mut self,
        mut clause: impl FnMut(&mut Self) -> T,
    ) -> PResult<(Vec<T>, usize)> {
        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            clauses.push(clause(self));
        }
        let end = self.expect(TokenKind::RBrace)?.span.end;
        Ok((clauses, end))
    }

    /// Parse a clause header with `head`, then its body. A broken header
    /// is recorded and skipped up to its `:`.
    fn parse_clause<H>(
        &mut self,
        head: impl FnOnce(&mut Self) -> PResult<H>,
    ) -> (Result<H, Span>, Vec<Stmt>, Span) {
        let start = self.pos;
        let header = match head(self).and_then(|h| self.expect(TokenKind::Colon).map(|_| h)) {
            Ok(header) => Ok(header),
            Err(err) => {
                self.errors.push(err);
                Err(self.skip_clause_header(start))
            }
        };
        let body = self.parse_stmt_list(true);
        let span = self.span_from(start);
        (header, body, span)
    }

    fn skip_clause_header(&mut self, start: usize) -> Span {
        if self.pos == start {
            self.bump();
        }
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace if depth == 0 => break,
                TokenKind::Colon if depth == 0 => {
                    self.bump();
                    break;
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
        self.span_from(start)
    }

    fn parse_case(&mut self) -> CaseClause {
        let (values, body, span) = self.parse_clause(|p| {
            if p.eat(&TokenKind::Default) {
                return Ok(Vec::new());
            }
            p.expect(TokenKind::Case)?;
            p.parse_expr_list()
        });
        let values = values.unwrap_or_else(|span| vec![Expr::Bad(BadNode { span })]);
        CaseClause { values, body, span }
    }

    fn parse_type_case(&mut self) -> TypeCaseClause {
        let (types, body, span) = self.parse_clause(|p| {
            if p.eat(&TokenKind::Default) {
                return Ok(Vec::new());
            }
            p.expect(TokenKind::Case)?;
            let mut types = vec![p.parse_type()?];
            while p.eat(&TokenKind::Comma) {
                types.push(p.parse_type()?);
            }
            Ok(types)
        });
        TypeCaseClause {
            types: types.unwrap_or_default(),
            body,
            span,
        }
    }

    fn parse_comm_case(&mut self) -> CommClause {
        let (comm, body, span) = self.parse_clause(|p| {
            if p.eat(&TokenKind::Default) {
                return Ok(None);
            }
            p.expect(TokenKind::Case)?;
            Ok(Some(Box::new(p.parse_simple_stmt()?)))
        });
        let comm = comm.unwrap_or_else(|span| Some(Box::new(Stmt::Bad(BadNode { span }))));
        CommClause { comm, body, span }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut x = self.parse_unary()?;
        while let Some(op) = binary_op(self.peek()) {
            if op.precedence() < min_prec {
                break;
            }
            self.bump();
            let y = self.parse_binary(op.precedence() + 1)?;
            let span = x.span().cover(&y.span());
            x = Expr::Binary(BinaryExpr {
                x: Box::new(x),
                op,
                y: Box::new(y),
                span,
            });
        }
        Ok(x)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            TokenKind::Amp => Some(UnaryOp::Addr),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::Xor),
            // `<-chan T` is a type.
            TokenKind::Arrow if self.peek_at(1) != &TokenKind::Chan => Some(UnaryOp::Recv),
            _ => None,
        };
        match op {
            Some(op) => {
                let start = self.bump().span.start;
                let x = self.parse_unary()?;
                let span = Span::new(start, x.span().end);
                Ok(Expr::Unary(UnaryExpr {
                    op,
                    x: Box::new(x),
                    span,
                }))
            }
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let mut x = self.parse_operand()?;
        loop {
            let start = x.span().start;
            match self.peek() {
                TokenKind::Dot => {
                    self.bump();
                    match self.peek() {
                        TokenKind::Ident(_) => {
                            let sel = self.ident()?;
                            let span = Span::new(start, sel.span.end);
                            x = Expr::Selector(SelectorExpr {
                                x: Box::new(x),
                                sel,
                                span,
                            });
                        }
                        TokenKind::LParen => {
                            self.bump();
                            let ty = if self.eat(&TokenKind::Type) {
                                None
                            } else {
                                Some(self.nested(|p| p.parse_type())?)
                            };
                            let end = self.expect(TokenKind::RParen)?.span.end;
                            x = Expr::TypeAssert(TypeAssertExpr {
                                x: Box::new(x),
                                ty,
                                span: Span::new(start, end),
                            });
                        }
                        _ => return Err(self.error("selector or type assertion")),
                    }
                }
                TokenKind::LParen => {
                    self.bump();
                    let (args, ellipsis) = self.nested(|p| {
                        let mut args = Vec::new();
                        let mut ellipsis = false;
                        while !p.at(&TokenKind::RParen) {
                            args.push(p.parse_expr()?);
                            ellipsis = p.eat(&TokenKind::Ellipsis);
                            if !p.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                        Ok((args, ellipsis))
                    })?;
                    let end = self.expect(TokenKind::RParen)?.span.end;
                    x = Expr::Call(CallExpr {
                        fun: Box::new(x),
                        args,
                        ellipsis,
                        span: Span::new(start, end),
                    });
                }
                TokenKind::LBracket => {
                    self.bump();
                    x = self.nested(|p| p.finish_index(x))?;
                }
                TokenKind::LBrace if self.starts_composite(&x) => {
                    let ty = expr_to_type(x).ok_or_else(|| self.error("composite literal type"))?;
                    x = Expr::Composite(self.parse_literal_value(Some(ty), start)?);
                }
                _ => break,
            }
        }
        Ok(x)
    }

    /// Index, slice or instantiation after `x[`.
    fn finish_index(&mut self, x: Expr) -> PResult<Expr> {
        let start = x.span().start;
        let low = match self.peek() {
            TokenKind::Colon => None,
            _ => Some(self.parse_expr()?),
        };

        if self.eat(&TokenKind::Colon) {
            let high = match self.peek() {
                TokenKind::Colon | TokenKind::RBracket => None,
                _ => Some(Box::new(self.parse_expr()?)),
            };
            let max = if self.eat(&TokenKind::Colon) {
                Some(Box::new(self.parse_expr()?))
            } else {
                None
            };
            let end = self.expect(TokenKind::RBracket)?.span.end;
            return Ok(Expr::Slice(SliceExpr {
                x: Box::new(x),
                low: low.map(Box::new),
                high,
                max,
                span: Span::new(start, end),
            }));
        }

        let Some(index) = low else {
            return Err(self.error("index"));
        };
        if self.at(&TokenKind::Comma) {
            let mut indices = vec![index];
            while self.eat(&TokenKind::Comma) && !self.at(&TokenKind::RBracket) {
                indices.push(self.parse_expr()?);
            }
            let end = self.expect(TokenKind::RBracket)?.span.end;
            return Ok(Expr::IndexList(IndexListExpr {
                x: Box::new(x),
                indices,
                span: Span::new(start, end),
            }));
        }

        let end = self.expect(TokenKind::RBracket)?.span.end;
        Ok(Expr::Index(IndexExpr {
            x: Box::new(x),
            index: Box::new(index),
            span: Span::new(start, end),
        }))
    }

    /// Whether a `{` after `x` opens a composite literal.
    fn starts_composite(&self, x: &Expr) -> bool {
        match x {
            Expr::Ident(_) | Expr::Selector(_) | Expr::Index(_) | Expr::IndexList(_) => {
                self.expr_lev >= 0
            }
            Expr::Type(
                TypeExpr::Array { .. }
                | TypeExpr::Slice { .. }
                | TypeExpr::Map { .. }
                | TypeExpr::Struct { .. },
            ) => true,
            _ => false,
        }
    }

    /// `{ elem, key: value, ... }` of a composite literal.
    fn parse_literal_value(&mut self, ty: Option<TypeExpr>, start: usize) -> PResult<CompositeLit> {
        self.expect(TokenKind::LBrace)?;
        let elts = self.nested(|p| {
            let mut elts = Vec::new();
            while !p.at(&TokenKind::RBrace) {
                let elt = p.parse_element()?;
                let elt = if p.eat(&TokenKind::Colon) {
                    let value = p.parse_element()?;
                    let span = elt.span().cover(&value.span());
                    Expr::KeyValue(KeyValueExpr {
                        key: Box::new(elt),
                        value: Box::new(value),
                        span,
                    })
                } else {
                    elt
                };
                elts.push(elt);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(elts)
        })?;
        let end = self.expect(TokenKind::RBrace)?.span.end;
        Ok(CompositeLit {
            ty,
            elts,
            span: Span::new(start, end),
        })
    }

    /// A composite literal element; a bare `{...}` is a literal of the
    /// elided element type.
    fn parse_element(&mut self) -> PResult<Expr> {
        if self.at(&TokenKind::LBrace) {
            let start = self.span().start;
            return self.parse_literal_value(None, start).map(Expr::Composite);
        }
        self.parse_expr()
    }

    fn parse_operand(&mut self) -> PResult<Expr> {
        let start = self.span().start;
        match self.peek() {
            TokenKind::Ident(_) => self.ident().map(Expr::Ident),
            TokenKind::Int(value)
            | TokenKind::Float(value)
            | TokenKind::Imag(value)
            | TokenKind::Char(value)
            | TokenKind::Str(value) => {
                let kind = match self.peek() {
                    TokenKind::Int(_) => LitKind::Int,
                    TokenKind::Float(_) => LitKind::Float,
                    TokenKind::Imag(_) => LitKind::Imag,
                    TokenKind::Char(_) => LitKind::Char,
                    _ => LitKind::String,
                };
                let value = value.clone();
                let span = self.bump().span;
                Ok(Expr::BasicLit(BasicLit { kind, value, span }))
            }
            TokenKind::LParen => {
                self.bump();
                let x = self.nested(|p| p.parse_expr())?;
                let end = self.expect(TokenKind::RParen)?.span.end;
                Ok(Expr::Paren(ParenExpr {
                    x: Box::new(x),
                    span: Span::new(start, end),
                }))
            }
            TokenKind::Func => {
                self.bump();
                let params = self.parse_params()?;
                let results = self.parse_results()?;
                if !self.at(&TokenKind::LBrace) {
                    return Ok(Expr::Type(TypeExpr::Func {
                        params,
                        results,
                        span: Span::new(start, self.prev_end()),
                    }));
                }
                let body = self.nested(|p| p.parse_block())?;
                let end = body.span.end;
                Ok(Expr::FuncLit(FuncLit {
                    params,
                    results,
                    body,
                    text: self.text(start, end),
                    span: Span::new(start, end),
                }))
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Arrow
            | TokenKind::Struct
            | TokenKind::Interface => self.parse_type().map(Expr::Type),
            TokenKind::Semicolon
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Eof
            | TokenKind::Break
            | TokenKind::Case
            | TokenKind::Const
            | TokenKind::Continue
            | TokenKind::Default
            | TokenKind::Defer
            | TokenKind::Else
            | TokenKind::Fallthrough
            | TokenKind::For
            | TokenKind::Go
            | TokenKind::Goto
            | TokenKind::If
            | TokenKind::Import
            | TokenKind::Package
            | TokenKind::Range
            | TokenKind::Return
            | TokenKind::Select
            | TokenKind::Switch
            | TokenKind::Type
            | TokenKind::Var => Err(self.error("expression")),
            _ => {
                self.errors.push(self.error("expression"));
                let span = self.bump().span;
                Ok(Expr::Bad(BadNode { span }))
            }
        }
    }
}

/// Split a `switch` header statement into a type switch guard, or hand it
/// back unchanged.
fn into_type_switch_guard(stmt: Stmt) -> Result<(Option<Ident>, Expr), Stmt> {
    match stmt {
        Stmt::Expr(Expr::TypeAssert(assert)) if assert.ty.is_none() => Ok((None, *assert.x)),
        Stmt::Assign(assign) if assign.op == AssignOp::Define => {
            let guard = match (assign.lhs.as_slice(), assign.rhs.as_slice()) {
                ([Expr::Ident(name)], [Expr::TypeAssert(assert)]) if assert.ty.is_none() => {
                    Some((Some(name.clone()), assert.x.as_ref().clone()))
                }
                _ => None,
            };
            guard.ok_or(Stmt::Assign(assign))
        }
        other => Err(other),
    }
}

/// The type named by a composite literal's type expression.
fn expr_to_type(expr: Expr) -> Option<TypeExpr> {
    match expr {
        Expr::Ident(name) => Some(TypeExpr::Name {
            package: None,
            name,
        }),
        Expr::Selector(sel) => match *sel.x {
            Expr::Ident(package) => Some(TypeExpr::Name {
                package: Some(package),
                name: sel.sel,
            }),
            _ => None,
        },
        Expr::Index(index) => {
            let span = index.span;
            let base = expr_to_type(*index.x)?;
            let arg = expr_to_type(*index.index)?;
            Some(TypeExpr::Generic {
                base: Box::new(base),
                args: vec![arg],
                span,
            })
        }
        Expr::IndexList(list) => {
            let span = list.span;
            let base = expr_to_type(*list.x)?;
            let args = list
                .indices
                .into_iter()
                .map(expr_to_type)
                .collect::<Option<Vec<_>>>()?;
            Some(TypeExpr::Generic {
                base: Box::new(base),
                args,
                span,
            })
        }
        Expr::Unary(unary) if unary.op == UnaryOp::Deref => {
            let elem = expr_to_type(*unary.x)?;
            Some(TypeExpr::Pointer {
                elem: Box::new(elem),
                span: unary.span,
            })
        }
        Expr::Type(ty) => Some(ty),
        _ => None,
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::Define => AssignOp::Define,
        TokenKind::AddAssign => AssignOp::Add,
        TokenKind::SubAssign => AssignOp::Sub,
        TokenKind::MulAssign => AssignOp::Mul,
        TokenKind::QuoAssign => AssignOp::Quo,
        TokenKind::RemAssign => AssignOp::Rem,
        TokenKind::AndAssign => AssignOp::And,
        TokenKind::OrAssign => AssignOp::Or,
        TokenKind::XorAssign => AssignOp::Xor,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        TokenKind::AndNotAssign => AssignOp::AndNot,
        _ => return None,
    })
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::OrOr => BinaryOp::LogOr,
        TokenKind::AndAnd => BinaryOp::LogAnd,
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::Ne => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Pipe => BinaryOp::Or,
        TokenKind::Caret => BinaryOp::Xor,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Quo,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Amp => BinaryOp::And,
        TokenKind::AndNot => BinaryOp::AndNot,
        _ => return None,
    })
}
