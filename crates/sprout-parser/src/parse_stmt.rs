//! Statement and block parsing: `def`, `return`, `if`/`elif`/`else`,
//! assignments, `pass`, and indented suites.

use sprout_lexer::token::TokenKind;
use sprout_types::ast::*;
use sprout_types::ErrorCode;

use crate::parser::Parser;

/// Python statement keywords outside the derive subset. These lex as plain
/// identifiers, so they are caught here for a precise diagnostic.
const UNSUPPORTED_STATEMENT_KEYWORDS: &[&str] = &[
    "import", "from", "for", "while", "class", "with", "try", "raise", "global", "nonlocal",
    "del", "assert", "yield", "async", "await", "match",
];

impl<'src> Parser<'src> {
    /// Parse the whole token stream as a module body.
    pub(crate) fn parse_module_body(&mut self) -> Option<Module> {
        let start = self.current_span();
        let mut body = Vec::new();

        while !self.at_end() && !self.too_many_errors() {
            self.skip_newlines();
            if self.at_end() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }

        let end = self.current_span();
        Some(Module {
            body,
            span: start.merge(end),
        })
    }

    /// Parse a single statement (the trailing newline is consumed).
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Def => self.parse_function_def(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Pass => {
                let span = self.advance().span;
                self.expect_newline();
                Some(Stmt::new(StmtKind::Pass, span))
            }
            TokenKind::Elif | TokenKind::Else => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("'{}' without a matching 'if'", self.peek_kind()),
                );
                None
            }
            TokenKind::Identifier(name)
                if UNSUPPORTED_STATEMENT_KEYWORDS.contains(&name.as_str()) =>
            {
                let name = name.clone();
                self.error_at_current(
                    ErrorCode::UNSUPPORTED_STATEMENT,
                    format!("'{name}' statements are not supported in derive functions"),
                );
                None
            }
            TokenKind::Identifier(_) if *self.look_ahead(1) == TokenKind::Assign => {
                self.parse_assign()
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                self.expect_newline();
                Some(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    // ── def ───────────────────────────────────────────────────────────────────

    fn parse_function_def(&mut self) -> Option<Stmt> {
        let def_span = self.advance().span; // consume `def`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_suite()?;

        let span = def_span.merge(body.last().map(|s| s.span).unwrap_or(def_span));
        Some(Stmt::new(
            StmtKind::FunctionDef(FunctionDef {
                name,
                params,
                body,
                span,
            }),
            span,
        ))
    }

    /// Parse a parameter list: `a, b=1, *rest, k=2, **kw` (sans parens).
    pub(crate) fn parse_params(&mut self) -> Option<Params> {
        let mut params = Params::default();
        // After `*rest` (or a bare `*`) further named params are keyword-only.
        let mut keyword_only = false;

        loop {
            match self.peek_kind().clone() {
                TokenKind::RParen | TokenKind::Colon => break,
                TokenKind::Star => {
                    self.advance();
                    if keyword_only || params.kwarg.is_some() {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "duplicate '*' in parameter list",
                        );
                        return None;
                    }
                    keyword_only = true;
                    if let TokenKind::Identifier(_) = self.peek_kind() {
                        params.vararg = Some(self.expect_identifier()?);
                    }
                }
                TokenKind::DoubleStar => {
                    self.advance();
                    params.kwarg = Some(self.expect_identifier()?);
                }
                TokenKind::Identifier(_) => {
                    let name = self.expect_identifier()?;
                    let default = if self.eat(&TokenKind::Assign) {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    let span = name.span;
                    let param = Param {
                        name,
                        default,
                        span,
                    };
                    if keyword_only {
                        params.kwonly.push(param);
                    } else {
                        params.args.push(param);
                    }
                }
                _ => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected parameter, got '{}'", self.peek_kind()),
                    );
                    return None;
                }
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Some(params)
    }

    // ── return ────────────────────────────────────────────────────────────────

    fn parse_return(&mut self) -> Option<Stmt> {
        let span = self.advance().span; // consume `return`
        let value = if self.check(&TokenKind::Newline)
            || self.check(&TokenKind::Dedent)
            || self.at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = value.as_ref().map(|v| span.merge(v.span)).unwrap_or(span);
        self.expect_newline();
        Some(Stmt::new(StmtKind::Return(value), span))
    }

    // ── if / elif / else ──────────────────────────────────────────────────────

    fn parse_if_statement(&mut self) -> Option<Stmt> {
        let if_span = self.advance().span; // consume `if` (or `elif`, see below)
        let test = self.parse_expression()?;
        let body = self.parse_suite()?;

        let orelse = if self.check(&TokenKind::Elif) {
            // `elif` chains become a nested If in the else branch.
            vec![self.parse_if_statement()?]
        } else if self.eat(&TokenKind::Else) {
            self.parse_suite()?
        } else {
            Vec::new()
        };

        let end = orelse
            .last()
            .or(body.last())
            .map(|s| s.span)
            .unwrap_or(if_span);
        let span = if_span.merge(end);
        Some(Stmt::new(
            StmtKind::If(IfStmt {
                test,
                body,
                orelse,
                span,
            }),
            span,
        ))
    }

    // ── assignment ────────────────────────────────────────────────────────────

    fn parse_assign(&mut self) -> Option<Stmt> {
        let target = self.expect_identifier()?;
        self.expect(&TokenKind::Assign)?;
        let value = self.parse_expression()?;
        let span = target.span.merge(value.span);
        self.expect_newline();
        Some(Stmt::new(StmtKind::Assign { target, value }, span))
    }

    // ── suites ────────────────────────────────────────────────────────────────

    /// Parse a colon-introduced suite: either an inline simple statement
    /// (`def f(x): return x`) or an indented block.
    pub(crate) fn parse_suite(&mut self) -> Option<Vec<Stmt>> {
        self.expect(&TokenKind::Colon)?;

        if !self.check(&TokenKind::Newline) {
            // Inline suite: one simple statement on the same line.
            let stmt = self.parse_statement()?;
            return Some(vec![stmt]);
        }

        self.advance(); // consume the newline
        self.skip_newlines();
        self.expect(&TokenKind::Indent)?;

        let mut body = Vec::new();
        while !self.check(&TokenKind::Dedent) && !self.at_end() && !self.too_many_errors() {
            self.skip_newlines();
            if self.check(&TokenKind::Dedent) || self.at_end() {
                break;
            }
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }
        self.eat(&TokenKind::Dedent);

        if body.is_empty() {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected an indented block");
            return None;
        }
        Some(body)
    }
}
