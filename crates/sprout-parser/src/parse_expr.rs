//! Expression parsing with Python operator precedence.
//!
//! Precedence (lowest → highest):
//! 10. `lambda`
//!  9. `x if c else y` (conditional, right-associative)
//!  8. `or`
//!  7. `and`
//!  6. `not`
//!  5. comparisons (`==`, `!=`, `<`, `<=`, `>`, `>=`; chaining allowed)
//!  4. `|`, `^`, `&`, `<<`/`>>`
//!  3. `+`, `-`
//!  2. `*`, `/`, `//`, `%`, `@`
//!  1. unary `-`/`+`/`~`, then `**` (right-associative), then postfix
//!     (`.attr`, `(...)`, `[...]`)

use sprout_lexer::token::TokenKind;
use sprout_types::ast::*;
use sprout_types::{ErrorCode, Span};

use crate::parser::Parser;

/// Recursion guard for deeply nested expressions.
const MAX_EXPR_DEPTH: u32 = 64;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::UNSUPPORTED_EXPRESSION,
                format!("expression nesting exceeds {MAX_EXPR_DEPTH} levels"),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_lambda();
        self.expr_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `LambdaExpr = "lambda" [params] ":" Expr | Conditional`
    fn parse_lambda(&mut self) -> Option<Expr> {
        if !self.check(&TokenKind::Lambda) {
            return self.parse_conditional();
        }
        let lambda_span = self.advance().span;
        let params = self.parse_params()?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_expression()?;
        let span = lambda_span.merge(body.span);
        Some(Expr::new(
            ExprKind::Lambda(Box::new(LambdaExpr { params, body, span })),
            span,
        ))
    }

    /// `Conditional = OrExpr [ "if" OrExpr "else" Expr ]` — right-associative.
    fn parse_conditional(&mut self) -> Option<Expr> {
        let body = self.parse_or()?;
        if !self.eat(&TokenKind::If) {
            return Some(body);
        }
        let test = self.parse_or()?;
        self.expect(&TokenKind::Else)?;
        let orelse = self.parse_expression()?;
        let span = body.span.merge(orelse.span);
        Some(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            span,
        ))
    }

    /// `OrExpr = AndExpr { "or" AndExpr }` — flattened into one BoolOp node.
    fn parse_or(&mut self) -> Option<Expr> {
        let first = self.parse_and()?;
        if !self.check(&TokenKind::Or) {
            return Some(first);
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::Or) {
            values.push(self.parse_and()?);
        }
        let span = values[0].span.merge(values.last().unwrap().span);
        Some(Expr::new(
            ExprKind::BoolOp {
                op: BoolOpKind::Or,
                values,
            },
            span,
        ))
    }

    /// `AndExpr = NotExpr { "and" NotExpr }` — flattened into one BoolOp node.
    fn parse_and(&mut self) -> Option<Expr> {
        let first = self.parse_not()?;
        if !self.check(&TokenKind::And) {
            return Some(first);
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::And) {
            values.push(self.parse_not()?);
        }
        let span = values[0].span.merge(values.last().unwrap().span);
        Some(Expr::new(
            ExprKind::BoolOp {
                op: BoolOpKind::And,
                values,
            },
            span,
        ))
    }

    /// `NotExpr = "not" NotExpr | Comparison`
    fn parse_not(&mut self) -> Option<Expr> {
        if self.check(&TokenKind::Not) {
            let not_span = self.advance().span;
            let operand = self.parse_not()?;
            let span = not_span.merge(operand.span);
            return Some(Expr::new(
                ExprKind::UnaryOp {
                    op: UnaryOpKind::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    /// `Comparison = BitOr { CmpOp BitOr }` — chains are kept flat, Python style.
    fn parse_comparison(&mut self) -> Option<Expr> {
        let left = self.parse_bitor()?;

        if matches!(self.peek_kind(), TokenKind::In | TokenKind::Is) {
            self.error_at_current(
                ErrorCode::UNSUPPORTED_EXPRESSION,
                format!(
                    "'{}' comparisons are not supported in derive functions",
                    self.peek_kind()
                ),
            );
            return None;
        }

        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        while let Some(op) = self.match_comparison_op() {
            self.advance();
            ops.push(op);
            comparators.push(self.parse_bitor()?);
        }

        if ops.is_empty() {
            return Some(left);
        }
        let span = left.span.merge(comparators.last().unwrap().span);
        Some(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            span,
        ))
    }

    fn match_comparison_op(&self) -> Option<CmpOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::NotEq),
            TokenKind::Less => Some(CmpOp::Lt),
            TokenKind::LessEq => Some(CmpOp::LtE),
            TokenKind::Greater => Some(CmpOp::Gt),
            TokenKind::GreaterEq => Some(CmpOp::GtE),
            _ => None,
        }
    }

    /// `BitOr = BitXor { "|" BitXor }`
    fn parse_bitor(&mut self) -> Option<Expr> {
        let mut left = self.parse_bitxor()?;
        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_bitxor()?;
            left = binop(left, BinOpKind::BitOr, right);
        }
        Some(left)
    }

    /// `BitXor = BitAnd { "^" BitAnd }`
    fn parse_bitxor(&mut self) -> Option<Expr> {
        let mut left = self.parse_bitand()?;
        while self.eat(&TokenKind::Caret) {
            let right = self.parse_bitand()?;
            left = binop(left, BinOpKind::BitXor, right);
        }
        Some(left)
    }

    /// `BitAnd = Shift { "&" Shift }`
    fn parse_bitand(&mut self) -> Option<Expr> {
        let mut left = self.parse_shift()?;
        while self.eat(&TokenKind::Amp) {
            let right = self.parse_shift()?;
            left = binop(left, BinOpKind::BitAnd, right);
        }
        Some(left)
    }

    /// `Shift = Arith { ("<<" | ">>") Arith }`
    fn parse_shift(&mut self) -> Option<Expr> {
        let mut left = self.parse_arith()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::LShift => BinOpKind::LShift,
                TokenKind::RShift => BinOpKind::RShift,
                _ => break,
            };
            self.advance();
            let right = self.parse_arith()?;
            left = binop(left, op, right);
        }
        Some(left)
    }

    /// `Arith = Term { ("+" | "-") Term }`
    fn parse_arith(&mut self) -> Option<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = binop(left, op, right);
        }
        Some(left)
    }

    /// `Term = Unary { ("*" | "/" | "//" | "%" | "@") Unary }`
    fn parse_term(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOpKind::Mul,
                TokenKind::Slash => BinOpKind::Div,
                TokenKind::DoubleSlash => BinOpKind::FloorDiv,
                TokenKind::Percent => BinOpKind::Mod,
                TokenKind::At => BinOpKind::MatMult,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binop(left, op, right);
        }
        Some(left)
    }

    /// `Unary = ("-" | "+" | "~") Unary | Power`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOpKind::Neg),
            TokenKind::Plus => Some(UnaryOpKind::Pos),
            TokenKind::Tilde => Some(UnaryOpKind::Invert),
            _ => None,
        };
        if let Some(op) = op {
            let op_span = self.advance().span;
            let operand = self.parse_unary()?;
            let span = op_span.merge(operand.span);
            return Some(Expr::new(
                ExprKind::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_power()
    }

    /// `Power = Postfix [ "**" Unary ]` — right-associative.
    fn parse_power(&mut self) -> Option<Expr> {
        let base = self.parse_postfix()?;
        if self.eat(&TokenKind::DoubleStar) {
            let exp = self.parse_unary()?;
            return Some(binop(base, BinOpKind::Pow, exp));
        }
        Some(base)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Postfix: attribute access, calls, subscripts
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let attr = self.expect_identifier()?;
                    let span = expr.span.merge(attr.span);
                    expr = Expr::new(
                        ExprKind::Attribute {
                            value: Box::new(expr),
                            attr,
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    self.advance();
                    let (args, keywords) = self.parse_call_args()?;
                    let close = self.expect(&TokenKind::RParen)?;
                    let span = expr.span.merge(close.span);
                    expr = Expr::new(
                        ExprKind::Call {
                            func: Box::new(expr),
                            args,
                            keywords,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let close = self.expect(&TokenKind::RBracket)?;
                    let span = expr.span.merge(close.span);
                    expr = Expr::new(
                        ExprKind::Subscript {
                            value: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Some(expr)
    }

    /// Parse call arguments: positional first, then `name=value` keywords.
    fn parse_call_args(&mut self) -> Option<(Vec<Expr>, Vec<(Ident, Expr)>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let is_keyword = matches!(self.peek_kind(), TokenKind::Identifier(_))
                && *self.look_ahead(1) == TokenKind::Assign;
            if is_keyword {
                let name = self.expect_identifier()?;
                self.expect(&TokenKind::Assign)?;
                let value = self.parse_expression()?;
                keywords.push((name, value));
            } else {
                if !keywords.is_empty() {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "positional argument follows keyword argument",
                    );
                    return None;
                }
                if self.check(&TokenKind::Star) {
                    let star_span = self.advance().span;
                    let inner = self.parse_expression()?;
                    let span = star_span.merge(inner.span);
                    args.push(Expr::new(ExprKind::Starred(Box::new(inner)), span));
                } else {
                    args.push(self.parse_expression()?);
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Some((args, keywords))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Atoms
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_atom(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Some(Expr::new(ExprKind::Int(n), span))
            }
            TokenKind::Float(x) => {
                self.advance();
                Some(Expr::new(ExprKind::Float(x), span))
            }
            TokenKind::Str(s) => {
                self.advance();
                Some(Expr::new(ExprKind::Str(s), span))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(true), span))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(false), span))
            }
            TokenKind::NoneKw => {
                self.advance();
                Some(Expr::new(ExprKind::NoneLit, span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Some(Expr::new(ExprKind::Name(name), span))
            }
            TokenKind::LParen => self.parse_paren_or_tuple(),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict(),
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// `( Expr )` grouping, `()` empty tuple, or `(a, b, ...)` tuple.
    fn parse_paren_or_tuple(&mut self) -> Option<Expr> {
        let open = self.advance().span; // consume '('
        if self.check(&TokenKind::RParen) {
            let close = self.advance().span;
            return Some(Expr::new(ExprKind::Tuple(Vec::new()), open.merge(close)));
        }

        let first = self.parse_expression()?;
        if !self.check(&TokenKind::Comma) {
            let close = self.expect(&TokenKind::RParen)?;
            // Plain grouping: parens are not preserved in the tree.
            let mut inner = first;
            inner.span = open.merge(close.span);
            return Some(inner);
        }

        let mut elems = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break; // trailing comma
            }
            elems.push(self.parse_expression()?);
        }
        let close = self.expect(&TokenKind::RParen)?;
        Some(Expr::new(ExprKind::Tuple(elems), open.merge(close.span)))
    }

    /// `[ Expr, ... ]`
    fn parse_list(&mut self) -> Option<Expr> {
        let open = self.advance().span; // consume '['
        let mut elems = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.at_end() {
            elems.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RBracket)?;
        Some(Expr::new(ExprKind::List(elems), open.merge(close.span)))
    }

    /// `{ Key: Value, ... }`
    fn parse_dict(&mut self) -> Option<Expr> {
        let open = self.advance().span; // consume '{'
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let key = self.parse_expression()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RBrace)?;
        Some(Expr::new(ExprKind::Dict(entries), open.merge(close.span)))
    }
}

/// Build a binary operator node spanning both operands.
fn binop(left: Expr, op: BinOpKind, right: Expr) -> Expr {
    let span: Span = left.span.merge(right.span);
    Expr::new(
        ExprKind::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
