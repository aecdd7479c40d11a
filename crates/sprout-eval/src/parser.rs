//! Recursive-descent parser for the evaluated JavaScript subset.
//!
//! Covers exactly what the compiled programs contain: literals, arrays,
//! object literals, identifiers, member/index/call chains, unary and binary
//! operators, `&&`/`||`, ternaries, arrow functions, `function` expressions
//! (with default and rest parameters), and the statement forms `var`/`let`/
//! `const`, `return`, `if`/`else`, `throw`, and expression statements.

use crate::error::{EvalError, EvalResult};
use crate::lexer::{scan, JsToken};

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum JsExpr {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Array(Vec<JsExpr>),
    Object(Vec<(JsExpr, JsExpr)>),
    Ident(String),
    Member {
        object: Box<JsExpr>,
        property: String,
    },
    Index {
        object: Box<JsExpr>,
        index: Box<JsExpr>,
    },
    Call {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    Unary {
        op: JsUnaryOp,
        operand: Box<JsExpr>,
    },
    Binary {
        left: Box<JsExpr>,
        op: JsBinaryOp,
        right: Box<JsExpr>,
    },
    Logical {
        left: Box<JsExpr>,
        and: bool,
        right: Box<JsExpr>,
    },
    Ternary {
        test: Box<JsExpr>,
        then: Box<JsExpr>,
        otherwise: Box<JsExpr>,
    },
    Function {
        params: Vec<JsParam>,
        body: Vec<JsStmt>,
    },
    /// `...expr` in call-argument position.
    Spread(Box<JsExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsUnaryOp {
    Not,
    Neg,
    Pos,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    StrictEq,
    StrictNeq,
    Lt,
    Le,
    Gt,
    Ge,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct JsParam {
    pub name: String,
    pub default: Option<JsExpr>,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsStmt {
    /// `var`/`let`/`const name = expr;`
    Decl { name: String, value: JsExpr },
    Return(Option<JsExpr>),
    If {
        test: JsExpr,
        then: Vec<JsStmt>,
        otherwise: Vec<JsStmt>,
    },
    Throw(JsExpr),
    Expr(JsExpr),
}

// ── Parser ────────────────────────────────────────────────────────────────────

/// Parse `source` as a single expression; trailing tokens are an error.
pub fn parse_expr_source(source: &str) -> EvalResult<JsExpr> {
    let tokens = scan(source)?;
    let mut parser = JsParser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    parser.expect(JsToken::Eof)?;
    Ok(expr)
}

struct JsParser {
    tokens: Vec<JsToken>,
    pos: usize,
}

impl JsParser {
    fn peek(&self) -> &JsToken {
        self.tokens.get(self.pos).unwrap_or(&JsToken::Eof)
    }

    fn peek_at(&self, n: usize) -> &JsToken {
        self.tokens.get(self.pos + n).unwrap_or(&JsToken::Eof)
    }

    fn advance(&mut self) -> JsToken {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &JsToken) -> bool {
        if self.peek() == tok {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: JsToken) -> EvalResult<()> {
        if self.peek() == &tok {
            self.pos += 1;
            Ok(())
        } else {
            Err(EvalError::Parse(format!(
                "expected {tok:?}, got {:?} at token {}",
                self.peek(),
                self.pos
            )))
        }
    }

    fn expect_ident(&mut self) -> EvalResult<String> {
        match self.advance() {
            JsToken::Ident(name) => Ok(name),
            other => Err(EvalError::Parse(format!(
                "expected identifier, got {other:?}"
            ))),
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> EvalResult<JsExpr> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> EvalResult<JsExpr> {
        let test = self.parse_or()?;
        if !self.eat(&JsToken::Question) {
            return Ok(test);
        }
        let then = self.parse_expr()?;
        self.expect(JsToken::Colon)?;
        let otherwise = self.parse_expr()?;
        Ok(JsExpr::Ternary {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_and()?;
        while self.eat(&JsToken::OrOr) {
            let right = self.parse_and()?;
            left = JsExpr::Logical {
                left: Box::new(left),
                and: false,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_bitor()?;
        while self.eat(&JsToken::AndAnd) {
            let right = self.parse_bitor()?;
            left = JsExpr::Logical {
                left: Box::new(left),
                and: true,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_bitor(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_bitxor()?;
        while self.eat(&JsToken::Pipe) {
            let right = self.parse_bitxor()?;
            left = binary(left, JsBinaryOp::BitOr, right);
        }
        Ok(left)
    }

    fn parse_bitxor(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_bitand()?;
        while self.eat(&JsToken::Caret) {
            let right = self.parse_bitand()?;
            left = binary(left, JsBinaryOp::BitXor, right);
        }
        Ok(left)
    }

    fn parse_bitand(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_equality()?;
        while self.eat(&JsToken::Amp) {
            let right = self.parse_equality()?;
            left = binary(left, JsBinaryOp::BitAnd, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                JsToken::StrictEq => JsBinaryOp::StrictEq,
                JsToken::StrictNeq => JsBinaryOp::StrictNeq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.peek() {
                JsToken::Less => JsBinaryOp::Lt,
                JsToken::LessEq => JsBinaryOp::Le,
                JsToken::Greater => JsBinaryOp::Gt,
                JsToken::GreaterEq => JsBinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_shift()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                JsToken::LShift => JsBinaryOp::Shl,
                JsToken::RShift => JsBinaryOp::Shr,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                JsToken::Plus => JsBinaryOp::Add,
                JsToken::Minus => JsBinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> EvalResult<JsExpr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                JsToken::Star => JsBinaryOp::Mul,
                JsToken::Slash => JsBinaryOp::Div,
                JsToken::Percent => JsBinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> EvalResult<JsExpr> {
        let op = match self.peek() {
            JsToken::Bang => Some(JsUnaryOp::Not),
            JsToken::Minus => Some(JsUnaryOp::Neg),
            JsToken::Plus => Some(JsUnaryOp::Pos),
            JsToken::Tilde => Some(JsUnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(JsExpr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> EvalResult<JsExpr> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek() {
                JsToken::Dot => {
                    self.advance();
                    let property = self.expect_ident()?;
                    expr = JsExpr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                JsToken::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(JsToken::RBracket)?;
                    expr = JsExpr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                JsToken::LParen => {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(JsToken::RParen)?;
                    expr = JsExpr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> EvalResult<Vec<JsExpr>> {
        let mut args = Vec::new();
        while self.peek() != &JsToken::RParen && self.peek() != &JsToken::Eof {
            if self.eat(&JsToken::Ellipsis) {
                let inner = self.parse_expr()?;
                args.push(JsExpr::Spread(Box::new(inner)));
            } else {
                args.push(self.parse_expr()?);
            }
            if !self.eat(&JsToken::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn parse_atom(&mut self) -> EvalResult<JsExpr> {
        match self.peek().clone() {
            JsToken::Num(n) => {
                self.advance();
                Ok(JsExpr::Num(n))
            }
            JsToken::Str(s) => {
                self.advance();
                Ok(JsExpr::Str(s))
            }
            JsToken::True => {
                self.advance();
                Ok(JsExpr::Bool(true))
            }
            JsToken::False => {
                self.advance();
                Ok(JsExpr::Bool(false))
            }
            JsToken::Null => {
                self.advance();
                Ok(JsExpr::Null)
            }
            JsToken::Undefined => {
                self.advance();
                Ok(JsExpr::Undefined)
            }
            JsToken::Ident(name) => {
                self.advance();
                // `name => expr` single-parameter arrow.
                if self.eat(&JsToken::Arrow) {
                    let params = vec![JsParam {
                        name,
                        default: None,
                        rest: false,
                    }];
                    let body = self.parse_arrow_body()?;
                    return Ok(JsExpr::Function { params, body });
                }
                Ok(JsExpr::Ident(name))
            }
            JsToken::Function => {
                self.advance();
                // Optional name on function expressions; ignored.
                if matches!(self.peek(), JsToken::Ident(_)) {
                    self.advance();
                }
                self.expect(JsToken::LParen)?;
                let params = self.parse_params()?;
                self.expect(JsToken::RParen)?;
                self.expect(JsToken::LBrace)?;
                let body = self.parse_block_body()?;
                Ok(JsExpr::Function { params, body })
            }
            JsToken::LParen => {
                if self.is_arrow_ahead() {
                    self.advance();
                    let params = self.parse_params()?;
                    self.expect(JsToken::RParen)?;
                    self.expect(JsToken::Arrow)?;
                    let body = self.parse_arrow_body()?;
                    return Ok(JsExpr::Function { params, body });
                }
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(JsToken::RParen)?;
                Ok(inner)
            }
            JsToken::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                while self.peek() != &JsToken::RBracket && self.peek() != &JsToken::Eof {
                    elems.push(self.parse_expr()?);
                    if !self.eat(&JsToken::Comma) {
                        break;
                    }
                }
                self.expect(JsToken::RBracket)?;
                Ok(JsExpr::Array(elems))
            }
            JsToken::LBrace => self.parse_object(),
            other => Err(EvalError::Parse(format!(
                "expected expression, got {other:?} at token {}",
                self.pos
            ))),
        }
    }

    fn parse_object(&mut self) -> EvalResult<JsExpr> {
        self.expect(JsToken::LBrace)?;
        let mut entries = Vec::new();
        while self.peek() != &JsToken::RBrace && self.peek() != &JsToken::Eof {
            let key = match self.advance() {
                JsToken::Str(s) => JsExpr::Str(s),
                JsToken::Ident(name) => JsExpr::Str(name),
                JsToken::Num(n) => JsExpr::Num(n),
                JsToken::LBracket => {
                    let computed = self.parse_expr()?;
                    self.expect(JsToken::RBracket)?;
                    computed
                }
                other => {
                    return Err(EvalError::Parse(format!(
                        "expected object key, got {other:?}"
                    )))
                }
            };
            self.expect(JsToken::Colon)?;
            let value = self.parse_expr()?;
            entries.push((key, value));
            if !self.eat(&JsToken::Comma) {
                break;
            }
        }
        self.expect(JsToken::RBrace)?;
        Ok(JsExpr::Object(entries))
    }

    /// Looks past a balanced `(...)` for `=>`, distinguishing arrow-function
    /// parameter lists from parenthesized expressions.
    fn is_arrow_ahead(&self) -> bool {
        debug_assert_eq!(self.peek(), &JsToken::LParen);
        let mut depth = 0usize;
        let mut n = 0usize;
        loop {
            match self.peek_at(n) {
                JsToken::LParen => depth += 1,
                JsToken::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.peek_at(n + 1) == &JsToken::Arrow;
                    }
                }
                JsToken::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_params(&mut self) -> EvalResult<Vec<JsParam>> {
        let mut params = Vec::new();
        while self.peek() != &JsToken::RParen && self.peek() != &JsToken::Eof {
            let rest = self.eat(&JsToken::Ellipsis);
            let name = self.expect_ident()?;
            let default = if self.eat(&JsToken::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(JsParam {
                name,
                default,
                rest,
            });
            if !self.eat(&JsToken::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// Arrow body: `{ statements }` or a bare expression (implicit return).
    fn parse_arrow_body(&mut self) -> EvalResult<Vec<JsStmt>> {
        if self.eat(&JsToken::LBrace) {
            self.parse_block_body()
        } else {
            let expr = self.parse_expr()?;
            Ok(vec![JsStmt::Return(Some(expr))])
        }
    }

    // ── Statements ────────────────────────────────────────────────────────

    /// Parse statements up to and including the closing `}`.
    fn parse_block_body(&mut self) -> EvalResult<Vec<JsStmt>> {
        let mut stmts = Vec::new();
        while self.peek() != &JsToken::RBrace && self.peek() != &JsToken::Eof {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(JsToken::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> EvalResult<JsStmt> {
        match self.peek() {
            JsToken::Var | JsToken::Let | JsToken::Const => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(JsToken::Assign)?;
                let value = self.parse_expr()?;
                self.eat(&JsToken::Semi);
                Ok(JsStmt::Decl { name, value })
            }
            JsToken::Return => {
                self.advance();
                if self.eat(&JsToken::Semi) {
                    return Ok(JsStmt::Return(None));
                }
                let value = self.parse_expr()?;
                self.eat(&JsToken::Semi);
                Ok(JsStmt::Return(Some(value)))
            }
            JsToken::If => self.parse_if_stmt(),
            JsToken::Throw => {
                self.advance();
                // `throw new Error('...')` appears in the runtime prelude.
                self.eat(&JsToken::New);
                let value = self.parse_expr()?;
                self.eat(&JsToken::Semi);
                Ok(JsStmt::Throw(value))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.eat(&JsToken::Semi);
                Ok(JsStmt::Expr(expr))
            }
        }
    }

    fn parse_if_stmt(&mut self) -> EvalResult<JsStmt> {
        self.expect(JsToken::If)?;
        self.expect(JsToken::LParen)?;
        let test = self.parse_expr()?;
        self.expect(JsToken::RParen)?;
        self.expect(JsToken::LBrace)?;
        let then = self.parse_block_body()?;

        let otherwise = if self.eat(&JsToken::Else) {
            if self.peek() == &JsToken::If {
                vec![self.parse_if_stmt()?]
            } else {
                self.expect(JsToken::LBrace)?;
                self.parse_block_body()?
            }
        } else {
            Vec::new()
        };

        Ok(JsStmt::If {
            test,
            then,
            otherwise,
        })
    }
}

fn binary(left: JsExpr, op: JsBinaryOp, right: JsExpr) -> JsExpr {
    JsExpr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
