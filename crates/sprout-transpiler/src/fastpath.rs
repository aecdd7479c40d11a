//! Direct lambda-to-arrow translation for the common case.
//!
//! Most derive functions are one-line lambdas over a handful of trial
//! variables.  Those never need the whole-program compiler: as long as every
//! construct in the body has a faithful JavaScript spelling, the arrow
//! function can be written out straight from the AST.  Anything outside the
//! supported subset raises [`FastPathRejection`], and the caller falls back
//! to the full pipeline.

use sprout_types::ast::*;

use crate::encode::{quote, render_float};

/// Signal that the input is outside the fast-path subset.  Not an error:
/// the full pipeline handles everything this path declines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastPathRejection;

// JavaScript operator precedence, only the levels this subset emits.
const P_COND: u8 = 2;
const P_OR: u8 = 3;
const P_AND: u8 = 4;
const P_EQ: u8 = 9;
const P_REL: u8 = 10;
const P_ADD: u8 = 12;
const P_MUL: u8 = 13;
const P_UNARY: u8 = 15;
const P_ATOM: u8 = 17;

/// Translate a module holding a single plain lambda into a parenthesized
/// arrow function, or reject it.
pub fn emit_fast(module: &Module) -> Result<String, FastPathRejection> {
    let lambda = single_lambda(module).ok_or(FastPathRejection)?;
    let params = plain_params(&lambda.params).ok_or(FastPathRejection)?;
    let body = emit(&lambda.body, 0)?;
    Ok(format!("(({}) => {{ return {}; }})", params.join(", "), body))
}

fn single_lambda(module: &Module) -> Option<&LambdaExpr> {
    match module.body.as_slice() {
        [stmt] => match &stmt.kind {
            StmtKind::Expr(expr) => match &expr.kind {
                ExprKind::Lambda(lam) => Some(lam),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Positional parameters without defaults only.  Defaults, `*args`,
/// keyword-only parameters, and `**kwargs` all force the full pipeline.
fn plain_params(params: &Params) -> Option<Vec<String>> {
    if params.vararg.is_some() || params.kwarg.is_some() || !params.kwonly.is_empty() {
        return None;
    }
    let mut out = Vec::with_capacity(params.args.len());
    for p in &params.args {
        if p.default.is_some() {
            return None;
        }
        out.push(p.name.name.clone());
    }
    Some(out)
}

fn emit(expr: &Expr, min_prec: u8) -> Result<String, FastPathRejection> {
    let (text, prec) = match &expr.kind {
        ExprKind::Int(n) => (n.to_string(), P_ATOM),
        ExprKind::Float(x) => (render_float(*x), P_ATOM),
        ExprKind::Str(s) => (quote(s), P_ATOM),
        ExprKind::Bool(b) => (if *b { "true" } else { "false" }.to_string(), P_ATOM),
        ExprKind::NoneLit => ("null".to_string(), P_ATOM),
        ExprKind::Name(name) => (name.clone(), P_ATOM),
        ExprKind::Call {
            func,
            args,
            keywords,
        } => (emit_call(func, args, keywords)?, P_ATOM),
        ExprKind::BinOp { left, op, right } => {
            let (sym, prec) = match op {
                BinOpKind::Add => ("+", P_ADD),
                BinOpKind::Sub => ("-", P_ADD),
                BinOpKind::Mul => ("*", P_MUL),
                BinOpKind::Div => ("/", P_MUL),
                BinOpKind::Mod => ("%", P_MUL),
                _ => return Err(FastPathRejection),
            };
            // All five operators are left-associative.
            let l = emit(left, prec)?;
            let r = emit(right, prec + 1)?;
            (format!("{l} {sym} {r}"), prec)
        }
        ExprKind::UnaryOp { op, operand } => match op {
            UnaryOpKind::Neg => (format!("-{}", emit(operand, P_UNARY)?), P_UNARY),
            UnaryOpKind::Not => (format!("!({})", emit(operand, 0)?), P_UNARY),
            _ => return Err(FastPathRejection),
        },
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => {
            // A chain like `1 < x < 10` needs the truthiness shims.
            let (op, right) = match (ops.as_slice(), comparators.as_slice()) {
                ([op], [right]) => (op, right),
                _ => return Err(FastPathRejection),
            };
            let sym = match op {
                CmpOp::Eq => "===",
                CmpOp::NotEq => "!==",
                CmpOp::Lt => "<",
                CmpOp::LtE => "<=",
                CmpOp::Gt => ">",
                CmpOp::GtE => ">=",
            };
            let prec = match op {
                CmpOp::Eq | CmpOp::NotEq => P_EQ,
                _ => P_REL,
            };
            let l = emit(left, prec)?;
            let r = emit(right, prec + 1)?;
            (format!("{l} {sym} {r}"), prec)
        }
        ExprKind::BoolOp { op, values } => {
            let (sym, prec) = match op {
                BoolOpKind::And => ("&&", P_AND),
                BoolOpKind::Or => ("||", P_OR),
            };
            let parts: Result<Vec<String>, FastPathRejection> =
                values.iter().map(|v| emit(v, prec)).collect();
            (parts?.join(&format!(" {sym} ")), prec)
        }
        ExprKind::IfExp { test, body, orelse } => {
            let t = emit(test, P_COND + 1)?;
            let b = emit(body, P_COND)?;
            let o = emit(orelse, P_COND)?;
            (format!("{t} ? {b} : {o}"), P_COND)
        }
        // Containers, subscripts, bare attributes, and nested lambdas go
        // through the full pipeline.
        _ => return Err(FastPathRejection),
    };
    if prec < min_prec {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

fn emit_call(
    func: &Expr,
    args: &[Expr],
    keywords: &[(Ident, Expr)],
) -> Result<String, FastPathRejection> {
    if !keywords.is_empty() {
        return Err(FastPathRejection);
    }
    match &func.kind {
        ExprKind::Name(name) => {
            let rendered: Result<Vec<String>, FastPathRejection> =
                args.iter().map(|a| emit(a, 0)).collect();
            let callee = if name == "str" { "String" } else { name };
            Ok(format!("{callee}({})", rendered?.join(", ")))
        }
        ExprKind::Attribute { value, attr } => {
            let method = match attr.name.as_str() {
                "lower" => "toLowerCase",
                "upper" => "toUpperCase",
                _ => return Err(FastPathRejection),
            };
            if !args.is_empty() {
                return Err(FastPathRejection);
            }
            Ok(format!("{}.{method}()", emit(value, P_ATOM)?))
        }
        _ => Err(FastPathRejection),
    }
}
