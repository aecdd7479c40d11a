//! Expression emission.
//!
//! Every expression is rendered to a JavaScript expression string.
//! Parentheses are inserted from a precedence table, mirroring how the
//! unparser handles the source language: a subexpression is wrapped exactly
//! when its precedence is below the minimum its position requires.
//!
//! Operators are emitted as native JavaScript operators.  Callers that need
//! source-language operator semantics (duck-typed equality, list
//! concatenation, true modulo) must rewrite operators into calls to the
//! runtime bindings before compiling; see `runtime.rs`.

use sprout_types::ast::*;

use crate::error::{CodegenError, CodegenResult};
use crate::stmt::emit_params;

// ── JavaScript precedence levels ──────────────────────────────────────────────

pub(crate) const P_COND: u8 = 2;
const P_OR: u8 = 3;
const P_AND: u8 = 4;
const P_BITOR: u8 = 5;
const P_BITXOR: u8 = 6;
const P_BITAND: u8 = 7;
const P_EQUALITY: u8 = 8;
const P_RELATIONAL: u8 = 9;
const P_SHIFT: u8 = 10;
const P_ADDITIVE: u8 = 11;
const P_MULTIPLICATIVE: u8 = 12;
const P_UNARY: u8 = 14;
const P_POSTFIX: u8 = 15;
const P_ATOM: u8 = 16;

/// Precedence of a native JavaScript binary operator.
fn bin_prec(op: BinOpKind) -> u8 {
    match op {
        BinOpKind::BitOr => P_BITOR,
        BinOpKind::BitXor => P_BITXOR,
        BinOpKind::BitAnd => P_BITAND,
        BinOpKind::LShift | BinOpKind::RShift => P_SHIFT,
        BinOpKind::Add | BinOpKind::Sub => P_ADDITIVE,
        BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => P_MULTIPLICATIVE,
        // Rendered as Math.floor / Math.pow calls.
        BinOpKind::FloorDiv | BinOpKind::Pow | BinOpKind::MatMult => P_ATOM,
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::NoneLit
        | ExprKind::List(_)
        | ExprKind::Tuple(_)
        | ExprKind::Dict(_)
        | ExprKind::Name(_)
        | ExprKind::Lambda(_) => P_ATOM,
        ExprKind::Attribute { .. } | ExprKind::Subscript { .. } | ExprKind::Call { .. } => {
            P_POSTFIX
        }
        ExprKind::UnaryOp { .. } => P_UNARY,
        ExprKind::BinOp { op, .. } => bin_prec(*op),
        ExprKind::Compare { ops, .. } => {
            if ops.len() > 1 {
                P_AND // chains are joined with &&
            } else if matches!(ops[0], CmpOp::Eq | CmpOp::NotEq) {
                P_EQUALITY
            } else {
                P_RELATIONAL
            }
        }
        ExprKind::BoolOp { op, .. } => match op {
            BoolOpKind::And => P_AND,
            BoolOpKind::Or => P_OR,
        },
        ExprKind::IfExp { .. } => P_COND,
        ExprKind::Starred(_) => P_ATOM,
    }
}

// ── Emission ──────────────────────────────────────────────────────────────────

/// Emit `expr` as JavaScript, parenthesized if its precedence falls below
/// `min_prec`.
pub fn emit_expr(expr: &Expr, min_prec: u8) -> CodegenResult<String> {
    let rendered = emit_unwrapped(expr)?;
    if expr_prec(expr) < min_prec {
        Ok(format!("({rendered})"))
    } else {
        Ok(rendered)
    }
}

fn emit_unwrapped(expr: &Expr) -> CodegenResult<String> {
    match &expr.kind {
        ExprKind::Int(n) => Ok(n.to_string()),
        ExprKind::Float(x) => Ok(render_float(*x)),
        ExprKind::Str(s) => emit_string(s),
        ExprKind::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        ExprKind::NoneLit => Ok("null".to_string()),

        ExprKind::List(elems) | ExprKind::Tuple(elems) => {
            let parts = emit_comma_list(elems)?;
            Ok(format!("[{parts}]"))
        }
        ExprKind::Dict(entries) => emit_dict(entries),

        ExprKind::Name(name) => Ok(name.clone()),

        ExprKind::Attribute { value, attr } => {
            let base = emit_expr(value, P_POSTFIX)?;
            Ok(format!("{base}.{}", attr.name))
        }
        ExprKind::Subscript { value, index } => {
            let base = emit_expr(value, P_POSTFIX)?;
            let idx = emit_expr(index, 0)?;
            Ok(format!("{base}[{idx}]"))
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => emit_call(func, args, keywords),

        ExprKind::BinOp { left, op, right } => emit_binop(left, *op, right),
        ExprKind::UnaryOp { op, operand } => {
            let inner = emit_expr(operand, P_UNARY)?;
            let sym = match op {
                UnaryOpKind::Neg => "-",
                UnaryOpKind::Pos => "+",
                UnaryOpKind::Invert => "~",
                UnaryOpKind::Not => "!",
            };
            Ok(format!("{sym}{inner}"))
        }

        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => emit_compare(left, ops, comparators),
        ExprKind::BoolOp { op, values } => {
            let sym = match op {
                BoolOpKind::And => " && ",
                BoolOpKind::Or => " || ",
            };
            let prec = expr_prec(expr);
            let parts: Vec<String> = values
                .iter()
                .map(|v| emit_expr(v, prec + 1))
                .collect::<CodegenResult<_>>()?;
            Ok(parts.join(sym))
        }

        ExprKind::IfExp { test, body, orelse } => {
            let t = emit_expr(test, P_COND + 1)?;
            let b = emit_expr(body, P_COND + 1)?;
            // Right operand may itself be a conditional.
            let o = emit_expr(orelse, P_COND)?;
            Ok(format!("{t} ? {b} : {o}"))
        }

        ExprKind::Lambda(lam) => {
            let params = emit_params(&lam.params)?;
            let body = emit_expr(&lam.body, 0)?;
            Ok(format!("(function ({params}) {{ return {body}; }})"))
        }

        // Only valid in call-argument position; JS spread syntax.
        ExprKind::Starred(inner) => {
            let value = emit_expr(inner, P_POSTFIX)?;
            Ok(format!("...{value}"))
        }
    }
}

fn emit_binop(left: &Expr, op: BinOpKind, right: &Expr) -> CodegenResult<String> {
    match op {
        BinOpKind::FloorDiv => {
            let l = emit_expr(left, P_MULTIPLICATIVE)?;
            let r = emit_expr(right, P_MULTIPLICATIVE + 1)?;
            Ok(format!("Math.floor({l} / {r})"))
        }
        BinOpKind::Pow => {
            let l = emit_expr(left, 0)?;
            let r = emit_expr(right, 0)?;
            Ok(format!("Math.pow({l}, {r})"))
        }
        BinOpKind::MatMult => Err(CodegenError::Unsupported(
            "matrix multiplication has no JavaScript operator".to_string(),
        )),
        _ => {
            let prec = bin_prec(op);
            let l = emit_expr(left, prec)?;
            let r = emit_expr(right, prec + 1)?;
            let sym = match op {
                BinOpKind::Add => "+",
                BinOpKind::Sub => "-",
                BinOpKind::Mul => "*",
                BinOpKind::Div => "/",
                BinOpKind::Mod => "%",
                BinOpKind::LShift => "<<",
                BinOpKind::RShift => ">>",
                BinOpKind::BitAnd => "&",
                BinOpKind::BitOr => "|",
                BinOpKind::BitXor => "^",
                BinOpKind::FloorDiv | BinOpKind::Pow | BinOpKind::MatMult => unreachable!(),
            };
            Ok(format!("{l} {sym} {r}"))
        }
    }
}

fn cmp_sym(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "===",
        CmpOp::NotEq => "!==",
        CmpOp::Lt => "<",
        CmpOp::LtE => "<=",
        CmpOp::Gt => ">",
        CmpOp::GtE => ">=",
    }
}

/// A single comparison maps to one native operator.  Chains are expanded to
/// pairwise comparisons joined with `&&`; middle operands are re-rendered,
/// which re-evaluates them, acceptable for the effect-free subset compiled
/// here.
fn emit_compare(left: &Expr, ops: &[CmpOp], comparators: &[Expr]) -> CodegenResult<String> {
    let mut pairs = Vec::with_capacity(ops.len());
    let mut lhs = left;
    for (op, rhs) in ops.iter().zip(comparators) {
        let l = emit_expr(lhs, P_RELATIONAL)?;
        let r = emit_expr(rhs, P_RELATIONAL + 1)?;
        pairs.push(format!("{l} {} {r}", cmp_sym(*op)));
        lhs = rhs;
    }
    Ok(pairs.join(" && "))
}

/// Calls.  A handful of source builtins and string methods map to their
/// JavaScript equivalents; everything else is emitted as an ordinary call.
/// Attribute calls on unresolved module names (`math.floor(x)`) pass through
/// verbatim for downstream rewriting.
fn emit_call(func: &Expr, args: &[Expr], keywords: &[(Ident, Expr)]) -> CodegenResult<String> {
    if !keywords.is_empty() {
        return Err(CodegenError::Unsupported(
            "keyword arguments at call sites".to_string(),
        ));
    }
    let rendered_args = emit_comma_list(args)?;

    if let ExprKind::Name(name) = &func.kind {
        if name == "str" {
            return Ok(format!("String({rendered_args})"));
        }
    }
    if let ExprKind::Attribute { value, attr } = &func.kind {
        if args.is_empty() {
            let mapped = match attr.name.as_str() {
                "lower" => Some("toLowerCase"),
                "upper" => Some("toUpperCase"),
                "strip" => Some("trim"),
                _ => None,
            };
            if let Some(js_method) = mapped {
                let base = emit_expr(value, P_POSTFIX)?;
                return Ok(format!("{base}.{js_method}()"));
            }
        }
    }

    let callee = emit_expr(func, P_POSTFIX)?;
    Ok(format!("{callee}({rendered_args})"))
}

fn emit_dict(entries: &[(Expr, Expr)]) -> CodegenResult<String> {
    let mut parts = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let v = emit_expr(value, P_COND)?;
        let rendered = match &key.kind {
            ExprKind::Str(s) => format!("{}: {v}", emit_string(s)?),
            _ => {
                let k = emit_expr(key, 0)?;
                format!("[{k}]: {v}")
            }
        };
        parts.push(rendered);
    }
    Ok(format!("{{{}}}", parts.join(", ")))
}

fn emit_comma_list(exprs: &[Expr]) -> CodegenResult<String> {
    let parts: Vec<String> = exprs
        .iter()
        .map(|e| emit_expr(e, P_COND))
        .collect::<CodegenResult<_>>()?;
    Ok(parts.join(", "))
}

/// JSON string escaping is a subset of JavaScript string syntax, so the
/// serializer doubles as the string emitter.
pub(crate) fn emit_string(s: &str) -> CodegenResult<String> {
    serde_json::to_string(s)
        .map_err(|e| CodegenError::Internal(format!("string escaping failed: {e}")))
}

/// Keep a trailing `.0` so the token still reads as the same literal.
fn render_float(x: f64) -> String {
    let text = x.to_string();
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}
