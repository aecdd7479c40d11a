//! The touch-key sentinel: a touchscreen response button standing in for a
//! key press.  Derive functions may reference touch keys (directly or via
//! `TouchKey.left()`-style constructor calls); those references compile to
//! the key's string literal rather than to function calls.

use sprout_types::ast::{Expr, ExprKind, Module, Stmt, StmtKind};
use sprout_types::Span;

use crate::encode::ToJs;

/// A touchscreen response button position.  Every position maps to the key
/// it emulates: left-side buttons to `"l"`, right-side buttons to `"r"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKey {
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl TouchKey {
    /// The emulated key.
    pub fn key(&self) -> &'static str {
        match self {
            TouchKey::Left | TouchKey::TopLeft | TouchKey::BottomLeft => "l",
            TouchKey::Right | TouchKey::TopRight | TouchKey::BottomRight => "r",
        }
    }

    /// The constructor name used in callable source (`TouchKey.<name>()`).
    fn from_constructor(name: &str) -> Option<TouchKey> {
        match name {
            "left" => Some(TouchKey::Left),
            "right" => Some(TouchKey::Right),
            "top_left" => Some(TouchKey::TopLeft),
            "top_right" => Some(TouchKey::TopRight),
            "bottom_left" => Some(TouchKey::BottomLeft),
            "bottom_right" => Some(TouchKey::BottomRight),
            _ => None,
        }
    }
}

impl ToJs for TouchKey {
    fn to_js(&self) -> String {
        format!("\"{}\"", self.key())
    }
}

/// Rewrite touch-key references to string constants.
///
/// Two shapes are replaced: `TouchKey.<ctor>()` calls, and bare names the
/// caller declared as touch-key globals (`replacements`).
pub fn rewrite_module(module: &mut Module, replacements: &[(String, TouchKey)]) {
    for stmt in &mut module.body {
        rewrite_stmt(stmt, replacements);
    }
}

fn rewrite_stmt(stmt: &mut Stmt, replacements: &[(String, TouchKey)]) {
    match &mut stmt.kind {
        StmtKind::FunctionDef(def) => {
            for p in def.params.args.iter_mut().chain(def.params.kwonly.iter_mut()) {
                if let Some(default) = &mut p.default {
                    rewrite_expr(default, replacements);
                }
            }
            for s in &mut def.body {
                rewrite_stmt(s, replacements);
            }
        }
        StmtKind::Return(Some(expr)) => rewrite_expr(expr, replacements),
        StmtKind::Return(None) | StmtKind::Pass => {}
        StmtKind::If(if_stmt) => {
            rewrite_expr(&mut if_stmt.test, replacements);
            for s in &mut if_stmt.body {
                rewrite_stmt(s, replacements);
            }
            for s in &mut if_stmt.orelse {
                rewrite_stmt(s, replacements);
            }
        }
        StmtKind::Assign { value, .. } => rewrite_expr(value, replacements),
        StmtKind::Expr(expr) => rewrite_expr(expr, replacements),
    }
}

fn rewrite_expr(expr: &mut Expr, replacements: &[(String, TouchKey)]) {
    // Replace the whole node first where it matches; otherwise recurse.
    if let Some(key) = match_touch_key(expr, replacements) {
        expr.kind = ExprKind::Str(key.key().to_string());
        expr.span = Span::synthetic();
        return;
    }

    match &mut expr.kind {
        ExprKind::List(elems) | ExprKind::Tuple(elems) => {
            for e in elems {
                rewrite_expr(e, replacements);
            }
        }
        ExprKind::Dict(entries) => {
            for (k, v) in entries {
                rewrite_expr(k, replacements);
                rewrite_expr(v, replacements);
            }
        }
        ExprKind::Attribute { value, .. } => rewrite_expr(value, replacements),
        ExprKind::Subscript { value, index } => {
            rewrite_expr(value, replacements);
            rewrite_expr(index, replacements);
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            rewrite_expr(func, replacements);
            for a in args {
                rewrite_expr(a, replacements);
            }
            for (_, v) in keywords {
                rewrite_expr(v, replacements);
            }
        }
        ExprKind::BinOp { left, right, .. } => {
            rewrite_expr(left, replacements);
            rewrite_expr(right, replacements);
        }
        ExprKind::UnaryOp { operand, .. } => rewrite_expr(operand, replacements),
        ExprKind::Compare {
            left, comparators, ..
        } => {
            rewrite_expr(left, replacements);
            for c in comparators {
                rewrite_expr(c, replacements);
            }
        }
        ExprKind::BoolOp { values, .. } => {
            for v in values {
                rewrite_expr(v, replacements);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            rewrite_expr(test, replacements);
            rewrite_expr(body, replacements);
            rewrite_expr(orelse, replacements);
        }
        ExprKind::Lambda(lam) => rewrite_expr(&mut lam.body, replacements),
        ExprKind::Starred(inner) => rewrite_expr(inner, replacements),
        _ => {}
    }
}

fn match_touch_key(expr: &Expr, replacements: &[(String, TouchKey)]) -> Option<TouchKey> {
    match &expr.kind {
        // `TouchKey.left()` and friends.
        ExprKind::Call { func, args, .. } if args.is_empty() => match &func.kind {
            ExprKind::Attribute { value, attr } => match &value.kind {
                ExprKind::Name(name) if name == "TouchKey" => {
                    TouchKey::from_constructor(&attr.name)
                }
                _ => None,
            },
            _ => None,
        },
        // A bare global bound to a touch key.
        ExprKind::Name(name) => replacements
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, k)| *k),
        _ => None,
    }
}
