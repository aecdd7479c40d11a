//! Operator normalization: rewrite every operator into an explicit call to
//! a named runtime shim.
//!
//! The whole-program compiler emits native JavaScript operators, whose
//! semantics diverge from the source language (strict equality, no list
//! concatenation, remainder instead of modulo).  Rewriting `a + b` into
//! `__add__(a, b)` routes every operation through the runtime shims, which
//! implement source semantics uniformly.  Applied bottom-up so nested
//! operands are rewritten before their parents.

use sprout_types::ast::*;
use sprout_types::Span;

/// Normalize every statement of a module in place.
pub fn normalize_module(module: &mut Module) {
    for stmt in &mut module.body {
        normalize_stmt(stmt);
    }
}

fn normalize_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::FunctionDef(def) => {
            for p in def.params.args.iter_mut().chain(def.params.kwonly.iter_mut()) {
                if let Some(default) = &mut p.default {
                    normalize_expr(default);
                }
            }
            for s in &mut def.body {
                normalize_stmt(s);
            }
        }
        StmtKind::Return(Some(expr)) => normalize_expr(expr),
        StmtKind::Return(None) | StmtKind::Pass => {}
        StmtKind::If(if_stmt) => {
            normalize_expr(&mut if_stmt.test);
            for s in &mut if_stmt.body {
                normalize_stmt(s);
            }
            for s in &mut if_stmt.orelse {
                normalize_stmt(s);
            }
        }
        StmtKind::Assign { value, .. } => normalize_expr(value),
        StmtKind::Expr(expr) => normalize_expr(expr),
    }
}

/// Normalize an expression in place.
pub fn normalize_expr(expr: &mut Expr) {
    // Children first.
    match &mut expr.kind {
        ExprKind::List(elems) | ExprKind::Tuple(elems) => {
            for e in elems {
                normalize_expr(e);
            }
        }
        ExprKind::Dict(entries) => {
            for (k, v) in entries {
                normalize_expr(k);
                normalize_expr(v);
            }
        }
        ExprKind::Attribute { value, .. } => normalize_expr(value),
        ExprKind::Subscript { value, index } => {
            normalize_expr(value);
            normalize_expr(index);
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            normalize_expr(func);
            for a in args {
                normalize_expr(a);
            }
            for (_, v) in keywords {
                normalize_expr(v);
            }
        }
        ExprKind::BinOp { left, right, .. } => {
            normalize_expr(left);
            normalize_expr(right);
        }
        ExprKind::UnaryOp { operand, .. } => normalize_expr(operand),
        ExprKind::Compare {
            left, comparators, ..
        } => {
            normalize_expr(left);
            for c in comparators {
                normalize_expr(c);
            }
        }
        ExprKind::BoolOp { values, .. } => {
            for v in values {
                normalize_expr(v);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            normalize_expr(test);
            normalize_expr(body);
            normalize_expr(orelse);
        }
        ExprKind::Lambda(lam) => {
            for p in lam.params.args.iter_mut().chain(lam.params.kwonly.iter_mut()) {
                if let Some(default) = &mut p.default {
                    normalize_expr(default);
                }
            }
            normalize_expr(&mut lam.body);
        }
        ExprKind::Starred(inner) => normalize_expr(inner),
        _ => {}
    }

    // Then this node.
    let kind = std::mem::replace(&mut expr.kind, ExprKind::NoneLit);
    expr.kind = match kind {
        ExprKind::BinOp { left, op, right } => shim_call(op.shim_name(), vec![*left, *right]),
        ExprKind::UnaryOp { op, operand } => shim_call(op.shim_name(), vec![*operand]),
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => rewrite_compare(*left, ops, comparators),
        ExprKind::BoolOp { op, values } => fold_boolop(op.shim_name(), values),
        other => other,
    };
}

/// Build `name(args…)` with synthetic spans.
fn shim_call(name: &'static str, args: Vec<Expr>) -> ExprKind {
    let span = Span::synthetic();
    ExprKind::Call {
        func: Box::new(Expr::new(ExprKind::Name(name.to_string()), span)),
        args,
        keywords: Vec::new(),
    }
}

/// `a < b <= c` becomes `and_(__lt__(a, b), __le__(b, c))`: each adjacent
/// pair compared, pairs folded left-to-right.  Middle operands are cloned
/// into both pairs, matching the source semantics for the effect-free
/// expressions handled here.
fn rewrite_compare(left: Expr, ops: Vec<CmpOp>, comparators: Vec<Expr>) -> ExprKind {
    let span = Span::synthetic();
    let mut pairs = Vec::with_capacity(ops.len());
    let mut lhs = left;
    for (op, rhs) in ops.into_iter().zip(comparators) {
        let next_lhs = rhs.clone();
        pairs.push(Expr::new(shim_call(op.shim_name(), vec![lhs, rhs]), span));
        lhs = next_lhs;
    }

    let mut iter = pairs.into_iter();
    let first = match iter.next() {
        Some(p) => p,
        None => return ExprKind::NoneLit, // parser never yields empty chains
    };
    let folded = iter.fold(first, |acc, pair| {
        Expr::new(shim_call("and_", vec![acc, pair]), span)
    });
    folded.kind
}

/// `a and b and c` becomes `and_(and_(a, b), c)`.
fn fold_boolop(name: &'static str, values: Vec<Expr>) -> ExprKind {
    let span = Span::synthetic();
    let mut iter = values.into_iter();
    let first = match iter.next() {
        Some(v) => v,
        None => return ExprKind::NoneLit, // parser never yields empty boolops
    };
    let folded = iter.fold(first, |acc, value| {
        Expr::new(shim_call(name, vec![acc, value]), span)
    });
    folded.kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_parser::parse_standalone_expr;
    use sprout_types::unparse::unparse_expr;

    fn normalized(src: &str) -> String {
        let mut expr = parse_standalone_expr(src).expect("parse failed");
        normalize_expr(&mut expr);
        unparse_expr(&expr)
    }

    #[test]
    fn test_binary_operators() {
        assert_eq!(normalized("a + b"), "__add__(a, b)");
        assert_eq!(normalized("a - b"), "__sub__(a, b)");
        assert_eq!(normalized("a * b"), "__mul__(a, b)");
        assert_eq!(normalized("a / b"), "__truediv__(a, b)");
        assert_eq!(normalized("a // b"), "__floordiv__(a, b)");
        assert_eq!(normalized("a % b"), "__mod__(a, b)");
        assert_eq!(normalized("a ** b"), "__pow__(a, b)");
        assert_eq!(normalized("a | b"), "__or__(a, b)");
        assert_eq!(normalized("a & b"), "__and__(a, b)");
        assert_eq!(normalized("a ^ b"), "__xor__(a, b)");
        assert_eq!(normalized("a << b"), "__lshift__(a, b)");
        assert_eq!(normalized("a >> b"), "__rshift__(a, b)");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(normalized("-a"), "__neg__(a)");
        assert_eq!(normalized("+a"), "__pos__(a)");
        assert_eq!(normalized("~a"), "__invert__(a)");
        assert_eq!(normalized("not a"), "__not__(a)");
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(normalized("a == b"), "__eq__(a, b)");
        assert_eq!(normalized("a != b"), "__ne__(a, b)");
        assert_eq!(normalized("a < b"), "__lt__(a, b)");
        assert_eq!(normalized("a >= b"), "__ge__(a, b)");
    }

    #[test]
    fn test_chained_comparison() {
        assert_eq!(
            normalized("a < b <= c"),
            "and_(__lt__(a, b), __le__(b, c))"
        );
        assert_eq!(
            normalized("a < b < c < d"),
            "and_(and_(__lt__(a, b), __lt__(b, c)), __lt__(c, d))"
        );
    }

    #[test]
    fn test_boolop_left_fold() {
        assert_eq!(normalized("a and b"), "and_(a, b)");
        assert_eq!(normalized("a or b or c"), "or_(or_(a, b), c)");
        assert_eq!(normalized("a and b and c"), "and_(and_(a, b), c)");
    }

    #[test]
    fn test_nesting_bottom_up() {
        assert_eq!(
            normalized("a + b * c"),
            "__add__(a, __mul__(b, c))"
        );
        assert_eq!(
            normalized("not a == b"),
            "__not__(__eq__(a, b))"
        );
    }

    #[test]
    fn test_rewrite_inside_calls_and_ternary() {
        assert_eq!(
            normalized("f(a + b)"),
            "f(__add__(a, b))"
        );
        assert_eq!(
            normalized("'f' if c == 'red' else 'j'"),
            "'f' if __eq__(c, 'red') else 'j'"
        );
    }

    #[test]
    fn test_lambda_body_normalized() {
        assert_eq!(
            normalized("lambda x: x + 1"),
            "lambda x: __add__(x, 1)"
        );
    }

    #[test]
    fn test_leaf_count_preserved() {
        // Two identifier leaves in, two out, plus the shim name which is a
        // call target rather than a leaf operand.
        let mut expr = parse_standalone_expr("a + b").expect("parse failed");
        normalize_expr(&mut expr);
        match &expr.kind {
            ExprKind::Call { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("expected call, got {other:?}"),
        }
    }
}
