//! Unparser — renders an AST back to canonical derive-subset source.
//!
//! Rewrite passes mutate the tree and the pipeline re-serializes it before
//! handing the synthetic module to the whole-program compiler, so the output
//! here must round-trip through the parser. Parenthesization follows a
//! precedence table; redundant parens are acceptable, dropped ones are not.

use crate::ast::*;

/// Render a whole module as source text (trailing newline included).
pub fn unparse_module(module: &Module) -> String {
    let mut out = String::new();
    for stmt in &module.body {
        unparse_stmt(stmt, 0, &mut out);
    }
    out
}

/// Render a single expression as source text.
pub fn unparse_expr(expr: &Expr) -> String {
    render_expr(expr, 0)
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

fn indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn unparse_stmt(stmt: &Stmt, level: usize, out: &mut String) {
    match &stmt.kind {
        StmtKind::FunctionDef(def) => {
            indent(level, out);
            out.push_str("def ");
            out.push_str(&def.name.name);
            out.push('(');
            out.push_str(&render_params(&def.params));
            out.push_str("):\n");
            for inner in &def.body {
                unparse_stmt(inner, level + 1, out);
            }
        }
        StmtKind::Return(value) => {
            indent(level, out);
            match value {
                Some(expr) => {
                    out.push_str("return ");
                    out.push_str(&render_expr(expr, 0));
                }
                None => out.push_str("return"),
            }
            out.push('\n');
        }
        StmtKind::If(if_stmt) => unparse_if(if_stmt, level, "if", out),
        StmtKind::Assign { target, value } => {
            indent(level, out);
            out.push_str(&target.name);
            out.push_str(" = ");
            out.push_str(&render_expr(value, 0));
            out.push('\n');
        }
        StmtKind::Expr(expr) => {
            indent(level, out);
            out.push_str(&render_expr(expr, 0));
            out.push('\n');
        }
        StmtKind::Pass => {
            indent(level, out);
            out.push_str("pass\n");
        }
    }
}

/// Render an if statement; a lone nested `If` in `orelse` becomes `elif`.
fn unparse_if(if_stmt: &IfStmt, level: usize, keyword: &str, out: &mut String) {
    indent(level, out);
    out.push_str(keyword);
    out.push(' ');
    out.push_str(&render_expr(&if_stmt.test, 0));
    out.push_str(":\n");
    for inner in &if_stmt.body {
        unparse_stmt(inner, level + 1, out);
    }
    if if_stmt.orelse.is_empty() {
        return;
    }
    if let [Stmt {
        kind: StmtKind::If(nested),
        ..
    }] = if_stmt.orelse.as_slice()
    {
        unparse_if(nested, level, "elif", out);
    } else {
        indent(level, out);
        out.push_str("else:\n");
        for inner in &if_stmt.orelse {
            unparse_stmt(inner, level + 1, out);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Parameter lists
// ─────────────────────────────────────────────────────────────────────

/// Render a full parameter list: `a, b=1, *rest, k=2, **kw`.
pub fn render_params(params: &Params) -> String {
    let mut parts = Vec::new();
    for p in &params.args {
        parts.push(render_param(p));
    }
    if let Some(v) = &params.vararg {
        parts.push(format!("*{}", v.name));
    } else if !params.kwonly.is_empty() {
        parts.push("*".to_string());
    }
    for p in &params.kwonly {
        parts.push(render_param(p));
    }
    if let Some(k) = &params.kwarg {
        parts.push(format!("**{}", k.name));
    }
    parts.join(", ")
}

fn render_param(p: &Param) -> String {
    match &p.default {
        Some(d) => format!("{}={}", p.name.name, render_expr(d, 0)),
        None => p.name.name.clone(),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

// Precedence levels, lowest first. A child is parenthesized whenever its
// own level is below the minimum its position requires.
const P_LAMBDA: u8 = 1;
const P_IFEXP: u8 = 2;
const P_OR: u8 = 3;
const P_AND: u8 = 4;
const P_NOT: u8 = 5;
const P_CMP: u8 = 6;
const P_BITOR: u8 = 7;
const P_BITXOR: u8 = 8;
const P_BITAND: u8 = 9;
const P_SHIFT: u8 = 10;
const P_ADD: u8 = 11;
const P_TERM: u8 = 12;
const P_UNARY: u8 = 13;
const P_POW: u8 = 14;
const P_POSTFIX: u8 = 15;
const P_ATOM: u8 = 16;

fn bin_prec(op: BinOpKind) -> u8 {
    match op {
        BinOpKind::BitOr => P_BITOR,
        BinOpKind::BitXor => P_BITXOR,
        BinOpKind::BitAnd => P_BITAND,
        BinOpKind::LShift | BinOpKind::RShift => P_SHIFT,
        BinOpKind::Add | BinOpKind::Sub => P_ADD,
        BinOpKind::Mul | BinOpKind::Div | BinOpKind::FloorDiv | BinOpKind::Mod
        | BinOpKind::MatMult => P_TERM,
        BinOpKind::Pow => P_POW,
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Lambda(_) => P_LAMBDA,
        ExprKind::IfExp { .. } => P_IFEXP,
        ExprKind::BoolOp { op, .. } => match op {
            BoolOpKind::Or => P_OR,
            BoolOpKind::And => P_AND,
        },
        ExprKind::UnaryOp {
            op: UnaryOpKind::Not,
            ..
        } => P_NOT,
        ExprKind::Compare { .. } => P_CMP,
        ExprKind::BinOp { op, .. } => bin_prec(*op),
        ExprKind::UnaryOp { .. } => P_UNARY,
        ExprKind::Attribute { .. } | ExprKind::Subscript { .. } | ExprKind::Call { .. } => {
            P_POSTFIX
        }
        _ => P_ATOM,
    }
}

/// Render `expr`, parenthesizing if its precedence is below `min_prec`.
fn render_expr(expr: &Expr, min_prec: u8) -> String {
    let rendered = render_expr_inner(expr);
    if expr_prec(expr) < min_prec {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn render_expr_inner(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Int(n) => n.to_string(),
        ExprKind::Float(f) => render_float(*f),
        ExprKind::Str(s) => render_str(s),
        ExprKind::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        ExprKind::NoneLit => "None".to_string(),
        ExprKind::Name(name) => name.clone(),

        ExprKind::List(elems) => {
            let inner: Vec<String> = elems.iter().map(|e| render_expr(e, 0)).collect();
            format!("[{}]", inner.join(", "))
        }
        ExprKind::Tuple(elems) => {
            let inner: Vec<String> = elems.iter().map(|e| render_expr(e, P_IFEXP)).collect();
            if elems.len() == 1 {
                format!("({},)", inner[0])
            } else {
                format!("({})", inner.join(", "))
            }
        }
        ExprKind::Dict(entries) => {
            let inner: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", render_expr(k, 0), render_expr(v, 0)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }

        ExprKind::Attribute { value, attr } => {
            format!("{}.{}", render_expr(value, P_POSTFIX), attr.name)
        }
        ExprKind::Subscript { value, index } => {
            format!("{}[{}]", render_expr(value, P_POSTFIX), render_expr(index, 0))
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            let mut parts: Vec<String> = args.iter().map(|a| render_expr(a, 0)).collect();
            for (name, value) in keywords {
                parts.push(format!("{}={}", name.name, render_expr(value, 0)));
            }
            format!("{}({})", render_expr(func, P_POSTFIX), parts.join(", "))
        }

        ExprKind::BinOp { left, op, right } => {
            let prec = bin_prec(*op);
            // `**` is right-associative; everything else left-associative.
            let (lmin, rmin) = if *op == BinOpKind::Pow {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            format!(
                "{} {} {}",
                render_expr(left, lmin),
                op.as_str(),
                render_expr(right, rmin)
            )
        }
        ExprKind::UnaryOp { op, operand } => {
            let min = if *op == UnaryOpKind::Not {
                P_NOT
            } else {
                P_UNARY
            };
            format!("{}{}", op.as_str(), render_expr(operand, min))
        }
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => {
            let mut out = render_expr(left, P_CMP + 1);
            for (op, right) in ops.iter().zip(comparators.iter()) {
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                out.push_str(&render_expr(right, P_CMP + 1));
            }
            out
        }
        ExprKind::BoolOp { op, values } => {
            let prec = match op {
                BoolOpKind::Or => P_OR,
                BoolOpKind::And => P_AND,
            };
            let parts: Vec<String> = values.iter().map(|v| render_expr(v, prec + 1)).collect();
            parts.join(&format!(" {} ", op.as_str()))
        }

        ExprKind::IfExp { test, body, orelse } => {
            format!(
                "{} if {} else {}",
                render_expr(body, P_IFEXP + 1),
                render_expr(test, P_IFEXP + 1),
                render_expr(orelse, P_IFEXP)
            )
        }
        ExprKind::Lambda(lambda) => {
            let params = render_params(&lambda.params);
            if params.is_empty() {
                format!("lambda: {}", render_expr(&lambda.body, P_LAMBDA))
            } else {
                format!("lambda {}: {}", params, render_expr(&lambda.body, P_LAMBDA))
            }
        }
        ExprKind::Starred(inner) => format!("*{}", render_expr(inner, P_POSTFIX)),
    }
}

fn render_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Single-quoted string literal with backslash escapes.
fn render_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    fn e(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::synthetic())
    }

    #[test]
    fn test_unparse_literals() {
        assert_eq!(unparse_expr(&e(ExprKind::Int(42))), "42");
        assert_eq!(unparse_expr(&e(ExprKind::Float(3.0))), "3.0");
        assert_eq!(unparse_expr(&e(ExprKind::Float(3.25))), "3.25");
        assert_eq!(unparse_expr(&e(ExprKind::Bool(true))), "True");
        assert_eq!(unparse_expr(&e(ExprKind::NoneLit)), "None");
        assert_eq!(
            unparse_expr(&e(ExprKind::Str("it's".to_string()))),
            "'it\\'s'"
        );
    }

    #[test]
    fn test_unparse_binop_precedence() {
        // (a + b) * c keeps its parens; a + b * c does not gain any.
        let a = e(ExprKind::Name("a".into()));
        let b = e(ExprKind::Name("b".into()));
        let c = e(ExprKind::Name("c".into()));
        let sum = e(ExprKind::BinOp {
            left: Box::new(a.clone()),
            op: BinOpKind::Add,
            right: Box::new(b.clone()),
        });
        let grouped = e(ExprKind::BinOp {
            left: Box::new(sum.clone()),
            op: BinOpKind::Mul,
            right: Box::new(c.clone()),
        });
        assert_eq!(unparse_expr(&grouped), "(a + b) * c");

        let product = e(ExprKind::BinOp {
            left: Box::new(b),
            op: BinOpKind::Mul,
            right: Box::new(c),
        });
        let flat = e(ExprKind::BinOp {
            left: Box::new(a),
            op: BinOpKind::Add,
            right: Box::new(product),
        });
        assert_eq!(unparse_expr(&flat), "a + b * c");
    }

    #[test]
    fn test_unparse_chained_compare() {
        let expr = e(ExprKind::Compare {
            left: Box::new(e(ExprKind::Name("a".into()))),
            ops: vec![CmpOp::Lt, CmpOp::Lt],
            comparators: vec![e(ExprKind::Name("b".into())), e(ExprKind::Name("c".into()))],
        });
        assert_eq!(unparse_expr(&expr), "a < b < c");
    }

    #[test]
    fn test_unparse_lambda_ternary() {
        let lambda = e(ExprKind::Lambda(Box::new(LambdaExpr {
            params: Params {
                args: vec![Param {
                    name: Ident::new("c", Span::synthetic()),
                    default: None,
                    span: Span::synthetic(),
                }],
                ..Default::default()
            },
            body: e(ExprKind::IfExp {
                test: Box::new(e(ExprKind::Compare {
                    left: Box::new(e(ExprKind::Name("c".into()))),
                    ops: vec![CmpOp::Eq],
                    comparators: vec![e(ExprKind::Str("red".into()))],
                })),
                body: Box::new(e(ExprKind::Str("f".into()))),
                orelse: Box::new(e(ExprKind::Str("j".into()))),
            }),
            span: Span::synthetic(),
        })));
        assert_eq!(unparse_expr(&lambda), "lambda c: 'f' if c == 'red' else 'j'");
    }

    #[test]
    fn test_unparse_params_full() {
        let sp = Span::synthetic();
        let params = Params {
            args: vec![
                Param {
                    name: Ident::new("a", sp),
                    default: None,
                    span: sp,
                },
                Param {
                    name: Ident::new("b", sp),
                    default: Some(e(ExprKind::Int(1))),
                    span: sp,
                },
            ],
            vararg: Some(Ident::new("rest", sp)),
            kwonly: vec![Param {
                name: Ident::new("k", sp),
                default: Some(e(ExprKind::NoneLit)),
                span: sp,
            }],
            kwarg: Some(Ident::new("kw", sp)),
        };
        assert_eq!(render_params(&params), "a, b=1, *rest, k=None, **kw");
    }

    #[test]
    fn test_unparse_if_elif_else() {
        let sp = Span::synthetic();
        let ret = |v: &str| {
            Stmt::new(
                StmtKind::Return(Some(e(ExprKind::Str(v.into())))),
                sp,
            )
        };
        let inner_if = Stmt::new(
            StmtKind::If(IfStmt {
                test: e(ExprKind::Compare {
                    left: Box::new(e(ExprKind::Name("v".into()))),
                    ops: vec![CmpOp::Eq],
                    comparators: vec![e(ExprKind::Int(2))],
                }),
                body: vec![ret("b")],
                orelse: vec![ret("c")],
                span: sp,
            }),
            sp,
        );
        let module = Module {
            body: vec![Stmt::new(
                StmtKind::If(IfStmt {
                    test: e(ExprKind::Compare {
                        left: Box::new(e(ExprKind::Name("v".into()))),
                        ops: vec![CmpOp::Eq],
                        comparators: vec![e(ExprKind::Int(1))],
                    }),
                    body: vec![ret("a")],
                    orelse: vec![inner_if],
                    span: sp,
                }),
                sp,
            )],
            span: sp,
        };
        let text = unparse_module(&module);
        assert_eq!(
            text,
            "if v == 1:\n    return 'a'\nelif v == 2:\n    return 'b'\nelse:\n    return 'c'\n"
        );
    }
}
