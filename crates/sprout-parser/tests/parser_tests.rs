//! Parser tests for the derive-function subset.
//!
//! Covers: expressions (precedence, postfix chains, lambdas, conditionals,
//! chained comparisons), statements (def, return, if/elif/else, assignment),
//! indentation-driven suites, unsupported-construct diagnostics, error
//! recovery, and determinism.

use sprout_parser::{parse_module, parse_standalone_expr, ParseResult};
use sprout_types::ast::*;
use sprout_types::SourceFile;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source and return the result (module + errors).
fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.py", source);
    parse_module(&sf)
}

/// Parse source and return the module, panicking if there are errors.
fn parse_ok(source: &str) -> Module {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.module.expect("no module returned")
}

/// Parse source and return the error count.
fn error_count(source: &str) -> usize {
    parse(source).errors.total_errors
}

/// Parse a standalone expression, panicking on failure.
fn expr_ok(source: &str) -> Expr {
    parse_standalone_expr(source)
        .unwrap_or_else(|| panic!("expected expression to parse: {source}"))
}

// ─────────────────────────────────────────────────────────────────────
// Expressions: literals and atoms
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_literals() {
    assert_eq!(expr_ok("42").kind, ExprKind::Int(42));
    assert_eq!(expr_ok("3.5").kind, ExprKind::Float(3.5));
    assert_eq!(expr_ok("'hi'").kind, ExprKind::Str("hi".to_string()));
    assert_eq!(expr_ok("True").kind, ExprKind::Bool(true));
    assert_eq!(expr_ok("False").kind, ExprKind::Bool(false));
    assert_eq!(expr_ok("None").kind, ExprKind::NoneLit);
    assert_eq!(expr_ok("x").kind, ExprKind::Name("x".to_string()));
}

#[test]
fn test_list_literal() {
    let expr = expr_ok("[1, 2, 3]");
    match expr.kind {
        ExprKind::List(elems) => assert_eq!(elems.len(), 3),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_list_trailing_comma() {
    let expr = expr_ok("[1, 2,]");
    match expr.kind {
        ExprKind::List(elems) => assert_eq!(elems.len(), 2),
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_empty_list_and_dict() {
    assert!(matches!(expr_ok("[]").kind, ExprKind::List(ref e) if e.is_empty()));
    assert!(matches!(expr_ok("{}").kind, ExprKind::Dict(ref e) if e.is_empty()));
}

#[test]
fn test_dict_literal() {
    let expr = expr_ok("{'a': 1, 'b': 2}");
    match expr.kind {
        ExprKind::Dict(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].0.kind, ExprKind::Str("a".to_string()));
            assert_eq!(entries[0].1.kind, ExprKind::Int(1));
        }
        other => panic!("expected dict, got {other:?}"),
    }
}

#[test]
fn test_tuple_literal() {
    let expr = expr_ok("(1, 2)");
    match expr.kind {
        ExprKind::Tuple(elems) => assert_eq!(elems.len(), 2),
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn test_empty_tuple() {
    assert!(matches!(expr_ok("()").kind, ExprKind::Tuple(ref e) if e.is_empty()));
}

#[test]
fn test_parenthesized_grouping_is_transparent() {
    // `(x)` is plain grouping, not a one-element tuple.
    assert_eq!(expr_ok("(x)").kind, ExprKind::Name("x".to_string()));
}

#[test]
fn test_single_element_tuple_needs_comma() {
    let expr = expr_ok("(1,)");
    match expr.kind {
        ExprKind::Tuple(elems) => assert_eq!(elems.len(), 1),
        other => panic!("expected tuple, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Expressions: precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_mul_binds_tighter_than_add() {
    // 1 + 2 * 3  =>  1 + (2 * 3)
    let expr = expr_ok("1 + 2 * 3");
    match expr.kind {
        ExprKind::BinOp { op, right, .. } => {
            assert_eq!(op, BinOpKind::Add);
            assert!(matches!(
                right.kind,
                ExprKind::BinOp {
                    op: BinOpKind::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binop, got {other:?}"),
    }
}

#[test]
fn test_parens_override_precedence() {
    // (1 + 2) * 3  =>  root is Mul
    let expr = expr_ok("(1 + 2) * 3");
    assert!(matches!(
        expr.kind,
        ExprKind::BinOp {
            op: BinOpKind::Mul,
            ..
        }
    ));
}

#[test]
fn test_power_is_right_associative() {
    // 2 ** 3 ** 2  =>  2 ** (3 ** 2)
    let expr = expr_ok("2 ** 3 ** 2");
    match expr.kind {
        ExprKind::BinOp { op, left, right } => {
            assert_eq!(op, BinOpKind::Pow);
            assert_eq!(left.kind, ExprKind::Int(2));
            assert!(matches!(
                right.kind,
                ExprKind::BinOp {
                    op: BinOpKind::Pow,
                    ..
                }
            ));
        }
        other => panic!("expected binop, got {other:?}"),
    }
}

#[test]
fn test_unary_minus_binds_tighter_than_mul() {
    // -x * y  =>  (-x) * y
    let expr = expr_ok("-x * y");
    match expr.kind {
        ExprKind::BinOp { op, left, .. } => {
            assert_eq!(op, BinOpKind::Mul);
            assert!(matches!(
                left.kind,
                ExprKind::UnaryOp {
                    op: UnaryOpKind::Neg,
                    ..
                }
            ));
        }
        other => panic!("expected binop, got {other:?}"),
    }
}

#[test]
fn test_power_binds_tighter_than_unary() {
    // -2 ** 3  =>  -(2 ** 3)
    let expr = expr_ok("-2 ** 3");
    match expr.kind {
        ExprKind::UnaryOp { op, operand } => {
            assert_eq!(op, UnaryOpKind::Neg);
            assert!(matches!(
                operand.kind,
                ExprKind::BinOp {
                    op: BinOpKind::Pow,
                    ..
                }
            ));
        }
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn test_floor_div_and_mod() {
    assert!(matches!(
        expr_ok("a // b").kind,
        ExprKind::BinOp {
            op: BinOpKind::FloorDiv,
            ..
        }
    ));
    assert!(matches!(
        expr_ok("a % b").kind,
        ExprKind::BinOp {
            op: BinOpKind::Mod,
            ..
        }
    ));
}

#[test]
fn test_bitwise_precedence() {
    // a | b & c  =>  a | (b & c)
    let expr = expr_ok("a | b & c");
    match expr.kind {
        ExprKind::BinOp { op, right, .. } => {
            assert_eq!(op, BinOpKind::BitOr);
            assert!(matches!(
                right.kind,
                ExprKind::BinOp {
                    op: BinOpKind::BitAnd,
                    ..
                }
            ));
        }
        other => panic!("expected binop, got {other:?}"),
    }
}

#[test]
fn test_shift_operators() {
    assert!(matches!(
        expr_ok("a << 2").kind,
        ExprKind::BinOp {
            op: BinOpKind::LShift,
            ..
        }
    ));
    assert!(matches!(
        expr_ok("a >> 2").kind,
        ExprKind::BinOp {
            op: BinOpKind::RShift,
            ..
        }
    ));
}

// ─────────────────────────────────────────────────────────────────────
// Expressions: boolean and comparison
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_and_or_precedence() {
    // a or b and c  =>  a or (b and c)
    let expr = expr_ok("a or b and c");
    match expr.kind {
        ExprKind::BoolOp { op, values } => {
            assert_eq!(op, BoolOpKind::Or);
            assert_eq!(values.len(), 2);
            assert!(matches!(
                values[1].kind,
                ExprKind::BoolOp {
                    op: BoolOpKind::And,
                    ..
                }
            ));
        }
        other => panic!("expected boolop, got {other:?}"),
    }
}

#[test]
fn test_bool_chain_is_flat() {
    // a or b or c is one BoolOp with three operands, not nested pairs.
    let expr = expr_ok("a or b or c");
    match expr.kind {
        ExprKind::BoolOp { op, values } => {
            assert_eq!(op, BoolOpKind::Or);
            assert_eq!(values.len(), 3);
        }
        other => panic!("expected boolop, got {other:?}"),
    }
}

#[test]
fn test_not_expression() {
    let expr = expr_ok("not x");
    assert!(matches!(
        expr.kind,
        ExprKind::UnaryOp {
            op: UnaryOpKind::Not,
            ..
        }
    ));
}

#[test]
fn test_not_binds_looser_than_comparison() {
    // not a == b  =>  not (a == b)
    let expr = expr_ok("not a == b");
    match expr.kind {
        ExprKind::UnaryOp { op, operand } => {
            assert_eq!(op, UnaryOpKind::Not);
            assert!(matches!(operand.kind, ExprKind::Compare { .. }));
        }
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn test_simple_comparison() {
    let expr = expr_ok("a == b");
    match expr.kind {
        ExprKind::Compare {
            ops, comparators, ..
        } => {
            assert_eq!(ops, vec![CmpOp::Eq]);
            assert_eq!(comparators.len(), 1);
        }
        other => panic!("expected compare, got {other:?}"),
    }
}

#[test]
fn test_chained_comparison_kept_flat() {
    // 1 < x <= 10 is a single Compare node with two operators.
    let expr = expr_ok("1 < x <= 10");
    match expr.kind {
        ExprKind::Compare {
            left,
            ops,
            comparators,
        } => {
            assert_eq!(left.kind, ExprKind::Int(1));
            assert_eq!(ops, vec![CmpOp::Lt, CmpOp::LtE]);
            assert_eq!(comparators.len(), 2);
        }
        other => panic!("expected compare, got {other:?}"),
    }
}

#[test]
fn test_all_comparison_operators() {
    for (src, op) in [
        ("a == b", CmpOp::Eq),
        ("a != b", CmpOp::NotEq),
        ("a < b", CmpOp::Lt),
        ("a <= b", CmpOp::LtE),
        ("a > b", CmpOp::Gt),
        ("a >= b", CmpOp::GtE),
    ] {
        match expr_ok(src).kind {
            ExprKind::Compare { ops, .. } => assert_eq!(ops, vec![op], "{src}"),
            other => panic!("expected compare for {src}, got {other:?}"),
        }
    }
}

#[test]
fn test_in_operator_rejected() {
    assert!(error_count("x in y\n") >= 1);
}

#[test]
fn test_is_operator_rejected() {
    assert!(error_count("x is None\n") >= 1);
}

// ─────────────────────────────────────────────────────────────────────
// Expressions: conditional and lambda
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_conditional_expression() {
    let expr = expr_ok("'f' if color == 'red' else 'j'");
    match expr.kind {
        ExprKind::IfExp { test, body, orelse } => {
            assert!(matches!(test.kind, ExprKind::Compare { .. }));
            assert_eq!(body.kind, ExprKind::Str("f".to_string()));
            assert_eq!(orelse.kind, ExprKind::Str("j".to_string()));
        }
        other => panic!("expected ifexp, got {other:?}"),
    }
}

#[test]
fn test_conditional_is_right_associative() {
    // a if p else b if q else c  =>  a if p else (b if q else c)
    let expr = expr_ok("a if p else b if q else c");
    match expr.kind {
        ExprKind::IfExp { orelse, .. } => {
            assert!(matches!(orelse.kind, ExprKind::IfExp { .. }));
        }
        other => panic!("expected ifexp, got {other:?}"),
    }
}

#[test]
fn test_lambda_no_params() {
    let expr = expr_ok("lambda: 1");
    match expr.kind {
        ExprKind::Lambda(lam) => {
            assert!(lam.params.args.is_empty());
            assert_eq!(lam.body.kind, ExprKind::Int(1));
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn test_lambda_with_params() {
    let expr = expr_ok("lambda color, word: color == word");
    match expr.kind {
        ExprKind::Lambda(lam) => {
            assert_eq!(lam.params.names(), vec!["color", "word"]);
            assert!(matches!(lam.body.kind, ExprKind::Compare { .. }));
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn test_lambda_with_default() {
    let expr = expr_ok("lambda x, y=2: x + y");
    match expr.kind {
        ExprKind::Lambda(lam) => {
            assert!(lam.params.args[0].default.is_none());
            assert!(lam.params.args[1].default.is_some());
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn test_lambda_body_extends_over_conditional() {
    // lambda c: 'f' if c else 'j'  =>  the conditional is the body.
    let expr = expr_ok("lambda c: 'f' if c else 'j'");
    match expr.kind {
        ExprKind::Lambda(lam) => assert!(matches!(lam.body.kind, ExprKind::IfExp { .. })),
        other => panic!("expected lambda, got {other:?}"),
    }
}

#[test]
fn test_nested_lambda() {
    let expr = expr_ok("lambda x: lambda y: x + y");
    match expr.kind {
        ExprKind::Lambda(outer) => {
            assert!(matches!(outer.body.kind, ExprKind::Lambda(_)));
        }
        other => panic!("expected lambda, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Expressions: postfix chains
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_attribute_access() {
    let expr = expr_ok("math.floor");
    match expr.kind {
        ExprKind::Attribute { value, attr } => {
            assert_eq!(value.kind, ExprKind::Name("math".to_string()));
            assert_eq!(attr.name, "floor");
        }
        other => panic!("expected attribute, got {other:?}"),
    }
}

#[test]
fn test_call_no_args() {
    let expr = expr_ok("f()");
    match expr.kind {
        ExprKind::Call { args, keywords, .. } => {
            assert!(args.is_empty());
            assert!(keywords.is_empty());
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_call_positional_and_keyword_args() {
    let expr = expr_ok("f(1, 2, key='v')");
    match expr.kind {
        ExprKind::Call { args, keywords, .. } => {
            assert_eq!(args.len(), 2);
            assert_eq!(keywords.len(), 1);
            assert_eq!(keywords[0].0.name, "key");
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_call_star_argument() {
    let expr = expr_ok("f(a, *rest)");
    match expr.kind {
        ExprKind::Call { args, .. } => {
            assert_eq!(args.len(), 2);
            match &args[1].kind {
                ExprKind::Starred(inner) => {
                    assert_eq!(inner.kind, ExprKind::Name("rest".to_string()));
                }
                other => panic!("expected starred argument, got {other:?}"),
            }
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_positional_after_keyword_is_error() {
    assert!(error_count("f(a=1, 2)\n") >= 1);
}

#[test]
fn test_method_call_chain() {
    // word.lower()  =>  Call(Attribute(Name, lower))
    let expr = expr_ok("word.lower()");
    match expr.kind {
        ExprKind::Call { func, .. } => match &func.kind {
            ExprKind::Attribute { attr, .. } => assert_eq!(attr.name, "lower"),
            other => panic!("expected attribute callee, got {other:?}"),
        },
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_subscript() {
    let expr = expr_ok("xs[0]");
    match expr.kind {
        ExprKind::Subscript { value, index } => {
            assert_eq!(value.kind, ExprKind::Name("xs".to_string()));
            assert_eq!(index.kind, ExprKind::Int(0));
        }
        other => panic!("expected subscript, got {other:?}"),
    }
}

#[test]
fn test_long_postfix_chain() {
    // a.b(1)[0].c  parses left to right.
    let expr = expr_ok("a.b(1)[0].c");
    match expr.kind {
        ExprKind::Attribute { value, attr } => {
            assert_eq!(attr.name, "c");
            assert!(matches!(value.kind, ExprKind::Subscript { .. }));
        }
        other => panic!("expected attribute, got {other:?}"),
    }
}

#[test]
fn test_call_inside_brackets_spans_lines() {
    // Implicit line joining inside parens.
    let expr = expr_ok("f(\n    1,\n    2,\n)");
    match expr.kind {
        ExprKind::Call { args, .. } => assert_eq!(args.len(), 2),
        other => panic!("expected call, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements: def
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_function_def() {
    let module = parse_ok("def f(x, y):\n    return x + y\n");
    assert_eq!(module.body.len(), 1);
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => {
            assert_eq!(def.name.name, "f");
            assert_eq!(def.params.names(), vec!["x", "y"]);
            assert_eq!(def.body.len(), 1);
            assert!(matches!(def.body[0].kind, StmtKind::Return(Some(_))));
        }
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_def_with_default_and_star_args() {
    let module = parse_ok("def f(a, b=1, *rest, **kw):\n    return a\n");
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => {
            assert_eq!(def.params.args.len(), 2);
            assert!(def.params.args[1].default.is_some());
            assert_eq!(def.params.vararg.as_ref().map(|v| v.name.as_str()), Some("rest"));
            assert_eq!(def.params.kwarg.as_ref().map(|v| v.name.as_str()), Some("kw"));
        }
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_def_inline_suite() {
    let module = parse_ok("def f(x): return x\n");
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => assert_eq!(def.body.len(), 1),
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_bare_return() {
    let module = parse_ok("def f():\n    return\n");
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => {
            assert!(matches!(def.body[0].kind, StmtKind::Return(None)));
        }
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_nested_def() {
    let src = "def outer(x):\n    def inner(y):\n        return y * 2\n    return inner(x)\n";
    let module = parse_ok(src);
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => {
            assert_eq!(def.body.len(), 2);
            assert!(matches!(def.body[0].kind, StmtKind::FunctionDef(_)));
        }
        other => panic!("expected def, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements: if / elif / else
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_else() {
    let src = "def f(x):\n    if x > 0:\n        return 1\n    else:\n        return 0\n";
    let module = parse_ok(src);
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => match &def.body[0].kind {
            StmtKind::If(if_stmt) => {
                assert_eq!(if_stmt.body.len(), 1);
                assert_eq!(if_stmt.orelse.len(), 1);
            }
            other => panic!("expected if, got {other:?}"),
        },
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_elif_becomes_nested_if() {
    let src = "def f(x):\n    if x > 0:\n        return 1\n    elif x < 0:\n        return -1\n    else:\n        return 0\n";
    let module = parse_ok(src);
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => match &def.body[0].kind {
            StmtKind::If(if_stmt) => {
                assert_eq!(if_stmt.orelse.len(), 1);
                match &if_stmt.orelse[0].kind {
                    StmtKind::If(inner) => assert_eq!(inner.orelse.len(), 1),
                    other => panic!("expected nested if for elif, got {other:?}"),
                }
            }
            other => panic!("expected if, got {other:?}"),
        },
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_if_without_else() {
    let src = "def f(x):\n    if x:\n        return 1\n    return 0\n";
    let module = parse_ok(src);
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => {
            assert_eq!(def.body.len(), 2);
            match &def.body[0].kind {
                StmtKind::If(if_stmt) => assert!(if_stmt.orelse.is_empty()),
                other => panic!("expected if, got {other:?}"),
            }
        }
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_dangling_else_is_error() {
    assert!(error_count("else:\n    pass\n") >= 1);
}

// ─────────────────────────────────────────────────────────────────────
// Statements: assignment, pass, expression statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_assignment() {
    let module = parse_ok("def f(x):\n    y = x * 2\n    return y\n");
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => match &def.body[0].kind {
            StmtKind::Assign { target, .. } => assert_eq!(target.name, "y"),
            other => panic!("expected assign, got {other:?}"),
        },
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_pass_statement() {
    let module = parse_ok("def f():\n    pass\n");
    match &module.body[0].kind {
        StmtKind::FunctionDef(def) => {
            assert!(matches!(def.body[0].kind, StmtKind::Pass));
        }
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_top_level_expression_statement() {
    let module = parse_ok("lambda x: x + 1\n");
    assert!(matches!(module.body[0].kind, StmtKind::Expr(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Unsupported constructs
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_for_loop_rejected() {
    let result = parse("def f(xs):\n    for x in xs:\n        pass\n");
    assert!(result.errors.has_errors());
    assert!(result
        .errors
        .errors
        .iter()
        .any(|e| e.code == sprout_types::ErrorCode::UNSUPPORTED_STATEMENT));
}

#[test]
fn test_while_loop_rejected() {
    assert!(error_count("while True:\n    pass\n") >= 1);
}

#[test]
fn test_import_rejected() {
    let result = parse("import math\n");
    assert!(result
        .errors
        .errors
        .iter()
        .any(|e| e.code == sprout_types::ErrorCode::UNSUPPORTED_STATEMENT));
}

#[test]
fn test_class_rejected() {
    assert!(error_count("class Foo:\n    pass\n") >= 1);
}

#[test]
fn test_try_rejected() {
    assert!(error_count("try:\n    pass\nexcept:\n    pass\n") >= 1);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery and limits
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovery_continues_after_bad_statement() {
    // A bad first statement should not hide the good second one.
    let result = parse("x = = 1\ny = 2\n");
    assert!(result.errors.has_errors());
    let module = result.module.expect("module survives recovery");
    assert!(module
        .body
        .iter()
        .any(|s| matches!(&s.kind, StmtKind::Assign { target, .. } if target.name == "y")));
}

#[test]
fn test_unclosed_paren_is_error() {
    assert!(error_count("f(1, 2\n") >= 1);
}

#[test]
fn test_standalone_expr_rejects_statements() {
    assert!(parse_standalone_expr("x = 1").is_none());
    assert!(parse_standalone_expr("def f(): return 1").is_none());
}

#[test]
fn test_standalone_expr_rejects_trailing_junk() {
    assert!(parse_standalone_expr("lambda x: x +").is_none());
}

#[test]
fn test_deeply_nested_parens_hit_depth_limit() {
    let src = format!("{}x{}", "(".repeat(200), ")".repeat(200));
    assert!(parse_standalone_expr(&src).is_none());
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_is_deterministic() {
    let src = "def task(color, word):\n    if color == word:\n        return 'f'\n    return 'j'\n";
    let first = parse_ok(src);
    for _ in 0..20 {
        assert_eq!(parse_ok(src), first);
    }
}
