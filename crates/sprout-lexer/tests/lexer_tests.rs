//! Lexer tests for the derive subset.
//!
//! Covers: keywords, operators, literals, comments, indentation layout
//! (Indent/Dedent synthesis, blank lines, mismatches), implicit line
//! joining inside brackets, string escapes, f-string/triple-quote
//! rejection, and error recovery.

use sprout_lexer::{Lexer, TokenKind};
use sprout_types::SourceFile;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("derive.py", source);
    let result = Lexer::new(&sf).lex();
    result
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

/// Lex and return the error count.
fn error_count(source: &str) -> usize {
    let sf = SourceFile::new("derive.py", source);
    let result = Lexer::new(&sf).lex();
    result.errors.total_errors
}

/// Lex and return the first error message.
fn first_error(source: &str) -> String {
    let sf = SourceFile::new("derive.py", source);
    let result = Lexer::new(&sf).lex();
    result
        .errors
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("lambda x: x"),
        vec![
            TokenKind::Lambda,
            TokenKind::Identifier("x".into()),
            TokenKind::Colon,
            TokenKind::Identifier("x".into()),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_constants_are_keywords() {
    assert_eq!(
        kinds("None True False"),
        vec![
            TokenKind::NoneKw,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_identifier_with_underscore_and_digits() {
    assert_eq!(
        kinds("_dv_3f name2"),
        vec![
            TokenKind::Identifier("_dv_3f".into()),
            TokenKind::Identifier("name2".into()),
            TokenKind::Newline,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_two_char_operators() {
    assert_eq!(
        kinds("a ** b // c << d >> e == f != g <= h >= i"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::DoubleStar,
            TokenKind::Identifier("b".into()),
            TokenKind::DoubleSlash,
            TokenKind::Identifier("c".into()),
            TokenKind::LShift,
            TokenKind::Identifier("d".into()),
            TokenKind::RShift,
            TokenKind::Identifier("e".into()),
            TokenKind::EqEq,
            TokenKind::Identifier("f".into()),
            TokenKind::NotEq,
            TokenKind::Identifier("g".into()),
            TokenKind::LessEq,
            TokenKind::Identifier("h".into()),
            TokenKind::GreaterEq,
            TokenKind::Identifier("i".into()),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_single_char_operators() {
    assert_eq!(
        kinds("a + b - c * d / e % f & g | h ^ i @ j"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Plus,
            TokenKind::Identifier("b".into()),
            TokenKind::Minus,
            TokenKind::Identifier("c".into()),
            TokenKind::Star,
            TokenKind::Identifier("d".into()),
            TokenKind::Slash,
            TokenKind::Identifier("e".into()),
            TokenKind::Percent,
            TokenKind::Identifier("f".into()),
            TokenKind::Amp,
            TokenKind::Identifier("g".into()),
            TokenKind::Pipe,
            TokenKind::Identifier("h".into()),
            TokenKind::Caret,
            TokenKind::Identifier("i".into()),
            TokenKind::At,
            TokenKind::Identifier("j".into()),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_bang_alone_is_error() {
    assert_eq!(error_count("a ! b"), 1);
    assert!(first_error("a ! b").contains("'!'"));
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_int_and_float() {
    assert_eq!(
        kinds("42 3.14 1e3"),
        vec![
            TokenKind::Int(42),
            TokenKind::Float(3.14),
            TokenKind::Float(1000.0),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_attribute_access_is_not_a_float() {
    assert_eq!(
        kinds("math.floor"),
        vec![
            TokenKind::Identifier("math".into()),
            TokenKind::Dot,
            TokenKind::Identifier("floor".into()),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_huge_int_is_error() {
    assert_eq!(error_count("99999999999999999999999"), 1);
}

#[test]
fn test_single_and_double_quoted_strings() {
    assert_eq!(
        kinds("'red' \"blue\""),
        vec![
            TokenKind::Str("red".into()),
            TokenKind::Str("blue".into()),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r"'it\'s\n'"),
        vec![TokenKind::Str("it's\n".into()), TokenKind::Newline]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(error_count("'oops"), 1);
    assert!(first_error("'oops").contains("unterminated"));
}

#[test]
fn test_fstring_rejected() {
    let src = "f'{x}'";
    assert_eq!(error_count(src), 1);
    assert!(first_error(src).contains("f-strings"));
}

#[test]
fn test_triple_quote_rejected() {
    let src = "'''doc'''";
    assert_eq!(error_count(src), 1);
    assert!(first_error(src).contains("triple-quoted"));
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comment_stripped() {
    assert_eq!(
        kinds("x # trailing\ny"),
        vec![
            TokenKind::Identifier("x".into()),
            TokenKind::Newline,
            TokenKind::Identifier("y".into()),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_comment_only_line_produces_nothing() {
    assert_eq!(
        kinds("# just a comment\nx"),
        vec![TokenKind::Identifier("x".into()), TokenKind::Newline]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_indent_dedent() {
    let toks = kinds("def f(x):\n    return x\n");
    assert_eq!(
        toks,
        vec![
            TokenKind::Def,
            TokenKind::Identifier("f".into()),
            TokenKind::LParen,
            TokenKind::Identifier("x".into()),
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Return,
            TokenKind::Identifier("x".into()),
            TokenKind::Newline,
            TokenKind::Dedent,
        ]
    );
}

#[test]
fn test_nested_indentation() {
    let toks = kinds("def f(x):\n    if x:\n        return x\n    return x\n");
    let indents = toks.iter().filter(|k| **k == TokenKind::Indent).count();
    let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
    assert_eq!(indents, 2);
    assert_eq!(dedents, 2);
}

#[test]
fn test_blank_lines_do_not_dedent() {
    let toks = kinds("def f(x):\n    a = 1\n\n    return a\n");
    let dedents = toks.iter().filter(|k| **k == TokenKind::Dedent).count();
    assert_eq!(dedents, 1);
}

#[test]
fn test_dedent_at_eof_without_trailing_newline() {
    let toks = kinds("def f(x):\n    return x");
    assert_eq!(toks.last(), Some(&TokenKind::Dedent));
}

#[test]
fn test_indent_mismatch_is_error() {
    let src = "def f(x):\n        a = 1\n   b = 2\n";
    assert_eq!(error_count(src), 1);
    assert!(first_error(src).contains("unindent"));
}

#[test]
fn test_no_layout_inside_brackets() {
    let toks = kinds("[1,\n    2,\n    3]");
    assert!(!toks.contains(&TokenKind::Indent));
    assert!(!toks.contains(&TokenKind::Dedent));
    // Only the final newline survives
    let newlines = toks.iter().filter(|k| **k == TokenKind::Newline).count();
    assert_eq!(newlines, 1);
}

#[test]
fn test_backslash_line_continuation() {
    let toks = kinds("a + \\\n    b");
    assert_eq!(
        toks,
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Plus,
            TokenKind::Identifier("b".into()),
            TokenKind::Newline,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery & determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovery_continues_after_error() {
    let toks = kinds("a $ b");
    assert!(toks.contains(&TokenKind::Identifier("a".into())));
    assert!(toks.contains(&TokenKind::Identifier("b".into())));
    assert_eq!(error_count("a $ b"), 1);
}

#[test]
fn test_determinism_100_iterations() {
    let src = "def choice(color):\n    return 'f' if color == 'red' else 'j'\n";
    let first = kinds(src);
    for i in 0..100 {
        assert_eq!(first, kinds(src), "determinism failure at iteration {i}");
    }
}
