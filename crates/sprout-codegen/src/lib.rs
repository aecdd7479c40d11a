//! Sprout whole-program compiler: restricted Python to JavaScript.
//!
//! # Architecture
//!
//! The compiler takes one entry file of restricted-Python source and emits a
//! complete, self-contained JavaScript program:
//!
//! 1. a runtime prelude binding the operator shims (`__add__`, `__eq__`,
//!    `and_`, …) that implement Python operator semantics,
//! 2. one `var <name> = function (…) {…};` binding per top-level function
//!    definition, in source order,
//! 3. an `export {…};` trailer naming the user bindings.
//!
//! Output lands in `__target__/<stem>.js` next to the entry file.
//!
//! Raw operators in the source compile to *native* JavaScript operators; a
//! caller that needs Python semantics across mixed types rewrites operators
//! into shim calls before compiling.  This split keeps the code generator a
//! straightforward syntax-directed pass.

pub mod compiler;
pub mod error;
pub mod expr;
pub mod runtime;
pub mod stmt;

pub use compiler::{compile_entry, compile_source, CompileOutput, TARGET_DIR};
pub use error::{CodegenError, CodegenResult};

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> String {
        let (program, _log) = compile_source("test.py", src).expect("compile failed");
        program
    }

    #[test]
    fn test_simple_function_binding() {
        let js = compile("def f(x):\n    return x + 1\n");
        assert!(js.contains("var f = function (x) {"));
        assert!(js.contains("return x + 1;"));
        assert!(js.contains("export {f};"));
    }

    #[test]
    fn test_prelude_precedes_user_bindings() {
        let js = compile("def f():\n    return 1\n");
        let prelude_pos = js.find("var __eq__").expect("prelude missing");
        let binding_pos = js.find("var f =").expect("binding missing");
        assert!(prelude_pos < binding_pos);
    }

    #[test]
    fn test_if_elif_else_chain() {
        let src = "def f(x):\n    if x == 1:\n        return 'a'\n    elif x == 2:\n        return 'b'\n    else:\n        return 'c'\n";
        let js = compile(src);
        assert!(js.contains("if (x === 1) {"));
        assert!(js.contains("} else if (x === 2) {"));
        assert!(js.contains("} else {"));
    }

    #[test]
    fn test_nested_function() {
        let src = "def outer(v):\n    def inner(c):\n        return c * 2\n    return inner(v)\n";
        let js = compile(src);
        assert!(js.contains("var outer = function (v) {"));
        assert!(js.contains("    var inner = function (c) {"));
        assert!(js.contains("return inner(v);"));
        assert!(js.contains("export {outer};"));
    }

    #[test]
    fn test_shim_calls_pass_through() {
        let js = compile("def f(a, b):\n    return __add__(a, b)\n");
        assert!(js.contains("return __add__(a, b);"));
    }

    #[test]
    fn test_builtin_mappings() {
        let js = compile("def f(w):\n    return str(w.lower())\n");
        assert!(js.contains("return String(w.toLowerCase());"));
    }

    #[test]
    fn test_ternary_and_comparison() {
        let js = compile("def f(c):\n    return 'f' if c == 'red' else 'j'\n");
        assert!(js.contains("return c === \"red\" ? \"f\" : \"j\";"));
    }

    #[test]
    fn test_chained_comparison_expands_pairwise() {
        let js = compile("def f(x):\n    return 1 < x < 10\n");
        assert!(js.contains("1 < x && x < 10"));
    }

    #[test]
    fn test_floor_div_and_pow() {
        let js = compile("def f(a, b):\n    return a // b + a ** b\n");
        assert!(js.contains("Math.floor(a / b)"));
        assert!(js.contains("Math.pow(a, b)"));
    }

    #[test]
    fn test_default_and_rest_params() {
        let js = compile("def f(a, b=2, *rest):\n    return a\n");
        assert!(js.contains("var f = function (a, b = 2, ...rest) {"));
    }

    #[test]
    fn test_unknown_module_attr_passes_through() {
        let js = compile("def f(x):\n    return math.floor(x)\n");
        assert!(js.contains("return math.floor(x);"));
    }

    #[test]
    fn test_parse_error_carries_diagnostics() {
        let err = compile_source("test.py", "def f(:\n    return 1\n").unwrap_err();
        match err {
            CodegenError::Parse { output } => assert!(!output.is_empty()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_parenthesization() {
        let js = compile("def f(a, b, c):\n    return (a + b) * c\n");
        assert!(js.contains("return (a + b) * c;"));
    }

    #[test]
    fn test_string_escaping() {
        let js = compile("def f():\n    return 'a\\'b\"c'\n");
        // JSON-style escaping: double quotes escaped, single quotes bare.
        assert!(js.contains("return \"a'b\\\"c\";"));
    }
}
