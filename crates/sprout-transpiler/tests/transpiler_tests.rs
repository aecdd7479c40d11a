//! End-to-end transpilation tests.
//!
//! Emitted JavaScript is executed with the `sprout-eval` interpreter, which
//! provides the runtime shims as built-ins, so behavioral checks compare
//! actual evaluation results rather than emitted text.

use sprout_eval::{invoke, JsValue};
use sprout_transpiler::{
    encode, function_call_to_js, function_to_js, pipeline, sanitize, Callable, Global,
    TouchKey, TranspileError, Value,
};

/// Transpile through the public entry point.
fn js(source: &str) -> String {
    function_to_js(&Callable::new(source)).expect("transpilation failed")
}

/// Force the full compile-and-extract pipeline, bypassing the fast path.
fn full_js(source: &str) -> String {
    let mut module = pipeline::parse_callable(source).expect("parse failed");
    sanitize::sanitize_module(&mut module);
    pipeline::emit_full(module, source).expect("full pipeline failed")
}

fn num(x: f64) -> JsValue {
    JsValue::Num(x)
}

fn s(text: &str) -> JsValue {
    JsValue::Str(text.to_string())
}

// ══════════════════════════════════════════════════════════════════════════════
// Literal encoding round-trips
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_encoded_literals_evaluate_back() {
    let cases = [
        (Value::Int(42), num(42.0)),
        (Value::Float(2.5), num(2.5)),
        (Value::Bool(true), JsValue::Bool(true)),
        (Value::Null, JsValue::Null),
        (Value::Str("it's".to_string()), s("it's")),
    ];
    for (value, expected) in cases {
        let text = encode(&value);
        assert_eq!(sprout_eval::eval_source(&text).unwrap(), expected, "literal {text}");
    }
}

#[test]
fn test_encoded_list_evaluates_back() {
    let value = Value::List(vec![
        Value::Str("a".to_string()),
        Value::Int(1),
        Value::Bool(false),
        Value::Null,
    ]);
    let text = encode(&value);
    assert_eq!(text, "['a',1,false,null]");
    let result = sprout_eval::eval_source(&text).unwrap();
    assert_eq!(
        result,
        JsValue::Array(vec![s("a"), num(1.0), JsValue::Bool(false), JsValue::Null])
    );
}

#[test]
fn test_encoded_dict_preserves_insertion_order() {
    let value = Value::Dict(vec![
        ("b".to_string(), Value::Int(2)),
        ("a".to_string(), Value::Int(1)),
    ]);
    assert_eq!(encode(&value), "{'b':2,'a':1}");
}

// ══════════════════════════════════════════════════════════════════════════════
// Fast path / full pipeline equivalence
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_fast_and_full_agree_on_stroop_lambda() {
    let source = "lambda color: 'f' if color == 'red' else 'j'";
    let fast = js(source);
    let full = full_js(source);
    assert_ne!(fast, full);
    for input in ["red", "blue", "green"] {
        let args = [s(input)];
        let a = invoke(&fast, &args).unwrap();
        let b = invoke(&full, &args).unwrap();
        assert_eq!(a, b, "input {input}");
    }
}

#[test]
fn test_fast_and_full_agree_on_arithmetic() {
    let source = "lambda a, b: a * 2 + b % 3";
    let fast = js(source);
    let full = full_js(source);
    for (a, b) in [(0.0, 0.0), (5.0, 7.0), (1.5, 4.0)] {
        let args = [num(a), num(b)];
        assert_eq!(invoke(&fast, &args).unwrap(), invoke(&full, &args).unwrap());
    }
}

#[test]
fn test_fast_and_full_agree_on_boolean_logic() {
    let source = "lambda p, q: p and not q";
    let fast = js(source);
    let full = full_js(source);
    for (p, q) in [(true, true), (true, false), (false, true), (false, false)] {
        let args = [JsValue::Bool(p), JsValue::Bool(q)];
        // The fast path returns the operand itself, the shims do too.
        assert_eq!(invoke(&fast, &args).unwrap(), invoke(&full, &args).unwrap());
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Full-pipeline-only constructs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_chained_comparison_via_shims() {
    let source = "f = lambda x: 1 < x < 10";
    let arrow = js(source);
    assert!(arrow.contains("and_("), "got: {arrow}");
    assert_eq!(invoke(&arrow, &[num(5.0)]).unwrap(), JsValue::Bool(true));
    assert_eq!(invoke(&arrow, &[num(10.0)]).unwrap(), JsValue::Bool(false));
    assert_eq!(invoke(&arrow, &[num(0.5)]).unwrap(), JsValue::Bool(false));
}

#[test]
fn test_floor_division_and_modulo_semantics() {
    let arrow = js("f = lambda a, b: a // b + a % b");
    // Python floor division and sign-of-divisor modulo.
    assert_eq!(invoke(&arrow, &[num(7.0), num(2.0)]).unwrap(), num(4.0));
    assert_eq!(invoke(&arrow, &[num(-7.0), num(2.0)]).unwrap(), num(-3.0));
}

#[test]
fn test_equality_shim_compares_bool_and_number() {
    let arrow = full_js("lambda flag: flag == 1");
    assert_eq!(invoke(&arrow, &[JsValue::Bool(true)]).unwrap(), JsValue::Bool(true));
    assert_eq!(invoke(&arrow, &[num(1.0)]).unwrap(), JsValue::Bool(true));
    assert_eq!(invoke(&arrow, &[num(2.0)]).unwrap(), JsValue::Bool(false));
}

#[test]
fn test_list_literal_body() {
    let arrow = js("f = lambda x: [x, x + 1]");
    assert_eq!(
        invoke(&arrow, &[num(3.0)]).unwrap(),
        JsValue::Array(vec![num(3.0), num(4.0)])
    );
}

#[test]
fn test_variadic_lambda_preserves_argument_binding() {
    // The wrapper's inner call must spread the variadic parameter after
    // the keyword-only one, matching the emitted signature order.
    let arrow = js("f = lambda x, *rest, k: [x, k, rest]");
    assert_eq!(
        invoke(&arrow, &[num(1.0), num(2.0), num(3.0)]).unwrap(),
        JsValue::Array(vec![num(1.0), num(2.0), JsValue::Array(vec![num(3.0)])])
    );
}

#[test]
fn test_string_body_with_brace_survives_extraction() {
    let arrow = js("f = lambda x: x + 'a}b'");
    assert_eq!(invoke(&arrow, &[s("<")]).unwrap(), s("<a}b"));
}

#[test]
fn test_math_namespace_postprocessed() {
    let arrow = js("f = lambda x: math.floor(x / 2)");
    assert!(arrow.contains("Math.floor"), "got: {arrow}");
    assert!(!arrow.contains("math.floor"), "got: {arrow}");
    assert_eq!(invoke(&arrow, &[num(7.0)]).unwrap(), num(3.0));
}

// ══════════════════════════════════════════════════════════════════════════════
// Capture guard
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_undeclared_global_rejected_before_compilation() {
    let callable = Callable::new("lambda a: a + X").with_global("X", Global::Other);
    let err = function_to_js(&callable).unwrap_err();
    match &err {
        TranspileError::CaptureViolation { callable, names } => {
            assert_eq!(callable, "lambda a: a + X");
            assert_eq!(names, &["X".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("non-local variables"), "got: {message}");
    assert!(message.contains("declared argument"), "got: {message}");
}

#[test]
fn test_capture_rejection_is_deterministic() {
    let callable = Callable::new("lambda a: z + y + z")
        .with_global("y", Global::Other)
        .with_global("z", Global::Other);
    let first = function_to_js(&callable).unwrap_err().to_string();
    for _ in 0..10 {
        assert_eq!(function_to_js(&callable).unwrap_err().to_string(), first);
    }
    assert!(first.contains("[\"y\", \"z\"]"), "got: {first}");
}

#[test]
fn test_allowed_module_reference_passes_guard() {
    let callable =
        Callable::new("f = lambda x: math.floor(x)").with_global("math", Global::Module);
    assert!(function_to_js(&callable).is_ok());
}

#[test]
fn test_unlisted_module_rejected() {
    let callable =
        Callable::new("f = lambda x: requests.get(x)").with_global("requests", Global::Module);
    let err = function_to_js(&callable).unwrap_err();
    assert!(matches!(err, TranspileError::CaptureViolation { .. }));
}

// ══════════════════════════════════════════════════════════════════════════════
// Parameter sanitization
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_reserved_word_parameter_still_computes() {
    let arrow = js("lambda var: var + 1");
    assert!(!arrow.contains("var var"), "got: {arrow}");
    assert_eq!(invoke(&arrow, &[num(41.0)]).unwrap(), num(42.0));
}

#[test]
fn test_reserved_word_parameter_on_full_path() {
    let arrow = full_js("lambda new: [new]");
    assert_eq!(
        invoke(&arrow, &[s("x")]).unwrap(),
        JsValue::Array(vec![s("x")])
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Touch keys
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_touch_key_constructor_call_replaced() {
    let arrow = js("f = lambda side: [TouchKey.left(), TouchKey.top_right()]");
    assert_eq!(
        invoke(&arrow, &[s("any")]).unwrap(),
        JsValue::Array(vec![s("l"), s("r")])
    );
}

#[test]
fn test_touch_key_to_js_literal() {
    assert_eq!(TouchKey::BottomLeft.key(), "l");
    let value = Value::from_to_js(&TouchKey::Right);
    assert_eq!(encode(&value), "\"r\"");
}

// ══════════════════════════════════════════════════════════════════════════════
// Named functions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_def_with_branching_body() {
    let source = "def respond(v):\n    if v == 1:\n        return 'one'\n    elif v == 2:\n        return 'two'\n    else:\n        return 'many'\n";
    let arrow = js(source);
    assert_eq!(invoke(&arrow, &[num(1.0)]).unwrap(), s("one"));
    assert_eq!(invoke(&arrow, &[num(2.0)]).unwrap(), s("two"));
    assert_eq!(invoke(&arrow, &[num(9.0)]).unwrap(), s("many"));
}

#[test]
fn test_def_with_nested_helper() {
    let source = "def outer(a, b):\n    def double(x):\n        return x * 2\n    return double(a) + double(b)\n";
    let arrow = js(source);
    assert_eq!(invoke(&arrow, &[num(2.0), num(3.0)]).unwrap(), num(10.0));
}

#[test]
fn test_nested_helper_with_branching_body() {
    let source = "def outer(v):\n    def inner(code):\n        if code == 1:\n            return 'left'\n        elif code == 2:\n            return 'right'\n        else:\n            return 'none'\n    return inner(v)\n";
    let arrow = js(source);
    assert_eq!(invoke(&arrow, &[num(1.0)]).unwrap(), s("left"));
    assert_eq!(invoke(&arrow, &[num(2.0)]).unwrap(), s("right"));
    assert_eq!(invoke(&arrow, &[num(9.0)]).unwrap(), s("none"));
}

#[test]
fn test_def_with_local_assignment() {
    let source = "def f(word):\n    lowered = word.lower()\n    return str(lowered)\n";
    let arrow = js(source);
    assert_eq!(invoke(&arrow, &[s("ABC")]).unwrap(), s("abc"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Call expressions
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_function_call_to_js_evaluates() {
    let callable = Callable::new("lambda a, b: a + b");
    let call = function_call_to_js(&callable, &[Value::Int(2), Value::Int(3)]).unwrap();
    assert_eq!(sprout_eval::eval_source(&call).unwrap(), num(5.0));
}

#[test]
fn test_function_call_with_string_arguments() {
    let callable = Callable::new("lambda color: 'f' if color == 'red' else 'j'");
    let call =
        function_call_to_js(&callable, &[Value::Str("red".to_string())]).unwrap();
    assert_eq!(sprout_eval::eval_source(&call).unwrap(), s("f"));
}

// ══════════════════════════════════════════════════════════════════════════════
// Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_output_is_deterministic() {
    let sources = [
        "lambda color: 'f' if color == 'red' else 'j'",
        "f = lambda x: 1 < x < 10",
        "def respond(v):\n    if v == 1:\n        return 'one'\n    else:\n        return 'two'\n",
    ];
    for source in sources {
        let first = js(source);
        for _ in 0..5 {
            assert_eq!(js(source), first, "source: {source}");
        }
    }
}
