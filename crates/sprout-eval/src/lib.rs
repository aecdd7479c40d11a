//! Reference evaluator for the JavaScript subset emitted by the sprout
//! compilers.
//!
//! This is a test-side collaborator: it executes emitted function
//! expressions so their behavior can be checked against the source
//! semantics, without a browser or a JavaScript engine in the loop.  The
//! runtime shims (`__add__`, `__eq__`, `and_`, `len`, …) are installed as
//! native builtins.

pub mod env;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{EvalError, EvalResult};
pub use evaluator::Interp;
pub use value::JsValue;

use parser::parse_expr_source;

/// Evaluate `source` as a single JavaScript expression.
pub fn eval_source(source: &str) -> EvalResult<JsValue> {
    let expr = parse_expr_source(source)?;
    Interp::new().eval(&expr)
}

/// Evaluate `fn_source` to a function value and invoke it with `args`.
///
/// This is the shape transpiled derive functions take: a parenthesized
/// function expression meant to be immediately applied.
pub fn invoke(fn_source: &str, args: &[JsValue]) -> EvalResult<JsValue> {
    let expr = parse_expr_source(fn_source)?;
    let mut interp = Interp::new();
    match interp.eval(&expr)? {
        JsValue::Function(f) => interp.call(&f, args),
        other => Err(EvalError::NotCallable(other.type_name().to_string())),
    }
}
