//! Derive-function transpilation.
//!
//! Experiments describe derived trial parameters with small restricted
//! Python callables.  This crate turns such a callable, plus the module
//! globals it was defined against, into a JavaScript function expression
//! ready to be spliced into a jsPsych timeline:
//!
//! 1. [`pipeline::parse_callable`] parses the source (locating the lambda
//!    inside its defining statement when necessary),
//! 2. [`guard`] rejects functions that capture module-level state,
//! 3. [`sanitize`] renames parameters that collide with JavaScript
//!    reserved words,
//! 4. [`touch_key`] replaces touch key constants with their key strings,
//! 5. [`fastpath`] translates simple lambdas directly; everything else is
//!    normalized onto the runtime shims, compiled as a whole program, and
//!    the relevant binding extracted back out ([`pipeline::emit_full`]).
//!
//! [`encode`] renders Rust-side values as JavaScript literals for argument
//! lists and embedded data.

use std::collections::BTreeMap;

pub mod encode;
pub mod error;
pub mod extract;
pub mod fastpath;
pub mod guard;
pub mod normalize;
pub mod pipeline;
pub mod postprocess;
pub mod sanitize;
pub mod touch_key;

pub use encode::{encode, encode_args, ToJs, Value};
pub use error::{TranspileError, TranspileResult};
pub use guard::Global;
pub use touch_key::TouchKey;

/// A Python callable together with the globals visible at its definition
/// site.  The globals table is what the capture guard checks references
/// against; names absent from it are assumed to resolve on the JavaScript
/// side.
#[derive(Debug, Clone)]
pub struct Callable {
    source: String,
    globals: BTreeMap<String, Global>,
}

impl Callable {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            globals: BTreeMap::new(),
        }
    }

    /// Declare a module-level name visible to the callable.
    pub fn with_global(mut self, name: impl Into<String>, global: Global) -> Self {
        self.globals.insert(name.into(), global);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Render a value as a JavaScript literal.
pub fn to_js(value: &Value) -> String {
    encode::encode(value)
}

/// Transpile a callable to a parenthesized JavaScript function expression.
pub fn function_to_js(callable: &Callable) -> TranspileResult<String> {
    let mut module = pipeline::parse_callable(&callable.source)?;
    guard::check_captures(&module, &callable.source, &callable.globals)?;
    sanitize::sanitize_module(&mut module);

    let replacements: Vec<(String, TouchKey)> = callable
        .globals
        .iter()
        .filter_map(|(name, global)| match global {
            Global::TouchKey(key) => Some((name.clone(), *key)),
            _ => None,
        })
        .collect();
    touch_key::rewrite_module(&mut module, &replacements);

    match fastpath::emit_fast(&module) {
        Ok(js) => Ok(js),
        Err(fastpath::FastPathRejection) => pipeline::emit_full(module, &callable.source),
    }
}

/// Transpile a callable and apply it to the given arguments, yielding a
/// JavaScript call expression.
pub fn function_call_to_js(callable: &Callable, args: &[Value]) -> TranspileResult<String> {
    let function = function_to_js(callable)?;
    Ok(format!("{function}({})", encode_args(args)))
}
