//! Runtime values for the JavaScript subset.

use std::fmt;

use crate::parser::{JsParam, JsStmt};

/// A JavaScript value.
#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Array(Vec<JsValue>),
    /// Object as an insertion-ordered key/value list.
    Object(Vec<(String, JsValue)>),
    /// A user function (arrow or `function` expression).
    Function(JsFunction),
}

/// A function value.  No captured environment: the evaluated subset only
/// nests functions that are invoked while their defining frame is still on
/// the scope stack, so lexical references resolve through the live stack.
#[derive(Debug, Clone, PartialEq)]
pub struct JsFunction {
    pub params: Vec<JsParam>,
    pub body: Vec<JsStmt>,
}

impl JsValue {
    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Bool(b) => *b,
            JsValue::Num(n) => *n != 0.0 && !n.is_nan(),
            JsValue::Str(s) => !s.is_empty(),
            JsValue::Array(_) | JsValue::Object(_) | JsValue::Function(_) => true,
        }
    }

    /// Strict equality (`===`).  Arrays and objects compare by identity in
    /// real JavaScript; the evaluator has no object identity, so comparing
    /// them is a type error surfaced by the caller.
    pub fn strict_eq(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Bool(a), JsValue::Bool(b)) => a == b,
            (JsValue::Num(a), JsValue::Num(b)) => a == b,
            (JsValue::Str(a), JsValue::Str(b)) => a == b,
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "null",
            JsValue::Bool(_) => "boolean",
            JsValue::Num(_) => "number",
            JsValue::Str(_) => "string",
            JsValue::Array(_) => "array",
            JsValue::Object(_) => "object",
            JsValue::Function(_) => "function",
        }
    }

    /// String coercion matching `String(v)`.
    pub fn to_js_string(&self) -> String {
        match self {
            JsValue::Undefined => "undefined".to_string(),
            JsValue::Null => "null".to_string(),
            JsValue::Bool(b) => b.to_string(),
            JsValue::Num(n) => format_number(*n),
            JsValue::Str(s) => s.clone(),
            JsValue::Array(elems) => elems
                .iter()
                .map(|v| match v {
                    JsValue::Null | JsValue::Undefined => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            JsValue::Object(_) => "[object Object]".to_string(),
            JsValue::Function(_) => "function".to_string(),
        }
    }
}

/// Integral numbers print without a decimal point, as in JavaScript.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_js_string())
    }
}
