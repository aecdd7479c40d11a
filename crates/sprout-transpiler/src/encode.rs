//! Value encoding: host values to JavaScript literal text.

use std::fmt;

/// Anything that can render itself as a JavaScript expression.  Opaque
/// handles (timeline-variable references, touch keys) implement this and are
/// carried through [`Value::Js`].
pub trait ToJs {
    fn to_js(&self) -> String;
}

/// A host value handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Insertion-ordered string-keyed mapping.
    Dict(Vec<(String, Value)>),
    /// An already-encoded JavaScript expression (a `ToJs` delegate).
    Js(String),
}

impl Value {
    pub fn from_to_js(value: &dyn ToJs) -> Self {
        Value::Js(value.to_js())
    }
}

/// Encode a value as a JavaScript literal.
///
/// Total over [`Value`]; there are no error conditions.  Booleans have their
/// own branch ahead of the numeric ones because the host language treats
/// them as a numeric subtype.
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => render_float(*x),
        Value::Str(s) => quote(s),
        Value::List(elems) => {
            let parts: Vec<String> = elems.iter().map(encode).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Dict(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}:{}", quote(k), encode(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        Value::Js(text) => text.clone(),
    }
}

/// Render an argument list: `v1,v2,…` (no surrounding parentheses).
pub fn encode_args(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(encode).collect();
    parts.join(",")
}

/// Single-quoted JavaScript string literal.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

pub(crate) fn render_float(x: f64) -> String {
    let text = x.to_string();
    if text.contains('.') || text.contains('e') {
        text
    } else {
        format!("{text}.0")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(self))
    }
}
