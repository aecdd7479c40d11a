//! Runtime error types for the JavaScript-subset evaluator.

use std::fmt;

use crate::value::JsValue;

/// Evaluation error.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// The source text is not in the evaluated subset.
    Parse(String),
    /// Unknown variable
    UndefinedVariable(String),
    /// A non-function value was called
    NotCallable(String),
    /// Unknown method on a receiver value
    UnknownMethod(String),
    /// Type mismatch at runtime
    TypeMismatch(String),
    /// `return` statement (used internally for control flow)
    Return(JsValue),
    /// Generic runtime error
    Runtime(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            Self::NotCallable(msg) => write!(f, "not callable: {msg}"),
            Self::UnknownMethod(msg) => write!(f, "unknown method: {msg}"),
            Self::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            Self::Return(_) => write!(f, "return"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
