//! Transpiler error types.
//!
//! Everything here is fatal for the compilation request it occurs in; the
//! only recoverable signal in the crate is [`crate::fastpath::FastPathRejection`],
//! which is deliberately not an error.

use thiserror::Error;

/// Errors surfaced to the caller of a compilation request.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// The callable closes over globals outside the allow-list.  Raised
    /// before any compiler invocation; never retried.  The field holding
    /// the offending source cannot be called `source` (thiserror reserves
    /// that name for an error cause).
    #[error(
        "function:\n{callable}\ncontains non-local variables: {names:?}.\n\
         Either the module is not supported or the variable should be \
         passed in as a declared argument instead."
    )]
    CaptureViolation {
        callable: String,
        names: Vec<String>,
    },

    /// The callable's source failed to parse, or no lambda could be located
    /// inside it.
    #[error("cannot parse callable source: {message}")]
    Parse { message: String },

    /// The whole-program compiler rejected the synthetic module; carries its
    /// diagnostic output verbatim.
    #[error("whole-program compilation failed:\n{output}")]
    Compiler { output: String },

    /// Extraction: no binding matching the expected name was found.
    #[error("no function binding '{name}' in compiled output")]
    BindingNotFound { name: String },

    /// Extraction: the parameter list was not followed by a `{{` body.
    #[error("expected '{{' after parameter list of '{name}' in compiled output")]
    MissingBodyBrace { name: String },

    /// Extraction: a balanced scan ran off the end of the text.
    #[error("unbalanced {what} scan in compiled output")]
    UnbalancedScan { what: &'static str },

    /// Scratch-directory or output-file i/o failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for transpiler operations.
pub type TranspileResult<T> = Result<T, TranspileError>;
