//! Codegen error types.

use thiserror::Error;

/// Errors that can occur while compiling a source file to JavaScript.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The entry file failed to lex or parse; carries the full diagnostic
    /// listing so callers can surface it verbatim.
    #[error("compilation failed:\n{output}")]
    Parse { output: String },

    /// An AST construct outside the compilable subset.
    #[error("unsupported construct: {0}")]
    Unsupported(String),

    /// An internal consistency check failed.
    #[error("internal codegen error: {0}")]
    Internal(String),

    /// Reading the entry file or writing the output failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
