//! Shared types for the Sprout transpiler.
//!
//! - [`Span`] / [`SourceFile`] — source locations for diagnostics
//! - [`SproutError`] / [`CompileErrors`] — structured diagnostics
//! - [`ast`] — the restricted-Python AST consumed by every pass
//! - [`unparse`] — AST back to canonical source text

pub mod ast;
pub mod error;
pub mod span;
pub mod unparse;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, Severity, SproutError, MAX_ERRORS};
pub use span::{SourceFile, Span};
