//! Sprout parser: token stream to derive-subset AST.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};

use sprout_lexer::Lexer;
use sprout_types::ast::{Expr, Module};
use sprout_types::{CompileErrors, SourceFile};

/// Lex and parse a whole module in one step.
pub fn parse_module(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}

/// Parse `source` as a single standalone expression.
///
/// Used by the pipeline's lambda-locating prefix scan: candidate prefixes
/// are accepted only when they parse cleanly with nothing left over.
pub fn parse_standalone_expr(source: &str) -> Option<Expr> {
    let sf = SourceFile::new("<expr>", source);
    let result = parse_module(&sf);
    if result.errors.has_errors() {
        return None;
    }
    let module: Module = result.module?;
    match module.body.as_slice() {
        [stmt] => match &stmt.kind {
            sprout_types::ast::StmtKind::Expr(expr) => Some(expr.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Convenience wrapper returning the module or the joined error text.
pub fn parse_module_or_message(source_file: &SourceFile) -> Result<Module, String> {
    let result = parse_module(source_file);
    if result.errors.has_errors() {
        return Err(result.errors.to_message());
    }
    result
        .module
        .ok_or_else(|| "empty parse result".to_string())
}

/// Re-exported for callers that only need the error container.
pub type Errors = CompileErrors;
