//! The full compilation pipeline.
//!
//! Callables outside the fast-path subset take the long road: the callable
//! is parsed (lambdas are first located inside their defining statement and
//! wrapped in a named function), operators are rewritten onto the runtime
//! shims, the result is unparsed into a synthetic module, compiled to a
//! whole JavaScript program in a temporary directory, and the one binding we
//! care about is extracted back out and post-processed.

use std::fmt::Write as _;
use std::fs;

use sha2::{Digest, Sha256};
use sprout_types::ast::*;
use sprout_types::unparse::unparse_module;
use sprout_types::{SourceFile, Span};

use crate::error::{TranspileError, TranspileResult};
use crate::{extract, normalize, postprocess};

/// Parse a callable's source into a module.
///
/// A source starting with `def` is parsed whole.  Anything else must
/// contain a lambda expression somewhere in its defining statement (the
/// right-hand side of an assignment, an argument position, and so on); the
/// lambda is located and becomes the module's single statement.
pub fn parse_callable(source: &str) -> TranspileResult<Module> {
    if source.trim_start().starts_with("def ") {
        let sf = SourceFile::new("derive.py", source);
        let module = sprout_parser::parse_module_or_message(&sf)
            .map_err(|message| TranspileError::Parse { message })?;
        if function_name(&module).is_none() {
            return Err(TranspileError::Parse {
                message: format!("no function definition found in:\n{}", source.trim()),
            });
        }
        Ok(module)
    } else {
        let lambda = locate_lambda(source)?;
        let stmt = Stmt::new(StmtKind::Expr(lambda), Span::synthetic());
        Ok(Module {
            body: vec![stmt],
            span: Span::synthetic(),
        })
    }
}

/// Compile an already-guarded, sanitized module down to a parenthesized
/// arrow expression.
pub fn emit_full(mut module: Module, source: &str) -> TranspileResult<String> {
    let name = match single_lambda(&module) {
        Some(lambda) => {
            let name = format!("_dv_{}", digest8(source));
            module = wrap_lambda(lambda, &name);
            name
        }
        None => match function_name(&module) {
            Some(name) => name,
            None => {
                return Err(TranspileError::Parse {
                    message: format!("no callable found in:\n{}", source.trim()),
                })
            }
        },
    };

    normalize::normalize_module(&mut module);
    let python = unparse_module(&module);

    let dir = tempfile::tempdir()?;
    let entry = dir.path().join("derive.py");
    fs::write(&entry, &python)?;
    let output =
        sprout_codegen::compile_entry(&entry).map_err(|err| TranspileError::Compiler {
            output: err.to_string(),
        })?;

    let arrow = extract::extract(&output.program, Some(&name))?;
    Ok(postprocess::apply(&arrow))
}

/// Scan forward from the `lambda` keyword, trying ever-shorter prefixes
/// until one parses as a standalone lambda expression.  The longest valid
/// prefix wins, so trailing syntax from the defining statement (a closing
/// call parenthesis, a second argument) is shed one byte at a time.
fn locate_lambda(source: &str) -> TranspileResult<Expr> {
    let start = lambda_keyword_offset(source).ok_or_else(|| TranspileError::Parse {
        message: format!("no lambda expression found in:\n{}", source.trim()),
    })?;
    let tail = &source[start..];
    let mut end = tail.len();
    while end > "lambda".len() {
        if tail.is_char_boundary(end) {
            if let Some(expr) = sprout_parser::parse_standalone_expr(&tail[..end]) {
                if matches!(expr.kind, ExprKind::Lambda(_)) {
                    return Ok(expr);
                }
            }
        }
        end -= 1;
    }
    Err(TranspileError::Parse {
        message: format!("could not isolate lambda expression in:\n{}", source.trim()),
    })
}

/// Byte offset of the first `lambda` appearing as a whole word.
fn lambda_keyword_offset(source: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    for (idx, _) in source.match_indices("lambda") {
        let before_ok = source[..idx].chars().next_back().is_none_or(|c| !is_ident(c));
        let after_ok = source[idx + "lambda".len()..]
            .chars()
            .next()
            .is_none_or(|c| !is_ident(c));
        if before_ok && after_ok {
            return Some(idx);
        }
    }
    None
}

fn single_lambda(module: &Module) -> Option<LambdaExpr> {
    match module.body.as_slice() {
        [stmt] => match &stmt.kind {
            StmtKind::Expr(expr) => match &expr.kind {
                ExprKind::Lambda(lam) => Some((**lam).clone()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn function_name(module: &Module) -> Option<String> {
    module.body.iter().find_map(|stmt| match &stmt.kind {
        StmtKind::FunctionDef(def) => Some(def.name.name.clone()),
        _ => None,
    })
}

/// First eight hex digits of the source's SHA-256, used to give anonymous
/// lambdas a stable binding name.
fn digest8(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    let mut out = String::with_capacity(8);
    for byte in &digest[..4] {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Wrap a lambda in a named function so the compiler has a binding to emit:
///
/// ```text
/// def NAME(params):
///     def NAME_inner(params):
///         return <lambda body>
///     return NAME_inner(param names)
/// ```
fn wrap_lambda(lambda: LambdaExpr, name: &str) -> Module {
    let span = Span::synthetic();
    let inner_name = format!("{name}_inner");

    let inner = FunctionDef {
        name: Ident::new(inner_name.clone(), span),
        params: lambda.params.clone(),
        body: vec![Stmt::new(StmtKind::Return(Some(lambda.body)), span)],
        span,
    };

    // Forward arguments in the order the compiled signature declares them:
    // positional, then keyword-only, then the kwargs object, with the
    // variadic parameter spread last.
    let name_expr = |n: &str| Expr::new(ExprKind::Name(n.to_string()), span);
    let mut call_args: Vec<Expr> = lambda
        .params
        .args
        .iter()
        .chain(lambda.params.kwonly.iter())
        .map(|p| name_expr(&p.name.name))
        .collect();
    if let Some(kw) = &lambda.params.kwarg {
        call_args.push(name_expr(&kw.name));
    }
    if let Some(va) = &lambda.params.vararg {
        call_args.push(Expr::new(
            ExprKind::Starred(Box::new(name_expr(&va.name))),
            span,
        ));
    }
    let call = Expr::new(
        ExprKind::Call {
            func: Box::new(Expr::new(ExprKind::Name(inner_name), span)),
            args: call_args,
            keywords: Vec::new(),
        },
        span,
    );

    let outer = FunctionDef {
        name: Ident::new(name, span),
        params: lambda.params,
        body: vec![
            Stmt::new(StmtKind::FunctionDef(inner), span),
            Stmt::new(StmtKind::Return(Some(call)), span),
        ],
        span,
    };

    Module {
        body: vec![Stmt::new(StmtKind::FunctionDef(outer), span)],
        span,
    }
}
