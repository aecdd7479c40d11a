//! Statement and function-body emission.

use sprout_types::ast::*;

use crate::error::{CodegenError, CodegenResult};
use crate::expr::emit_expr;

const INDENT: &str = "    ";

/// Render a parameter list as JavaScript parameters.
///
/// Defaults become ES default parameters.  Keyword-only parameters follow the
/// positional ones as ordinary parameters, the keyword-variadic catch-all
/// defaults to an empty object, and the variadic parameter is emitted last as
/// a rest parameter (JavaScript requires it in final position).
pub fn emit_params(params: &Params) -> CodegenResult<String> {
    let mut parts = Vec::new();
    for p in &params.args {
        parts.push(render_param(p)?);
    }
    for p in &params.kwonly {
        parts.push(render_param(p)?);
    }
    if let Some(kw) = &params.kwarg {
        parts.push(format!("{} = {{}}", kw.name));
    }
    if let Some(va) = &params.vararg {
        parts.push(format!("...{}", va.name));
    }
    Ok(parts.join(", "))
}

fn render_param(p: &Param) -> CodegenResult<String> {
    match &p.default {
        Some(default) => {
            let d = emit_expr(default, 0)?;
            Ok(format!("{} = {d}", p.name.name))
        }
        None => Ok(p.name.name.clone()),
    }
}

/// Emit a function body (or any statement list) at the given indent depth.
pub fn emit_stmts(stmts: &[Stmt], depth: usize, out: &mut String) -> CodegenResult<()> {
    for stmt in stmts {
        emit_stmt(stmt, depth, out)?;
    }
    Ok(())
}

fn emit_stmt(stmt: &Stmt, depth: usize, out: &mut String) -> CodegenResult<()> {
    let pad = INDENT.repeat(depth);
    match &stmt.kind {
        StmtKind::FunctionDef(def) => {
            let params = emit_params(&def.params)?;
            out.push_str(&format!("{pad}var {} = function ({params}) {{\n", def.name.name));
            emit_stmts(&def.body, depth + 1, out)?;
            out.push_str(&format!("{pad}}};\n"));
        }
        StmtKind::Return(value) => match value {
            Some(expr) => {
                let rendered = emit_expr(expr, 0)?;
                out.push_str(&format!("{pad}return {rendered};\n"));
            }
            None => out.push_str(&format!("{pad}return;\n")),
        },
        StmtKind::If(if_stmt) => emit_if(if_stmt, depth, out)?,
        StmtKind::Assign { target, value } => {
            let rendered = emit_expr(value, 0)?;
            out.push_str(&format!("{pad}var {} = {rendered};\n", target.name));
        }
        StmtKind::Expr(expr) => {
            let rendered = emit_expr(expr, 0)?;
            out.push_str(&format!("{pad}{rendered};\n"));
        }
        StmtKind::Pass => {
            // No statement to emit; an empty block is valid.
        }
    }
    Ok(())
}

/// `elif` arrives as an `orelse` holding exactly one nested `if`; chain it
/// back together as `else if` so the output stays flat.
fn emit_if(if_stmt: &IfStmt, depth: usize, out: &mut String) -> CodegenResult<()> {
    let pad = INDENT.repeat(depth);
    let test = emit_expr(&if_stmt.test, 0)?;
    out.push_str(&format!("{pad}if ({test}) {{\n"));
    emit_stmts(&if_stmt.body, depth + 1, out)?;

    let mut orelse = &if_stmt.orelse;
    loop {
        if orelse.is_empty() {
            out.push_str(&format!("{pad}}}\n"));
            return Ok(());
        }
        if let [single] = orelse.as_slice() {
            if let StmtKind::If(nested) = &single.kind {
                let test = emit_expr(&nested.test, 0)?;
                out.push_str(&format!("{pad}}} else if ({test}) {{\n"));
                emit_stmts(&nested.body, depth + 1, out)?;
                orelse = &nested.orelse;
                continue;
            }
        }
        out.push_str(&format!("{pad}}} else {{\n"));
        emit_stmts(orelse, depth + 1, out)?;
        out.push_str(&format!("{pad}}}\n"));
        return Ok(());
    }
}

/// Emit one top-level binding.  Only function definitions, assignments, and
/// bare expression statements are meaningful at module scope.
pub fn emit_top_level(stmt: &Stmt, out: &mut String) -> CodegenResult<()> {
    match &stmt.kind {
        StmtKind::FunctionDef(_) | StmtKind::Assign { .. } | StmtKind::Expr(_) => {
            emit_stmt(stmt, 0, out)
        }
        StmtKind::Pass => Ok(()),
        other => Err(CodegenError::Unsupported(format!(
            "top-level statement: {other:?}"
        ))),
    }
}
