//! Whole-program assembly.
//!
//! Orchestrates the compilation pipeline:
//! 1. Read and parse the entry file
//! 2. Emit the runtime prelude (operator shims, truthiness, `len`)
//! 3. Emit one `var <name> = function (…) {…};` binding per top-level
//!    definition, in source order
//! 4. Emit an `export {…};` trailer naming the user bindings
//! 5. Write the program to `<entry dir>/__target__/<stem>.js`
//!
//! Diagnostics go into a log buffer carried on the output value; nothing is
//! ever printed.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use sprout_types::ast::{Module, StmtKind};
use sprout_types::SourceFile;

use crate::error::{CodegenError, CodegenResult};
use crate::runtime::RUNTIME_PRELUDE;
use crate::stmt::emit_top_level;

/// Name of the output directory created next to the entry file.
pub const TARGET_DIR: &str = "__target__";

/// A compiled program plus its diagnostic log.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Path of the emitted `.js` file.
    pub target_file: PathBuf,
    /// The full emitted program text.
    pub program: String,
    /// Captured diagnostics (one line per event).
    pub log: String,
}

/// Compile `entry` and write the emitted program to
/// `<entry dir>/__target__/<stem>.js`.
pub fn compile_entry(entry: &Path) -> CodegenResult<CompileOutput> {
    let source = fs::read_to_string(entry)?;
    let file_name = entry
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("module.py")
        .to_string();
    let (program, log) = compile_source(&file_name, &source)?;

    let dir = entry.parent().unwrap_or_else(|| Path::new("."));
    let target_dir = dir.join(TARGET_DIR);
    fs::create_dir_all(&target_dir)?;

    let stem = entry
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("module");
    let target_file = target_dir.join(format!("{stem}.js"));
    fs::write(&target_file, &program)?;

    Ok(CompileOutput {
        target_file,
        program,
        log,
    })
}

/// Compile `source` (named `file_name` in diagnostics) to a full program.
///
/// Returns the program text and the diagnostic log.
pub fn compile_source(file_name: &str, source: &str) -> CodegenResult<(String, String)> {
    let sf = SourceFile::new(file_name, source);
    let result = sprout_parser::parse_module(&sf);
    if result.errors.has_errors() {
        return Err(CodegenError::Parse {
            output: result.errors.to_message(),
        });
    }
    let module = result.module.ok_or_else(|| {
        CodegenError::Internal("parser returned no module and no errors".to_string())
    })?;

    emit_program(file_name, &module)
}

fn emit_program(file_name: &str, module: &Module) -> CodegenResult<(String, String)> {
    let mut log = String::new();
    let _ = writeln!(log, "compiling {file_name}");

    let mut program = String::new();
    let _ = writeln!(program, "// Generated from {file_name}. Do not edit.");
    program.push_str("'use strict';\n");
    program.push_str(RUNTIME_PRELUDE);

    let mut exports = Vec::new();
    for stmt in &module.body {
        emit_top_level(stmt, &mut program)?;
        match &stmt.kind {
            StmtKind::FunctionDef(def) => {
                let _ = writeln!(log, "emitted function '{}'", def.name.name);
                exports.push(def.name.name.clone());
            }
            StmtKind::Assign { target, .. } => {
                let _ = writeln!(log, "emitted binding '{}'", target.name);
                exports.push(target.name.clone());
            }
            _ => {}
        }
    }

    if !exports.is_empty() {
        let _ = writeln!(program, "export {{{}}};", exports.join(", "));
    }
    let _ = writeln!(log, "done ({} exports)", exports.len());

    Ok((program, log))
}
