//! Capture guard: reject functions that close over module-level state.
//!
//! A derive function must be self-contained.  Values it needs have to come
//! in through declared parameters, because the emitted JavaScript runs in a
//! context where the Python module's globals do not exist.  The only names
//! allowed to leak through are well-known module imports and touch key
//! constants, which get rewritten rather than captured.

use std::collections::{BTreeMap, BTreeSet};

use sprout_types::ast::*;

use crate::error::{TranspileError, TranspileResult};
use crate::touch_key::TouchKey;

/// What a name in the caller's global table refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Global {
    /// An imported module object.
    Module,
    /// A touch key constant, replaced with its key string during rewriting.
    TouchKey(TouchKey),
    /// Anything else.  Referencing one of these is a capture violation.
    Other,
}

/// Module names a derive function may reference without declaring them.
/// These either map onto JavaScript equivalents or never survive into the
/// emitted code.
pub const NON_LOCAL_INCLUDES: &[&str] = &[
    "math", "random", "numpy", "pandas", "datetime", "time", "re", "os", "sys", "json",
    "csv", "TouchKey",
];

/// Check every free name of `module` against the caller-supplied global
/// table.  Free names that resolve to plain values or to modules outside
/// the allow-list are reported together in one error.
pub fn check_captures(
    module: &Module,
    source: &str,
    globals: &BTreeMap<String, Global>,
) -> TranspileResult<()> {
    let free = free_names(module);
    let mut violations: Vec<String> = Vec::new();
    for name in &free {
        match globals.get(name.as_str()) {
            Some(Global::Module) => {
                if !NON_LOCAL_INCLUDES.contains(&name.as_str()) {
                    violations.push(name.clone());
                }
            }
            Some(Global::TouchKey(_)) => {}
            Some(Global::Other) => violations.push(name.clone()),
            None => {}
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(TranspileError::CaptureViolation {
            callable: source.trim().to_string(),
            names: violations,
        })
    }
}

/// Collect the free names of a module: every `Name` reference not bound by
/// an enclosing parameter list, assignment, or `def`.  The result is sorted
/// and deduplicated.
pub fn free_names(module: &Module) -> Vec<String> {
    let mut walker = FreeNameWalker {
        scopes: vec![BTreeSet::new()],
        free: BTreeSet::new(),
    };
    // Module-level assignments and defs bind before any body executes.
    for stmt in &module.body {
        walker.predeclare(stmt);
    }
    for stmt in &module.body {
        walker.walk_stmt(stmt);
    }
    walker.free.into_iter().collect()
}

struct FreeNameWalker {
    scopes: Vec<BTreeSet<String>>,
    free: BTreeSet<String>,
}

impl FreeNameWalker {
    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains(name))
    }

    fn reference(&mut self, name: &str) {
        if !self.is_bound(name) {
            self.free.insert(name.to_string());
        }
    }

    /// Bind names introduced by a statement in the current scope without
    /// descending into nested bodies.
    fn predeclare(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => self.bind(&def.name.name),
            StmtKind::Assign { target, .. } => self.bind(&target.name),
            StmtKind::If(if_stmt) => {
                for s in if_stmt.body.iter().chain(if_stmt.orelse.iter()) {
                    self.predeclare(s);
                }
            }
            _ => {}
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => {
                for p in def.params.args.iter().chain(def.params.kwonly.iter()) {
                    if let Some(default) = &p.default {
                        self.walk_expr(default);
                    }
                }
                self.scopes.push(BTreeSet::new());
                for name in def.params.names() {
                    self.bind(&name);
                }
                for s in &def.body {
                    self.predeclare(s);
                }
                for s in &def.body {
                    self.walk_stmt(s);
                }
                self.scopes.pop();
            }
            StmtKind::Return(Some(expr)) => self.walk_expr(expr),
            StmtKind::Return(None) | StmtKind::Pass => {}
            StmtKind::If(if_stmt) => {
                self.walk_expr(&if_stmt.test);
                for s in if_stmt.body.iter().chain(if_stmt.orelse.iter()) {
                    self.walk_stmt(s);
                }
            }
            StmtKind::Assign { value, .. } => self.walk_expr(value),
            StmtKind::Expr(expr) => self.walk_expr(expr),
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Name(name) => self.reference(name),
            ExprKind::List(elems) | ExprKind::Tuple(elems) => {
                for e in elems {
                    self.walk_expr(e);
                }
            }
            ExprKind::Dict(entries) => {
                for (k, v) in entries {
                    self.walk_expr(k);
                    self.walk_expr(v);
                }
            }
            ExprKind::Attribute { value, .. } => self.walk_expr(value),
            ExprKind::Subscript { value, index } => {
                self.walk_expr(value);
                self.walk_expr(index);
            }
            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                self.walk_expr(func);
                for a in args {
                    self.walk_expr(a);
                }
                for (_, v) in keywords {
                    self.walk_expr(v);
                }
            }
            ExprKind::BinOp { left, right, .. } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            ExprKind::UnaryOp { operand, .. } => self.walk_expr(operand),
            ExprKind::Compare {
                left, comparators, ..
            } => {
                self.walk_expr(left);
                for c in comparators {
                    self.walk_expr(c);
                }
            }
            ExprKind::BoolOp { values, .. } => {
                for v in values {
                    self.walk_expr(v);
                }
            }
            ExprKind::IfExp { test, body, orelse } => {
                self.walk_expr(test);
                self.walk_expr(body);
                self.walk_expr(orelse);
            }
            ExprKind::Lambda(lam) => {
                for p in lam.params.args.iter().chain(lam.params.kwonly.iter()) {
                    if let Some(default) = &p.default {
                        self.walk_expr(default);
                    }
                }
                self.scopes.push(BTreeSet::new());
                for name in lam.params.names() {
                    self.bind(&name);
                }
                self.walk_expr(&lam.body);
                self.scopes.pop();
            }
            ExprKind::Starred(inner) => self.walk_expr(inner),
            _ => {}
        }
    }
}
