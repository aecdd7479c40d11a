//! Identifier sanitization: rename parameters that collide with JavaScript
//! reserved words.
//!
//! A scope is pushed for every `def` and `lambda` entered.  Each scope maps
//! original parameter names to their effective names: colliding parameters
//! get a fresh `_py`-suffixed name, non-colliding ones map to themselves so
//! that an inner parameter shadows any outer rename of the same name.
//! References look up the innermost scope that knows the name.

use std::collections::BTreeMap;

use sprout_types::ast::*;

/// JavaScript reserved words plus the literals that cannot be identifiers.
const JS_RESERVED: &[&str] = &[
    "abstract",
    "arguments",
    "await",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "function",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "let",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
    "yield",
];

/// Whether `name` is reserved in the target language.
pub fn is_js_reserved(name: &str) -> bool {
    JS_RESERVED.contains(&name)
}

/// Sanitize a whole module in place.
pub fn sanitize_module(module: &mut Module) {
    let mut scopes = Scopes::new();
    for stmt in &mut module.body {
        sanitize_stmt(stmt, &mut scopes);
    }
}

struct Scopes {
    stack: Vec<BTreeMap<String, String>>,
}

impl Scopes {
    fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn push(&mut self) {
        self.stack.push(BTreeMap::new());
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    /// Innermost-first lookup.
    fn lookup(&self, name: &str) -> Option<&str> {
        for scope in self.stack.iter().rev() {
            if let Some(renamed) = scope.get(name) {
                return Some(renamed);
            }
        }
        None
    }

    /// Register a parameter in the current scope, renaming it when it
    /// collides with a reserved word.  The suffix strategy is deterministic:
    /// `_py`, then `_py2`, `_py3`, … until the candidate is free.
    fn declare_param(&mut self, name: &str) -> String {
        let effective = if is_js_reserved(name) {
            let mut candidate = format!("{name}_py");
            let mut counter = 2;
            while self.taken_in_current(&candidate) || is_js_reserved(&candidate) {
                candidate = format!("{name}_py{counter}");
                counter += 1;
            }
            candidate
        } else {
            name.to_string()
        };
        if let Some(scope) = self.stack.last_mut() {
            scope.insert(name.to_string(), effective.clone());
        }
        effective
    }

    fn taken_in_current(&self, candidate: &str) -> bool {
        self.stack
            .last()
            .is_some_and(|scope| scope.values().any(|v| v == candidate))
    }
}

fn sanitize_stmt(stmt: &mut Stmt, scopes: &mut Scopes) {
    match &mut stmt.kind {
        StmtKind::FunctionDef(def) => {
            // Defaults are evaluated in the enclosing scope.
            for p in def.params.args.iter_mut().chain(def.params.kwonly.iter_mut()) {
                if let Some(default) = &mut p.default {
                    sanitize_expr(default, scopes);
                }
            }
            scopes.push();
            declare_params(&mut def.params, scopes);
            for s in &mut def.body {
                sanitize_stmt(s, scopes);
            }
            scopes.pop();
        }
        StmtKind::Return(Some(expr)) => sanitize_expr(expr, scopes),
        StmtKind::Return(None) | StmtKind::Pass => {}
        StmtKind::If(if_stmt) => {
            sanitize_expr(&mut if_stmt.test, scopes);
            for s in &mut if_stmt.body {
                sanitize_stmt(s, scopes);
            }
            for s in &mut if_stmt.orelse {
                sanitize_stmt(s, scopes);
            }
        }
        StmtKind::Assign { target, value } => {
            sanitize_expr(value, scopes);
            if let Some(renamed) = scopes.lookup(&target.name) {
                target.name = renamed.to_string();
            }
        }
        StmtKind::Expr(expr) => sanitize_expr(expr, scopes),
    }
}

fn declare_params(params: &mut Params, scopes: &mut Scopes) {
    for p in params.args.iter_mut().chain(params.kwonly.iter_mut()) {
        p.name.name = scopes.declare_param(&p.name.name);
    }
    if let Some(v) = &mut params.vararg {
        v.name = scopes.declare_param(&v.name);
    }
    if let Some(k) = &mut params.kwarg {
        k.name = scopes.declare_param(&k.name);
    }
}

fn sanitize_expr(expr: &mut Expr, scopes: &mut Scopes) {
    match &mut expr.kind {
        ExprKind::Name(name) => {
            if let Some(renamed) = scopes.lookup(name) {
                *name = renamed.to_string();
            }
        }
        ExprKind::List(elems) | ExprKind::Tuple(elems) => {
            for e in elems {
                sanitize_expr(e, scopes);
            }
        }
        ExprKind::Dict(entries) => {
            for (k, v) in entries {
                sanitize_expr(k, scopes);
                sanitize_expr(v, scopes);
            }
        }
        // Attribute names live in the member namespace, not the scope.
        ExprKind::Attribute { value, .. } => sanitize_expr(value, scopes),
        ExprKind::Subscript { value, index } => {
            sanitize_expr(value, scopes);
            sanitize_expr(index, scopes);
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            sanitize_expr(func, scopes);
            for a in args {
                sanitize_expr(a, scopes);
            }
            // Keyword names refer to the callee's parameters; only the
            // values are in scope here.
            for (_, v) in keywords {
                sanitize_expr(v, scopes);
            }
        }
        ExprKind::BinOp { left, right, .. } => {
            sanitize_expr(left, scopes);
            sanitize_expr(right, scopes);
        }
        ExprKind::UnaryOp { operand, .. } => sanitize_expr(operand, scopes),
        ExprKind::Compare {
            left, comparators, ..
        } => {
            sanitize_expr(left, scopes);
            for c in comparators {
                sanitize_expr(c, scopes);
            }
        }
        ExprKind::BoolOp { values, .. } => {
            for v in values {
                sanitize_expr(v, scopes);
            }
        }
        ExprKind::IfExp { test, body, orelse } => {
            sanitize_expr(test, scopes);
            sanitize_expr(body, scopes);
            sanitize_expr(orelse, scopes);
        }
        ExprKind::Lambda(lam) => {
            for p in lam.params.args.iter_mut().chain(lam.params.kwonly.iter_mut()) {
                if let Some(default) = &mut p.default {
                    sanitize_expr(default, scopes);
                }
            }
            scopes.push();
            declare_params(&mut lam.params, scopes);
            sanitize_expr(&mut lam.body, scopes);
            scopes.pop();
        }
        ExprKind::Starred(inner) => sanitize_expr(inner, scopes),
        _ => {}
    }
}
