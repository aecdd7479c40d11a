//! Tree-walking evaluator.
//!
//! The runtime shims the compiled programs reference (`__add__`, `__eq__`,
//! `and_`, `len`, …) are installed as native builtins with the same
//! semantics as the emitted prelude, so a function sliced out of a compiled
//! program evaluates here without carrying the prelude along.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::parser::{JsBinaryOp, JsExpr, JsStmt, JsUnaryOp};
use crate::value::{JsFunction, JsValue};

/// The interpreter.  One instance per evaluation; holds the scope stack and
/// the deterministic PRNG state backing `Math.random`.
pub struct Interp {
    env: Environment,
    rng_state: u64,
}

impl Interp {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            rng_state: 0x5eed_cafe_f00d_2026,
        }
    }

    /// Evaluate an expression.
    pub fn eval(&mut self, expr: &JsExpr) -> EvalResult<JsValue> {
        match expr {
            JsExpr::Num(n) => Ok(JsValue::Num(*n)),
            JsExpr::Str(s) => Ok(JsValue::Str(s.clone())),
            JsExpr::Bool(b) => Ok(JsValue::Bool(*b)),
            JsExpr::Null => Ok(JsValue::Null),
            JsExpr::Undefined => Ok(JsValue::Undefined),

            JsExpr::Array(elems) => {
                let mut out = Vec::with_capacity(elems.len());
                for e in elems {
                    out.push(self.eval(e)?);
                }
                Ok(JsValue::Array(out))
            }
            JsExpr::Object(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let k = match self.eval(key)? {
                        JsValue::Str(s) => s,
                        other => other.to_js_string(),
                    };
                    out.push((k, self.eval(value)?));
                }
                Ok(JsValue::Object(out))
            }

            JsExpr::Ident(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            JsExpr::Member { object, property } => self.eval_member(object, property),
            JsExpr::Index { object, index } => {
                let obj = self.eval(object)?;
                let idx = self.eval(index)?;
                self.eval_index(&obj, &idx)
            }
            JsExpr::Call { callee, args } => self.eval_call(callee, args),

            JsExpr::Unary { op, operand } => {
                let v = self.eval(operand)?;
                self.eval_unary(*op, &v)
            }
            JsExpr::Binary { left, op, right } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                eval_binary(*op, &l, &r)
            }
            JsExpr::Logical { left, and, right } => {
                let l = self.eval(left)?;
                if *and {
                    if l.is_truthy() {
                        self.eval(right)
                    } else {
                        Ok(l)
                    }
                } else if l.is_truthy() {
                    Ok(l)
                } else {
                    self.eval(right)
                }
            }
            JsExpr::Ternary {
                test,
                then,
                otherwise,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }

            JsExpr::Function { params, body } => Ok(JsValue::Function(JsFunction {
                params: params.clone(),
                body: body.clone(),
            })),

            JsExpr::Spread(_) => Err(EvalError::Runtime(
                "spread is only valid in a call argument list".to_string(),
            )),
        }
    }

    /// Call a function value with already-evaluated arguments.
    pub fn call(&mut self, func: &JsFunction, args: &[JsValue]) -> EvalResult<JsValue> {
        self.env.push_scope();
        let mut arg_iter = args.iter().cloned();
        for param in &func.params {
            if param.rest {
                let rest: Vec<JsValue> = arg_iter.by_ref().collect();
                self.env.define(&param.name, JsValue::Array(rest));
                continue;
            }
            let value = match arg_iter.next() {
                Some(v) => v,
                None => match &param.default {
                    Some(default) => match self.eval(default) {
                        Ok(v) => v,
                        Err(e) => {
                            self.env.pop_scope();
                            return Err(e);
                        }
                    },
                    None => JsValue::Undefined,
                },
            };
            self.env.define(&param.name, value);
        }

        let result = self.exec_stmts(&func.body);
        self.env.pop_scope();
        match result {
            Ok(()) => Ok(JsValue::Undefined),
            Err(EvalError::Return(v)) => Ok(v),
            Err(e) => Err(e),
        }
    }

    fn exec_stmts(&mut self, stmts: &[JsStmt]) -> EvalResult<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &JsStmt) -> EvalResult<()> {
        match stmt {
            JsStmt::Decl { name, value } => {
                let v = self.eval(value)?;
                self.env.define(name, v);
                Ok(())
            }
            JsStmt::Return(value) => {
                let v = match value {
                    Some(expr) => self.eval(expr)?,
                    None => JsValue::Undefined,
                };
                Err(EvalError::Return(v))
            }
            JsStmt::If {
                test,
                then,
                otherwise,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.exec_stmts(then)
                } else {
                    self.exec_stmts(otherwise)
                }
            }
            JsStmt::Throw(expr) => {
                let v = self.eval(expr)?;
                Err(EvalError::Runtime(v.to_js_string()))
            }
            JsStmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(())
            }
        }
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &JsExpr, args: &[JsExpr]) -> EvalResult<JsValue> {
        // `Math.<fn>(…)` namespace.
        if let JsExpr::Member { object, property } = callee {
            if matches!(object.as_ref(), JsExpr::Ident(n) if n == "Math") {
                let values = self.eval_args(args)?;
                return self.call_math(property, &values);
            }
            // Method call on a receiver value.
            let receiver = self.eval(object)?;
            let values = self.eval_args(args)?;
            return call_method(&receiver, property, &values);
        }

        if let JsExpr::Ident(name) = callee {
            // User bindings shadow natives.
            if self.env.get(name).is_none() {
                if let Some(result) = self.try_native(name, args)? {
                    return Ok(result);
                }
            }
        }

        let func = match self.eval(callee)? {
            JsValue::Function(f) => f,
            other => return Err(EvalError::NotCallable(other.type_name().to_string())),
        };
        let values = self.eval_args(args)?;
        self.call(&func, &values)
    }

    fn eval_args(&mut self, args: &[JsExpr]) -> EvalResult<Vec<JsValue>> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            if let JsExpr::Spread(inner) = arg {
                match self.eval(inner)? {
                    JsValue::Array(elems) => out.extend(elems),
                    other => {
                        return Err(EvalError::TypeMismatch(format!(
                            "cannot spread {}",
                            other.type_name()
                        )))
                    }
                }
            } else {
                out.push(self.eval(arg)?);
            }
        }
        Ok(out)
    }

    fn try_native(&mut self, name: &str, args: &[JsExpr]) -> EvalResult<Option<JsValue>> {
        let is_native = matches!(
            name,
            "String"
                | "Error"
                | "len"
                | "and_"
                | "or_"
                | "__truthy__"
                | "__not__"
                | "__neg__"
                | "__pos__"
                | "__invert__"
        ) || name.starts_with("__") && name.ends_with("__");
        if !is_native {
            return Ok(None);
        }
        let values = self.eval_args(args)?;
        call_shim(name, &values).map(Some)
    }

    fn call_math(&mut self, name: &str, args: &[JsValue]) -> EvalResult<JsValue> {
        let num = |i: usize| -> EvalResult<f64> {
            match args.get(i) {
                Some(JsValue::Num(n)) => Ok(*n),
                other => Err(EvalError::TypeMismatch(format!(
                    "Math.{name} argument {i}: expected number, got {:?}",
                    other.map(|v| v.type_name())
                ))),
            }
        };
        match name {
            "floor" => Ok(JsValue::Num(num(0)?.floor())),
            "ceil" => Ok(JsValue::Num(num(0)?.ceil())),
            "round" => Ok(JsValue::Num(num(0)?.round())),
            "trunc" => Ok(JsValue::Num(num(0)?.trunc())),
            "abs" => Ok(JsValue::Num(num(0)?.abs())),
            "sqrt" => Ok(JsValue::Num(num(0)?.sqrt())),
            "pow" => Ok(JsValue::Num(num(0)?.powf(num(1)?))),
            "min" => Ok(JsValue::Num(num(0)?.min(num(1)?))),
            "max" => Ok(JsValue::Num(num(0)?.max(num(1)?))),
            "random" => {
                // Deterministic LCG; the distribution is irrelevant, only
                // the [0, 1) range contract matters for tests.
                self.rng_state = self
                    .rng_state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let x = (self.rng_state >> 11) as f64 / (1u64 << 53) as f64;
                Ok(JsValue::Num(x))
            }
            other => Err(EvalError::UnknownMethod(format!("Math.{other}"))),
        }
    }

    fn eval_member(&mut self, object: &JsExpr, property: &str) -> EvalResult<JsValue> {
        let obj = self.eval(object)?;
        match (&obj, property) {
            (JsValue::Str(s), "length") => Ok(JsValue::Num(s.chars().count() as f64)),
            (JsValue::Array(a), "length") => Ok(JsValue::Num(a.len() as f64)),
            (JsValue::Object(entries), prop) => Ok(entries
                .iter()
                .find(|(k, _)| k == prop)
                .map(|(_, v)| v.clone())
                .unwrap_or(JsValue::Undefined)),
            _ => Err(EvalError::UnknownMethod(format!(
                "{}.{property}",
                obj.type_name()
            ))),
        }
    }

    fn eval_index(&self, obj: &JsValue, idx: &JsValue) -> EvalResult<JsValue> {
        match (obj, idx) {
            (JsValue::Array(elems), JsValue::Num(n)) => Ok(elems
                .get(*n as usize)
                .cloned()
                .unwrap_or(JsValue::Undefined)),
            (JsValue::Str(s), JsValue::Num(n)) => Ok(s
                .chars()
                .nth(*n as usize)
                .map(|c| JsValue::Str(c.to_string()))
                .unwrap_or(JsValue::Undefined)),
            (JsValue::Object(entries), JsValue::Str(key)) => Ok(entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or(JsValue::Undefined)),
            _ => Err(EvalError::TypeMismatch(format!(
                "cannot index {} with {}",
                obj.type_name(),
                idx.type_name()
            ))),
        }
    }

    fn eval_unary(&self, op: JsUnaryOp, v: &JsValue) -> EvalResult<JsValue> {
        match op {
            JsUnaryOp::Not => Ok(JsValue::Bool(!v.is_truthy())),
            JsUnaryOp::Neg => Ok(JsValue::Num(-as_number(v)?)),
            JsUnaryOp::Pos => Ok(JsValue::Num(as_number(v)?)),
            JsUnaryOp::BitNot => Ok(JsValue::Num(!(as_number(v)? as i64 as i32) as f64)),
        }
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

// ── Operator semantics ────────────────────────────────────────────────────────

fn as_number(v: &JsValue) -> EvalResult<f64> {
    match v {
        JsValue::Num(n) => Ok(*n),
        JsValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(EvalError::TypeMismatch(format!(
            "expected number, got {}",
            other.type_name()
        ))),
    }
}

fn eval_binary(op: JsBinaryOp, l: &JsValue, r: &JsValue) -> EvalResult<JsValue> {
    use JsBinaryOp::*;
    match op {
        Add => match (l, r) {
            (JsValue::Num(a), JsValue::Num(b)) => Ok(JsValue::Num(a + b)),
            (JsValue::Str(_), _) | (_, JsValue::Str(_)) => Ok(JsValue::Str(format!(
                "{}{}",
                l.to_js_string(),
                r.to_js_string()
            ))),
            _ => Err(EvalError::TypeMismatch(format!(
                "cannot add {} and {}",
                l.type_name(),
                r.type_name()
            ))),
        },
        Sub => Ok(JsValue::Num(as_number(l)? - as_number(r)?)),
        Mul => Ok(JsValue::Num(as_number(l)? * as_number(r)?)),
        Div => Ok(JsValue::Num(as_number(l)? / as_number(r)?)),
        // `%` is a remainder with the dividend's sign, as in JavaScript.
        Mod => Ok(JsValue::Num(as_number(l)? % as_number(r)?)),
        StrictEq => Ok(JsValue::Bool(l.strict_eq(r))),
        StrictNeq => Ok(JsValue::Bool(!l.strict_eq(r))),
        Lt | Le | Gt | Ge => compare(op, l, r),
        BitAnd => bit_op(l, r, |a, b| a & b),
        BitOr => bit_op(l, r, |a, b| a | b),
        BitXor => bit_op(l, r, |a, b| a ^ b),
        Shl => bit_op(l, r, |a, b| a << (b & 31)),
        Shr => bit_op(l, r, |a, b| a >> (b & 31)),
    }
}

fn bit_op(l: &JsValue, r: &JsValue, f: fn(i32, i32) -> i32) -> EvalResult<JsValue> {
    let a = as_number(l)? as i64 as i32;
    let b = as_number(r)? as i64 as i32;
    Ok(JsValue::Num(f(a, b) as f64))
}

fn compare(op: JsBinaryOp, l: &JsValue, r: &JsValue) -> EvalResult<JsValue> {
    let ord = match (l, r) {
        (JsValue::Str(a), JsValue::Str(b)) => a.partial_cmp(b),
        _ => as_number(l)?.partial_cmp(&as_number(r)?),
    };
    let Some(ord) = ord else {
        return Ok(JsValue::Bool(false)); // NaN comparisons
    };
    let result = match op {
        JsBinaryOp::Lt => ord.is_lt(),
        JsBinaryOp::Le => ord.is_le(),
        JsBinaryOp::Gt => ord.is_gt(),
        JsBinaryOp::Ge => ord.is_ge(),
        _ => unreachable!(),
    };
    Ok(JsValue::Bool(result))
}

// ── Runtime shims (native) ────────────────────────────────────────────────────

/// Truthiness with source-language semantics: empty containers are falsy.
fn py_truthy(v: &JsValue) -> bool {
    match v {
        JsValue::Array(a) => !a.is_empty(),
        JsValue::Object(o) => !o.is_empty(),
        other => other.is_truthy(),
    }
}

/// Duck-typed equality: booleans compare numerically against numbers, lists
/// compare element-wise.
fn py_eq(l: &JsValue, r: &JsValue) -> bool {
    match (l, r) {
        (JsValue::Bool(_), JsValue::Num(_)) | (JsValue::Num(_), JsValue::Bool(_)) => {
            as_number(l).ok() == as_number(r).ok()
        }
        (JsValue::Array(a), JsValue::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| py_eq(x, y))
        }
        _ => l.strict_eq(r),
    }
}

fn call_method(receiver: &JsValue, method: &str, args: &[JsValue]) -> EvalResult<JsValue> {
    match (receiver, method) {
        (JsValue::Str(s), "toLowerCase") => Ok(JsValue::Str(s.to_lowercase())),
        (JsValue::Str(s), "toUpperCase") => Ok(JsValue::Str(s.to_uppercase())),
        (JsValue::Str(s), "trim") => Ok(JsValue::Str(s.trim().to_string())),
        (JsValue::Str(s), "repeat") => match args.first() {
            Some(JsValue::Num(n)) => Ok(JsValue::Str(s.repeat(*n as usize))),
            _ => Err(EvalError::TypeMismatch("repeat count".to_string())),
        },
        (JsValue::Array(a), "concat") => match args.first() {
            Some(JsValue::Array(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(JsValue::Array(out))
            }
            _ => Err(EvalError::TypeMismatch("concat argument".to_string())),
        },
        _ => Err(EvalError::UnknownMethod(format!(
            "{}.{method}",
            receiver.type_name()
        ))),
    }
}

fn call_shim(name: &str, args: &[JsValue]) -> EvalResult<JsValue> {
    let arg = |i: usize| -> EvalResult<&JsValue> {
        args.get(i).ok_or_else(|| {
            EvalError::Runtime(format!("{name}: missing argument {i}"))
        })
    };
    let num = |i: usize| -> EvalResult<f64> { as_number(arg(i)?) };

    match name {
        "String" => Ok(JsValue::Str(arg(0)?.to_js_string())),
        "Error" => Ok(JsValue::Str(arg(0)?.to_js_string())),
        "len" => match arg(0)? {
            JsValue::Str(s) => Ok(JsValue::Num(s.chars().count() as f64)),
            JsValue::Array(a) => Ok(JsValue::Num(a.len() as f64)),
            JsValue::Object(o) => Ok(JsValue::Num(o.len() as f64)),
            other => Err(EvalError::TypeMismatch(format!(
                "len of {}",
                other.type_name()
            ))),
        },

        "__truthy__" => Ok(JsValue::Bool(py_truthy(arg(0)?))),
        "__not__" => Ok(JsValue::Bool(!py_truthy(arg(0)?))),
        "and_" => Ok(if py_truthy(arg(0)?) {
            arg(1)?.clone()
        } else {
            arg(0)?.clone()
        }),
        "or_" => Ok(if py_truthy(arg(0)?) {
            arg(0)?.clone()
        } else {
            arg(1)?.clone()
        }),

        "__eq__" => Ok(JsValue::Bool(py_eq(arg(0)?, arg(1)?))),
        "__ne__" => Ok(JsValue::Bool(!py_eq(arg(0)?, arg(1)?))),
        "__lt__" => compare(JsBinaryOp::Lt, arg(0)?, arg(1)?),
        "__le__" => compare(JsBinaryOp::Le, arg(0)?, arg(1)?),
        "__gt__" => compare(JsBinaryOp::Gt, arg(0)?, arg(1)?),
        "__ge__" => compare(JsBinaryOp::Ge, arg(0)?, arg(1)?),

        "__add__" => match (arg(0)?, arg(1)?) {
            (JsValue::Array(a), JsValue::Array(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(JsValue::Array(out))
            }
            (l, r) => eval_binary(JsBinaryOp::Add, l, r),
        },
        "__sub__" => Ok(JsValue::Num(num(0)? - num(1)?)),
        "__mul__" => match (arg(0)?, arg(1)?) {
            (JsValue::Str(s), JsValue::Num(n)) | (JsValue::Num(n), JsValue::Str(s)) => {
                Ok(JsValue::Str(s.repeat(*n as usize)))
            }
            _ => Ok(JsValue::Num(num(0)? * num(1)?)),
        },
        "__truediv__" => Ok(JsValue::Num(num(0)? / num(1)?)),
        "__floordiv__" => Ok(JsValue::Num((num(0)? / num(1)?).floor())),
        "__mod__" => {
            let (a, b) = (num(0)?, num(1)?);
            Ok(JsValue::Num(((a % b) + b) % b))
        }
        "__pow__" => Ok(JsValue::Num(num(0)?.powf(num(1)?))),
        "__lshift__" => bit_op(arg(0)?, arg(1)?, |a, b| a << (b & 31)),
        "__rshift__" => bit_op(arg(0)?, arg(1)?, |a, b| a >> (b & 31)),
        "__and__" => bit_op(arg(0)?, arg(1)?, |a, b| a & b),
        "__or__" => bit_op(arg(0)?, arg(1)?, |a, b| a | b),
        "__xor__" => bit_op(arg(0)?, arg(1)?, |a, b| a ^ b),
        "__neg__" => Ok(JsValue::Num(-num(0)?)),
        "__pos__" => Ok(JsValue::Num(num(0)?)),
        "__invert__" => Ok(JsValue::Num(!(num(0)? as i64 as i32) as f64)),
        "__matmul__" => Err(EvalError::Runtime(
            "matrix multiplication is not supported".to_string(),
        )),

        other => Err(EvalError::UndefinedVariable(other.to_string())),
    }
}
