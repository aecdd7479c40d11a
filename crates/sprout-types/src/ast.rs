//! AST node types for the restricted-Python derive subset.
//!
//! Every node carries a [`Span`] for error reporting; nodes synthesized by
//! rewrite passes carry `Span::synthetic()`. Large recursive types are boxed
//! to keep enum sizes reasonable. Source order is preserved everywhere —
//! dict entries and parameter lists are positional.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete parsed module: the statements of one derive-function source.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `def name(params): body`
    FunctionDef(FunctionDef),
    /// `return [expr]`
    Return(Option<Expr>),
    /// `if test: body [elif ...] [else: orelse]` — elif chains nest in `orelse`.
    If(IfStmt),
    /// `name = expr`
    Assign { target: Ident, value: Expr },
    /// A bare expression statement.
    Expr(Expr),
    /// `pass`
    Pass,
}

/// `def name(params): body`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Params,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `if test: body [else: orelse]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub body: Vec<Stmt>,
    /// Empty for no else; a single nested `If` statement for `elif`.
    pub orelse: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Parameters
// ══════════════════════════════════════════════════════════════════════════════

/// A full parameter list: positional, `*args`, keyword-only, `**kwargs`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    pub args: Vec<Param>,
    pub vararg: Option<Ident>,
    pub kwonly: Vec<Param>,
    pub kwarg: Option<Ident>,
}

impl Params {
    /// All declared parameter names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.args.iter().map(|p| p.name.name.as_str()).collect();
        if let Some(v) = &self.vararg {
            out.push(v.name.as_str());
        }
        out.extend(self.kwonly.iter().map(|p| p.name.name.as_str()));
        if let Some(k) = &self.kwarg {
            out.push(k.name.as_str());
        }
        out
    }
}

/// One positional or keyword-only parameter, with optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    /// `42`
    Int(i64),
    /// `3.14`
    Float(f64),
    /// `"hello"` / `'hello'` (unescaped value)
    Str(String),
    /// `True` / `False`
    Bool(bool),
    /// `None`
    NoneLit,
    /// `[expr, ...]`
    List(Vec<Expr>),
    /// `(expr, ...)`
    Tuple(Vec<Expr>),
    /// `{key: value, ...}` — source order preserved
    Dict(Vec<(Expr, Expr)>),

    // ── Names & access ──
    /// `color`, `math`
    Name(String),
    /// `expr.attr`
    Attribute { value: Box<Expr>, attr: Ident },
    /// `expr[index]`
    Subscript { value: Box<Expr>, index: Box<Expr> },
    /// `func(args...)`
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(Ident, Expr)>,
    },

    // ── Operators ──
    /// `a + b`, `a ** b`, ...
    BinOp {
        left: Box<Expr>,
        op: BinOpKind,
        right: Box<Expr>,
    },
    /// `-x`, `not x`, `~x`, `+x`
    UnaryOp { op: UnaryOpKind, operand: Box<Expr> },
    /// `a < b`, `a < b < c` — ops/comparators are parallel vectors.
    Compare {
        left: Box<Expr>,
        ops: Vec<CmpOp>,
        comparators: Vec<Expr>,
    },
    /// `a and b and c` — flattened, N >= 2 operands.
    BoolOp { op: BoolOpKind, values: Vec<Expr> },

    // ── Conditional & lambda ──
    /// `body if test else orelse`
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// `lambda params: body`
    Lambda(Box<LambdaExpr>),

    /// `*expr` in call-argument position.  Synthesized when a wrapper
    /// forwards a variadic parameter into its inner call.
    Starred(Box<Expr>),
}

/// `lambda params: body` — expression body only.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Params,
    pub body: Expr,
    pub span: Span,
}

// ── Binary operators ──────────────────────────────────────────────────────────

/// Binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    MatMult,
}

impl BinOpKind {
    /// Returns the operator symbol for unparsing and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::FloorDiv => "//",
            BinOpKind::Mod => "%",
            BinOpKind::Pow => "**",
            BinOpKind::LShift => "<<",
            BinOpKind::RShift => ">>",
            BinOpKind::BitOr => "|",
            BinOpKind::BitXor => "^",
            BinOpKind::BitAnd => "&",
            BinOpKind::MatMult => "@",
        }
    }

    /// The runtime shim that implements this operator's host semantics.
    pub fn shim_name(&self) -> &'static str {
        match self {
            BinOpKind::Add => "__add__",
            BinOpKind::Sub => "__sub__",
            BinOpKind::Mul => "__mul__",
            BinOpKind::Div => "__truediv__",
            BinOpKind::FloorDiv => "__floordiv__",
            BinOpKind::Mod => "__mod__",
            BinOpKind::Pow => "__pow__",
            BinOpKind::LShift => "__lshift__",
            BinOpKind::RShift => "__rshift__",
            BinOpKind::BitOr => "__or__",
            BinOpKind::BitXor => "__xor__",
            BinOpKind::BitAnd => "__and__",
            BinOpKind::MatMult => "__matmul__",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `~x`
    Invert,
    /// `not x`
    Not,
}

impl UnaryOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOpKind::Neg => "-",
            UnaryOpKind::Pos => "+",
            UnaryOpKind::Invert => "~",
            UnaryOpKind::Not => "not ",
        }
    }

    pub fn shim_name(&self) -> &'static str {
        match self {
            UnaryOpKind::Neg => "__neg__",
            UnaryOpKind::Pos => "__pos__",
            UnaryOpKind::Invert => "__invert__",
            UnaryOpKind::Not => "__not__",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
        }
    }

    pub fn shim_name(&self) -> &'static str {
        match self {
            CmpOp::Eq => "__eq__",
            CmpOp::NotEq => "__ne__",
            CmpOp::Lt => "__lt__",
            CmpOp::LtE => "__le__",
            CmpOp::Gt => "__gt__",
            CmpOp::GtE => "__ge__",
        }
    }

    /// The native JavaScript operator the fast path may use.
    pub fn js_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "===",
            CmpOp::NotEq => "!==",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
        }
    }
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOpKind {
    And,
    Or,
}

impl BoolOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOpKind::And => "and",
            BoolOpKind::Or => "or",
        }
    }

    pub fn shim_name(&self) -> &'static str {
        match self {
            BoolOpKind::And => "and_",
            BoolOpKind::Or => "or_",
        }
    }
}
