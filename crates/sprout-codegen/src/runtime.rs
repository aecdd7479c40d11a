//! Runtime support bindings emitted at the top of every compiled program.
//!
//! Source programs reference these by name (`__add__(a, b)` instead of
//! `a + b`) when they need Python operator semantics: duck-typed equality
//! across numbers/booleans, deep list equality, list concatenation, true
//! modulo, value truthiness.  The preamble is plain `var` bindings so that
//! downstream consumers slicing individual functions out of the program can
//! skip it wholesale.

/// Names bound by [`RUNTIME_PRELUDE`], in emission order.
pub const RUNTIME_BINDINGS: &[&str] = &[
    "__truthy__",
    "__eq__",
    "__ne__",
    "__lt__",
    "__le__",
    "__gt__",
    "__ge__",
    "__add__",
    "__sub__",
    "__mul__",
    "__truediv__",
    "__floordiv__",
    "__mod__",
    "__pow__",
    "__lshift__",
    "__rshift__",
    "__and__",
    "__or__",
    "__xor__",
    "__matmul__",
    "__neg__",
    "__pos__",
    "__invert__",
    "__not__",
    "and_",
    "or_",
    "len",
];

/// The runtime preamble text.  Emitted verbatim before any user binding.
pub const RUNTIME_PRELUDE: &str = r#"var __truthy__ = function (v) {
    if (v === null || v === undefined || v === false) return false;
    if (v === 0 || v === '') return false;
    if (Array.isArray(v)) return v.length > 0;
    if (typeof v === 'object') return Object.keys(v).length > 0;
    return true;
};
var __eq__ = function (a, b) {
    if (typeof a === 'boolean' || typeof b === 'boolean') {
        if (typeof a === 'number' || typeof b === 'number') {
            return Number(a) === Number(b);
        }
    }
    if (Array.isArray(a) && Array.isArray(b)) {
        if (a.length !== b.length) return false;
        for (var i = 0; i < a.length; i++) {
            if (!__eq__(a[i], b[i])) return false;
        }
        return true;
    }
    return a === b;
};
var __ne__ = function (a, b) { return !__eq__(a, b); };
var __lt__ = function (a, b) { return a < b; };
var __le__ = function (a, b) { return a <= b; };
var __gt__ = function (a, b) { return a > b; };
var __ge__ = function (a, b) { return a >= b; };
var __add__ = function (a, b) {
    if (Array.isArray(a) && Array.isArray(b)) return a.concat(b);
    return a + b;
};
var __sub__ = function (a, b) { return a - b; };
var __mul__ = function (a, b) {
    if (typeof a === 'string' && typeof b === 'number') return a.repeat(b);
    if (typeof a === 'number' && typeof b === 'string') return b.repeat(a);
    return a * b;
};
var __truediv__ = function (a, b) { return a / b; };
var __floordiv__ = function (a, b) { return Math.floor(a / b); };
var __mod__ = function (a, b) {
    if (typeof a === 'number' && typeof b === 'number') {
        return ((a % b) + b) % b;
    }
    return a % b;
};
var __pow__ = function (a, b) { return Math.pow(a, b); };
var __lshift__ = function (a, b) { return a << b; };
var __rshift__ = function (a, b) { return a >> b; };
var __and__ = function (a, b) { return a & b; };
var __or__ = function (a, b) { return a | b; };
var __xor__ = function (a, b) { return a ^ b; };
var __matmul__ = function (a, b) {
    throw new Error('matrix multiplication is not supported');
};
var __neg__ = function (a) { return -a; };
var __pos__ = function (a) { return +a; };
var __invert__ = function (a) { return ~a; };
var __not__ = function (a) { return !__truthy__(a); };
var and_ = function (a, b) { return __truthy__(a) ? b : a; };
var or_ = function (a, b) { return __truthy__(a) ? a : b; };
var len = function (v) {
    if (typeof v === 'string' || Array.isArray(v)) return v.length;
    return Object.keys(v).length;
};
"#;
