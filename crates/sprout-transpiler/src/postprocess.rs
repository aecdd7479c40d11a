//! Textual fixups applied to extracted JavaScript.
//!
//! A few Python standard-library calls survive compilation verbatim because
//! the compiler treats unknown names as pass-through.  They are rewritten
//! here onto their `Math` equivalents.  Order matters: the `random.randint`
//! rule must run before the bare `random.random` rule, and both before the
//! blanket `math.` rename.

use regex::Regex;

/// Rewrite surviving Python standard-library calls to JavaScript.
pub fn apply(js: &str) -> String {
    // randint(a, b) is inclusive on both ends, hence the `+ 1`.  The
    // replacement is parenthesized so the trailing `+ $1` stays bound to
    // it inside any surrounding expression.
    let randint = Regex::new(r"random\.randint\s*\(([^,()]+),\s*([^()]+)\)").unwrap();
    let out = randint.replace_all(js, "(Math.floor(Math.random() * ($2 - $1 + 1)) + $1)");
    let random = Regex::new(r"\brandom\.random\(\)").unwrap();
    let out = random.replace_all(&out, "Math.random()");
    let math = Regex::new(r"\bmath\.").unwrap();
    math.replace_all(&out, "Math.").into_owned()
}
