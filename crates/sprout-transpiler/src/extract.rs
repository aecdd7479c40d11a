//! Pull a single function out of a compiled JavaScript program.
//!
//! The compiler emits a whole module: runtime prelude, every top-level
//! binding, exports.  Only one of those bindings is the derive function, so
//! we locate its binding by name and re-wrap the parameter list and body as
//! a standalone arrow expression.  Brace matching is quote-aware because
//! string literals in the body may contain unbalanced `(`/`{`.

use regex::Regex;

use crate::error::{TranspileError, TranspileResult};

/// Extract the function bound to `name` from `program` and return it as a
/// parenthesized arrow expression.  With `None`, the first top-level
/// `var`/`let`/`const` function binding is taken.
pub fn extract(program: &str, name: Option<&str>) -> TranspileResult<String> {
    let open_paren = match name {
        Some(name) => find_named(program, name)?,
        None => find_first(program)?,
    };
    let (params, after_params) = balanced_slice(program, open_paren, '(', ')', "parameter list")?;
    let rest = &program[after_params..];
    let brace_offset = rest.len() - rest.trim_start().len();
    if !rest.trim_start().starts_with('{') {
        return Err(TranspileError::MissingBodyBrace {
            name: name.unwrap_or("<anonymous>").to_string(),
        });
    }
    let (body, _) = balanced_slice(program, after_params + brace_offset, '{', '}', "function body")?;
    Ok(format!("(({params}) => {{{body}}})"))
}

/// Byte offset of the `(` opening the parameter list of the binding named
/// `name`.  Several binding shapes are tried; the one appearing earliest in
/// the program wins.
fn find_named(program: &str, name: &str) -> TranspileResult<usize> {
    let escaped = regex::escape(name);
    let patterns = [
        format!(r"(?m)^\s*(?:var|let|const)\s+{escaped}\s*=\s*function\s*\("),
        format!(r"\b{escaped}\s*=\s*function\s*\("),
        format!(r"\bfunction\s+{escaped}\s*\("),
    ];
    let mut best: Option<(usize, usize)> = None;
    for pattern in &patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(m) = re.find(program) {
            if best.is_none_or(|(start, _)| m.start() < start) {
                best = Some((m.start(), m.end() - 1));
            }
        }
    }
    match best {
        Some((_, open_paren)) => Ok(open_paren),
        None => Err(TranspileError::BindingNotFound {
            name: name.to_string(),
        }),
    }
}

fn find_first(program: &str) -> TranspileResult<usize> {
    let re = Regex::new(r"(?m)^\s*(?:var|let|const)\s+[A-Za-z_$][\w$]*\s*=\s*function\s*\(")
        .unwrap();
    match re.find(program) {
        Some(m) => Ok(m.end() - 1),
        None => Err(TranspileError::BindingNotFound {
            name: "<anonymous>".to_string(),
        }),
    }
}

/// Return the text between the delimiter at `open` and its balanced partner
/// (exclusive on both ends) and the byte offset just past the closer.
/// Delimiters inside string literals do not count toward the balance.
fn balanced_slice(
    program: &str,
    open: usize,
    opener: char,
    closer: char,
    what: &'static str,
) -> TranspileResult<(String, usize)> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for (offset, c) in program[open..].char_indices() {
        if let Some(q) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_string = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => in_string = Some(c),
            c if c == opener => depth += 1,
            c if c == closer => {
                depth -= 1;
                if depth == 0 {
                    let start = open + opener.len_utf8();
                    let end = open + offset;
                    return Ok((program[start..end].to_string(), end + closer.len_utf8()));
                }
            }
            _ => {}
        }
    }
    Err(TranspileError::UnbalancedScan { what })
}
