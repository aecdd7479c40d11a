//! Token scanner for the evaluated JavaScript subset.

use crate::error::{EvalError, EvalResult};

/// A JavaScript token.  No spans: diagnostics report the byte offset only.
#[derive(Debug, Clone, PartialEq)]
pub enum JsToken {
    Num(f64),
    Str(String),
    Ident(String),

    // Keywords
    Function,
    Return,
    Var,
    Let,
    Const,
    If,
    Else,
    True,
    False,
    Null,
    Undefined,
    New,
    Throw,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Dot,
    Arrow,    // =>
    Ellipsis, // ...

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    StrictEq,  // ===
    StrictNeq, // !==
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,
    Bang,
    Question,
    Tilde,
    Amp,
    Pipe,
    Caret,
    LShift,
    RShift,

    Eof,
}

/// Scan `source` into a token vector.
pub fn scan(source: &str) -> EvalResult<Vec<JsToken>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            b'0'..=b'9' => {
                let (tok, next) = scan_number(source, pos)?;
                tokens.push(tok);
                pos = next;
            }
            b'\'' | b'"' | b'`' => {
                let (tok, next) = scan_string(source, pos)?;
                tokens.push(tok);
                pos = next;
            }
            c if c == b'_' || c == b'$' || c.is_ascii_alphabetic() => {
                let start = pos;
                while pos < bytes.len()
                    && (bytes[pos] == b'_'
                        || bytes[pos] == b'$'
                        || bytes[pos].is_ascii_alphanumeric())
                {
                    pos += 1;
                }
                tokens.push(keyword_or_ident(&source[start..pos]));
            }
            _ => {
                let (tok, width) = scan_operator(bytes, pos)?;
                tokens.push(tok);
                pos += width;
            }
        }
    }

    tokens.push(JsToken::Eof);
    Ok(tokens)
}

fn keyword_or_ident(word: &str) -> JsToken {
    match word {
        "function" => JsToken::Function,
        "return" => JsToken::Return,
        "var" => JsToken::Var,
        "let" => JsToken::Let,
        "const" => JsToken::Const,
        "if" => JsToken::If,
        "else" => JsToken::Else,
        "true" => JsToken::True,
        "false" => JsToken::False,
        "null" => JsToken::Null,
        "undefined" => JsToken::Undefined,
        "new" => JsToken::New,
        "throw" => JsToken::Throw,
        _ => JsToken::Ident(word.to_string()),
    }
}

fn scan_number(source: &str, start: usize) -> EvalResult<(JsToken, usize)> {
    let bytes = source.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            pos += 1;
        }
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    let text = &source[start..pos];
    let n: f64 = text
        .parse()
        .map_err(|_| EvalError::Parse(format!("bad number literal '{text}' at {start}")))?;
    Ok((JsToken::Num(n), pos))
}

fn scan_string(source: &str, start: usize) -> EvalResult<(JsToken, usize)> {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut pos = start + 1;
    let mut value = String::new();

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                let esc = bytes.get(pos + 1).copied().ok_or_else(|| {
                    EvalError::Parse(format!("unterminated escape at {pos}"))
                })?;
                value.push(match esc {
                    b'n' => '\n',
                    b't' => '\t',
                    b'r' => '\r',
                    b'0' => '\0',
                    other => other as char,
                });
                pos += 2;
            }
            c if c == quote => return Ok((JsToken::Str(value), pos + 1)),
            _ => {
                let ch = source[pos..].chars().next().ok_or_else(|| {
                    EvalError::Parse(format!("bad utf-8 at {pos}"))
                })?;
                value.push(ch);
                pos += ch.len_utf8();
            }
        }
    }
    Err(EvalError::Parse(format!(
        "unterminated string starting at {start}"
    )))
}

fn scan_operator(bytes: &[u8], pos: usize) -> EvalResult<(JsToken, usize)> {
    let rest = &bytes[pos..];
    let starts = |p: &[u8]| rest.starts_with(p);

    // Longest first.
    if starts(b"===") {
        return Ok((JsToken::StrictEq, 3));
    }
    if starts(b"!==") {
        return Ok((JsToken::StrictNeq, 3));
    }
    if starts(b"...") {
        return Ok((JsToken::Ellipsis, 3));
    }
    if starts(b"=>") {
        return Ok((JsToken::Arrow, 2));
    }
    if starts(b"&&") {
        return Ok((JsToken::AndAnd, 2));
    }
    if starts(b"||") {
        return Ok((JsToken::OrOr, 2));
    }
    if starts(b"<<") {
        return Ok((JsToken::LShift, 2));
    }
    if starts(b">>") {
        return Ok((JsToken::RShift, 2));
    }
    if starts(b"<=") {
        return Ok((JsToken::LessEq, 2));
    }
    if starts(b">=") {
        return Ok((JsToken::GreaterEq, 2));
    }

    let tok = match bytes[pos] {
        b'(' => JsToken::LParen,
        b')' => JsToken::RParen,
        b'{' => JsToken::LBrace,
        b'}' => JsToken::RBrace,
        b'[' => JsToken::LBracket,
        b']' => JsToken::RBracket,
        b',' => JsToken::Comma,
        b';' => JsToken::Semi,
        b':' => JsToken::Colon,
        b'.' => JsToken::Dot,
        b'+' => JsToken::Plus,
        b'-' => JsToken::Minus,
        b'*' => JsToken::Star,
        b'/' => JsToken::Slash,
        b'%' => JsToken::Percent,
        b'=' => JsToken::Assign,
        b'<' => JsToken::Less,
        b'>' => JsToken::Greater,
        b'!' => JsToken::Bang,
        b'?' => JsToken::Question,
        b'~' => JsToken::Tilde,
        b'&' => JsToken::Amp,
        b'|' => JsToken::Pipe,
        b'^' => JsToken::Caret,
        other => {
            return Err(EvalError::Parse(format!(
                "unexpected character '{}' at {pos}",
                other as char
            )))
        }
    };
    Ok((tok, 1))
}
