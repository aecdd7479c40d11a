//! Core Sprout lexer — converts derive-subset source to a token stream.
//!
//! Features:
//! - Indentation-sensitive layout: synthesizes `Indent`/`Dedent` tokens from
//!   leading whitespace, with an indent stack and mismatch detection
//! - Implicit line joining inside `()`, `[]`, `{}` (no layout tokens there)
//! - Single- and double-quoted strings with backslash escapes
//! - `#` comments stripped; blank and comment-only lines produce no tokens
//! - f-strings and triple-quoted strings rejected with specific errors
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use sprout_types::{CompileErrors, ErrorCode, SourceFile, Span, SproutError};

use crate::token::{Token, TokenKind};

/// The Sprout lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`sprout_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// File name (for errors).
    file_name: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected errors.
    errors: CompileErrors,
    /// Indentation stack; always starts with 0.
    indents: Vec<u32>,
    /// Open `(`/`[`/`{` count — layout tokens are suppressed when > 0.
    bracket_depth: u32,
    /// True when the next scan starts a fresh logical line.
    at_line_start: bool,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            file_name: &source_file.name,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
            indents: vec![0],
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= sprout_types::MAX_ERRORS {
                break;
            }

            if self.at_line_start && self.bracket_depth == 0 {
                self.start_logical_line(&mut tokens);
            }

            if self.at_end() {
                self.finish(&mut tokens);
                break;
            }

            if let Some(token) = self.scan_token() {
                tokens.push(token);
            }
        }

        // Ensure token stream always ends with Eof
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("").to_string();
        let err = SproutError::new(self.file_name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("").to_string();
        let err = SproutError::new(self.file_name, code, message, span, source_line)
            .with_suggestion(suggestion);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Layout: indentation handling
    // ─────────────────────────────────────────────────────────────

    /// Consume leading whitespace of a fresh logical line and emit
    /// `Indent`/`Dedent` tokens against the indent stack. Blank and
    /// comment-only lines are consumed without producing tokens.
    fn start_logical_line(&mut self, tokens: &mut Vec<Token>) {
        loop {
            let width = self.measure_indent();

            // Blank line or comment-only line: swallow it entirely.
            match self.peek() {
                Some(b'\n') => {
                    self.advance();
                    continue;
                }
                Some(b'#') => {
                    self.skip_comment();
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                    continue;
                }
                None => {
                    self.at_line_start = false;
                    return;
                }
                _ => {}
            }

            self.at_line_start = false;
            let current = *self.indents.last().unwrap_or(&0);
            if width > current {
                self.indents.push(width);
                tokens.push(Token::new(TokenKind::Indent, self.current_span()));
            } else if width < current {
                while *self.indents.last().unwrap_or(&0) > width {
                    self.indents.pop();
                    tokens.push(Token::new(TokenKind::Dedent, self.current_span()));
                }
                if *self.indents.last().unwrap_or(&0) != width {
                    self.emit_error(
                        ErrorCode::BAD_INDENT,
                        "unindent does not match any outer indentation level",
                        self.current_span(),
                    );
                    self.indents.push(width);
                }
            }
            return;
        }
    }

    /// Count leading spaces/tabs; a tab advances to the next multiple of 8.
    fn measure_indent(&mut self) -> u32 {
        let mut width = 0u32;
        while let Some(ch) = self.peek() {
            match ch {
                b' ' => {
                    width += 1;
                    self.advance();
                }
                b'\t' => {
                    width = (width / 8 + 1) * 8;
                    self.advance();
                }
                b'\r' => {
                    self.advance();
                }
                _ => break,
            }
        }
        width
    }

    /// Emit the trailing Newline and closing Dedents at end of input.
    fn finish(&mut self, tokens: &mut Vec<Token>) {
        let needs_newline = matches!(
            tokens.last().map(|t| &t.kind),
            Some(kind) if !matches!(kind, TokenKind::Newline | TokenKind::Dedent | TokenKind::Indent)
        );
        if needs_newline {
            tokens.push(Token::new(TokenKind::Newline, self.current_span()));
        }
        while *self.indents.last().unwrap_or(&0) > 0 {
            self.indents.pop();
            tokens.push(Token::new(TokenKind::Dedent, self.current_span()));
        }
        tokens.push(Token::new(TokenKind::Eof, self.current_span()));
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces and tabs within a line (NOT newlines — those are layout).
    fn skip_inline_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b' ' || ch == b'\t' || ch == b'\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip a `#` comment up to (not including) the newline.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. Returns `None` when the input consumed produced no
    /// token (line continuations, suppressed newlines, recovered errors).
    fn scan_token(&mut self) -> Option<Token> {
        self.skip_inline_whitespace();

        if self.peek() == Some(b'#') {
            self.skip_comment();
        }

        let start_line = self.line;
        let start_col = self.col;
        let ch = self.advance()?;

        let token = match ch {
            b'\n' => {
                if self.bracket_depth > 0 {
                    return None;
                }
                self.at_line_start = true;
                Token::new(TokenKind::Newline, self.span_from(start_line, start_col))
            }

            // Explicit line continuation
            b'\\' if self.peek() == Some(b'\n') => {
                self.advance();
                return None;
            }

            b'\'' | b'"' => self.scan_string(ch, start_line, start_col),

            b'0'..=b'9' => self.scan_number(start_line, start_col),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_line, start_col),

            b'+' => Token::new(TokenKind::Plus, self.span_from(start_line, start_col)),
            b'-' => Token::new(TokenKind::Minus, self.span_from(start_line, start_col)),
            b'%' => Token::new(TokenKind::Percent, self.span_from(start_line, start_col)),
            b'@' => Token::new(TokenKind::At, self.span_from(start_line, start_col)),
            b'&' => Token::new(TokenKind::Amp, self.span_from(start_line, start_col)),
            b'|' => Token::new(TokenKind::Pipe, self.span_from(start_line, start_col)),
            b'^' => Token::new(TokenKind::Caret, self.span_from(start_line, start_col)),
            b'~' => Token::new(TokenKind::Tilde, self.span_from(start_line, start_col)),
            b',' => Token::new(TokenKind::Comma, self.span_from(start_line, start_col)),
            b':' => Token::new(TokenKind::Colon, self.span_from(start_line, start_col)),
            b'.' => Token::new(TokenKind::Dot, self.span_from(start_line, start_col)),

            b'*' => {
                if self.peek() == Some(b'*') {
                    self.advance();
                    Token::new(TokenKind::DoubleStar, self.span_from(start_line, start_col))
                } else {
                    Token::new(TokenKind::Star, self.span_from(start_line, start_col))
                }
            }

            b'/' => {
                if self.peek() == Some(b'/') {
                    self.advance();
                    Token::new(TokenKind::DoubleSlash, self.span_from(start_line, start_col))
                } else {
                    Token::new(TokenKind::Slash, self.span_from(start_line, start_col))
                }
            }

            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::new(TokenKind::EqEq, self.span_from(start_line, start_col))
                } else {
                    Token::new(TokenKind::Assign, self.span_from(start_line, start_col))
                }
            }

            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::new(TokenKind::NotEq, self.span_from(start_line, start_col))
                } else {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "unexpected character '!'",
                        span,
                        "Use 'not' for boolean negation, or '!=' for inequality",
                    );
                    return None;
                }
            }

            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::new(TokenKind::LessEq, self.span_from(start_line, start_col))
                } else if self.peek() == Some(b'<') {
                    self.advance();
                    Token::new(TokenKind::LShift, self.span_from(start_line, start_col))
                } else {
                    Token::new(TokenKind::Less, self.span_from(start_line, start_col))
                }
            }

            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::new(TokenKind::GreaterEq, self.span_from(start_line, start_col))
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    Token::new(TokenKind::RShift, self.span_from(start_line, start_col))
                } else {
                    Token::new(TokenKind::Greater, self.span_from(start_line, start_col))
                }
            }

            b'(' => {
                self.bracket_depth += 1;
                Token::new(TokenKind::LParen, self.span_from(start_line, start_col))
            }
            b'[' => {
                self.bracket_depth += 1;
                Token::new(TokenKind::LBracket, self.span_from(start_line, start_col))
            }
            b'{' => {
                self.bracket_depth += 1;
                Token::new(TokenKind::LBrace, self.span_from(start_line, start_col))
            }
            b')' => {
                self.close_bracket(start_line, start_col);
                Token::new(TokenKind::RParen, self.span_from(start_line, start_col))
            }
            b']' => {
                self.close_bracket(start_line, start_col);
                Token::new(TokenKind::RBracket, self.span_from(start_line, start_col))
            }
            b'}' => {
                self.close_bracket(start_line, start_col);
                Token::new(TokenKind::RBrace, self.span_from(start_line, start_col))
            }

            _ => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("unexpected character '{}'", ch as char),
                    span,
                );
                return None;
            }
        };

        Some(token)
    }

    fn close_bracket(&mut self, start_line: u32, start_col: u32) {
        if self.bracket_depth == 0 {
            let span = self.span_from(start_line, start_col);
            self.emit_error(ErrorCode::UNBALANCED_BRACKET, "unmatched closing bracket", span);
        } else {
            self.bracket_depth -= 1;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start_line: u32, start_col: u32) -> Token {
        let start_pos = self.pos - 1;
        let mut is_float = false;

        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.advance(); // consume '.'
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let after = match self.peek_at(1) {
                Some(b'+' | b'-') => self.peek_at(2),
                other => other,
            };
            if matches!(after, Some(b'0'..=b'9')) {
                is_float = true;
                self.advance(); // consume 'e'
                if matches!(self.peek(), Some(b'+' | b'-')) {
                    self.advance();
                }
                while let Some(b'0'..=b'9') = self.peek() {
                    self.advance();
                }
            }
        }

        let span = self.span_from(start_line, start_col);
        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).unwrap_or("0");

        if is_float {
            match text.parse::<f64>() {
                Ok(value) => Token::new(TokenKind::Float(value), span),
                Err(_) => {
                    self.emit_error(
                        ErrorCode::INVALID_NUMBER,
                        format!("invalid float literal '{text}'"),
                        span,
                    );
                    Token::new(TokenKind::Float(0.0), span)
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Token::new(TokenKind::Int(value), span),
                Err(_) => {
                    self.emit_error(
                        ErrorCode::INVALID_NUMBER,
                        format!("integer literal '{text}' out of range"),
                        span,
                    );
                    Token::new(TokenKind::Int(0), span)
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start_line: u32, start_col: u32) -> Token {
        let start_pos = self.pos - 1;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = std::str::from_utf8(&self.source[start_pos..self.pos])
            .unwrap_or("")
            .to_string();

        // String prefixes: only f-strings get a dedicated diagnostic.
        if matches!(self.peek(), Some(b'\'' | b'"')) && (text == "f" || text == "F") {
            let quote = self.advance().unwrap();
            let span = self.span_from(start_line, start_col);
            self.emit_error_with_suggestion(
                ErrorCode::FSTRING_UNSUPPORTED,
                "f-strings are not supported in derive functions",
                span,
                "Build the string with + and str() instead",
            );
            // Recovery: lex the string body so later tokens stay aligned.
            return self.scan_string(quote, start_line, start_col);
        }

        let span = self.span_from(start_line, start_col);
        let kind =
            TokenKind::from_keyword(&text).unwrap_or(TokenKind::Identifier(text));
        Token::new(kind, span)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after consuming the opening quote.
    fn scan_string(&mut self, quote: u8, start_line: u32, start_col: u32) -> Token {
        // Triple quotes are outside the subset.
        if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
            self.advance();
            self.advance();
            let span = self.span_from(start_line, start_col);
            self.emit_error(
                ErrorCode::UNSUPPORTED_EXPRESSION,
                "triple-quoted strings are not supported in derive functions",
                span,
            );
            return self.scan_triple_string_recovery(quote, start_line, start_col);
        }

        let mut buf = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    return Token::new(TokenKind::Str(buf), span);
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return Token::new(
                        TokenKind::Str(buf),
                        self.span_from(start_line, start_col),
                    );
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch as char);
                }
            }
        }
    }

    /// Consume a triple-quoted string body so lexing can continue.
    fn scan_triple_string_recovery(
        &mut self,
        quote: u8,
        start_line: u32,
        start_col: u32,
    ) -> Token {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => break,
                Some(ch)
                    if ch == quote
                        && self.peek_at(1) == Some(quote)
                        && self.peek_at(2) == Some(quote) =>
                {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch as char);
                }
            }
        }
        Token::new(TokenKind::Str(buf), self.span_from(start_line, start_col))
    }

    /// Scan an escape sequence after seeing the `\`.
    /// Returns the unescaped character, or `None` if invalid (error emitted).
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance(); // consume the '\'

        match self.advance() {
            Some(b'\'') => Some('\''),
            Some(b'"') => Some('"'),
            Some(b'\\') => Some('\\'),
            Some(b'n') => Some('\n'),
            Some(b't') => Some('\t'),
            Some(b'r') => Some('\r'),
            Some(b'0') => Some('\0'),
            Some(ch) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("invalid escape sequence '\\{}'", ch as char),
                    span,
                );
                Some(ch as char) // error recovery: emit the char as-is
            }
            None => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNTERMINATED_STRING,
                    "unexpected end of file in escape sequence",
                    span,
                );
                None
            }
        }
    }
}
