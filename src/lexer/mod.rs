//! Lexical analysis (spec §4.3).
//!
//! Tokens are produced eagerly into a flat `Vec<Token>` (scanning the whole
//! file up front is simpler than a truly lazy stream and the parser never
//! needs more than finite lookahead); the *speculative mode* contract the
//! parser relies on is implemented as a stack of savepoints over a cursor
//! index, mirroring the teacher's `ParseState` (`get_index`/`set_index`)
//! generalized to the named `enter_speculative_mode` / `commit_speculation`
//! / `rollback_speculation` operations the spec requires.

mod token;

pub use token::{Keyword, Token, TokenKind};

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiagnostic {
    pub message: String,
    pub span: Span,
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    pub diagnostics: Vec<LexDiagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            diagnostics: Vec::new(),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if b != b'\r' {
            self.col += 1;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.col)
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let span = self.span();
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        match Keyword::from_str(text) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), span),
            None => Token::new(TokenKind::Ident(text.to_string()), span),
        }
    }

    fn lex_number(&mut self) -> Token {
        let span = self.span();
        let start = self.pos;
        let mut is_float = false;
        let leading_zero = self.peek_byte() == Some(b'0');
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.'
                && !is_float
                && self
                    .bytes
                    .get(self.pos + 1)
                    .is_some_and(u8::is_ascii_digit)
            {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }
        let digits_end = self.pos;
        // optional integer-type suffix, e.g. `256u8`
        let mut suffix = None;
        if !is_float {
            let suffix_start = self.pos;
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_alphanumeric() {
                    self.advance();
                } else {
                    break;
                }
            }
            if self.pos > suffix_start {
                suffix = Some(self.input[suffix_start..self.pos].to_string());
            }
        }
        let text = &self.input[start..digits_end];

        if leading_zero && text.len() > 1 && !is_float {
            self.diagnostics.push(LexDiagnostic {
                message: format!("malformed numeric literal '{text}': leading zero"),
                span,
            });
            return Token::new(TokenKind::Unknown(text.to_string()), span);
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(v) => Token::new(TokenKind::Float(v), span),
                Err(_) => {
                    self.diagnostics.push(LexDiagnostic {
                        message: format!("malformed float literal '{text}'"),
                        span,
                    });
                    Token::new(TokenKind::Unknown(text.to_string()), span)
                }
            }
        } else {
            match text.parse::<u64>() {
                Ok(v) => Token::new(TokenKind::Integer(v, suffix), span),
                Err(_) => {
                    self.diagnostics.push(LexDiagnostic {
                        message: format!("integer literal '{text}' too large"),
                        span,
                    });
                    Token::new(TokenKind::Unknown(text.to_string()), span)
                }
            }
        }
    }

    fn lex_string(&mut self) -> Token {
        let span = self.span();
        self.advance(); // opening quote
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == b'"' {
                break;
            }
            if b == b'\\' {
                self.advance();
            }
            self.advance();
        }
        let text = self.input[start..self.pos].to_string();
        if self.peek_byte() == Some(b'"') {
            self.advance();
        } else {
            self.diagnostics.push(LexDiagnostic {
                message: "unterminated string literal".into(),
                span,
            });
        }
        let unescaped = unescape::unescape(&text).unwrap_or(text);
        Token::new(TokenKind::Str(unescaped), span)
    }

    fn lex_punct(&mut self) -> Token {
        let span = self.span();
        macro_rules! two {
            ($first:literal, $second:literal, $kind:expr, $fallback:expr) => {{
                self.advance();
                if self.peek_byte() == Some($second) {
                    self.advance();
                    Token::new($kind, span)
                } else {
                    Token::new($fallback, span)
                }
            }};
        }
        use TokenKind::*;
        match self.peek_byte().unwrap() {
            b'(' => {
                self.advance();
                Token::new(LParen, span)
            }
            b')' => {
                self.advance();
                Token::new(RParen, span)
            }
            b'{' => {
                self.advance();
                Token::new(LBrace, span)
            }
            b'}' => {
                self.advance();
                Token::new(RBrace, span)
            }
            b'[' => {
                self.advance();
                Token::new(LBracket, span)
            }
            b']' => {
                self.advance();
                Token::new(RBracket, span)
            }
            b';' => {
                self.advance();
                Token::new(Semi, span)
            }
            b':' => {
                self.advance();
                Token::new(Colon, span)
            }
            b',' => {
                self.advance();
                Token::new(Comma, span)
            }
            b'.' => two!(b'.', b'.', DotDot, Dot),
            b'-' => {
                self.advance();
                match self.peek_byte() {
                    Some(b'>') => {
                        self.advance();
                        Token::new(Arrow, span)
                    }
                    Some(b'-') => {
                        self.advance();
                        Token::new(MinusMinus, span)
                    }
                    Some(b'=') => {
                        self.advance();
                        Token::new(MinusEq, span)
                    }
                    _ => Token::new(Minus, span),
                }
            }
            b'+' => {
                self.advance();
                match self.peek_byte() {
                    Some(b'+') => {
                        self.advance();
                        Token::new(PlusPlus, span)
                    }
                    Some(b'=') => {
                        self.advance();
                        Token::new(PlusEq, span)
                    }
                    _ => Token::new(Plus, span),
                }
            }
            b'*' => two!(b'*', b'=', StarEq, Star),
            b'/' => two!(b'/', b'=', SlashEq, Slash),
            b'%' => two!(b'%', b'=', PercentEq, Percent),
            b'!' => two!(b'!', b'=', BangEq, Bang),
            b'&' => {
                self.advance();
                Token::new(Amp, span)
            }
            b'=' => two!(b'=', b'=', EqEq, Eq),
            b'<' => two!(b'<', b'=', LtEq, Lt),
            b'>' => two!(b'>', b'=', GtEq, Gt),
            other => {
                self.advance();
                self.diagnostics.push(LexDiagnostic {
                    message: format!("unexpected character '{}'", other as char),
                    span,
                });
                Token::new(TokenKind::Unknown((other as char).to_string()), span)
            }
        }
    }

    fn lex_one(&mut self) -> Option<Token> {
        self.skip_trivia();
        let b = self.peek_byte()?;
        Some(if b.is_ascii_alphabetic() || b == b'_' {
            self.lex_ident_or_keyword()
        } else if b.is_ascii_digit() {
            self.lex_number()
        } else if b == b'"' {
            self.lex_string()
        } else {
            self.lex_punct()
        })
    }

    /// Scan the whole input into a flat token vector. Malformed tokens are
    /// reported to `diagnostics` and surfaced as `Unknown`, never aborting
    /// the scan (spec §4.3 "Error semantics").
    pub fn lex(mut self) -> (Vec<Token>, Vec<LexDiagnostic>) {
        let mut tokens = Vec::new();
        while let Some(t) = self.lex_one() {
            tokens.push(t);
        }
        (tokens, self.diagnostics)
    }
}

/// Cursor over a pre-lexed token vector implementing the speculative-mode
/// contract: nested savepoints, rollback restores position exactly.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,
    savepoints: Vec<usize>,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            savepoints: Vec::new(),
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n)
    }

    pub fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.index).cloned();
        if t.is_some() {
            self.index += 1;
        }
        t
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn is_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn last_span(&self) -> Span {
        self.tokens
            .get(self.index.saturating_sub(1))
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_default()
    }

    pub fn enter_speculative_mode(&mut self) {
        self.savepoints.push(self.index);
    }

    pub fn commit_speculation(&mut self) {
        self.savepoints.pop();
    }

    pub fn rollback_speculation(&mut self) {
        if let Some(saved) = self.savepoints.pop() {
            self.index = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, diags) = Lexer::new(src).lex();
        assert!(diags.is_empty(), "unexpected lex diagnostics: {diags:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_and_idents() {
        assert_eq!(
            kinds("fn add"),
            vec![
                TokenKind::Keyword(Keyword::Fn),
                TokenKind::Ident("add".into())
            ]
        );
    }

    #[test]
    fn lexes_integer_suffix() {
        let (tokens, diags) = Lexer::new("256u8").lex();
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Integer(256, Some("u8".into())));
    }

    #[test]
    fn rejects_leading_zero() {
        let (_, diags) = Lexer::new("08").lex();
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn rejects_overflowing_literal() {
        let (_, diags) = Lexer::new("18446744073709551616").lex();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("too large"));
    }

    #[test]
    fn speculative_rollback_restores_position() {
        let (tokens, _) = Lexer::new("a < b").lex();
        let mut cursor = TokenCursor::new(tokens);
        cursor.next(); // a
        cursor.enter_speculative_mode();
        cursor.next(); // <
        cursor.next(); // b
        assert_eq!(cursor.index(), 3);
        cursor.rollback_speculation();
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn nested_speculation_commit_does_not_affect_outer() {
        let (tokens, _) = Lexer::new("a b c").lex();
        let mut cursor = TokenCursor::new(tokens);
        cursor.enter_speculative_mode();
        cursor.next();
        cursor.enter_speculative_mode();
        cursor.next();
        cursor.commit_speculation();
        assert_eq!(cursor.index(), 2);
        cursor.rollback_speculation();
        assert_eq!(cursor.index(), 0);
    }
}
