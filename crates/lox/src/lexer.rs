use crate::{
    diag::Diagnostics,
    token::{Literal, Token, TokenType, keyword},
};

/// Scans source text into a token stream terminated by `Eof`.
///
/// Lexical errors are reported and scanning continues, so a single pass
/// surfaces every bad character, unterminated string, and unterminated
/// comment in the input.
pub(crate) struct Lexer<'src, 'd> {
    source: &'src str,
    diag: &'d mut Diagnostics,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: u32,
}

impl<'src, 'd> Lexer<'src, 'd> {
    pub fn new(source: &'src str, diag: &'d mut Diagnostics) -> Self {
        Self {
            source,
            diag,
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::new(TokenType::Eof, "", None, self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let byte = self.advance();
        match byte {
            b'(' => self.add_token(TokenType::LeftParen),
            b')' => self.add_token(TokenType::RightParen),
            b'{' => self.add_token(TokenType::LeftBrace),
            b'}' => self.add_token(TokenType::RightBrace),
            b',' => self.add_token(TokenType::Comma),
            b'.' => self.add_token(TokenType::Dot),
            b'-' => self.add_token(TokenType::Minus),
            b'+' => self.add_token(TokenType::Plus),
            b';' => self.add_token(TokenType::Semicolon),
            b'*' => self.add_token(TokenType::Star),
            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(kind);
            }
            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(kind);
            }
            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(kind);
            }
            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(kind);
            }
            b'/' => {
                if self.peek() == b'*' {
                    self.block_comment();
                } else if self.match_byte(b'/') {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.current += 1;
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            b'?' => self.conditional(),
            b' ' | b'\r' | b'\t' => {}
            b'\n' => self.line += 1,
            b'"' => self.string(),
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),
            _ => {
                // Re-align to the char boundary so multi-byte input yields
                // one error, not one per byte.
                let ch = self.source[self.start..]
                    .chars()
                    .next()
                    .expect("start lies on a char boundary");
                self.current = self.start + ch.len_utf8();
                self.diag.error(self.line, "Unexpected character.");
            }
        }
    }

    /// Skips a `/* ... */` comment, honoring arbitrary nesting. Each opener
    /// still unmatched at end of input is reported on its own line.
    fn block_comment(&mut self) {
        let mut opener_lines = vec![self.line];
        self.current += 1; // the '*' of the opener
        while !opener_lines.is_empty() {
            if self.is_at_end() {
                for line in opener_lines {
                    self.diag.error(line, "Unterminated comment block.");
                }
                return;
            }
            match (self.peek(), self.peek_next()) {
                (b'/', b'*') => {
                    opener_lines.push(self.line);
                    self.current += 2;
                }
                (b'*', b'/') => {
                    opener_lines.pop();
                    self.current += 2;
                }
                (b'\n', _) => {
                    self.line += 1;
                    self.current += 1;
                }
                _ => self.current += 1,
            }
        }
    }

    /// Emits `Question`, then keeps scanning tokens until the first `:` at
    /// this nesting and consumes it. No colon token kind exists; the parser
    /// relies on the then- and else-branch tokens being adjacent. Nested
    /// ternaries recurse through `scan_token`, so their colons are swallowed
    /// at their own nesting.
    fn conditional(&mut self) {
        self.add_token(TokenType::Question);
        loop {
            if self.match_byte(b':') {
                return;
            }
            if self.is_at_end() {
                self.diag
                    .error(self.line, "Expect ':' after then branch of ternary conditional.");
                return;
            }
            self.start = self.current;
            self.scan_token();
        }
    }

    fn string(&mut self) {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.current += 1;
        }
        if self.is_at_end() {
            self.diag.error(self.line, "Unterminated string.");
            return;
        }
        self.current += 1; // closing quote
        let value = &self.source[self.start + 1..self.current - 1];
        self.add_literal(TokenType::String, Some(Literal::Str(value.into())));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.current += 1;
        }
        // A fractional part requires digits on both sides of the dot.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.current += 1;
            while self.peek().is_ascii_digit() {
                self.current += 1;
            }
        }
        let value: f64 = self.source[self.start..self.current]
            .parse()
            .expect("lexeme matches the number grammar");
        self.add_literal(TokenType::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while matches!(self.peek(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.current += 1;
        }
        let text = &self.source[self.start..self.current];
        let kind = keyword(text).unwrap_or(TokenType::Identifier);
        self.add_token(kind);
    }

    fn add_token(&mut self, kind: TokenType) {
        self.add_literal(kind, None);
    }

    fn add_literal(&mut self, kind: TokenType, literal: Option<Literal>) {
        let lexeme = &self.source[self.start..self.current];
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source.as_bytes()[self.current];
        self.current += 1;
        byte
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source.as_bytes()[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            b'\0'
        } else {
            self.source.as_bytes()[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            b'\0'
        } else {
            self.source.as_bytes()[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}
