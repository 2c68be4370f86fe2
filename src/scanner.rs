//! Module `scanner` implements a one‑pass streaming lexer.
//!
//! It turns a byte slice into a sequence of [`Token`]s, skipping whitespace
//! and `//` comments, and emits exactly one `EOF` token at the end. A lexical
//! error is yielded in place of the token it would have been and scanning
//! resumes after the offending character, so one pass can surface several
//! errors.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new(b"print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Scan `src` to completion, splitting tokens from lexical errors.
///
/// The token list always ends with `EOF`, even when errors occurred.
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for item in Scanner::new(src.as_bytes()) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Tokenized {} token(s) with {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}

/// A single pass **scanner** over raw source bytes.
pub struct Scanner<'a> {
    src: &'a [u8],              // entire source buffer
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a [u8]) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it. Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past the end.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    /// The byte after [`Self::peek`], or `0` past the end.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `single` unless the next byte is `=`, in which case `double`.
    #[inline(always)]
    fn either(&mut self, double: TokenType, single: TokenType) -> TokenType {
        if self.match_byte(b'=') {
            double
        } else {
            single
        }
    }

    fn text(&self, from: usize, to: usize) -> String {
        String::from_utf8_lossy(&self.src[from..to]).into_owned()
    }

    /// Decode the character at `self.start` and step over the rest of its
    /// bytes. A byte that starts no valid UTF-8 sequence is consumed alone.
    fn unexpected_char(&mut self) -> char {
        let end = (self.start + 4).min(self.len());
        let rest = &self.src[self.start..end];
        let valid = match std::str::from_utf8(rest) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&rest[..e.valid_up_to()]).unwrap_or_default(),
        };

        match valid.chars().next() {
            Some(ch) => {
                self.curr = self.start + ch.len_utf8();
                ch
            }
            None => char::REPLACEMENT_CHARACTER,
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan exactly one lexeme starting at `self.curr`. A recognised token
    /// kind lands in `self.pending`; whitespace and comments leave it `None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        let tt: TokenType = match b {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b' ' | b'\r' | b'\t' => return Ok(()),

            b'\n' => {
                self.line += 1;
                return Ok(());
            }

            b'/' => {
                if self.match_byte(b'/') {
                    // Jump straight to the newline; it is left for the next
                    // call so the line counter stays in one place.
                    match memchr(b'\n', &self.src[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.len(),
                    }

                    return Ok(());
                }

                TokenType::SLASH
            }

            b'"' => return self.string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                let ch = self.unexpected_char();
                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        };

        self.pending = Some(tt);

        Ok(())
    }

    /// Double‑quoted string literal; may span lines.
    fn string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let contents: String = self.text(self.start + 1, self.curr - 1);
        self.pending = Some(TokenType::STRING(contents));

        Ok(())
    }

    /// `123` or `3.14`. A trailing `.` without a digit after it is left for
    /// the next token.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let n: f64 = self
            .text(self.start, self.curr)
            .parse::<f64>()
            .unwrap_or(0.0); // only ASCII digits reach here
        TokenType::NUMBER(n)
    }

    fn identifier(&mut self) -> TokenType {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // Emit exactly one EOF, then stay exhausted.
            if self.curr == self.len() {
                self.curr += 1;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(tt) = self.pending.take() {
                let lexeme: String = self.text(self.start, self.curr);
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lexeme, self.line)));
            }
        }

        None
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
