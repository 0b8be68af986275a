//! Lexer for the permissive object-literal syntax accepted inside `find(...)`
//!
//! The accepted syntax is a JSON5 subset: unquoted keys, single or double
//! quoted strings, hexadecimal integers, signed numbers, trailing commas and
//! `//` / `/* */` comments. `Infinity` and `NaN` lex as floats so the parser
//! can reject them by name.

use crate::token::{Span, Token, TokenKind};
use std::borrow::Cow;

pub struct Lexer<'a> {
    input: &'a str,
    /// Current position in the input (byte index)
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Returns the character at the current position without advancing
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Returns the character after the current one without advancing
    fn peek_next(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// Advances one character and returns it
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    fn token(&self, kind: TokenKind<'a>, start: usize) -> Token<'a> {
        Token { kind, span: Span::new(start, self.position) }
    }

    /// Skips whitespace and comments
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                self.bump();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Reads exactly `len` hex digits
    fn read_hex(&mut self, len: usize) -> Option<u32> {
        let hex = self.input.get(self.position..self.position + len)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        self.position += len;
        Some(value)
    }

    /// Decodes the digits of a `\u` escape, pairing a high surrogate with a
    /// following `\uDC00`-`\uDFFF` escape. Unpaired surrogates become U+FFFD
    fn read_unicode_escape(&mut self) -> Option<char> {
        let unit = self.read_hex(4)?;
        if !(0xD800..0xDC00).contains(&unit) {
            return Some(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        let resume = self.position;
        if self.input[self.position..].starts_with("\\u") {
            self.position += 2;
            match self.read_hex(4) {
                Some(low) if (0xDC00..0xE000).contains(&low) => {
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code);
                }
                _ => self.position = resume,
            }
        }
        Some(char::REPLACEMENT_CHARACTER)
    }

    /// Reads a numeric literal. A leading sign, if any, was already consumed
    fn read_number(&mut self, start: usize) -> Token<'a> {
        let negative = self.input[start..].starts_with('-');

        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x') | Some('X')) {
            self.bump();
            self.bump();
            let digits_start = self.position;
            if self.skip_digits(16) == 0 {
                return self.token(TokenKind::Illegal, start);
            }
            let digits = &self.input[digits_start..self.position];
            return match i64::from_str_radix(digits, 16) {
                Ok(v) => self.token(TokenKind::Integer(if negative { -v } else { v }), start),
                Err(_) => self.token(TokenKind::Illegal, start),
            };
        }

        let mut digits = self.skip_digits(10);
        let mut is_float = false;
        if self.peek() == Some('.') {
            self.bump();
            is_float = true;
            digits += self.skip_digits(10);
        }
        if digits == 0 {
            return self.token(TokenKind::Illegal, start);
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.bump();
            is_float = true;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if self.skip_digits(10) == 0 {
                return self.token(TokenKind::Illegal, start);
            }
        }

        let text = &self.input[start..self.position];
        if !is_float {
            if let Ok(v) = text.parse::<i64>() {
                return self.token(TokenKind::Integer(v), start);
            }
        }
        match text.parse::<f64>() {
            Ok(v) => self.token(TokenKind::Float(v), start),
            Err(_) => self.token(TokenKind::Illegal, start),
        }
    }

    /// Reads a quoted string literal.
    /// The opening quote was already consumed by the caller
    fn read_string(&mut self, start: usize, quote: char) -> Token<'a> {
        let content_start = self.position;
        let mut owned: Option<String> = None;

        loop {
            let Some(c) = self.bump() else {
                return self.token(TokenKind::Illegal, start);
            };
            if c == quote {
                break;
            }
            if c == '\n' {
                return self.token(TokenKind::Illegal, start);
            }
            if c != '\\' {
                if let Some(buf) = owned.as_mut() {
                    buf.push(c);
                }
                continue;
            }

            let buf = owned.get_or_insert_with(|| {
                self.input[content_start..self.position - 1].to_string()
            });
            let Some(escaped) = self.input[self.position..].chars().next() else {
                return self.token(TokenKind::Illegal, start);
            };
            self.position += escaped.len_utf8();
            match escaped {
                'n' => buf.push('\n'),
                't' => buf.push('\t'),
                'r' => buf.push('\r'),
                'b' => buf.push('\u{8}'),
                'f' => buf.push('\u{c}'),
                'v' => buf.push('\u{b}'),
                '0' => buf.push('\0'),
                // line continuations
                '\n' | '\u{2028}' | '\u{2029}' => {}
                '\r' => {
                    if self.peek() == Some('\n') {
                        self.bump();
                    }
                }
                'x' => match self.read_hex(2).and_then(char::from_u32) {
                    Some(ch) => buf.push(ch),
                    None => return self.token(TokenKind::Illegal, start),
                },
                'u' => match self.read_unicode_escape() {
                    Some(ch) => buf.push(ch),
                    None => return self.token(TokenKind::Illegal, start),
                },
                other => buf.push(other),
            }
        }

        let value = match owned {
            Some(buf) => Cow::Owned(buf),
            None => Cow::Borrowed(&self.input[content_start..self.position - 1]),
        };
        self.token(TokenKind::String(value), start)
    }

    /// Reads an identifier or keyword.
    /// Identifiers may contain letters, digits, underscores and dollar signs
    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(c) = self.peek() {
            if is_identifier_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        let literal = &self.input[start..self.position];
        let kind = match literal {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "Infinity" => TokenKind::Float(f64::INFINITY),
            "NaN" => TokenKind::Float(f64::NAN),
            _ => TokenKind::Identifier(literal),
        };
        self.token(kind, start)
    }

    /// Reads the word after a sign; only `Infinity` and `NaN` may follow one
    fn read_signed_word(&mut self, start: usize, negative: bool) -> Token<'a> {
        let word_start = self.position;
        while self.peek().is_some_and(is_identifier_char) {
            self.bump();
        }
        let kind = match &self.input[word_start..self.position] {
            "Infinity" if negative => TokenKind::Float(f64::NEG_INFINITY),
            "Infinity" => TokenKind::Float(f64::INFINITY),
            "NaN" => TokenKind::Float(f64::NAN),
            _ => TokenKind::Illegal,
        };
        self.token(kind, start)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        let start = self.position;

        let c = self.bump()?;

        let token = match c {
            '{' => self.token(TokenKind::LBrace, start),
            '}' => self.token(TokenKind::RBrace, start),
            '[' => self.token(TokenKind::LBracket, start),
            ']' => self.token(TokenKind::RBracket, start),
            ':' => self.token(TokenKind::Colon, start),
            ',' => self.token(TokenKind::Comma, start),
            '"' | '\'' => self.read_string(start, c),
            '-' | '+' => match self.peek() {
                Some(d) if d.is_ascii_digit() || d == '.' => self.read_number(start),
                Some(d) if is_identifier_start(d) => self.read_signed_word(start, c == '-'),
                _ => self.token(TokenKind::Illegal, start),
            },
            '.' => {
                // Leading-dot decimals such as `.5`
                self.position = start;
                self.read_number(start)
            }
            c if c.is_ascii_digit() => {
                self.position = start;
                self.read_number(start)
            }
            c if is_identifier_start(c) => self.read_identifier(start),
            _ => self.token(TokenKind::Illegal, start),
        };
        Some(token)
    }
}
