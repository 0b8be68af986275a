//! Recursive-descent parser for the argument list of a `find` invocation
//!
//! ## Grammar
//!
//! ```text
//! arguments := (value (',' value)* ','?)?  EOF
//! value     := object | array | STRING | INTEGER | FLOAT | true | false | null
//! object    := '{' (member (',' member)* ','?)? '}'
//! member    := (IDENTIFIER | STRING) ':' value
//! array     := '[' (value (',' value)* ','?)? ']'
//! ```
//!
//! Values are produced as `serde_json::Value`; object members keep their
//! source order. A repeated key keeps its first position and its last value.
//! Objects and arrays nest at most `MAX_DEPTH` levels.

use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Deepest object/array nesting accepted, same limit as serde_json
pub const MAX_DEPTH: usize = 128;

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    position: usize,
    /// Objects and arrays currently open
    depth: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}{}", location(.span))]
pub struct ParseError {
    pub message: String,
    pub span: Option<Span>,
}

fn location(span: &Option<Span>) -> String {
    span.map(|s| format!(" at {}", s)).unwrap_or_default()
}

impl ParseError {
    fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    fn at_position(message: String, span: Span) -> Self {
        Self { message, span: Some(span) }
    }
}

/// Parses the comma-separated values between the parentheses of a call
pub fn parse_arguments(input: &str) -> Result<Vec<Value>, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).collect();
    Parser::new(&tokens).parse_arguments()
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        Self { tokens, position: 0, depth: 0 }
    }

    /// Returns the current token without advancing
    fn peek(&self) -> Option<&'a Token<'a>> {
        self.tokens.get(self.position)
    }

    /// Returns the current token and advances
    fn advance(&mut self) -> Option<&'a Token<'a>> {
        let tokens = self.tokens;
        let token = tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Checks whether the current token matches the given kind
    fn match_token(&self, kind: &TokenKind) -> bool {
        self.peek()
            .is_some_and(|token| std::mem::discriminant(&token.kind) == std::mem::discriminant(kind))
    }

    /// Expects a token of a specific kind and advances, otherwise returns an error
    fn expect(&mut self, expected: TokenKind) -> Result<&'a Token<'a>, ParseError> {
        match self.peek() {
            Some(token) if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) => {
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::at_position(
                format!("Expected {:?}, found {:?}", expected, token.kind),
                token.span,
            )),
            None => Err(ParseError::new(
                format!("Expected {:?}, but reached end of input", expected),
                None,
            )),
        }
    }

    pub fn parse_arguments(&mut self) -> Result<Vec<Value>, ParseError> {
        let mut values = Vec::new();

        while self.peek().is_some() {
            values.push(self.parse_value()?);
            if self.peek().is_none() {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }

        Ok(values)
    }

    pub fn parse_value(&mut self) -> Result<Value, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new("Unexpected end of input".to_string(), None));
        };

        match &token.kind {
            TokenKind::LBrace => self.parse_nested(token.span, Self::parse_object),
            TokenKind::LBracket => self.parse_nested(token.span, Self::parse_array),
            TokenKind::String(s) => Ok(Value::String(s.to_string())),
            TokenKind::Integer(n) => Ok(Value::Number(Number::from(*n))),
            // Infinity and NaN lex as numbers but have no JSON or SQL form
            TokenKind::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
                ParseError::at_position(format!("Non-finite number {} is not supported", f), token.span)
            }),
            TokenKind::True => Ok(Value::Bool(true)),
            TokenKind::False => Ok(Value::Bool(false)),
            TokenKind::Null => Ok(Value::Null),
            other => Err(ParseError::at_position(
                format!("Expected a value, found {:?}", other),
                token.span,
            )),
        }
    }

    /// Runs `parse` for an object or array body, enforcing `MAX_DEPTH`
    fn parse_nested(
        &mut self,
        span: Span,
        parse: fn(&mut Self) -> Result<Value, ParseError>,
    ) -> Result<Value, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::at_position(
                format!("Nesting deeper than {} levels", MAX_DEPTH),
                span,
            ));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    /// Parses the members of an object; the opening brace was already consumed
    fn parse_object(&mut self) -> Result<Value, ParseError> {
        let mut members = Map::new();

        loop {
            if self.match_token(&TokenKind::RBrace) {
                self.advance();
                break;
            }

            let key = self.parse_key()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            members.insert(key, value);

            if self.match_token(&TokenKind::Comma) {
                self.advance();
            } else {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }

        Ok(Value::Object(members))
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new("Expected object key, but reached end of input".to_string(), None));
        };

        match &token.kind {
            TokenKind::Identifier(name) => Ok(name.to_string()),
            TokenKind::String(s) => Ok(s.to_string()),
            // Keywords are valid unquoted keys
            TokenKind::True => Ok("true".to_string()),
            TokenKind::False => Ok("false".to_string()),
            TokenKind::Null => Ok("null".to_string()),
            other => Err(ParseError::at_position(
                format!("Expected object key, found {:?}", other),
                token.span,
            )),
        }
    }

    /// Parses the elements of an array; the opening bracket was already consumed
    fn parse_array(&mut self) -> Result<Value, ParseError> {
        let mut elements = Vec::new();

        loop {
            if self.match_token(&TokenKind::RBracket) {
                self.advance();
                break;
            }

            elements.push(self.parse_value()?);

            if self.match_token(&TokenKind::Comma) {
                self.advance();
            } else {
                self.expect(TokenKind::RBracket)?;
                break;
            }
        }

        Ok(Value::Array(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Parses exactly one value with nothing after it
    fn parse_document(input: &str) -> Result<Value, ParseError> {
        let mut values = parse_arguments(input)?;
        match values.len() {
            1 => Ok(values.remove(0)),
            n => Err(ParseError::new(format!("Expected one value, found {}", n), None)),
        }
    }

    #[test]
    fn test_unquoted_keys_and_single_quotes() {
        let value = parse_document("{status: 'placed', total: {$gt: 100}}").unwrap();
        assert_eq!(value, json!({"status": "placed", "total": {"$gt": 100}}));
    }

    #[test]
    fn test_member_order_is_preserved() {
        let value = parse_document("{name: 1, age: 1, _id: 0}").unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "age", "_id"]);
    }

    #[test]
    fn test_duplicate_key_keeps_first_position_last_value() {
        let value = parse_document("{a: 1, b: 2, a: 3}").unwrap();
        let entries: Vec<_> = value.as_object().unwrap().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(entries, vec![("a".to_string(), json!(3)), ("b".to_string(), json!(2))]);
    }

    #[test]
    fn test_nested_arrays_and_trailing_commas() {
        let value = parse_document("{$or: [{a: 1,}, {b: [1, 2,],},],}").unwrap();
        assert_eq!(value, json!({"$or": [{"a": 1}, {"b": [1, 2]}]}));
    }

    #[test]
    fn test_scalars() {
        let value = parse_document(r#"[true, false, null, -2, 1.5, "x"]"#).unwrap();
        assert_eq!(value, json!([true, false, null, -2, 1.5, "x"]));
    }

    #[test]
    fn test_quoted_keys() {
        let value = parse_document(r#"{"first name": 'Ann', 'age': 3}"#).unwrap();
        assert_eq!(value, json!({"first name": "Ann", "age": 3}));
    }

    #[test]
    fn test_arguments_list() {
        let args = parse_arguments("{_id: 23113}, {name: 1, age: 1}").unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], json!({"_id": 23113}));
        assert_eq!(args[1], json!({"name": 1, "age": 1}));
    }

    #[test]
    fn test_empty_arguments_list() {
        assert!(parse_arguments("").unwrap().is_empty());
        assert!(parse_arguments("  ").unwrap().is_empty());
    }

    #[test]
    fn test_missing_colon_is_error() {
        let err = parse_document("{a 1}").unwrap_err();
        assert_eq!(err.span, Some(Span::new(3, 4)));
        assert!(err.message.contains("Colon"));
    }

    #[test]
    fn test_unclosed_object_is_error() {
        let err = parse_document("{a: 1").unwrap_err();
        assert_eq!(err.span, None);
    }

    #[test]
    fn test_illegal_token_is_error() {
        assert!(parse_document("{a: #}").is_err());
        assert!(parse_arguments("{a: 1} {b: 2}").is_err());
    }

    #[test]
    fn test_trailing_tokens_are_error() {
        assert!(parse_document("{a: 1} }").is_err());
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let input = format!("{}1{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_document(&input).is_ok());
    }

    #[test]
    fn test_nesting_past_limit_is_error() {
        let input = format!("{}1{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        let err = parse_document(&input).unwrap_err();
        assert_eq!(err.span, Some(Span::new(MAX_DEPTH, MAX_DEPTH + 1)));
        assert!(err.message.contains("Nesting deeper"));

        // Far past the limit still fails cleanly instead of exhausting the stack
        let deep = format!("{{a: {}1{}}}", "[".repeat(5000), "]".repeat(5000));
        assert!(parse_arguments(&deep).is_err());
    }

    #[test]
    fn test_non_finite_numbers_are_error() {
        for input in ["{a: Infinity}", "{a: -Infinity}", "{a: NaN}"] {
            let err = parse_document(input).unwrap_err();
            assert!(err.message.contains("Non-finite"), "{}: {}", input, err);
        }
    }

    #[test]
    fn test_unicode_escapes() {
        let value = parse_document(r"{e: '\uD83D\uDE00', x: '\x41\x62', c: 'caf\u00e9'}").unwrap();
        assert_eq!(value, json!({"e": "\u{1F600}", "x": "Ab", "c": "caf\u{e9}"}));
    }

    #[test]
    fn test_error_display_includes_span() {
        let err = parse_document("{a: }").unwrap_err();
        assert_eq!(err.to_string(), "Expected a value, found RBrace at 4..5");
    }
}
