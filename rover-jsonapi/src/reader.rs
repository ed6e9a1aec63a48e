//! Forward-only pull tokenizer for JSON documents.
//!
//! The decoder never materializes a document tree. It walks the token
//! stream through [`TokenReader`] and only builds values for the members it
//! cares about.

use serde_json::Number;

use crate::error::DecodeError;

/// Deepest object/array nesting accepted before decoding stops.
pub const MAX_DEPTH: usize = 128;

/// Kind of the next token in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Name,
    String,
    Number,
    Bool,
    Null,
    /// A bareword that is neither a number nor a literal, such as `tru`.
    Malformed,
    EndDocument,
}

/// A streaming JSON token source.
pub trait TokenReader {
    fn begin_object(&mut self) -> Result<(), DecodeError>;
    fn end_object(&mut self) -> Result<(), DecodeError>;
    fn begin_array(&mut self) -> Result<(), DecodeError>;
    fn end_array(&mut self) -> Result<(), DecodeError>;

    /// Whether the current object or array has another element.
    fn has_next(&mut self) -> Result<bool, DecodeError>;

    fn next_name(&mut self) -> Result<String, DecodeError>;
    fn peek(&mut self) -> Result<Token, DecodeError>;
    fn next_string(&mut self) -> Result<String, DecodeError>;

    /// Read a number. On [`DecodeError::MalformedValue`] the token has
    /// already been consumed.
    fn next_number(&mut self) -> Result<Number, DecodeError>;

    fn next_bool(&mut self) -> Result<bool, DecodeError>;
    fn next_null(&mut self) -> Result<(), DecodeError>;

    /// Skip the next value, including any nested structure.
    fn skip_value(&mut self) -> Result<(), DecodeError>;

    /// Byte position, for diagnostics.
    fn offset(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyDocument,
    NonemptyDocument,
    EmptyObject,
    DanglingName,
    NonemptyObject,
    EmptyArray,
    NonemptyArray,
}

/// [`TokenReader`] over an in-memory byte slice.
pub struct JsonReader<'a> {
    input: &'a [u8],
    pos: usize,
    stack: Vec<Scope>,
    peeked: Option<Token>,
}

impl std::fmt::Debug for JsonReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonReader")
            .field("pos", &self.pos)
            .field("len", &self.input.len())
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b'[' | b']' | b'{' | b'}' | b'"'
    )
}

impl<'a> JsonReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
        }
    }

    fn syntax(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::Syntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &'static str, found: Token) -> DecodeError {
        DecodeError::UnexpectedToken {
            expected,
            found: format!("{:?}", found),
            offset: self.pos,
        }
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.input.get(self.pos) {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn next_non_whitespace(&mut self) -> Result<u8, DecodeError> {
        self.skip_whitespace();
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof)
    }

    /// End of the bareword (number or literal) starting at `pos`.
    fn bareword_end(&self) -> usize {
        let mut end = self.pos;
        while let Some(&b) = self.input.get(end) {
            if is_delimiter(b) {
                break;
            }
            end += 1;
        }
        end
    }

    fn take_bareword(&mut self) -> &'a str {
        let end = self.bareword_end();
        let input = self.input;
        let word = &input[self.pos..end];
        self.pos = end;
        // Delimiters are ASCII, so a bareword of valid UTF-8 input is valid UTF-8.
        std::str::from_utf8(word).unwrap_or("")
    }

    fn classify_value(&mut self) -> Result<Token, DecodeError> {
        let c = self.next_non_whitespace()?;
        let token = match c {
            b'{' => {
                self.pos += 1;
                Token::BeginObject
            }
            b'[' => {
                self.pos += 1;
                Token::BeginArray
            }
            b'"' => Token::String,
            _ => {
                let word = &self.input[self.pos..self.bareword_end()];
                match word {
                    b"true" | b"false" => Token::Bool,
                    b"null" => Token::Null,
                    b"NaN" | b"Infinity" => Token::Number,
                    [b'-' | b'+' | b'.' | b'0'..=b'9', ..] => Token::Number,
                    [] => {
                        return Err(self.syntax(format!("unexpected character {:?}", c as char)));
                    }
                    _ => Token::Malformed,
                }
            }
        };
        Ok(token)
    }

    fn do_peek(&mut self) -> Result<Token, DecodeError> {
        let scope = *self.stack.last().ok_or_else(|| self.syntax("reader exhausted"))?;
        match scope {
            Scope::EmptyArray => {
                self.set_top(Scope::NonemptyArray);
                if self.next_non_whitespace()? == b']' {
                    self.pos += 1;
                    return Ok(Token::EndArray);
                }
            }
            Scope::NonemptyArray => match self.next_non_whitespace()? {
                b']' => {
                    self.pos += 1;
                    return Ok(Token::EndArray);
                }
                b',' => self.pos += 1,
                _ => return Err(self.syntax("expected ',' or ']'")),
            },
            Scope::EmptyObject | Scope::NonemptyObject => {
                self.set_top(Scope::DanglingName);
                if scope == Scope::NonemptyObject {
                    match self.next_non_whitespace()? {
                        b'}' => {
                            self.pos += 1;
                            return Ok(Token::EndObject);
                        }
                        b',' => self.pos += 1,
                        _ => return Err(self.syntax("expected ',' or '}'")),
                    }
                }
                return match self.next_non_whitespace()? {
                    b'"' => Ok(Token::Name),
                    b'}' if scope == Scope::EmptyObject => {
                        self.pos += 1;
                        Ok(Token::EndObject)
                    }
                    _ => Err(self.syntax("expected member name")),
                };
            }
            Scope::DanglingName => {
                self.set_top(Scope::NonemptyObject);
                if self.next_non_whitespace()? != b':' {
                    return Err(self.syntax("expected ':'"));
                }
                self.pos += 1;
            }
            Scope::EmptyDocument => self.set_top(Scope::NonemptyDocument),
            Scope::NonemptyDocument => {
                self.skip_whitespace();
                return if self.pos >= self.input.len() {
                    Ok(Token::EndDocument)
                } else {
                    Err(self.syntax("trailing data after document"))
                };
            }
        }
        self.classify_value()
    }

    fn push(&mut self, scope: Scope) -> Result<(), DecodeError> {
        // The bottom entry is the document scope.
        if self.stack.len() > MAX_DEPTH {
            return Err(DecodeError::DepthLimit { offset: self.pos });
        }
        self.stack.push(scope);
        Ok(())
    }

    fn expect(&mut self, expected: Token, name: &'static str) -> Result<(), DecodeError> {
        let found = self.peek()?;
        if found != expected {
            return Err(self.unexpected(name, found));
        }
        self.peeked = None;
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32, DecodeError> {
        let digits = self
            .input
            .get(self.pos..self.pos + 4)
            .ok_or(DecodeError::UnexpectedEof)?;
        let text = std::str::from_utf8(digits).map_err(|_| self.syntax("invalid \\u escape"))?;
        let value = u32::from_str_radix(text, 16).map_err(|_| self.syntax("invalid \\u escape"))?;
        self.pos += 4;
        Ok(value)
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        let c = *self.input.get(self.pos).ok_or(DecodeError::UnexpectedEof)?;
        self.pos += 1;
        let simple = match c {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let high = self.read_hex4()?;
                let code = if (0xD800..0xDC00).contains(&high)
                    && self.input.get(self.pos..self.pos + 2) == Some(b"\\u")
                {
                    let mark = self.pos;
                    self.pos += 2;
                    let low = self.read_hex4()?;
                    if (0xDC00..0xE000).contains(&low) {
                        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                    } else {
                        // Not a pair; leave the second escape for the next round.
                        self.pos = mark;
                        high
                    }
                } else {
                    high
                };
                let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                return Ok(());
            }
            other => return Err(self.syntax(format!("invalid escape '\\{}'", other as char))),
        };
        out.push(simple);
        Ok(())
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let start = self.pos;
        if self.input.get(self.pos) != Some(&b'"') {
            return Err(self.syntax("expected string"));
        }
        self.pos += 1;

        let mut out = Vec::new();
        loop {
            let chunk_start = self.pos;
            while let Some(&b) = self.input.get(self.pos) {
                if b == b'"' || b == b'\\' {
                    break;
                }
                self.pos += 1;
            }
            out.extend_from_slice(&self.input[chunk_start..self.pos]);

            match self.input.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    self.pos += 1;
                    self.read_escape(&mut out)?;
                }
                None => return Err(DecodeError::UnexpectedEof),
            }
        }

        String::from_utf8(out).map_err(|_| DecodeError::InvalidUtf8 { offset: start })
    }
}

impl TokenReader for JsonReader<'_> {
    fn begin_object(&mut self) -> Result<(), DecodeError> {
        self.expect(Token::BeginObject, "'{'")?;
        self.push(Scope::EmptyObject)
    }

    fn end_object(&mut self) -> Result<(), DecodeError> {
        self.expect(Token::EndObject, "'}'")?;
        self.stack.pop();
        Ok(())
    }

    fn begin_array(&mut self) -> Result<(), DecodeError> {
        self.expect(Token::BeginArray, "'['")?;
        self.push(Scope::EmptyArray)
    }

    fn end_array(&mut self) -> Result<(), DecodeError> {
        self.expect(Token::EndArray, "']'")?;
        self.stack.pop();
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, DecodeError> {
        let token = self.peek()?;
        Ok(!matches!(
            token,
            Token::EndObject | Token::EndArray | Token::EndDocument
        ))
    }

    fn next_name(&mut self) -> Result<String, DecodeError> {
        self.expect(Token::Name, "member name")?;
        self.read_string()
    }

    fn peek(&mut self) -> Result<Token, DecodeError> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.do_peek()?;
        self.peeked = Some(token);
        Ok(token)
    }

    fn next_string(&mut self) -> Result<String, DecodeError> {
        match self.peek()? {
            Token::String => {
                self.peeked = None;
                self.read_string()
            }
            // Lenient: numbers read as their literal text.
            Token::Number => {
                self.peeked = None;
                Ok(self.take_bareword().to_string())
            }
            other => Err(self.unexpected("string", other)),
        }
    }

    fn next_number(&mut self) -> Result<Number, DecodeError> {
        let found = self.peek()?;
        if found != Token::Number {
            return Err(self.unexpected("number", found));
        }
        self.peeked = None;
        let offset = self.pos;
        let literal = self.take_bareword();

        if let Ok(n) = literal.parse::<i64>() {
            return Ok(Number::from(n));
        }
        if let Ok(n) = literal.parse::<u64>() {
            return Ok(Number::from(n));
        }
        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| DecodeError::MalformedValue {
                offset,
                literal: literal.to_string(),
            })
    }

    fn next_bool(&mut self) -> Result<bool, DecodeError> {
        let found = self.peek()?;
        if found != Token::Bool {
            return Err(self.unexpected("boolean", found));
        }
        self.peeked = None;
        Ok(self.take_bareword() == "true")
    }

    fn next_null(&mut self) -> Result<(), DecodeError> {
        self.expect(Token::Null, "null")?;
        self.take_bareword();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<(), DecodeError> {
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                Token::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                Token::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                token @ (Token::EndObject | Token::EndArray) => {
                    if depth == 0 {
                        return Err(self.unexpected("value", token));
                    }
                    if token == Token::EndObject {
                        self.end_object()?;
                    } else {
                        self.end_array()?;
                    }
                    depth -= 1;
                }
                Token::Name => {
                    self.next_name()?;
                    continue;
                }
                Token::String => {
                    self.next_string()?;
                }
                Token::Number | Token::Bool | Token::Null | Token::Malformed => {
                    self.peeked = None;
                    self.take_bareword();
                }
                Token::EndDocument => return Err(DecodeError::UnexpectedEof),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    fn offset(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_nested_document() {
        let mut r = JsonReader::new(br#"{"a": [1, "two", true, null], "b": {}}"#);
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "a");
        r.begin_array().unwrap();
        assert_eq!(r.next_number().unwrap(), Number::from(1));
        assert_eq!(r.next_string().unwrap(), "two");
        assert!(r.next_bool().unwrap());
        r.next_null().unwrap();
        assert!(!r.has_next().unwrap());
        r.end_array().unwrap();
        assert_eq!(r.next_name().unwrap(), "b");
        r.begin_object().unwrap();
        r.end_object().unwrap();
        r.end_object().unwrap();
        assert_eq!(r.peek().unwrap(), Token::EndDocument);
    }

    #[test]
    fn decodes_escapes_and_surrogates() {
        let mut r = JsonReader::new(br#"["line\nbreak \"q\" \u00e9 \ud83d\ude00"]"#);
        r.begin_array().unwrap();
        assert_eq!(r.next_string().unwrap(), "line\nbreak \"q\" \u{e9} \u{1F600}");
    }

    #[test]
    fn malformed_number_is_consumed() {
        let mut r = JsonReader::new(b"[1.2.3, 4]");
        r.begin_array().unwrap();
        let err = r.next_number().unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(r.next_number().unwrap(), Number::from(4));
        r.end_array().unwrap();
    }

    #[test]
    fn non_finite_numbers_are_malformed() {
        let mut r = JsonReader::new(b"[NaN]");
        r.begin_array().unwrap();
        assert_eq!(r.peek().unwrap(), Token::Number);
        assert!(matches!(r.next_number(), Err(DecodeError::MalformedValue { .. })));
    }

    #[test]
    fn skip_value_skips_nested_structures() {
        let mut r = JsonReader::new(br#"{"skip": {"x": [1, {"y": 2}]}, "keep": 3}"#);
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "skip");
        r.skip_value().unwrap();
        assert_eq!(r.next_name().unwrap(), "keep");
        assert_eq!(r.next_number().unwrap(), Number::from(3));
        r.end_object().unwrap();
    }

    #[test]
    fn missing_closing_brace_is_eof() {
        let mut r = JsonReader::new(br#"{"a": 1"#);
        r.begin_object().unwrap();
        r.next_name().unwrap();
        r.next_number().unwrap();
        assert!(matches!(r.has_next(), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn missing_opening_brace_is_an_error() {
        let mut r = JsonReader::new(br#""data": 1}"#);
        assert!(r.begin_object().is_err());
    }

    #[test]
    fn unknown_literal_is_skippable() {
        let mut r = JsonReader::new(b"[tru, nul, 2]");
        r.begin_array().unwrap();
        assert_eq!(r.peek().unwrap(), Token::Malformed);
        r.skip_value().unwrap();
        assert_eq!(r.peek().unwrap(), Token::Malformed);
        r.skip_value().unwrap();
        assert_eq!(r.next_number().unwrap(), Number::from(2));
        r.end_array().unwrap();
    }

    #[test]
    fn stray_delimiter_is_a_syntax_error() {
        let mut r = JsonReader::new(b"[:]");
        r.begin_array().unwrap();
        assert!(matches!(r.peek(), Err(DecodeError::Syntax { .. })));
    }

    #[test]
    fn invalid_utf8_string_leaves_reader_at_next_token() {
        let mut r = JsonReader::new(b"[\"\xff\xfe\", \"ok\"]");
        r.begin_array().unwrap();
        let err = r.next_string().unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8 { offset: 1 }));
        assert!(err.is_recoverable());
        assert_eq!(r.next_string().unwrap(), "ok");
        r.end_array().unwrap();
    }

    #[test]
    fn nesting_beyond_limit_is_rejected() {
        let deep = "[".repeat(MAX_DEPTH + 1);
        let mut r = JsonReader::new(deep.as_bytes());
        for _ in 0..MAX_DEPTH {
            r.begin_array().unwrap();
        }
        assert!(matches!(r.begin_array(), Err(DecodeError::DepthLimit { offset: _ })));

        let mut r = JsonReader::new(deep.as_bytes());
        assert!(matches!(r.skip_value(), Err(DecodeError::DepthLimit { .. })));
    }
}
