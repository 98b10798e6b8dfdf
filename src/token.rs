//! Token vocabulary and stream contracts.
//!
//! The dynamic value converter never touches bytes. It speaks to a pull-style
//! [`TokenRead`] source and a push-style [`TokenWrite`] sink, so the same
//! conversion logic runs against real JSON streams (see [`crate::json`]) and
//! against in-memory token sequences.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::{ReadError, WriteError};

/// One lexical unit of a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    /// A property name inside an object.
    Name(String),
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// JavaScript `undefined`. Converts to a null value.
    Undefined,
    Date(DateTime<Utc>),
    Bytes(Vec<u8>),
    /// A comment. Skipped wherever the converter encounters one.
    Comment(String),
}

impl Token {
    /// A short label for the token type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Token::BeginObject => "begin-object",
            Token::EndObject => "end-object",
            Token::BeginArray => "begin-array",
            Token::EndArray => "end-array",
            Token::Name(_) => "property-name",
            Token::String(_) => "string",
            Token::Integer(_) => "integer",
            Token::Float(_) => "float",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
            Token::Undefined => "undefined",
            Token::Date(_) => "date",
            Token::Bytes(_) => "byte-sequence",
            Token::Comment(_) => "comment",
        }
    }
}

/// A sequential pull source of tokens.
pub trait TokenRead {
    /// Pulls the next token, or `None` once the stream is exhausted.
    fn next_token(&mut self) -> Result<Option<Token>, ReadError>;
}

/// A sequential push sink for tokens.
///
/// The scalar emissions mirror the token vocabulary; how a sink spells a
/// date or a byte sequence on its wire is the sink's own business.
pub trait TokenWrite {
    fn begin_object(&mut self) -> Result<(), WriteError>;
    fn end_object(&mut self) -> Result<(), WriteError>;
    fn begin_array(&mut self) -> Result<(), WriteError>;
    fn end_array(&mut self) -> Result<(), WriteError>;
    fn name(&mut self, name: &str) -> Result<(), WriteError>;
    fn string_value(&mut self, value: &str) -> Result<(), WriteError>;
    fn number_value(&mut self, value: i64) -> Result<(), WriteError>;
    fn fp_number_value(&mut self, value: f64) -> Result<(), WriteError>;
    fn bool_value(&mut self, value: bool) -> Result<(), WriteError>;
    fn null_value(&mut self) -> Result<(), WriteError>;
    fn date_value(&mut self, value: &DateTime<Utc>) -> Result<(), WriteError>;
    fn bytes_value(&mut self, value: &[u8]) -> Result<(), WriteError>;
    /// Makes everything written so far observable on sinks that buffer.
    fn flush(&mut self) -> Result<(), WriteError>;
}

/// An in-memory FIFO of tokens implementing both stream contracts.
///
/// Reading pops from the front, writing pushes to the back. Used by tests and
/// benches to drive the converter with exact token sequences, including ones
/// a real JSON parser would never produce (comments, truncated containers).
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer {
    tokens: VecDeque<Token>,
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into()
    }
}

impl FromIterator<Token> for TokenBuffer {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

impl TokenRead for TokenBuffer {
    fn next_token(&mut self) -> Result<Option<Token>, ReadError> {
        Ok(self.tokens.pop_front())
    }
}

impl TokenWrite for TokenBuffer {
    fn begin_object(&mut self) -> Result<(), WriteError> {
        self.tokens.push_back(Token::BeginObject);
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), WriteError> {
        self.tokens.push_back(Token::EndObject);
        Ok(())
    }

    fn begin_array(&mut self) -> Result<(), WriteError> {
        self.tokens.push_back(Token::BeginArray);
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), WriteError> {
        self.tokens.push_back(Token::EndArray);
        Ok(())
    }

    fn name(&mut self, name: &str) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Name(name.to_owned()));
        Ok(())
    }

    fn string_value(&mut self, value: &str) -> Result<(), WriteError> {
        self.tokens.push_back(Token::String(value.to_owned()));
        Ok(())
    }

    fn number_value(&mut self, value: i64) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Integer(value));
        Ok(())
    }

    fn fp_number_value(&mut self, value: f64) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Float(value));
        Ok(())
    }

    fn bool_value(&mut self, value: bool) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Bool(value));
        Ok(())
    }

    fn null_value(&mut self) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Null);
        Ok(())
    }

    fn date_value(&mut self, value: &DateTime<Utc>) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Date(*value));
        Ok(())
    }

    fn bytes_value(&mut self, value: &[u8]) -> Result<(), WriteError> {
        self.tokens.push_back(Token::Bytes(value.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), WriteError> {
        Ok(())
    }
}
