//! Struson-backed token streams.
//!
//! Adapters between byte streams and the [`token`](crate::token) contracts.
//! The tokenizer itself is [struson]'s: this module only flattens its
//! structured reader API into the crate's pull-token vocabulary and forwards
//! the push-token vocabulary to its writer. No grammar or number-format
//! handling happens here.
//!
//! [struson]: https://docs.rs/struson

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use struson::reader::{JsonReader, JsonStreamReader, ReaderSettings, ValueType};
use struson::writer::{JsonStreamWriter, JsonWriter};

use crate::error::{ReadError, WriteError};
use crate::token::{Token, TokenRead, TokenWrite};

#[derive(Debug, Clone, Copy)]
enum Scope {
    Object { expect_value: bool },
    Array,
}

/// A pull-token reader over a JSON byte stream.
///
/// Struson walks the document with a structured API (`begin_object`,
/// `has_next`, `next_name`, ...); this adapter tracks the container stack and
/// turns that walk into a flat token sequence. JSON comments are enabled in
/// the reader settings and consumed by struson itself, so this source never
/// emits [`Token::Comment`] — byte-level comment tolerance is the parser's
/// job, token-level tolerance the converter's.
pub struct JsonTokenReader<R: Read> {
    inner: JsonStreamReader<R>,
    stack: Vec<Scope>,
    done: bool,
}

impl<R: Read> JsonTokenReader<R> {
    pub fn new(source: R) -> Self {
        let settings = ReaderSettings {
            allow_comments: true,
            ..ReaderSettings::default()
        };
        Self {
            inner: JsonStreamReader::new_custom(source, settings),
            stack: Vec::new(),
            done: false,
        }
    }

    /// Consumes the start of the next value and returns its token. Container
    /// starts push a scope; the matching end token is produced later when the
    /// container is exhausted.
    fn read_value_token(&mut self) -> Result<Token, ReadError> {
        let token = match self.inner.peek()? {
            ValueType::Object => {
                self.inner.begin_object()?;
                self.stack.push(Scope::Object {
                    expect_value: false,
                });
                Token::BeginObject
            }
            ValueType::Array => {
                self.inner.begin_array()?;
                self.stack.push(Scope::Array);
                Token::BeginArray
            }
            ValueType::String => {
                let s = self.inner.next_string()?;
                self.value_done();
                Token::String(s)
            }
            ValueType::Number => {
                let raw = self.inner.next_number_as_string()?;
                self.value_done();
                parse_number(&raw)?
            }
            ValueType::Boolean => {
                let b = self.inner.next_bool()?;
                self.value_done();
                Token::Bool(b)
            }
            ValueType::Null => {
                self.inner.next_null()?;
                self.value_done();
                Token::Null
            }
        };
        Ok(token)
    }

    fn value_done(&mut self) {
        if self.stack.is_empty() {
            self.done = true;
        }
    }

    fn set_expect_value(&mut self, expect: bool) {
        if let Some(Scope::Object { expect_value }) = self.stack.last_mut() {
            *expect_value = expect;
        }
    }
}

impl<R: Read> TokenRead for JsonTokenReader<R> {
    fn next_token(&mut self) -> Result<Option<Token>, ReadError> {
        if self.done {
            return Ok(None);
        }
        let token = match self.stack.last().copied() {
            None => self.read_value_token()?,
            Some(Scope::Array) => {
                if self.inner.has_next()? {
                    self.read_value_token()?
                } else {
                    self.inner.end_array()?;
                    self.stack.pop();
                    self.value_done();
                    Token::EndArray
                }
            }
            Some(Scope::Object { expect_value: true }) => {
                self.set_expect_value(false);
                self.read_value_token()?
            }
            Some(Scope::Object { expect_value: false }) => {
                if self.inner.has_next()? {
                    let name = self.inner.next_name_owned()?;
                    self.set_expect_value(true);
                    Token::Name(name)
                } else {
                    self.inner.end_object()?;
                    self.stack.pop();
                    self.value_done();
                    Token::EndObject
                }
            }
        };
        Ok(Some(token))
    }
}

// JSON numbers decode as i64 where they fit and f64 otherwise.
fn parse_number(raw: &str) -> Result<Token, ReadError> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Token::Integer(n));
    }
    match raw.parse::<f64>() {
        Ok(x) => Ok(Token::Float(x)),
        Err(_) => Err(ReadError::Number(raw.to_owned())),
    }
}

/// A push-token writer producing a JSON byte stream.
///
/// Dates are written as RFC 3339 strings and byte sequences as standard
/// base64, since the JSON wire has no native spelling for either. Call
/// [`finish`](Self::finish) once the root value is complete; it validates the
/// document and writes everything through to the sink.
pub struct JsonTokenWriter<W: Write> {
    inner: JsonStreamWriter<W>,
}

impl<W: Write> JsonTokenWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            inner: JsonStreamWriter::new(sink),
        }
    }

    /// Completes the document and flushes struson's buffer into the sink.
    /// The sink itself stays open.
    pub fn finish(self) -> Result<(), WriteError> {
        self.inner.finish_document()?;
        Ok(())
    }
}

impl<W: Write> TokenWrite for JsonTokenWriter<W> {
    fn begin_object(&mut self) -> Result<(), WriteError> {
        Ok(self.inner.begin_object()?)
    }

    fn end_object(&mut self) -> Result<(), WriteError> {
        Ok(self.inner.end_object()?)
    }

    fn begin_array(&mut self) -> Result<(), WriteError> {
        Ok(self.inner.begin_array()?)
    }

    fn end_array(&mut self) -> Result<(), WriteError> {
        Ok(self.inner.end_array()?)
    }

    fn name(&mut self, name: &str) -> Result<(), WriteError> {
        Ok(self.inner.name(name)?)
    }

    fn string_value(&mut self, value: &str) -> Result<(), WriteError> {
        Ok(self.inner.string_value(value)?)
    }

    fn number_value(&mut self, value: i64) -> Result<(), WriteError> {
        Ok(self.inner.number_value(value)?)
    }

    fn fp_number_value(&mut self, value: f64) -> Result<(), WriteError> {
        Ok(self.inner.fp_number_value(value)?)
    }

    fn bool_value(&mut self, value: bool) -> Result<(), WriteError> {
        Ok(self.inner.bool_value(value)?)
    }

    fn null_value(&mut self) -> Result<(), WriteError> {
        Ok(self.inner.null_value()?)
    }

    fn date_value(&mut self, value: &DateTime<Utc>) -> Result<(), WriteError> {
        Ok(self.inner.string_value(&value.to_rfc3339())?)
    }

    fn bytes_value(&mut self, value: &[u8]) -> Result<(), WriteError> {
        Ok(self.inner.string_value(&STANDARD.encode(value))?)
    }

    // Struson only flushes on document completion; `finish` does the real
    // work for this sink.
    fn flush(&mut self) -> Result<(), WriteError> {
        Ok(())
    }
}
