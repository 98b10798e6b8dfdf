//! The dynamic value converter.
//!
//! Bidirectionally adapts between a token stream and a [`Value`] tree. The
//! read side is a recursive descent over pull tokens; the write side is a
//! recursive match over the value's variant tag. All in-progress state lives
//! on the calling thread's stack, so the converter itself carries none.
//!
//! The converter is installed into a [`SerializerConfig`](crate::config::SerializerConfig)
//! as an entry in an ordered list of [`Converter`] triples; the first entry
//! whose applicability test accepts the target type wins.

use std::any::{Any, TypeId};

use crate::error::{ReadError, WriteError};
use crate::token::{Token, TokenRead, TokenWrite};
use crate::value::{Map, Value};

/// Reads one complete dynamic value from the token stream.
///
/// Leading comment tokens are skipped. Objects preserve the order properties
/// are first encountered in; a repeated key overwrites the value in place
/// without moving the key from its first-seen position.
pub fn read_value<R: TokenRead + ?Sized>(reader: &mut R) -> Result<Value, ReadError> {
    loop {
        match reader.next_token()? {
            None => return Err(ReadError::UnexpectedEnd("value")),
            Some(Token::Comment(_)) => continue,
            Some(token) => return read_value_from(reader, token),
        }
    }
}

/// Dispatches on a token that has already been pulled from the stream.
fn read_value_from<R: TokenRead + ?Sized>(
    reader: &mut R,
    token: Token,
) -> Result<Value, ReadError> {
    match token {
        Token::BeginObject => read_object(reader),
        Token::BeginArray => read_array(reader),
        Token::String(s) => Ok(Value::String(s)),
        Token::Integer(n) => Ok(Value::Integer(n)),
        Token::Float(x) => Ok(Value::Float(x)),
        Token::Bool(b) => Ok(Value::Bool(b)),
        Token::Null | Token::Undefined => Ok(Value::Null),
        Token::Date(d) => Ok(Value::Date(d)),
        Token::Bytes(b) => Ok(Value::Bytes(b)),
        other => Err(ReadError::UnexpectedToken(other.kind())),
    }
}

fn read_object<R: TokenRead + ?Sized>(reader: &mut R) -> Result<Value, ReadError> {
    let mut map = Map::new();
    loop {
        match reader.next_token()? {
            None => return Err(ReadError::UnexpectedEnd("object")),
            Some(Token::Comment(_)) => {}
            Some(Token::EndObject) => return Ok(Value::Map(map)),
            Some(Token::Name(key)) => {
                let value = read_value(reader)?;
                map.insert(key, value);
            }
            Some(other) => return Err(ReadError::UnexpectedToken(other.kind())),
        }
    }
}

fn read_array<R: TokenRead + ?Sized>(reader: &mut R) -> Result<Value, ReadError> {
    let mut items = Vec::new();
    loop {
        match reader.next_token()? {
            None => return Err(ReadError::UnexpectedEnd("array")),
            Some(Token::Comment(_)) => {}
            Some(Token::EndArray) => return Ok(Value::Seq(items)),
            Some(token) => items.push(read_value_from(reader, token)?),
        }
    }
}

/// Writes a dynamic value to the token sink.
///
/// Emission order follows the value exactly: map entries in iteration order,
/// sequence elements in element order. Nothing is reordered.
pub fn write_value<W: TokenWrite + ?Sized>(writer: &mut W, value: &Value) -> Result<(), WriteError> {
    match value {
        Value::Null => writer.null_value(),
        Value::Bool(b) => writer.bool_value(*b),
        Value::Integer(n) => writer.number_value(*n),
        Value::Float(x) => writer.fp_number_value(*x),
        Value::String(s) => writer.string_value(s),
        Value::Bytes(bytes) => writer.bytes_value(bytes),
        Value::Date(date) => writer.date_value(date),
        Value::Seq(items) => {
            writer.begin_array()?;
            for item in items {
                write_value(writer, item)?;
            }
            writer.end_array()
        }
        Value::Map(map) => write_map_entries(writer, map),
    }
}

fn write_map_entries<W: TokenWrite + ?Sized>(writer: &mut W, map: &Map) -> Result<(), WriteError> {
    writer.begin_object()?;
    for (key, value) in map {
        writer.name(key)?;
        write_value(writer, value)?;
    }
    writer.end_object()
}

/// One entry in the converter registry: an applicability test over the target
/// type plus a token-level decode and encode function.
///
/// Kept as a plain struct of fn pointers rather than a trait hierarchy so
/// that registration order stays visible and testable. Values cross the
/// boundary as `Any` because the registry is consulted with a runtime type
/// id; the serializer downcasts on the way out.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    pub applies: fn(TypeId) -> bool,
    pub read: fn(&mut dyn TokenRead) -> Result<Box<dyn Any>, ReadError>,
    pub write: fn(&dyn Any, &mut dyn TokenWrite) -> Result<(), WriteError>,
}

/// The converter for the ordered string-to-dynamic-value mapping type.
///
/// This is the applicability rule from the original contract: the converter
/// claims exactly the generic dictionary type. Scalars and arrays reached
/// during recursive descent are handled internally without further
/// applicability checks. A document whose root is not an object does not
/// decode into a [`Map`].
pub fn dynamic_map_converter() -> Converter {
    Converter {
        applies: |target| target == TypeId::of::<Map>(),
        read: |reader| match read_value(reader)? {
            Value::Map(map) => Ok(Box::new(map)),
            // Scalar kinds match their token labels; a sequence root was a
            // begin-array token.
            Value::Seq(_) => Err(ReadError::UnexpectedToken("begin-array")),
            other => Err(ReadError::UnexpectedToken(other.kind())),
        },
        write: |value, writer| {
            let map = value
                .downcast_ref::<Map>()
                .ok_or(WriteError::UnsupportedType(std::any::type_name::<Map>()))?;
            write_map_entries(writer, map)
        },
    }
}

/// The converter for [`Value`] itself, so callers can read a document of any
/// shape dynamically at the root.
pub fn dynamic_value_converter() -> Converter {
    Converter {
        applies: |target| target == TypeId::of::<Value>(),
        read: |reader| Ok(Box::new(read_value(reader)?)),
        write: |value, writer| {
            let value = value
                .downcast_ref::<Value>()
                .ok_or(WriteError::UnsupportedType(std::any::type_name::<Value>()))?;
            write_value(writer, value)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenBuffer;

    #[test]
    fn map_converter_applies_to_map_only() {
        let converter = dynamic_map_converter();
        assert!((converter.applies)(TypeId::of::<Map>()));
        assert!(!(converter.applies)(TypeId::of::<Value>()));
        assert!(!(converter.applies)(TypeId::of::<String>()));
    }

    #[test]
    fn map_converter_rejects_non_object_roots_by_token_kind() {
        let converter = dynamic_map_converter();

        let mut tokens = TokenBuffer::from_tokens([Token::Integer(7)]);
        let err = (converter.read)(&mut tokens).unwrap_err();
        assert!(matches!(err, ReadError::UnexpectedToken("integer")));

        let mut tokens = TokenBuffer::from_tokens([Token::BeginArray, Token::EndArray]);
        let err = (converter.read)(&mut tokens).unwrap_err();
        assert!(matches!(err, ReadError::UnexpectedToken("begin-array")));
    }

    #[test]
    fn value_converter_round_trips_through_any() {
        let converter = dynamic_value_converter();
        let original = Value::from(vec![Value::from(1), Value::from("two")]);

        let mut tokens = TokenBuffer::new();
        (converter.write)(&original, &mut tokens).unwrap();
        let read_back = (converter.read)(&mut tokens).unwrap();
        assert_eq!(read_back.downcast_ref::<Value>(), Some(&original));
    }
}
