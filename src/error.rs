//! Error types for reading and writing dynamic values.
use thiserror::Error;

/// Errors surfaced while deserializing.
///
/// All failures are reported synchronously to the caller of the outermost
/// read operation. There are no retries and no partial results: a read either
/// yields a fully formed value or one of these errors.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The byte stream is not well-formed JSON. Reported by the underlying
    /// token reader.
    #[error("malformed JSON input: {0}")]
    Syntax(#[from] struson::reader::ReaderError),
    /// A token appeared in a position where the dynamic value converter
    /// cannot accept it, e.g. an end-array token at the start of a value.
    #[error("unexpected {0} token when converting dynamic value")]
    UnexpectedToken(&'static str),
    /// The token stream ended in the middle of an object, array or property.
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEnd(&'static str),
    /// A JSON number that fits neither `i64` nor `f64`.
    #[error("unsupported number value: {0}")]
    Number(String),
    /// The input bytes are not valid text for the configured encoding.
    #[error("input is not valid {0} text")]
    Encoding(&'static str),
    #[error("deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading failed: {0}")]
    Io(#[from] std::io::Error),
    /// Array reading was invoked on a serializer without an array strategy.
    #[error("array reading requires a type-specific strategy")]
    NotSupported,
    /// A registered converter produced a value of the wrong type.
    #[error("no deserialization strategy produced a value of type {0}")]
    UnsupportedType(&'static str),
}

/// Errors surfaced while serializing.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("writing failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    /// A floating-point value that JSON cannot represent (NaN or infinity).
    #[error("number cannot be represented in JSON: {0}")]
    Number(#[from] struson::writer::JsonNumberError),
    /// A registered converter was handed a value of the wrong type.
    #[error("no serialization strategy accepts a value of type {0}")]
    UnsupportedType(&'static str),
}
