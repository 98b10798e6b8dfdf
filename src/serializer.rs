//! The typed serializer adapter and its factory.

use std::any::{Any, TypeId};
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::SerializerConfig;
use crate::error::{ReadError, WriteError};
use crate::json::{JsonTokenReader, JsonTokenWriter};

/// Character encoding of the JSON byte stream.
///
/// JSON ships in UTF-8, UTF-16LE or UTF-16BE (RFC 8259 §8.1); UTF-8 is the
/// default and the only streaming path. The UTF-16 variants buffer and
/// transcode the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf16Be => "UTF-16BE",
        }
    }

    /// Decodes a whole document. A leading byte order mark is tolerated and
    /// stripped.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, ReadError> {
        let text = match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|_| ReadError::Encoding(self.name()))?,
            Encoding::Utf16Le | Encoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(ReadError::Encoding(self.name()));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| match self {
                        Encoding::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|_| ReadError::Encoding(self.name()))?
            }
        };
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_owned())
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Le => text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
            Encoding::Utf16Be => text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect(),
        }
    }
}

/// The uniform read/write contract for one element type `T`.
///
/// Implementations must be safe for concurrent use from multiple threads:
/// no mutable per-call state on the serializer itself. Streams stay owned by
/// the caller — reads never close them, writes flush and leave them open.
pub trait Serializer<T> {
    /// Deserializes exactly one `T` from the full content of the stream.
    fn read_one(&self, stream: &mut dyn Read) -> Result<T, ReadError>;

    /// Same as [`read_one`](Self::read_one), but overwrites `into` wholesale.
    /// The previous contents are discarded, never merged.
    fn read_one_into(&self, stream: &mut dyn Read, into: &mut T) -> Result<(), ReadError> {
        *into = self.read_one(stream)?;
        Ok(())
    }

    /// Deserializes an array of `T`. Serializers without a concrete array
    /// strategy fail with [`ReadError::NotSupported`].
    fn read_array(&self, _stream: &mut dyn Read) -> Result<Vec<T>, ReadError> {
        Err(ReadError::NotSupported)
    }

    /// Serializes one value to the stream.
    fn write_one(&self, stream: &mut dyn Write, value: &T) -> Result<(), WriteError>;
}

/// How a serializer turns a complete JSON document into `Vec<T>`.
///
/// The base adapter has none and reports array reads as unsupported; callers
/// that know their element type plug one in via
/// [`JsonSerializer::with_array_strategy`].
pub type ArrayStrategy<T> = fn(&str) -> Result<Vec<T>, ReadError>;

/// A JSON serializer for one element type `T`.
///
/// Cheap to clone and safe to share: the only owned state is the immutable
/// configuration behind an `Arc` plus the encoding and buffer size fixed at
/// construction. Every read/write call keeps its working state on the
/// caller's stack.
///
/// Reads and writes consult the configuration's converter registry first —
/// dynamic value types take the token-level conversion path — and fall back
/// to default serde-driven serialization for everything else.
pub struct JsonSerializer<T> {
    config: Arc<SerializerConfig>,
    encoding: Encoding,
    buffer_size: usize,
    array_strategy: Option<ArrayStrategy<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub const DEFAULT_BUFFER_SIZE: usize = 1024;

    /// An adapter backed by the process-wide shared configuration.
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::shared())
    }

    pub fn with_config(config: Arc<SerializerConfig>) -> Self {
        Self {
            config,
            encoding: Encoding::default(),
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            array_strategy: None,
            _marker: PhantomData,
        }
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Installs a concrete array-reading strategy, enabling
    /// [`Serializer::read_array`].
    pub fn with_array_strategy(mut self, strategy: ArrayStrategy<T>) -> Self {
        self.array_strategy = Some(strategy);
        self
    }

    /// Drains the stream and decodes it with the configured encoding.
    fn read_stream_to_string(&self, stream: &mut dyn Read) -> Result<String, ReadError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        self.encoding.decode(&bytes)
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonSerializer<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            encoding: self.encoding,
            buffer_size: self.buffer_size,
            array_strategy: self.array_strategy,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSerializer")
            .field("encoding", &self.encoding)
            .field("buffer_size", &self.buffer_size)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned + 'static> JsonSerializer<T> {
    /// Deserializes one `T` from a JSON string, bypassing the converter
    /// registry. Dynamic values still decode correctly through their serde
    /// implementations.
    pub fn item_from_json(&self, json: &str) -> Result<T, ReadError> {
        Ok(serde_json::from_str(json)?)
    }

    fn read_one_from<R: Read>(&self, source: R) -> Result<T, ReadError> {
        if let Some(converter) = self.config.converter_for(TypeId::of::<T>()) {
            let mut reader = JsonTokenReader::new(source);
            let boxed = (converter.read)(&mut reader)?;
            boxed
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| ReadError::UnsupportedType(std::any::type_name::<T>()))
        } else {
            Ok(serde_json::from_reader(source)?)
        }
    }
}

impl<T: Serialize + 'static> JsonSerializer<T> {
    /// Serializes one `T` to a JSON string, bypassing the converter
    /// registry.
    pub fn value_to_json(&self, value: &T) -> Result<String, WriteError> {
        Ok(serde_json::to_string(value)?)
    }

    fn write_one_to<W: Write>(&self, sink: W, value: &T) -> Result<(), WriteError> {
        if let Some(converter) = self.config.converter_for(TypeId::of::<T>()) {
            let mut writer = JsonTokenWriter::new(sink);
            (converter.write)(value as &dyn Any, &mut writer)?;
            writer.finish()
        } else {
            Ok(serde_json::to_writer(sink, value)?)
        }
    }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn read_one(&self, stream: &mut dyn Read) -> Result<T, ReadError> {
        match self.encoding {
            Encoding::Utf8 => {
                let source = skip_utf8_bom(stream)?;
                let source = BufReader::with_capacity(self.buffer_size, source);
                self.read_one_from(source)
            }
            _ => {
                let text = self.read_stream_to_string(stream)?;
                self.read_one_from(text.as_bytes())
            }
        }
    }

    fn read_array(&self, stream: &mut dyn Read) -> Result<Vec<T>, ReadError> {
        let json = self.read_stream_to_string(stream)?;
        match self.array_strategy {
            Some(strategy) => strategy(&json),
            None => Err(ReadError::NotSupported),
        }
    }

    fn write_one(&self, stream: &mut dyn Write, value: &T) -> Result<(), WriteError> {
        match self.encoding {
            Encoding::Utf8 => {
                let mut sink = BufWriter::with_capacity(self.buffer_size, &mut *stream);
                self.write_one_to(&mut sink, value)?;
                sink.flush()?;
            }
            encoding => {
                let mut utf8 = Vec::new();
                self.write_one_to(&mut utf8, value)?;
                // Both serialization paths emit UTF-8.
                let json = String::from_utf8(utf8)
                    .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
                stream.write_all(&encoding.encode(&json))?;
            }
        }
        stream.flush()?;
        Ok(())
    }
}

/// Consumes a UTF-8 byte order mark if the stream starts with one, handing
/// back a reader over the remaining bytes.
fn skip_utf8_bom(
    stream: &mut dyn Read,
) -> Result<std::io::Chain<Cursor<Vec<u8>>, &mut dyn Read>, ReadError> {
    const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
    let mut prefix = [0u8; 3];
    let mut filled = 0;
    while filled < prefix.len() {
        match stream.read(&mut prefix[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    let kept = if prefix[..filled] == BOM {
        Vec::new()
    } else {
        prefix[..filled].to_vec()
    };
    Ok(Cursor::new(kept).chain(stream))
}

/// Hands out serializer adapters that all share one configuration.
#[derive(Debug, Clone)]
pub struct JsonSerializerFactory {
    config: Arc<SerializerConfig>,
}

impl JsonSerializerFactory {
    /// A factory over the process-wide shared configuration.
    pub fn new() -> Self {
        Self {
            config: SerializerConfig::shared(),
        }
    }

    pub fn with_config(config: Arc<SerializerConfig>) -> Self {
        Self { config }
    }

    /// The process-wide shared factory.
    pub fn shared() -> &'static JsonSerializerFactory {
        static SHARED: OnceLock<JsonSerializerFactory> = OnceLock::new();
        SHARED.get_or_init(JsonSerializerFactory::new)
    }

    /// An adapter for `T` backed by this factory's configuration.
    pub fn create<T>(&self) -> JsonSerializer<T> {
        JsonSerializer::with_config(self.config.clone())
    }
}

impl Default for JsonSerializerFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_round_trips_with_bom() {
        let encoding = Encoding::Utf16Le;
        let mut bytes = encoding.encode("\u{feff}{\"a\":1}");
        assert_eq!(encoding.decode(&bytes).unwrap(), "{\"a\":1}");

        bytes.pop();
        assert!(matches!(
            encoding.decode(&bytes),
            Err(ReadError::Encoding("UTF-16LE"))
        ));
    }

    #[test]
    fn factory_shares_one_config() {
        let factory = JsonSerializerFactory::new();
        let a = factory.create::<crate::value::Value>();
        let b = factory.create::<crate::value::Map>();
        assert!(Arc::ptr_eq(&a.config, &b.config));
    }
}
