/*!
A streaming JSON serializer with an order-preserving dynamic value model.

# Main concepts

The crate adapts between JSON byte streams and Rust values along two paths:

* **Dynamic path** — for values whose shape is only known at runtime. A
  [`Value`] is a sum type over scalars, ordered sequences and ordered
  mappings ([`Map`]); object key order and array element order survive a
  round trip exactly. The conversion itself is a recursive walk over a pull
  token stream ([`read_value`]) and a push token stream ([`write_value`]),
  tolerant of comment tokens and strict about truncated or unbalanced input.
* **Typed path** — for everything else. A [`JsonSerializer`] falls back to
  serde-driven serialization whenever its converter registry has no entry
  for the target type, so plain `#[derive(Serialize, Deserialize)]` types
  work unchanged, including ones with [`Value`] fields inside them.

Which path a type takes is decided by the [`SerializerConfig`]: an ordered,
immutable list of converters consulted first-match-wins. One configuration is
built per process and shared read-only between threads; adapters are cheap
handles over it, hold no per-call state and are safe for concurrent use.

# Example

```
use dynjson::{JsonSerializer, Serializer, Value};

let serializer = JsonSerializer::<Value>::new();

let mut input = r#"{"name":"ok","tags":["x","y"],"n":3}"#.as_bytes();
let value = serializer.read_one(&mut input)?;
assert_eq!(value.get("name").and_then(Value::as_str), Some("ok"));

let mut out = Vec::new();
serializer.write_one(&mut out, &value)?;
assert_eq!(out, br#"{"name":"ok","tags":["x","y"],"n":3}"#);
# Ok::<(), Box<dyn std::error::Error>>(())
```

The token layer underneath is [struson](https://docs.rs/struson); this crate
never tokenizes JSON itself.
*/

pub mod config;
pub mod convert;
pub mod error;
pub mod json;
pub mod serializer;
pub mod token;
pub mod value;

pub use config::SerializerConfig;
pub use convert::{
    dynamic_map_converter, dynamic_value_converter, read_value, write_value, Converter,
};
pub use error::{ReadError, WriteError};
pub use json::{JsonTokenReader, JsonTokenWriter};
pub use serializer::{
    ArrayStrategy, Encoding, JsonSerializer, JsonSerializerFactory, Serializer,
};
pub use token::{Token, TokenBuffer, TokenRead, TokenWrite};
pub use value::{Map, Value};
