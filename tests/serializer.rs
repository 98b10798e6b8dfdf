//! End-to-end behavior of the typed serializer adapter over JSON bytes.

use std::io::Cursor;

use dynjson::{
    Encoding, JsonSerializer, JsonSerializerFactory, Map, ReadError, Serializer, Value,
};
use serde::{Deserialize, Serialize};

fn read_value_bytes(json: &str) -> Result<Value, ReadError> {
    JsonSerializer::<Value>::new().read_one(&mut json.as_bytes())
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
struct Login {
    username: String,
    remember: bool,
    attempts: i64,
}

fn login() -> Login {
    Login {
        username: "johndoe@gmail.com".to_owned(),
        remember: true,
        attempts: 3,
    }
}

#[test]
fn reads_the_reference_document() {
    // {"name":"ok","tags":["x","y"],"n":3}
    let value = read_value_bytes(r#"{"name":"ok","tags":["x","y"],"n":3}"#).unwrap();

    let map = value.as_map().unwrap();
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["name", "tags", "n"]);
    assert_eq!(map["name"], Value::from("ok"));
    assert_eq!(
        map["tags"],
        Value::from(vec![Value::from("x"), Value::from("y")])
    );
    assert_eq!(map["n"], Value::Integer(3));

    // Writing the value back produces bytes that re-read to the same map.
    let serializer = JsonSerializer::<Value>::new();
    let mut out = Vec::new();
    serializer.write_one(&mut out, &value).unwrap();
    let again = serializer.read_one(&mut out.as_slice()).unwrap();
    assert_eq!(again, value);
}

#[test]
fn map_adapter_takes_the_converter_path() {
    let serializer = JsonSerializer::<Map>::new();
    let map = serializer
        .read_one(&mut r#"{"b":2,"a":1}"#.as_bytes())
        .unwrap();
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["b", "a"]);

    // A non-object root is not a mapping; the error names the offending
    // token.
    let err = serializer.read_one(&mut "[1,2]".as_bytes()).unwrap_err();
    assert!(matches!(err, ReadError::UnexpectedToken("begin-array")));
}

#[test]
fn typed_structs_take_the_serde_path() {
    let serializer = JsonSerializer::<Login>::new();

    let mut out = Vec::new();
    serializer.write_one(&mut out, &login()).unwrap();
    let read_back = serializer.read_one(&mut out.as_slice()).unwrap();
    assert_eq!(read_back, login());
}

#[test]
fn dynamic_fields_inside_typed_structs() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Envelope {
        kind: String,
        payload: Value,
    }

    let serializer = JsonSerializer::<Envelope>::new();
    let envelope = serializer
        .read_one(&mut r#"{"kind":"event","payload":{"z":1,"a":[null,true]}}"#.as_bytes())
        .unwrap();

    assert_eq!(envelope.kind, "event");
    let keys: Vec<&str> = envelope
        .payload
        .as_map()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["z", "a"]);

    let mut out = Vec::new();
    serializer.write_one(&mut out, &envelope).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        r#"{"kind":"event","payload":{"z":1,"a":[null,true]}}"#
    );
}

#[test]
fn byte_level_comments_are_tolerated() {
    let value = read_value_bytes(
        "// header\n{\"a\": /* inline */ 1, \"b\": [2, // trailing\n 3]}",
    )
    .unwrap();
    let plain = read_value_bytes(r#"{"a":1,"b":[2,3]}"#).unwrap();
    assert_eq!(value, plain);
}

#[test]
fn scalar_documents_pass_through() {
    assert_eq!(read_value_bytes("\"hello\"").unwrap(), Value::from("hello"));
    assert_eq!(read_value_bytes("42").unwrap(), Value::Integer(42));
    assert_eq!(read_value_bytes("true").unwrap(), Value::Bool(true));
    assert_eq!(read_value_bytes("null").unwrap(), Value::Null);
}

#[test]
fn truncated_bytes_fail_with_syntax_error() {
    for json in [r#"{"a":1"#, "[1,2", "}"] {
        let err = read_value_bytes(json).unwrap_err();
        assert!(matches!(err, ReadError::Syntax(_)), "input {json:?}");
    }
}

#[test]
fn read_one_into_overwrites_wholesale() {
    let serializer = JsonSerializer::<Login>::new();
    let mut slot = login();
    serializer
        .read_one_into(
            &mut r#"{"username":"other","remember":false,"attempts":0}"#.as_bytes(),
            &mut slot,
        )
        .unwrap();
    assert_eq!(
        slot,
        Login {
            username: "other".to_owned(),
            remember: false,
            attempts: 0,
        }
    );
}

#[test]
fn read_array_requires_a_strategy() {
    let serializer = JsonSerializer::<Login>::new();
    let err = serializer.read_array(&mut "[]".as_bytes()).unwrap_err();
    assert!(matches!(err, ReadError::NotSupported));

    let serializer =
        JsonSerializer::<Login>::new().with_array_strategy(|json| Ok(serde_json::from_str(json)?));
    let logins = serializer
        .read_array(&mut r#"[{"username":"a","remember":true,"attempts":1}]"#.as_bytes())
        .unwrap();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].username, "a");
}

#[test]
fn write_one_leaves_the_stream_open() {
    let serializer = JsonSerializer::<Value>::new();
    let mut stream = Cursor::new(Vec::new());

    serializer.write_one(&mut stream, &Value::from(1)).unwrap();
    serializer.write_one(&mut stream, &Value::from(2)).unwrap();

    assert_eq!(stream.into_inner(), b"12");
}

#[test]
fn utf16_documents_round_trip() {
    for encoding in [Encoding::Utf16Le, Encoding::Utf16Be] {
        let serializer = JsonSerializer::<Value>::new().encoding(encoding);
        let original = read_value_bytes(r#"{"greeting":"héllo","n":1}"#).unwrap();

        let mut out = Vec::new();
        serializer.write_one(&mut out, &original).unwrap();
        // Not valid UTF-8 on the wire.
        assert!(JsonSerializer::<Value>::new()
            .read_one(&mut out.as_slice())
            .is_err());

        let read_back = serializer.read_one(&mut out.as_slice()).unwrap();
        assert_eq!(read_back, original, "{}", encoding.name());
    }
}

#[test]
fn utf8_byte_order_mark_is_tolerated() {
    let serializer = JsonSerializer::<Value>::new();

    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(br#"{"a":1}"#);
    let value = serializer.read_one(&mut bytes.as_slice()).unwrap();
    assert_eq!(value, read_value_bytes(r#"{"a":1}"#).unwrap());

    // Inputs shorter than a BOM still read.
    assert_eq!(read_value_bytes("1").unwrap(), Value::Integer(1));
}

#[test]
fn non_utf8_writes_use_the_converter_registry() {
    use dynjson::{read_value, Converter, SerializerConfig, TokenWrite};
    use std::any::TypeId;
    use std::sync::Arc;

    // A converter that spells every dynamic value as a fixed string, so the
    // two write paths are distinguishable on the wire.
    let spelling = Converter {
        applies: |target| target == TypeId::of::<Value>(),
        read: |reader| Ok(Box::new(read_value(reader)?)),
        write: |_, writer| writer.string_value("converted"),
    };
    let config = Arc::new(SerializerConfig::with_converters(vec![spelling]));

    for encoding in [Encoding::Utf8, Encoding::Utf16Le, Encoding::Utf16Be] {
        let serializer =
            JsonSerializer::<Value>::with_config(config.clone()).encoding(encoding);
        let mut out = Vec::new();
        serializer.write_one(&mut out, &Value::from(1)).unwrap();
        assert_eq!(
            encoding.decode(&out).unwrap(),
            r#""converted""#,
            "{}",
            encoding.name()
        );
    }
}

#[test]
fn shared_factory_hands_out_working_adapters() {
    let factory = JsonSerializerFactory::shared();
    let serializer: JsonSerializer<Value> = factory.create();
    let value = serializer.read_one(&mut "[1]".as_bytes()).unwrap();
    assert_eq!(value, Value::from(vec![Value::from(1)]));

    // Adapters are plain values; sharing them across threads needs no locks.
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JsonSerializer<Value>>();
    assert_send_sync::<JsonSerializerFactory>();
}

#[test]
fn string_level_helpers_bypass_streams() {
    let serializer = JsonSerializer::<Login>::new();
    let json = serializer.value_to_json(&login()).unwrap();
    let read_back = serializer.item_from_json(&json).unwrap();
    assert_eq!(read_back, login());
}
