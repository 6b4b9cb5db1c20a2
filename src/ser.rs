//! Encoding Rust values as `key = value` text.
//!
//! ## Overview
//!
//! The [`Encoder`] accepts a struct or a map at the top level and writes one
//! line per entry:
//!
//! - **Structs** are written in field declaration order; `#[serde(skip)]`
//!   fields never appear
//! - **Maps** are written in their own iteration order, which is unspecified
//!   for `HashMap`; sort first (or use a `BTreeMap`) for stable output
//! - `None` values are omitted
//!
//! Values must be scalars. A `Serialize` impl that produces a string (see
//! [`convert`](crate::convert)) overrides the primitive formatting, and an
//! error it raises is reported as
//! [`Error::CustomConversion`](crate::Error::CustomConversion) with the key.
//!
//! Strings are written verbatim. A value containing `#` or a newline will not
//! read back the same way.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_kvconf::to_string;
//!
//! #[derive(Serialize)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     #[serde(skip)]
//!     secret: String,
//! }
//!
//! let server = Server {
//!     host: "example.com".to_string(),
//!     port: 443,
//!     secret: "hunter2".to_string(),
//! };
//! assert_eq!(to_string(&server).unwrap(), "host=example.com\nport=443\n");
//! ```

use crate::{Error, KvOptions, Location, Result};
use serde::ser::{self, Impossible};
use serde::Serialize;
use std::io;

/// Writes values as `key = value` lines to a stream.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::{Encoder, KvOptions, LineEnding};
/// use std::collections::BTreeMap;
///
/// let mut ports = BTreeMap::new();
/// ports.insert("http", 80);
/// ports.insert("https", 443);
///
/// let options = KvOptions::new().with_line_ending(LineEnding::CrLf);
/// let mut encoder = Encoder::with_options(Vec::new(), options);
/// encoder.encode(&ports).unwrap();
///
/// assert_eq!(encoder.into_inner(), b"http=80\r\nhttps=443\r\n");
/// ```
pub struct Encoder<W> {
    writer: W,
    options: KvOptions,
}

impl<W: io::Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, KvOptions::default())
    }

    pub fn with_options(writer: W, options: KvOptions) -> Self {
        Encoder { writer, options }
    }

    /// Writes every entry of `value`.
    ///
    /// Lines are written as they are produced, so on error the stream holds
    /// the entries before the failing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] when `value` is not a struct or a
    /// map or holds a non-scalar, [`Error::CustomConversion`] when a custom
    /// converter fails, and [`Error::Io`] when writing fails.
    pub fn encode<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let mut serializer = Serializer::with_options(&mut self.writer, self.options.clone());
        value.serialize(&mut serializer)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// The serde serializer behind [`Encoder`].
pub struct Serializer<W> {
    writer: W,
    options: KvOptions,
}

impl<W: io::Write> Serializer<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, KvOptions::default())
    }

    pub fn with_options(writer: W, options: KvOptions) -> Self {
        Serializer { writer, options }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, key: &str, value: &str) -> Result<()> {
        write!(
            self.writer,
            "{}{}{}{}",
            key,
            self.options.separator(),
            value,
            self.options.line_ending.as_str()
        )?;
        Ok(())
    }

    fn write_entry<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let text = value.serialize(ScalarSerializer).map_err(|err| match err {
            Error::UnsupportedType(what) => {
                Error::UnsupportedType(format!("{} for key `{}`", what, key))
            }
            other => other.locate(|| Location::Key(key.to_string())),
        })?;

        match text {
            Some(text) => self.write_line(key, &text),
            None => {
                tracing::trace!(key, "omitting empty optional value");
                Ok(())
            }
        }
    }
}

fn unsupported_top_level<T>(what: &str) -> Result<T> {
    Err(Error::UnsupportedType(format!(
        "{} at the top level, expected a map or a struct",
        what
    )))
}

impl<'a, W: io::Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = MapSerializer<'a, W>;
    type SerializeStruct = StructSerializer<'a, W>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        unsupported_top_level("bool")
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        unsupported_top_level("i8")
    }

    fn serialize_i16(self, _v: i16) -> Result<()> {
        unsupported_top_level("i16")
    }

    fn serialize_i32(self, _v: i32) -> Result<()> {
        unsupported_top_level("i32")
    }

    fn serialize_i64(self, _v: i64) -> Result<()> {
        unsupported_top_level("i64")
    }

    fn serialize_u8(self, _v: u8) -> Result<()> {
        unsupported_top_level("u8")
    }

    fn serialize_u16(self, _v: u16) -> Result<()> {
        unsupported_top_level("u16")
    }

    fn serialize_u32(self, _v: u32) -> Result<()> {
        unsupported_top_level("u32")
    }

    fn serialize_u64(self, _v: u64) -> Result<()> {
        unsupported_top_level("u64")
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        unsupported_top_level("f32")
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        unsupported_top_level("f64")
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        unsupported_top_level("char")
    }

    fn serialize_str(self, _v: &str) -> Result<()> {
        unsupported_top_level("string")
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        unsupported_top_level("bytes")
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        unsupported_top_level("unit")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        unsupported_top_level(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        unsupported_top_level(name)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        unsupported_top_level(name)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        unsupported_top_level("sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        unsupported_top_level("tuple")
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        unsupported_top_level(name)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        unsupported_top_level(name)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer {
            ser: self,
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructSerializer { ser: self })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        unsupported_top_level(name)
    }
}

pub struct MapSerializer<'a, W> {
    ser: &'a mut Serializer<W>,
    current_key: Option<String>,
}

impl<'a, W: io::Write> ser::SerializeMap for MapSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(ScalarSerializer)? {
            Some(key) => {
                self.current_key = Some(key);
                Ok(())
            }
            None => Err(Error::unsupported_type("empty map key")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.ser.write_entry(&key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

pub struct StructSerializer<'a, W> {
    ser: &'a mut Serializer<W>,
}

impl<'a, W: io::Write> ser::SerializeStruct for StructSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.write_entry(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Formats a single value; `None` means the entry is left out.
struct ScalarSerializer;

fn unsupported_value<T>(what: &str) -> Result<T> {
    Err(Error::unsupported_type(what))
}

impl ser::Serializer for ScalarSerializer {
    type Ok = Option<String>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<String>, Error>;
    type SerializeTuple = Impossible<Option<String>, Error>;
    type SerializeTupleStruct = Impossible<Option<String>, Error>;
    type SerializeTupleVariant = Impossible<Option<String>, Error>;
    type SerializeMap = Impossible<Option<String>, Error>;
    type SerializeStruct = Impossible<Option<String>, Error>;
    type SerializeStructVariant = Impossible<Option<String>, Error>;

    fn serialize_bool(self, v: bool) -> Result<Option<String>> {
        Ok(Some(if v { "true" } else { "false" }.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Option<String>> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Option<String>> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Option<String>> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Option<String>> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Option<String>> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Option<String>> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    // Formatted at their own width so the shortest round-trip form is kept.
    fn serialize_f32(self, v: f32) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Option<String>> {
        Ok(Some(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Option<String>> {
        unsupported_value("bytes")
    }

    fn serialize_none(self) -> Result<Option<String>> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<String>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<String>> {
        unsupported_value("unit")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Option<String>> {
        unsupported_value(&format!("unit struct `{}`", name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<String>> {
        Ok(Some(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Option<String>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Option<String>>
    where
        T: ?Sized + Serialize,
    {
        unsupported_value(&format!("enum variant `{}::{}`", name, variant))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        unsupported_value("sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        unsupported_value("tuple")
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        unsupported_value(&format!("tuple struct `{}`", name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        unsupported_value(&format!("enum variant `{}::{}`", name, variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        unsupported_value("nested map")
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        unsupported_value(&format!("nested struct `{}`", name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        unsupported_value(&format!("enum variant `{}::{}`", name, variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineEnding;
    use std::collections::BTreeMap;

    fn encode<T: ?Sized + Serialize>(value: &T) -> Result<String> {
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode(value)?;
        Ok(String::from_utf8(encoder.into_inner()).unwrap())
    }

    #[derive(Serialize)]
    struct Primitives {
        a: i32,
        b: u32,
        c: bool,
        d: f64,
        e: String,
    }

    #[test]
    fn test_struct_field_order() {
        let value = Primitives {
            a: 1,
            b: 2,
            c: true,
            d: 3.14,
            e: "abc".to_string(),
        };
        assert_eq!(encode(&value).unwrap(), "a=1\nb=2\nc=true\nd=3.14\ne=abc\n");
    }

    #[test]
    fn test_float_formatting() {
        let mut map = BTreeMap::new();
        map.insert("a", 0.1f64 + 0.2);
        map.insert("b", 1e21);
        map.insert("c", -0.5);
        let text = encode(&map).unwrap();
        assert_eq!(text, "a=0.30000000000000004\nb=1000000000000000000000\nc=-0.5\n");

        let mut map = BTreeMap::new();
        map.insert("f", 3.14f32);
        assert_eq!(encode(&map).unwrap(), "f=3.14\n");
    }

    #[test]
    fn test_none_is_omitted() {
        #[derive(Serialize)]
        struct Opts {
            a: Option<u8>,
            b: Option<u8>,
        }

        let text = encode(&Opts { a: None, b: Some(7) }).unwrap();
        assert_eq!(text, "b=7\n");
    }

    #[test]
    fn test_unit_variant_and_newtype() {
        #[derive(Serialize)]
        #[serde(rename_all = "lowercase")]
        enum Level {
            Warn,
        }

        #[derive(Serialize)]
        struct Port(u16);

        #[derive(Serialize)]
        struct Cfg {
            level: Level,
            port: Port,
        }

        let text = encode(&Cfg {
            level: Level::Warn,
            port: Port(22),
        })
        .unwrap();
        assert_eq!(text, "level=warn\nport=22\n");
    }

    #[test]
    fn test_map_with_numeric_keys() {
        let mut map = BTreeMap::new();
        map.insert(80u16, "http");
        map.insert(443u16, "https");
        assert_eq!(encode(&map).unwrap(), "80=http\n443=https\n");
    }

    #[test]
    fn test_top_level_scalar_is_unsupported() {
        let err = encode(&1).unwrap_err();
        match err {
            Error::UnsupportedType(msg) => assert!(msg.starts_with("i32"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(encode(&vec![1, 2]), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_nested_value_is_unsupported_and_partial() {
        #[derive(Serialize)]
        struct Outer {
            name: String,
            tags: Vec<String>,
            after: u8,
        }

        let value = Outer {
            name: "x".to_string(),
            tags: vec!["a".to_string()],
            after: 1,
        };

        let mut encoder = Encoder::new(Vec::new());
        let err = encoder.encode(&value).unwrap_err();
        match err {
            Error::UnsupportedType(msg) => assert_eq!(msg, "sequence for key `tags`"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(encoder.into_inner(), b"name=x\n");
    }

    #[test]
    fn test_custom_serialize_error_carries_key() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: ser::Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
                Err(ser::Error::custom("cannot render"))
            }
        }

        #[derive(Serialize)]
        struct Cfg {
            broken: Broken,
        }

        let err = encode(&Cfg { broken: Broken }).unwrap_err();
        match err {
            Error::CustomConversion { location, cause } => {
                assert_eq!(location, Location::Key("broken".to_string()));
                assert_eq!(cause, "cannot render");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_options_apply() {
        let mut map = BTreeMap::new();
        map.insert("k", "v");

        let options = KvOptions::pretty().with_line_ending(LineEnding::CrLf);
        let mut encoder = Encoder::with_options(Vec::new(), options);
        encoder.encode(&map).unwrap();
        assert_eq!(encoder.into_inner(), b"k = v\r\n");
    }

    #[test]
    fn test_write_errors_propagate() {
        struct Full;

        impl io::Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut map = BTreeMap::new();
        map.insert("k", "v");
        let err = Encoder::new(Full).encode(&map).unwrap_err();
        match err {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::WriteZero),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
