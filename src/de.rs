//! Decoding `key = value` text into Rust values.
//!
//! ## Overview
//!
//! The [`Decoder`] pulls [`LineRecord`]s from the [`parse`](crate::parse)
//! module and hands them to the destination's `Deserialize` impl:
//!
//! - **Structs** see each line as a field; keys without a matching field are
//!   ignored, and `#[serde(skip)]` fields are never matched
//! - **Maps** receive every line as an entry, keys and values converted with
//!   the same scalar rules
//! - **Dynamic** destinations ([`Value`], `serde_json::Value`, ...) become a
//!   map of strings to strings
//!
//! Scalars are parsed per primitive kind. A `Deserialize` impl that asks for
//! a string instead (see [`convert`](crate::convert)) gets the raw text, and
//! any error it raises is reported as
//! [`Error::CustomConversion`](crate::Error::CustomConversion) with the line
//! number.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_kvconf::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     #[serde(rename = "tls")]
//!     use_tls: bool,
//! }
//!
//! let text = "host = example.com\nport = 443 # https\ntls = true\nextra = ignored";
//! let server: Server = from_str(text).unwrap();
//! assert_eq!(server.port, 443);
//! assert!(server.use_tls);
//! ```

use crate::parse::{LineRecord, Lines};
use crate::{Error, Location, Result, ScalarKind, Value};
use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use std::io::BufRead;
use std::str::FromStr;

/// Reads `key = value` lines from a stream into a destination.
///
/// A decoder consumes its stream; build a new one for every input.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::Decoder;
/// use std::collections::HashMap;
///
/// let ports: HashMap<String, u16> = Decoder::new("http = 80\nhttps = 443".as_bytes())
///     .decode()
///     .unwrap();
/// assert_eq!(ports["https"], 443);
/// ```
pub struct Decoder<R> {
    lines: Lines<R>,
}

impl<R: BufRead> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Decoder {
            lines: Lines::new(reader),
        }
    }

    /// Decodes the whole stream into a new `T`.
    ///
    /// Lines are converted in order and the earliest failing line is the one
    /// reported. For structs, a line that a later line with the same key
    /// overrides is still converted, so a bad value there fails the call.
    ///
    /// # Errors
    ///
    /// Returns the first parse, conversion or I/O error encountered, or
    /// [`Error::InvalidTarget`] when `T` is neither a map, a struct nor a
    /// dynamic value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use serde_kvconf::{Decoder, Error};
    ///
    /// #[derive(Deserialize, Debug)]
    /// struct Server { port: u16 }
    ///
    /// let err = Decoder::new("port = http\nport = 80".as_bytes())
    ///     .decode::<Server>()
    ///     .unwrap_err();
    /// assert!(matches!(err, Error::PrimitiveParse { line: 1, .. }));
    /// ```
    pub fn decode<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut deserializer = Deserializer::from_lines(self.lines);
        let mut outcome = T::deserialize(&mut deserializer);
        if !deserializer.saw_struct {
            return outcome;
        }

        // one extra pass per repeat of the most repeated key
        for pass in 0..deserializer.depth().saturating_sub(1) {
            deserializer.pass = Some(pass);
            if let Err(err) = T::deserialize(&mut deserializer) {
                if reported_earlier(&err, &outcome) {
                    outcome = Err(err);
                }
            }
        }
        outcome
    }

    /// Decodes the whole stream into an existing dynamic destination.
    ///
    /// An unset destination becomes a map on the first line, an existing map
    /// is extended in place, and duplicate keys keep the last value. Lines
    /// decoded before an error stay in the destination.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConflict`] with the line number when the
    /// destination holds a string, plus any parse or I/O error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::{Decoder, Error, Value};
    ///
    /// let mut value = Value::from("not a map");
    /// let err = Decoder::new("\nkey = value".as_bytes())
    ///     .decode_into(&mut value)
    ///     .unwrap_err();
    /// assert!(matches!(err, Error::TypeConflict { line: 2 }));
    /// ```
    pub fn decode_into(self, dest: &mut Value) -> Result<()> {
        for record in self.lines {
            let record = record?;
            let map = dest
                .get_or_insert_map()
                .ok_or_else(|| Error::type_conflict(record.line))?;
            map.insert(record.key, record.value);
        }
        Ok(())
    }
}

fn reported_earlier<T>(err: &Error, outcome: &Result<T>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(current) => err.line().unwrap_or(usize::MAX) < current.line().unwrap_or(usize::MAX),
    }
}

/// The serde deserializer behind [`Decoder`].
///
/// The input is read up front, up to the first line that fails to parse.
/// The top level must be a map or a struct; every value below it is a
/// scalar. Maps see every line, structs see the last line of each key.
/// Only [`Decoder::decode`] also converts the lines a repeated key overrides.
pub struct Deserializer {
    records: Vec<LineRecord>,
    stop: Option<Error>,
    pass: Option<usize>,
    saw_struct: bool,
}

impl Deserializer {
    pub fn new<R: BufRead>(reader: R) -> Self {
        Self::from_lines(Lines::new(reader))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> Self {
        Self::new(input.as_bytes())
    }

    fn from_lines<R: BufRead>(lines: Lines<R>) -> Self {
        let mut records = Vec::new();
        let mut stop = None;
        for record in lines {
            match record {
                Ok(record) => records.push(record),
                Err(err) => {
                    stop = Some(err);
                    break;
                }
            }
        }

        Deserializer {
            records,
            stop,
            pass: None,
            saw_struct: false,
        }
    }

    fn lines_by_key(&self) -> IndexMap<&str, Vec<usize>> {
        let mut lines_by_key: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            lines_by_key
                .entry(record.key.as_str())
                .or_default()
                .push(idx);
        }
        lines_by_key
    }

    /// Largest number of lines sharing one key.
    fn depth(&self) -> usize {
        self.lines_by_key()
            .values()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// One record per key, in line order.
    ///
    /// With a pass set, the pass-th line of a repeated key is picked, falling
    /// back to its last line; otherwise the last line wins.
    fn struct_view(&self) -> Vec<&LineRecord> {
        let mut picked: Vec<usize> = Vec::new();
        for (key, idxs) in self.lines_by_key() {
            let last = idxs.len() - 1;
            let nth = match self.pass {
                Some(pass) => pass.min(last),
                None => {
                    if last > 0 {
                        tracing::debug!(key, lines = idxs.len(), "repeated key, last line wins");
                    }
                    last
                }
            };
            picked.extend(idxs.get(nth).copied());
        }
        picked.sort_unstable();
        picked.iter().filter_map(|idx| self.records.get(*idx)).collect()
    }

    /// Folds the error that cut the input short into a finished visit.
    ///
    /// A conversion error comes from an earlier line and is kept; a visit
    /// that succeeded, or only missed fields, reports the cut instead.
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        match (self.stop.take(), result) {
            (Some(stop), Ok(_)) | (Some(stop), Err(Error::Message(_))) => Err(stop),
            (_, result) => result,
        }
    }
}

macro_rules! invalid_target {
    ($($method:ident($($arg:ident: $ty:ty),*) => $what:expr;)*) => {
        $(
            fn $method<V>(self, $($arg: $ty,)* _visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                $(let _ = $arg;)*
                Err(Error::InvalidTarget(format!(
                    "cannot decode into {}, expected a map or a struct",
                    $what
                )))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let result = visitor.visit_map(RecordAccess::new(self.records.iter()));
        self.settle(result)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.saw_struct = true;
        let result = {
            let view = self.struct_view();
            visitor.visit_map(RecordAccess::new(view.into_iter()))
        };
        self.settle(result)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.stop.take() {
            Some(stop) => Err(stop),
            None => visitor.visit_unit(),
        }
    }

    invalid_target! {
        deserialize_bool() => "bool";
        deserialize_i8() => "i8";
        deserialize_i16() => "i16";
        deserialize_i32() => "i32";
        deserialize_i64() => "i64";
        deserialize_i128() => "i128";
        deserialize_u8() => "u8";
        deserialize_u16() => "u16";
        deserialize_u32() => "u32";
        deserialize_u64() => "u64";
        deserialize_u128() => "u128";
        deserialize_f32() => "f32";
        deserialize_f64() => "f64";
        deserialize_char() => "char";
        deserialize_str() => "a string";
        deserialize_string() => "a string";
        deserialize_bytes() => "bytes";
        deserialize_byte_buf() => "bytes";
        deserialize_unit() => "unit";
        deserialize_unit_struct(name: &'static str) => name;
        deserialize_seq() => "a sequence";
        deserialize_tuple(len: usize) => "a tuple";
        deserialize_tuple_struct(name: &'static str, len: usize) => name;
        deserialize_enum(name: &'static str, variants: &'static [&'static str]) => name;
        deserialize_identifier() => "an identifier";
    }
}

/// Feeds line records to a map or struct visitor.
struct RecordAccess<'r, I> {
    records: I,
    pending: Option<&'r LineRecord>,
}

impl<'r, I> RecordAccess<'r, I> {
    fn new(records: I) -> Self {
        RecordAccess {
            records,
            pending: None,
        }
    }
}

impl<'de, 'r, I> de::MapAccess<'de> for RecordAccess<'r, I>
where
    I: Iterator<Item = &'r LineRecord>,
{
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.records.next() {
            Some(record) => {
                let key = seed.deserialize(ScalarDeserializer::key(record))?;
                self.pending = Some(record);
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(record) => seed.deserialize(ScalarDeserializer::value(record)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

/// Converts one text value to whatever scalar the destination asks for.
#[derive(Clone, Copy)]
struct ScalarDeserializer<'a> {
    line: usize,
    key: &'a str,
    raw: &'a str,
}

impl<'a> ScalarDeserializer<'a> {
    fn key(record: &'a LineRecord) -> Self {
        ScalarDeserializer {
            line: record.line,
            key: &record.key,
            raw: &record.key,
        }
    }

    fn value(record: &'a LineRecord) -> Self {
        ScalarDeserializer {
            line: record.line,
            key: &record.key,
            raw: &record.value,
        }
    }

    fn parse<T: FromStr>(&self, kind: ScalarKind) -> Result<T> {
        self.raw
            .parse::<T>()
            .map_err(|_| Error::primitive_parse(kind, self.raw, self.line))
    }

    fn parse_bool(&self) -> Result<bool> {
        match self.raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(Error::primitive_parse(ScalarKind::Bool, self.raw, self.line)),
        }
    }

    fn parse_char(&self) -> Result<char> {
        let mut chars = self.raw.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(Error::primitive_parse(ScalarKind::Char, self.raw, self.line)),
        }
    }

    /// Errors raised by the visitor come from user code.
    fn located<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|err| err.locate(|| Location::Line(self.line)))
    }

    fn unsupported<T>(&self, what: &str) -> Result<T> {
        Err(Error::UnsupportedType(format!(
            "{} for key `{}` on line {}",
            what, self.key, self.line
        )))
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty, $kind:expr);)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let value = self.parse::<$ty>($kind)?;
                self.located(visitor.$visit(value))
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for ScalarDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.located(visitor.visit_str(self.raw))
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_bool()?;
        self.located(visitor.visit_bool(value))
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8(i8, ScalarKind::Int);
        deserialize_i16 => visit_i16(i16, ScalarKind::Int);
        deserialize_i32 => visit_i32(i32, ScalarKind::Int);
        deserialize_i64 => visit_i64(i64, ScalarKind::Int);
        deserialize_i128 => visit_i128(i128, ScalarKind::Int);
        deserialize_u8 => visit_u8(u8, ScalarKind::Uint);
        deserialize_u16 => visit_u16(u16, ScalarKind::Uint);
        deserialize_u32 => visit_u32(u32, ScalarKind::Uint);
        deserialize_u64 => visit_u64(u64, ScalarKind::Uint);
        deserialize_u128 => visit_u128(u128, ScalarKind::Uint);
        deserialize_f32 => visit_f32(f32, ScalarKind::Float);
        deserialize_f64 => visit_f64(f64, ScalarKind::Float);
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_char()?;
        self.located(visitor.visit_char(value))
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.located(visitor.visit_str(self.raw))
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.located(visitor.visit_str(self.raw))
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("bytes")
    }

    fn deserialize_byte_buf<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("bytes")
    }

    /// A present key is always `Some`, even with an empty value; only a
    /// missing key leaves the field `None`.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("unit")
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported(&format!("unit struct `{}`", name))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("sequence")
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("tuple")
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported(&format!("tuple struct `{}`", name))
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported("nested map")
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.unsupported(&format!("nested struct `{}`", name))
    }

    /// Only unit variants, spelled by name.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let variant: de::value::StrDeserializer<'_, Error> = self.raw.into_deserializer();
        self.located(visitor.visit_enum(variant))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.located(visitor.visit_str(self.raw))
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        tracing::trace!(line = self.line, key = %self.key, "no field for key, ignoring");
        visitor.visit_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};

    fn decode<T: DeserializeOwned>(input: &str) -> Result<T> {
        Decoder::new(input.as_bytes()).decode()
    }

    #[derive(Deserialize, Debug, PartialEq, Default)]
    #[serde(default)]
    struct Primitives {
        a: i32,
        b: u64,
        c: bool,
        d: f64,
        e: String,
        f: char,
        g: i128,
    }

    #[test]
    fn test_struct_primitives() {
        let input = "a = -1\nb = 2\nc = true\nd = 3.14\ne = abc\nf = x\ng = -170141183460469231731687303715884105728";
        let value: Primitives = decode(input).unwrap();
        assert_eq!(value.a, -1);
        assert_eq!(value.b, 2);
        assert!(value.c);
        assert_eq!(value.d, 3.14);
        assert_eq!(value.e, "abc");
        assert_eq!(value.f, 'x');
        assert_eq!(value.g, i128::MIN);
    }

    #[test]
    fn test_bool_aliases() {
        for (raw, expected) in [
            ("1", true),
            ("t", true),
            ("T", true),
            ("TRUE", true),
            ("True", true),
            ("0", false),
            ("f", false),
            ("F", false),
            ("FALSE", false),
            ("False", false),
        ] {
            let value: Primitives = decode(&format!("c = {}", raw)).unwrap();
            assert_eq!(value.c, expected, "alias {}", raw);
        }

        let err = decode::<Primitives>("c = yes").unwrap_err();
        assert!(matches!(
            err,
            Error::PrimitiveParse {
                kind: ScalarKind::Bool,
                line: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_integer_range_is_checked_per_width() {
        #[derive(Deserialize, Debug)]
        struct Narrow {
            #[allow(dead_code)]
            small: i8,
        }

        let err = decode::<Narrow>("small = 128").unwrap_err();
        match err {
            Error::PrimitiveParse { kind, raw, line } => {
                assert_eq!(kind, ScalarKind::Int);
                assert_eq!(raw, "128");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        let err = decode::<Primitives>("\nb = -2").unwrap_err();
        assert!(matches!(
            err,
            Error::PrimitiveParse {
                kind: ScalarKind::Uint,
                line: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_float_accepts_exponent() {
        let value: Primitives = decode("d = 1.5e3").unwrap();
        assert_eq!(value.d, 1500.0);
    }

    #[test]
    fn test_char_needs_exactly_one() {
        let err = decode::<Primitives>("f = xy").unwrap_err();
        assert!(matches!(
            err,
            Error::PrimitiveParse {
                kind: ScalarKind::Char,
                ..
            }
        ));
    }

    #[test]
    fn test_typed_maps() {
        let map: HashMap<String, u32> = decode("a = 1\nb = 2\na = 3").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 3);

        let map: BTreeMap<u16, bool> = decode("80 = true\n443 = false").unwrap();
        assert_eq!(map.get(&80), Some(&true));
        assert_eq!(map.get(&443), Some(&false));
    }

    #[test]
    fn test_map_key_parse_error_has_line() {
        let err = decode::<BTreeMap<u16, String>>("80 = a\nhttp = b").unwrap_err();
        assert!(matches!(
            err,
            Error::PrimitiveParse {
                kind: ScalarKind::Uint,
                line: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_struct_duplicate_key_last_wins() {
        let value: Primitives = decode("a = 1\ne = x\na = 2").unwrap();
        assert_eq!(value.a, 2);
        assert_eq!(value.e, "x");
    }

    #[test]
    fn test_option_fields() {
        #[derive(Deserialize, Debug, Default)]
        #[serde(default)]
        struct Opts {
            present: Option<u16>,
            empty: Option<u16>,
            missing: Option<u16>,
        }

        let value: Opts = decode("present = 8080").unwrap();
        assert_eq!(value.present, Some(8080));
        assert_eq!(value.empty, None);
        assert_eq!(value.missing, None);

        let err = decode::<Opts>("empty =").unwrap_err();
        assert!(matches!(
            err,
            Error::PrimitiveParse {
                kind: ScalarKind::Uint,
                line: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_value_is_some_empty_string() {
        #[derive(Deserialize, Debug, Default)]
        #[serde(default)]
        struct Proxy {
            user: Option<String>,
            pass: Option<String>,
        }

        let value: Proxy = decode("user =").unwrap();
        assert_eq!(value.user.as_deref(), Some(""));
        assert_eq!(value.pass, None);
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Listen {
        port: u16,
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_overridden_line_is_still_converted() {
        let err = decode::<Listen>("port = notanumber\nport = 80").unwrap_err();
        match err {
            Error::PrimitiveParse { kind, raw, line } => {
                assert_eq!(kind, ScalarKind::Uint);
                assert_eq!(raw, "notanumber");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let value: Listen = decode("port = 1\nname = a\nport = 2\nport = 3").unwrap();
        assert_eq!(value, Listen { port: 3, name: "a".to_string() });
    }

    #[test]
    fn test_overridden_line_error_beats_later_one() {
        let err = decode::<Listen>("port = 1\nport = x\nname = a\nport = y").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_conversion_error_before_malformed_line_wins() {
        let err = decode::<Listen>("port = notanumber\nbroken line\nname = x").unwrap_err();
        assert!(matches!(err, Error::PrimitiveParse { line: 1, .. }));

        let err = decode::<Listen>("port = 80\nbroken line\nname = x").unwrap_err();
        assert!(matches!(err, Error::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_malformed_line_beats_missing_field() {
        let err = decode::<Listen>("name = x\nbroken line\nport = 80").unwrap_err();
        assert!(matches!(err, Error::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_map_reports_earliest_error() {
        let err = decode::<HashMap<String, u16>>("a = x\nbroken").unwrap_err();
        assert!(matches!(err, Error::PrimitiveParse { line: 1, .. }));

        let err = decode::<HashMap<String, u16>>("a = 1\nbroken\nb = x").unwrap_err();
        assert!(matches!(err, Error::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_deserializer_alone_keeps_last_line() {
        let mut deserializer = Deserializer::from_str("port = nope\nport = 80");
        let value = Listen::deserialize(&mut deserializer).unwrap();
        assert_eq!(value.port, 80);
    }

    #[test]
    fn test_unit_enum_by_name() {
        #[derive(Deserialize, Debug, PartialEq)]
        #[serde(rename_all = "lowercase")]
        enum Level {
            Debug,
            Info,
        }

        #[derive(Deserialize, Debug)]
        struct Logging {
            level: Level,
        }

        let value: Logging = decode("level = info").unwrap();
        assert_eq!(value.level, Level::Info);

        let err = decode::<Logging>("level = loud").unwrap_err();
        assert!(matches!(
            err,
            Error::CustomConversion {
                location: Location::Line(1),
                ..
            }
        ));
    }

    #[test]
    fn test_newtype_is_transparent() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Port(u16);

        #[derive(Deserialize, Debug)]
        struct Server {
            port: Port,
        }

        let value: Server = decode("port = 22").unwrap();
        assert_eq!(value.port, Port(22));
    }

    #[test]
    fn test_nested_kinds_are_unsupported() {
        #[derive(Deserialize, Debug)]
        struct Tags {
            #[allow(dead_code)]
            tags: Vec<String>,
        }

        let err = decode::<Tags>("tags = a,b").unwrap_err();
        match err {
            Error::UnsupportedType(msg) => assert!(msg.contains("sequence"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_top_level_target() {
        let err = decode::<i32>("a = 1").unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));

        let err = decode::<Vec<String>>("a = 1").unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(_)));
    }

    #[test]
    fn test_decode_into_extends_existing_map() {
        let mut value = Value::Unset;
        Decoder::new("a = 1".as_bytes())
            .decode_into(&mut value)
            .unwrap();
        Decoder::new("b = 2\na = 3".as_bytes())
            .decode_into(&mut value)
            .unwrap();

        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some("3"));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn test_decode_into_string_with_empty_input_is_untouched() {
        let mut value = Value::from("scalar");
        Decoder::new("# nothing here\n".as_bytes())
            .decode_into(&mut value)
            .unwrap();
        assert_eq!(value.as_str(), Some("scalar"));
    }

    #[test]
    fn test_deserializer_from_str() {
        let mut deserializer = Deserializer::from_str("k = v");
        let value = Value::deserialize(&mut deserializer).unwrap();
        assert_eq!(value.get("k"), Some("v"));
    }
}
