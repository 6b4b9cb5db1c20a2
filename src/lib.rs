//! # serde_kvconf
//!
//! A Serde-compatible codec for flat `key = value` configuration files.
//!
//! ## The Format
//!
//! ```text
//! # comments run from `#` to the end of the line
//! listen   = 8080
//! log_dir  = /var/log/app.log   # trailing comments too
//! dsn      = user=admin;db=main # only the first `=` separates
//! ```
//!
//! - Whitespace around keys and values is trimmed
//! - Blank lines are ignored
//! - A non-blank line without `=` is an error that names the line
//! - There is no quoting or escaping: `#` always starts a comment and values
//!   cannot span lines
//!
//! ## Key Features
//!
//! - **Serde Compatible**: decode into any `#[derive(Deserialize)]` struct or
//!   map, encode any `#[derive(Serialize)]` struct or map
//! - **Forward Compatible**: keys without a matching struct field are ignored
//! - **Custom Converters**: [`convert::UnmarshalKv`] / [`convert::MarshalKv`]
//!   override the built-in text form of a field
//! - **Dynamic Values**: [`Value`] collects arbitrary keys into a string map
//! - **Located Errors**: every input error carries its 1-based line number
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_kvconf::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     listen: u16,
//!     log_dir: String,
//!     #[serde(skip)]
//!     runtime_only: bool,
//! }
//!
//! let text = "
//!     ## trim the left space
//!     listen = 8080
//!     log_dir = /var/log/kvconf.log # trim this";
//!
//! let config: Config = from_str(text).unwrap();
//! assert_eq!(config.listen, 8080);
//! assert_eq!(config.log_dir, "/var/log/kvconf.log");
//!
//! assert_eq!(
//!     to_string(&config).unwrap(),
//!     "listen=8080\nlog_dir=/var/log/kvconf.log\n"
//! );
//! ```
//!
//! ## Record Fields
//!
//! - The key of a field is its Rust name, or the `#[serde(rename = "...")]`
//!   value, in both directions
//! - `#[serde(skip)]` excludes a field from decoding and encoding
//! - Fields missing from the input need `#[serde(default)]`
//! - A key repeated in the input keeps the value of its last line
//!
//! ## Limitations
//!
//! The key space is flat: nested structs, sequences and maps inside a record
//! are rejected with [`Error::UnsupportedType`] unless the field uses a
//! custom converter. Errors abort the call without rolling back what was
//! already written.

pub mod convert;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod parse;
pub mod ser;
pub mod value;

pub use de::{Decoder, Deserializer};
pub use error::{Error, Location, Result, ScalarKind};
pub use map::KvMap;
pub use options::{KvOptions, LineEnding};
pub use ser::{Encoder, Serializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize a struct or map to a `key = value` string.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x=1\ny=2\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a struct or map, holds a non-scalar
/// field, or a custom converter fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, KvOptions::default())
}

/// Serialize to a string with a space on each side of `=`.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::to_string_pretty;
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert("name", "demo");
/// assert_eq!(to_string_pretty(&map).unwrap(), "name = demo\n");
/// ```
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, KvOptions::pretty())
}

/// Serialize to a string with custom options.
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: KvOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut buffer = Vec::with_capacity(128);
    to_writer_with_options(&mut buffer, value, options)?;
    String::from_utf8(buffer).map_err(Error::custom)
}

/// Serialize a struct or map to a writer.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(buffer, b"x=1\ny=2\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, KvOptions::default())
}

/// Serialize a struct or map to a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: KvOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    Encoder::with_options(writer, options).encode(value)
}

/// Deserialize an instance of type `T` from `key = value` text.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if a line is malformed or a value cannot be converted to
/// its field's type. Error messages include the line number.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    Decoder::new(s.as_bytes()).decode()
}

/// Deserialize an instance of type `T` from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x = 1\ny = 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails (propagated as [`Error::Io`]), a line is
/// malformed, or a value cannot be converted.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    Decoder::new(io::BufReader::new(reader)).decode()
}

/// Deserialize an instance of type `T` from bytes of `key = value` text.
///
/// # Examples
///
/// ```rust
/// use serde_kvconf::from_slice;
/// use std::collections::HashMap;
///
/// let map: HashMap<String, String> = from_slice(b"a = b").unwrap();
/// assert_eq!(map["a"], "b");
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, a line is malformed, or
/// a value cannot be converted.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    Decoder::new(v).decode()
}
