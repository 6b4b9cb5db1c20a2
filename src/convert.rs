//! Custom value converters.
//!
//! A field type can take over its own text form by implementing
//! [`UnmarshalKv`] (decode) and/or [`MarshalKv`] (encode), then opting in on
//! the field with `#[serde(with = "serde_kvconf::convert")]`. The converter
//! always wins over the built-in primitive handling, even when the type wraps
//! a primitive.
//!
//! Encoding only needs a shared reference, so `MarshalKv` takes `&self`.
//! Decoding writes into the field, so `UnmarshalKv` takes `&mut self` and
//! starts from `Default::default()`. Both traits are also implemented for
//! references and boxes of implementing types.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_kvconf::convert::{MarshalKv, UnmarshalKv};
//! use serde_kvconf::{from_str, to_string};
//! use std::num::ParseIntError;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Percent(u8);
//!
//! impl UnmarshalKv for Percent {
//!     type Error = ParseIntError;
//!
//!     fn unmarshal_kv(&mut self, raw: &str) -> Result<(), Self::Error> {
//!         self.0 = raw.trim_end_matches('%').parse()?;
//!         Ok(())
//!     }
//! }
//!
//! impl MarshalKv for Percent {
//!     type Error = std::convert::Infallible;
//!
//!     fn marshal_kv(&self) -> Result<String, Self::Error> {
//!         Ok(format!("{}%", self.0))
//!     }
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Limits {
//!     #[serde(with = "serde_kvconf::convert")]
//!     cpu: Percent,
//! }
//!
//! let limits: Limits = from_str("cpu = 75%").unwrap();
//! assert_eq!(limits.cpu, Percent(75));
//! assert_eq!(to_string(&limits).unwrap(), "cpu=75%\n");
//! ```

use serde::{de, ser};
use std::fmt;
use std::marker::PhantomData;

/// Decodes a value in place from its raw text.
pub trait UnmarshalKv {
    type Error: fmt::Display;

    fn unmarshal_kv(&mut self, raw: &str) -> Result<(), Self::Error>;
}

/// Renders a value as its raw text.
pub trait MarshalKv {
    type Error: fmt::Display;

    fn marshal_kv(&self) -> Result<String, Self::Error>;
}

impl<T: UnmarshalKv + ?Sized> UnmarshalKv for &mut T {
    type Error = T::Error;

    fn unmarshal_kv(&mut self, raw: &str) -> Result<(), Self::Error> {
        (**self).unmarshal_kv(raw)
    }
}

impl<T: UnmarshalKv + ?Sized> UnmarshalKv for Box<T> {
    type Error = T::Error;

    fn unmarshal_kv(&mut self, raw: &str) -> Result<(), Self::Error> {
        (**self).unmarshal_kv(raw)
    }
}

impl<T: MarshalKv + ?Sized> MarshalKv for &T {
    type Error = T::Error;

    fn marshal_kv(&self) -> Result<String, Self::Error> {
        (**self).marshal_kv()
    }
}

impl<T: MarshalKv + ?Sized> MarshalKv for &mut T {
    type Error = T::Error;

    fn marshal_kv(&self) -> Result<String, Self::Error> {
        (**self).marshal_kv()
    }
}

impl<T: MarshalKv + ?Sized> MarshalKv for Box<T> {
    type Error = T::Error;

    fn marshal_kv(&self) -> Result<String, Self::Error> {
        (**self).marshal_kv()
    }
}

/// Serializes a field through its [`MarshalKv`] impl.
///
/// Use through `#[serde(with = "serde_kvconf::convert")]` or
/// `#[serde(serialize_with = "serde_kvconf::convert::serialize")]`.
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: MarshalKv + ?Sized,
    S: ser::Serializer,
{
    let text = value
        .marshal_kv()
        .map_err(<S::Error as ser::Error>::custom)?;
    serializer.serialize_str(&text)
}

/// Deserializes a field through its [`UnmarshalKv`] impl.
///
/// Use through `#[serde(with = "serde_kvconf::convert")]` or
/// `#[serde(deserialize_with = "serde_kvconf::convert::deserialize")]`.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: UnmarshalKv + Default,
    D: de::Deserializer<'de>,
{
    struct RawVisitor<T>(PhantomData<T>);

    impl<'de, T> de::Visitor<'de> for RawVisitor<T>
    where
        T: UnmarshalKv + Default,
    {
        type Value = T;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a raw text value")
        }

        fn visit_str<E>(self, raw: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let mut value = T::default();
            value.unmarshal_kv(raw).map_err(E::custom)?;
            Ok(value)
        }
    }

    deserializer.deserialize_str(RawVisitor(PhantomData))
}
