//! Dynamic destination for configs whose keys are not known up front.
//!
//! A [`Value`] starts out [`Value::Unset`] and turns into a
//! [`Value::Map`] the first time a line is decoded into it. Decoding into a
//! value that already holds a map adds to the same map; decoding into a
//! [`Value::String`] is a [`TypeConflict`](crate::Error::TypeConflict).
//!
//! ```rust
//! use serde_kvconf::{Decoder, Value};
//!
//! let mut value = Value::Unset;
//! Decoder::new("a = b\nc = d".as_bytes()).decode_into(&mut value).unwrap();
//!
//! assert!(value.is_map());
//! assert_eq!(value.get("a"), Some("b"));
//! assert_eq!(value.get("c"), Some("d"));
//! ```

use crate::KvMap;
use serde::de::{self, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// An open, dynamically shaped decode destination.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Value {
    /// Nothing decoded yet; encodes like an empty map.
    #[default]
    Unset,
    String(String),
    Map(KvMap),
}

impl Value {
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Value::Unset)
    }

    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&KvMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Returns the map held by this value, creating it if the value is unset.
    ///
    /// Returns `None` when the value holds a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::Value;
    ///
    /// let mut value = Value::Unset;
    /// value.get_or_insert_map().unwrap().insert("k".into(), "v".into());
    /// assert_eq!(value.get("k"), Some("v"));
    ///
    /// let mut value = Value::from("scalar");
    /// assert!(value.get_or_insert_map().is_none());
    /// ```
    pub fn get_or_insert_map(&mut self) -> Option<&mut KvMap> {
        if self.is_unset() {
            *self = Value::Map(KvMap::new());
        }
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Map(map) => {
                for (k, v) in map.iter() {
                    writeln!(f, "{}={}", k, v)?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Unset => serializer.serialize_map(Some(0))?.end(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or a map of strings")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Unset)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Unset)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut map = KvMap::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::custom("Value is not a string")),
        }
    }
}

impl TryFrom<Value> for KvMap {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Map(map) => Ok(map),
            _ => Err(crate::Error::custom("Value is not a map")),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<KvMap> for Value {
    fn from(value: KvMap) -> Self {
        Value::Map(value)
    }
}

impl From<HashMap<String, String>> for Value {
    fn from(value: HashMap<String, String>) -> Self {
        Value::Map(KvMap::from(value))
    }
}
