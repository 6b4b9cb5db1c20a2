//! Ordered string map backing dynamic values.
//!
//! [`KvMap`] wraps an [`IndexMap`] so entries come back out in the order the
//! lines were read, which keeps re-encoded dynamic configs stable and easy
//! to diff.
//!
//! ## Examples
//!
//! ```rust
//! use serde_kvconf::KvMap;
//!
//! let mut map = KvMap::new();
//! map.insert("host".to_string(), "localhost".to_string());
//! map.insert("port".to_string(), "8080".to_string());
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("port"), Some("8080"));
//! ```

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// An insertion-ordered map of string keys to string values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KvMap(IndexMap<String, String>);

impl KvMap {
    #[must_use]
    pub fn new() -> Self {
        KvMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        KvMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// An existing key keeps its position and gets the new value; the old
    /// value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_kvconf::KvMap;
    ///
    /// let mut map = KvMap::new();
    /// assert!(map.insert("key".to_string(), "a".to_string()).is_none());
    /// assert_eq!(map.insert("key".to_string(), "b".to_string()), Some("a".to_string()));
    /// ```
    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, String> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, String> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl From<HashMap<String, String>> for KvMap {
    fn from(map: HashMap<String, String>) -> Self {
        KvMap(map.into_iter().collect())
    }
}

impl From<KvMap> for HashMap<String, String> {
    fn from(map: KvMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for KvMap {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a KvMap {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, String)> for KvMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        KvMap(IndexMap::from_iter(iter))
    }
}

impl Serialize for KvMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KvMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KvMapVisitor;

        impl<'de> Visitor<'de> for KvMapVisitor {
            type Value = KvMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of strings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = KvMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(KvMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_overwrite() {
        let mut map = KvMap::new();
        map.insert("b".to_string(), "1".to_string());
        map.insert("a".to_string(), "2".to_string());
        map.insert("b".to_string(), "3".to_string());

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some("3"));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: KvMap = [("x", "1"), ("y", "2"), ("z", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(map.remove("y"), Some("2".to_string()));

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "z"]);
        assert!(!map.contains_key("y"));
    }

    #[test]
    fn test_hashmap_conversion() {
        let mut source = HashMap::new();
        source.insert("k".to_string(), "v".to_string());
        let map = KvMap::from(source.clone());
        let back: HashMap<String, String> = map.into();
        assert_eq!(back, source);
    }
}
