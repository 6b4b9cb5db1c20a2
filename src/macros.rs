/// Builds a [`Value::Map`](crate::Value::Map) from `key => value` pairs.
///
/// Keys and values may be anything implementing `ToString`.
///
/// ```rust
/// use serde_kvconf::kv;
///
/// let value = kv! {
///     "host" => "localhost",
///     "port" => 8080,
/// };
/// assert_eq!(value.get("port"), Some("8080"));
/// ```
#[macro_export]
macro_rules! kv {
    () => {
        $crate::Value::Map($crate::KvMap::new())
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::KvMap::new();
        $(
            map.insert(::std::string::ToString::to_string(&$key), ::std::string::ToString::to_string(&$value));
        )+
        $crate::Value::Map(map)
    }};
}
