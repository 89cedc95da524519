//! JSON persistence for [`NamingStore`].
//!
//! The persisted form is a flat JSON object whose keys are the stored names
//! and whose values are the flattened strings, rendered with two-space
//! indentation and `\n` line endings on every platform:
//!
//! ```text
//! {
//!   "Host": "example.com",
//!   "Tags": "a, b, c"
//! }
//! ```
//!
//! Decoding walks the object's members in document order and merges them
//! with [`MergePolicy::Preserve`](crate::MergePolicy::Preserve): the first
//! occurrence of a duplicated name wins.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{NamingError, Result};
use crate::store::NamingStore;

/// Render a store as indented JSON text.
pub fn encode(store: &NamingStore) -> Result<String> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Parse JSON text into a store. A `null` document yields an empty store;
/// any other non-object root is [`NamingError::NotAnObject`], matching
/// [`NamingStore::from_json_value`].
pub fn decode(text: &str) -> Result<NamingStore> {
    let store: NamingStore = if text.trim_start().starts_with('{') {
        serde_json::from_str(text)?
    } else {
        NamingStore::from_json_value(&serde_json::from_str::<Value>(text)?)?
    };
    debug!(names = store.len(), "decoded naming store");
    Ok(store)
}

/// Parse JSON bytes into a store, with the same root rules as [`decode`].
pub fn decode_slice(bytes: &[u8]) -> Result<NamingStore> {
    if bytes.trim_ascii_start().starts_with(b"{") {
        Ok(serde_json::from_slice(bytes)?)
    } else {
        NamingStore::from_json_value(&serde_json::from_slice::<Value>(bytes)?)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl NamingStore {
    /// Create a store from a parsed JSON object, merging members in order
    /// without overwriting.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut store = Self::new();
        for (name, value) in object {
            store.try_add(name, value);
        }
        store
    }

    /// Create a store from a parsed JSON value. `null` yields an empty store;
    /// anything other than an object is rejected.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(object) => Ok(Self::from_json_object(object)),
            other => Err(NamingError::NotAnObject {
                kind: kind_of(other),
            }),
        }
    }

    /// Render the store as indented JSON text.
    pub fn to_json(&self) -> Result<String> {
        encode(self)
    }
}

impl Serialize for NamingStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct NamingStoreVisitor;

impl<'de> Visitor<'de> for NamingStoreVisitor {
    type Value = NamingStore;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object of names to values")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<NamingStore, E> {
        Ok(NamingStore::new())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<NamingStore, E> {
        Ok(NamingStore::new())
    }

    // Members arrive one by one, so duplicated names are still seen in
    // document order and the first one is kept.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<NamingStore, A::Error> {
        let mut store = NamingStore::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            store.try_add(&name, value);
        }
        Ok(store)
    }
}

impl<'de> Deserialize<'de> for NamingStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(NamingStoreVisitor)
    }
}

/// Indented JSON text, as produced by [`encode`].
impl fmt::Display for NamingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for NamingStore {
    type Err = NamingError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}
