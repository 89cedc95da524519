//! Raw input values and the flattening algorithm.
//!
//! Every value merged into a [`NamingStore`](crate::NamingStore) arrives as a
//! [`RawValue`] and is reduced to a single string by [`RawValue::flatten`]
//! before it is stored. Nothing but the flattened string is retained.
//!
//! # Separators
//!
//! The separator written between elements depends on the kind of the
//! immediately enclosing container, at every nesting level:
//!
//! | Container               | Separator |
//! |-------------------------|-----------|
//! | [`RawValue::Array`]     | `", "`    |
//! | [`RawValue::Sequence`]  | `","`     |
//! | [`RawValue::Bag`]       | `","`     |
//!
//! So `Array["p", Sequence["q", "r"]]` flattens to `"p, q,r"`.

use std::fmt;

use serde_json::Value;

/// Separator placed between the elements of an [`RawValue::Array`].
pub const ARRAY_SEPARATOR: &str = ", ";

/// Separator placed between the elements of any other sequence.
pub const SEQUENCE_SEPARATOR: &str = ",";

/// A value accepted at the merge boundary, before flattening.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// Absent value. Contributes nothing; a top-level `Null` skips the entry.
    Null,
    /// Text, appended verbatim with no quoting or escaping.
    Text(String),
    /// Fixed, indexable array. Elements are joined with `", "`.
    Array(Vec<RawValue>),
    /// Any other enumerable sequence. Elements are joined with `","`.
    Sequence(Vec<RawValue>),
    /// A nested property bag, flattened as the sequence of its values.
    Bag(PropertyBag),
    /// Any other scalar, rendered with its `Display` form.
    Scalar(Scalar),
}

/// Scalars that are neither text nor containers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Char(char),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Integer(v) => write!(f, "{v}"),
            Scalar::Unsigned(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Char(v) => write!(f, "{v}"),
        }
    }
}

impl RawValue {
    /// Build an [`RawValue::Array`] from anything convertible.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        RawValue::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a [`RawValue::Sequence`] from anything convertible.
    pub fn sequence<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        RawValue::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for [`RawValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Reduce this value to its single string representation.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut String) {
        match self {
            RawValue::Null => {}
            RawValue::Text(text) => out.push_str(text),
            RawValue::Array(items) => join_into(out, items.iter(), ARRAY_SEPARATOR),
            RawValue::Sequence(items) => join_into(out, items.iter(), SEQUENCE_SEPARATOR),
            RawValue::Bag(bag) => join_into(out, bag.values(), SEQUENCE_SEPARATOR),
            RawValue::Scalar(scalar) => out.push_str(&scalar.to_string()),
        }
    }
}

/// Appends each non-null element, preceded by `separator` unless it sits at
/// position zero of its container. A null at position zero therefore still
/// leaves the following element prefixed by the separator.
fn join_into<'a>(out: &mut String, items: impl Iterator<Item = &'a RawValue>, separator: &str) {
    for (index, item) in items.enumerate() {
        if item.is_null() {
            continue;
        }
        if index > 0 {
            out.push_str(separator);
        }
        item.flatten_into(out);
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<&String> for RawValue {
    fn from(value: &String) -> Self {
        RawValue::Text(value.clone())
    }
}

impl From<&RawValue> for RawValue {
    fn from(value: &RawValue) -> Self {
        value.clone()
    }
}

impl From<Scalar> for RawValue {
    fn from(value: Scalar) -> Self {
        RawValue::Scalar(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Scalar(Scalar::Bool(value))
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Scalar(Scalar::Integer(i64::from(value)))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Scalar(Scalar::Integer(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Scalar(Scalar::Unsigned(u64::from(value)))
    }
}

impl From<u64> for RawValue {
    fn from(value: u64) -> Self {
        RawValue::Scalar(Scalar::Unsigned(value))
    }
}

impl From<usize> for RawValue {
    fn from(value: usize) -> Self {
        RawValue::Scalar(Scalar::Unsigned(u64::try_from(value).unwrap_or(u64::MAX)))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Scalar(Scalar::Float(value))
    }
}

impl From<char> for RawValue {
    fn from(value: char) -> Self {
        RawValue::Scalar(Scalar::Char(value))
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

/// Fixed-size arrays flatten with the array separator.
impl<T: Into<RawValue>, const N: usize> From<[T; N]> for RawValue {
    fn from(items: [T; N]) -> Self {
        RawValue::array(items)
    }
}

/// Slices flatten with the array separator.
impl<T: Clone + Into<RawValue>> From<&[T]> for RawValue {
    fn from(items: &[T]) -> Self {
        RawValue::array(items.iter().cloned())
    }
}

/// Growable lists are sequences, not arrays, and use the `","` separator.
impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::sequence(items)
    }
}

impl From<PropertyBag> for RawValue {
    fn from(bag: PropertyBag) -> Self {
        RawValue::Bag(bag)
    }
}

/// JSON strings become text, JSON arrays become sequences and JSON objects
/// become bags, so a persisted document reads back unchanged.
impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Scalar(Scalar::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    RawValue::Scalar(Scalar::Unsigned(u))
                } else {
                    // Every non-integer serde_json number is representable as f64.
                    RawValue::Scalar(Scalar::Float(n.as_f64().unwrap_or_default()))
                }
            }
            Value::String(s) => RawValue::Text(s),
            Value::Array(items) => RawValue::sequence(items),
            Value::Object(map) => RawValue::Bag(map.into_iter().collect()),
        }
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        RawValue::from(value.clone())
    }
}

/// An ordered collection of name/value pairs.
///
/// Duplicate names are kept; the merge policy of the receiving store decides
/// which occurrence wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, RawValue)>,
}

impl PropertyBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a pair at the end of the bag.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &RawValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for PropertyBag {
    type Item = (String, RawValue);
    type IntoIter = std::vec::IntoIter<(String, RawValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
