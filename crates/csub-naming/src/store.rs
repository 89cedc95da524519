//! The case-insensitive naming store.
//!
//! [`NamingStore`] keeps entries in insertion order in a `Vec` and indexes
//! them by case-folded name. Lookups and merges go through the folded index,
//! while the stored key text keeps the case of the first insertion.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{NamingError, Result};
use crate::value::RawValue;

/// How a merge treats a name that is already present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Replace the existing value (the `insert` family).
    Overwrite,
    /// Keep the existing value (the `try_add` family).
    #[default]
    Preserve,
}

/// Result of merging a single entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddOutcome {
    /// The name was new and has been added.
    Added,
    /// The name existed and its value was replaced.
    Replaced,
    /// The name existed and its value was left untouched.
    Preserved,
    /// The entry had an empty name or a null value and was ignored.
    Skipped,
}

impl AddOutcome {
    /// Returns `true` if the entry was newly added.
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }

    /// Returns `true` if the entry collided with an existing name.
    pub fn is_collision(&self) -> bool {
        matches!(self, AddOutcome::Replaced | AddOutcome::Preserved)
    }
}

/// Folds a name to the form used for comparison.
///
/// Each character is mapped on its own, upper then lower, so forms that
/// `str::to_lowercase` would keep apart by context (final `ς` vs `σ`) meet.
fn fold_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
        .collect()
}

/// A mapping from names to flattened string values with case-insensitive
/// name comparison.
///
/// Entries are never removed. Iteration and serialization follow insertion
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamingStore {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl NamingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from `entries`. The first occurrence of a name
    /// wins; later duplicates are dropped.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let mut store = Self::new();
        store.try_add_all(entries);
        store
    }

    /// Create a store seeded from another store.
    pub fn from_store(other: &NamingStore) -> Self {
        let mut store = Self::new();
        store.try_add_store(other);
        store
    }

    /// Adopt a case-sensitive mapping, collapsing names that differ only by
    /// case onto the first one seen.
    fn normalized<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut store = Self::new();
        let mut collapsed = 0usize;
        for (name, value) in entries {
            if store.merge_entry(MergePolicy::Preserve, &name, value).is_collision() {
                collapsed += 1;
            }
        }
        if collapsed > 0 {
            debug!(collapsed, "case-insensitive normalization collapsed names");
        }
        store
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Number of names in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive membership test.
    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(&fold_name(name))
    }

    /// The value stored for `name`.
    ///
    /// Returns [`NamingError::KeyNotFound`] when the name is absent; use
    /// [`try_get`](Self::try_get) when absence is expected.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.try_get(name).ok_or_else(|| NamingError::KeyNotFound {
            name: name.to_string(),
        })
    }

    /// The value stored for `name`, or `None` when absent.
    pub fn try_get(&self, name: &str) -> Option<&str> {
        self.index
            .get(&fold_name(name))
            .map(|&slot| self.entries[slot].1.as_str())
    }

    /// Iterate `(name, value)` pairs in insertion order, with names as stored.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Stored names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Copy the store into a plain string-to-string map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries.iter().cloned().collect()
    }

    /// Copy an optional store into a plain map; a missing store yields an
    /// empty map.
    pub fn map_or_empty(store: Option<&NamingStore>) -> HashMap<String, String> {
        store.map(NamingStore::to_map).unwrap_or_default()
    }

    // ---------------------------------------------------------------
    // Merging
    // ---------------------------------------------------------------

    /// Flatten `value` and merge it under `name` using `policy`.
    pub fn merge_entry(
        &mut self,
        policy: MergePolicy,
        name: &str,
        value: impl Into<RawValue>,
    ) -> AddOutcome {
        let value = value.into();
        if name.is_empty() || value.is_null() {
            trace!(name, "skipping entry with empty name or null value");
            return AddOutcome::Skipped;
        }

        let flattened = value.flatten();
        let folded = fold_name(name);
        match self.index.get(&folded) {
            Some(&slot) => match policy {
                MergePolicy::Overwrite => {
                    self.entries[slot].1 = flattened;
                    AddOutcome::Replaced
                }
                MergePolicy::Preserve => {
                    trace!(name, existing = %self.entries[slot].0, "name already present, keeping value");
                    AddOutcome::Preserved
                }
            },
            None => {
                self.index.insert(folded, self.entries.len());
                self.entries.push((name.to_string(), flattened));
                AddOutcome::Added
            }
        }
    }

    /// Merge every entry using `policy`.
    ///
    /// Returns `true` only if no entry collided with an existing name. Every
    /// entry is attempted regardless of earlier collisions. Skipped entries
    /// do not count either way, so an empty source returns `true`.
    pub fn merge_all<I, K, V>(&mut self, policy: MergePolicy, entries: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let mut is_unique = true;
        for (name, value) in entries {
            let outcome = self.merge_entry(policy, name.as_ref(), value);
            is_unique = !outcome.is_collision() && is_unique;
        }
        is_unique
    }

    /// Insert a single entry, replacing any existing value.
    pub fn insert(&mut self, name: &str, value: impl Into<RawValue>) {
        self.merge_entry(MergePolicy::Overwrite, name, value);
    }

    /// Insert every entry, replacing existing values.
    ///
    /// Accepts property bags, string-keyed maps to strings or to
    /// [`RawValue`]s, and any other iterable of name/value pairs.
    pub fn insert_all<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        self.merge_all(MergePolicy::Overwrite, entries);
    }

    /// Insert every entry of another store, replacing existing values.
    pub fn insert_store(&mut self, other: &NamingStore) {
        self.insert_all(other.iter());
    }

    /// Add a single entry unless its name is already present.
    ///
    /// Returns `true` only if the entry was newly added.
    pub fn try_add(&mut self, name: &str, value: impl Into<RawValue>) -> bool {
        self.merge_entry(MergePolicy::Preserve, name, value).is_added()
    }

    /// Add every entry whose name is not already present.
    ///
    /// Returns `true` only if every entry was new. Non-colliding entries are
    /// merged even when the call returns `false`.
    pub fn try_add_all<I, K, V>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        self.merge_all(MergePolicy::Preserve, entries)
    }

    /// Add every entry of another store whose name is not already present.
    pub fn try_add_store(&mut self, other: &NamingStore) -> bool {
        self.try_add_all(other.iter())
    }
}

impl<K: AsRef<str>, V: Into<RawValue>> FromIterator<(K, V)> for NamingStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<K: AsRef<str>, V: Into<RawValue>> Extend<(K, V)> for NamingStore {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

/// Adopts a case-sensitive map. Names differing only by case collapse onto
/// whichever the map yields first.
impl From<HashMap<String, String>> for NamingStore {
    fn from(map: HashMap<String, String>) -> Self {
        Self::normalized(map)
    }
}

/// Adopts a case-sensitive map. Names differing only by case collapse onto
/// the first in sorted order.
impl From<BTreeMap<String, String>> for NamingStore {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::normalized(map)
    }
}

impl From<&NamingStore> for HashMap<String, String> {
    fn from(store: &NamingStore) -> Self {
        store.to_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PropertyBag;

    // ---- Lookup ----

    #[test]
    fn lookups_ignore_case() {
        let mut store = NamingStore::new();
        store.insert("Host", "example.com");

        assert!(store.contains_key("host"));
        assert!(store.contains_key("HOST"));
        assert_eq!(store.get("hOsT").unwrap(), "example.com");
        assert_eq!(store.try_get("host"), Some("example.com"));
    }

    #[test]
    fn greek_sigma_forms_are_one_name() {
        let mut store = NamingStore::new();
        store.insert("ΟΔΟΣ", "v");

        assert!(store.contains_key("ΟΔΟΣ"));
        assert!(store.contains_key("οδοσ"));
        assert!(store.contains_key("οδος"));
        assert!(!store.try_add("οδος", "w"));
        assert_eq!(store.get("οδοσ").unwrap(), "v");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn non_ascii_letters_ignore_case() {
        let mut store = NamingStore::new();
        store.insert("Straße", "1");
        store.insert("ÄRGER", "2");
        store.insert("Привет", "3");

        assert_eq!(store.get("STRASSE").unwrap(), "1");
        assert_eq!(store.get("ärger").unwrap(), "2");
        assert_eq!(store.get("пРИВЕТ").unwrap(), "3");
    }

    #[test]
    fn get_absent_is_key_not_found() {
        let store = NamingStore::new();
        let err = store.get("missing").unwrap_err();
        assert!(
            matches!(err, NamingError::KeyNotFound { ref name } if name == "missing"),
            "expected KeyNotFound, got: {err}"
        );
    }

    #[test]
    fn try_get_absent_is_none() {
        let store = NamingStore::new();
        assert_eq!(store.try_get("missing"), None);
        assert!(!store.contains_key("missing"));
    }

    // ---- Insert ----

    #[test]
    fn insert_overwrites() {
        let mut store = NamingStore::new();
        store.insert("k", "a");
        store.insert("k", "b");
        assert_eq!(store.get("k").unwrap(), "b");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn overwrite_keeps_original_key_case() {
        let mut store = NamingStore::new();
        store.insert("Host", "a");
        store.insert("HOST", "b");
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["Host"]);
        assert_eq!(store.get("host").unwrap(), "b");
    }

    #[test]
    fn insert_skips_null_value_and_empty_name() {
        let mut store = NamingStore::new();
        store.insert("k", RawValue::Null);
        store.insert("", "v");
        store.insert("n", None::<String>);
        assert!(store.is_empty());
    }

    #[test]
    fn insert_null_does_not_clear_existing() {
        let mut store = NamingStore::new();
        store.insert("k", "a");
        store.insert("k", RawValue::Null);
        assert_eq!(store.get("k").unwrap(), "a");
    }

    #[test]
    fn insert_flattens_values() {
        let mut store = NamingStore::new();
        store.insert("array", ["x", "y", "z"]);
        store.insert("sequence", vec!["x", "y", "z"]);
        store.insert(
            "nested",
            RawValue::Array(vec![RawValue::from("p"), RawValue::sequence(["q", "r"])]),
        );
        store.insert("port", 8080);

        assert_eq!(store.get("array").unwrap(), "x, y, z");
        assert_eq!(store.get("sequence").unwrap(), "x,y,z");
        assert_eq!(store.get("nested").unwrap(), "p, q,r");
        assert_eq!(store.get("port").unwrap(), "8080");
    }

    #[test]
    fn insert_all_accepts_string_and_raw_maps() {
        let mut strings = HashMap::new();
        strings.insert("a".to_string(), "1".to_string());
        let mut raws: HashMap<String, RawValue> = HashMap::new();
        raws.insert("A".to_string(), RawValue::array(["2", "3"]));
        raws.insert("b".to_string(), RawValue::Null);

        let mut store = NamingStore::new();
        store.insert_all(&strings);
        store.insert_all(raws);

        assert_eq!(store.get("a").unwrap(), "2, 3");
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn insert_all_from_bag_last_duplicate_wins() {
        let bag = PropertyBag::new().with("k", "first").with("K", "second");
        let mut store = NamingStore::new();
        store.insert_all(bag);
        assert_eq!(store.get("k").unwrap(), "second");
    }

    #[test]
    fn insert_store_overwrites() {
        let mut base = NamingStore::from_entries([("a", "1"), ("b", "2")]);
        let other = NamingStore::from_entries([("B", "20"), ("c", "30")]);
        base.insert_store(&other);

        assert_eq!(base.get("b").unwrap(), "20");
        assert_eq!(base.get("c").unwrap(), "30");
        assert_eq!(base.len(), 3);
    }

    // ---- TryAdd ----

    #[test]
    fn try_add_preserves() {
        let mut store = NamingStore::new();
        assert!(store.try_add("k", "a"));
        assert!(!store.try_add("K", "b"));
        assert_eq!(store.get("k").unwrap(), "a");
    }

    #[test]
    fn batch_with_one_collision_returns_false_and_merges_rest() {
        let mut store = NamingStore::new();
        store.insert("b", "existing");

        let bag = PropertyBag::new()
            .with("a", "1")
            .with("B", "2")
            .with("c", "3");
        assert!(!store.try_add_all(bag));

        assert_eq!(store.get("a").unwrap(), "1");
        assert_eq!(store.get("b").unwrap(), "existing");
        assert_eq!(store.get("c").unwrap(), "3");
    }

    #[test]
    fn collision_early_in_batch_does_not_stop_later_entries() {
        let mut store = NamingStore::from_entries([("a", "0")]);
        let unique = store.try_add_all([("a", "1"), ("b", "2"), ("c", "3")]);
        assert!(!unique);
        assert!(store.contains_key("b"));
        assert!(store.contains_key("c"));
    }

    #[test]
    fn try_add_empty_source_is_vacuously_unique() {
        let mut store = NamingStore::from_entries([("a", "1")]);
        assert!(store.try_add_all(PropertyBag::new()));
        assert!(store.try_add_all(HashMap::<String, String>::new()));
        assert!(store.try_add_store(&NamingStore::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn skipped_entries_do_not_affect_batch_result() {
        let mut store = NamingStore::new();
        let bag = PropertyBag::new()
            .with("", "ignored")
            .with("a", RawValue::Null)
            .with("b", "1");
        assert!(store.try_add_all(bag));
        assert_eq!(store.len(), 1);
        assert!(!store.try_add("c", RawValue::Null));
    }

    #[test]
    fn try_add_store_reports_collisions() {
        let mut store = NamingStore::from_entries([("a", "1")]);
        let other = NamingStore::from_entries([("A", "x"), ("b", "2")]);
        assert!(!store.try_add_store(&other));
        assert_eq!(store.get("a").unwrap(), "1");
        assert_eq!(store.get("b").unwrap(), "2");
    }

    #[test]
    fn merge_entry_outcomes() {
        let mut store = NamingStore::new();
        assert_eq!(store.merge_entry(MergePolicy::Preserve, "a", "1"), AddOutcome::Added);
        assert_eq!(store.merge_entry(MergePolicy::Preserve, "A", "2"), AddOutcome::Preserved);
        assert_eq!(store.merge_entry(MergePolicy::Overwrite, "a", "3"), AddOutcome::Replaced);
        assert_eq!(store.merge_entry(MergePolicy::Overwrite, "", "4"), AddOutcome::Skipped);
        assert_eq!(store.get("a").unwrap(), "3");
    }

    // ---- Construction ----

    #[test]
    fn seeded_construction_first_occurrence_wins() {
        let store = NamingStore::from_entries(vec![("Name", "first"), ("name", "second")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("NAME").unwrap(), "first");
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["Name"]);
    }

    #[test]
    fn from_store_copies_entries() {
        let original = NamingStore::from_entries([("Host", "h"), ("Port", "1")]);
        let copy = NamingStore::from_store(&original);
        assert_eq!(copy, original);
    }

    #[test]
    fn adopting_case_sensitive_map_normalizes_once() {
        let mut map = BTreeMap::new();
        map.insert("HOST".to_string(), "upper".to_string());
        map.insert("host".to_string(), "lower".to_string());
        map.insert("Port".to_string(), "80".to_string());

        let store = NamingStore::from(map);
        assert_eq!(store.len(), 2);
        // "HOST" sorts before "host".
        assert_eq!(store.get("Host").unwrap(), "upper");
        assert!(store.contains_key("port"));
        assert!(store.contains_key("PORT"));
    }

    #[test]
    fn adopting_hash_map_is_case_insensitive() {
        let mut map = HashMap::new();
        map.insert("Key".to_string(), "v".to_string());
        let store = NamingStore::from(map);
        assert!(store.contains_key("key"));
        assert!(store.contains_key("KEY"));
    }

    #[test]
    fn collect_and_extend() {
        let mut store: NamingStore = vec![("a", "1"), ("A", "2")].into_iter().collect();
        assert_eq!(store.get("a").unwrap(), "1");

        store.extend([("a", "3")]);
        assert_eq!(store.get("a").unwrap(), "3");
    }

    // ---- Conversion view ----

    #[test]
    fn to_map_snapshot() {
        let mut store = NamingStore::from_entries([("Host", "h")]);
        let map = store.to_map();
        store.insert("Other", "o");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Host").map(String::as_str), Some("h"));
    }

    #[test]
    fn missing_store_converts_to_empty_map() {
        assert!(NamingStore::map_or_empty(None).is_empty());

        let store = NamingStore::from_entries([("a", "1")]);
        assert_eq!(NamingStore::map_or_empty(Some(&store)).len(), 1);

        let map: HashMap<String, String> = (&store).into();
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let store = NamingStore::from_entries([("z", "1"), ("a", "2"), ("m", "3")]);
        let pairs: Vec<(&str, &str)> = store.iter().collect();
        assert_eq!(pairs, vec![("z", "1"), ("a", "2"), ("m", "3")]);
    }
}
