//! Customization
//!
//! Buyers personalise a line with free-form option pairs (`Capacity: 500 Gram`,
//! `Print Colour: Gold`). Two lines describe the same thing only when they carry the
//! same option set, so the pairs are held in canonical form: keys and values are
//! trimmed, empty entries are dropped, and keys are kept sorted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical set of customization options for a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Customization {
    options: BTreeMap<String, String>,
}

impl Customization {
    /// Create an empty customization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a canonical customization from raw key/value pairs.
    ///
    /// When a key repeats, the last value wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let options = pairs
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.as_ref().trim();
                let value = value.as_ref().trim();

                (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect();

        Self { options }
    }

    /// Look up an option value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Iterate over options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether no options were chosen.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Customization {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self::from_pairs(value)
    }
}

impl From<Customization> for BTreeMap<String, String> {
    fn from(value: Customization) -> Self {
        value.options
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Customization {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_insertion_order() {
        let a = Customization::from_pairs([("Capacity", "50 Gram"), ("Lid", "Gold")]);
        let b = Customization::from_pairs([("Lid", "Gold"), ("Capacity", "50 Gram")]);

        assert_eq!(a, b);
    }

    #[test]
    fn different_values_are_distinct() {
        let a = Customization::from_pairs([("Capacity", "50 Gram")]);
        let b = Customization::from_pairs([("Capacity", "100 Gram")]);

        assert_ne!(a, b);
    }

    #[test]
    fn subset_is_distinct() {
        let a = Customization::from_pairs([("Capacity", "50 Gram")]);
        let b = Customization::from_pairs([("Capacity", "50 Gram"), ("Lid", "Gold")]);

        assert_ne!(a, b);
    }

    #[test]
    fn blank_entries_are_dropped_and_whitespace_trimmed() {
        let sparse = Customization::from_pairs([("Capacity", " 50 Gram "), ("Note", ""), ("", "x")]);

        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse.get("Capacity"), Some("50 Gram"));
        assert_eq!(sparse, Customization::from_pairs([("Capacity", "50 Gram")]));
    }

    #[test]
    fn iterates_in_sorted_key_order() {
        let customization = Customization::from_pairs([("b", "2"), ("a", "1"), ("c", "3")]);
        let keys: Vec<&str> = customization.iter().map(|(key, _)| key).collect();

        assert_eq!(keys, ["a", "b", "c"]);
    }
}
