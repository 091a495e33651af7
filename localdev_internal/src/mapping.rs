//! The URL matcher.
//!
//! A [`MappingTable`] maps production URL prefixes to local development URL prefixes.
//! Keys are prefixes, not full URLs: everything after the matched key is carried over
//! to the local side, so query strings, fragments and deeper paths survive the rewrite.
//!
//! # Matching order
//!
//! 1. A key equal to the whole URL wins outright and its value is returned unchanged.
//! 2. Otherwise the first key, in insertion order, that is a prefix of the URL wins.
//! 3. Otherwise there is no rewrite.
//!
//! ```
//! use localdev_internal::mapping::MappingTable;
//!
//! let mut table = MappingTable::new();
//! table.insert("https://ext.azurestaticapps.net/", "http://localhost:3000/");
//!
//! assert_eq!(
//!     table.resolve("https://ext.azurestaticapps.net/app?x=1").as_deref(),
//!     Some("http://localhost:3000/app?x=1"),
//! );
//! assert_eq!(table.resolve("https://elsewhere.example/"), None);
//! ```
//!
//! Insertion order is a foot-gun when one key is a prefix of another: the shorter key
//! shadows the longer one whenever it was inserted first.  [`MappingTable::shadowed`]
//! reports those pairs, and [`MappingTable::conflicts`] reports entries whose local URL
//! would itself be rewritten again.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered production-prefix to local-prefix table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    entries: IndexMap<String, String>,
}

/// An entry whose local URL the table would rewrite again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub production: String,
    pub local: String,
    /// The key that matches `local`.
    pub rematched_by: String,
}

/// A later entry that an earlier, shorter key hides for every non-exact URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    pub earlier: String,
    pub later: String,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites one entry.
    ///
    /// Overwriting keeps the entry's original position.  Returns the previous local URL.
    pub fn insert(
        &mut self,
        production: impl Into<String>,
        local: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(production.into(), local.into())
    }

    /// Removes one entry, preserving the order of the rest.
    pub fn remove(&mut self, production: &str) -> Option<String> {
        self.entries.shift_remove(production)
    }

    pub fn get(&self, production: &str) -> Option<&str> {
        self.entries.get(production).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in match order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolves `url` to its local replacement, if any entry applies.
    pub fn resolve(&self, url: &str) -> Option<String> {
        if let Some(local) = self.entries.get(url) {
            return Some(local.clone());
        }
        self.entries.iter().find_map(|(production, local)| {
            url.strip_prefix(production.as_str())
                .map(|remainder| format!("{local}{remainder}"))
        })
    }

    /// Entries whose local URL would match some production key.
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.entries
            .iter()
            .filter_map(|(production, local)| {
                self.key_for(local).map(|key| Conflict {
                    production: production.clone(),
                    local: local.clone(),
                    rematched_by: key.to_string(),
                })
            })
            .collect()
    }

    /// Pairs where an earlier key is a strict prefix of a later one.
    pub fn shadowed(&self) -> Vec<Shadowed> {
        let keys: Vec<&String> = self.entries.keys().collect();
        let mut found = Vec::new();
        for (i, earlier) in keys.iter().enumerate() {
            for later in &keys[i + 1..] {
                if later.len() > earlier.len() && later.starts_with(earlier.as_str()) {
                    found.push(Shadowed {
                        earlier: (*earlier).clone(),
                        later: (*later).clone(),
                    });
                }
            }
        }
        found
    }

    /// The key [`resolve`](Self::resolve) would use for `url`.
    pub fn key_for(&self, url: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(url) {
            return Some(key.as_str());
        }
        self.entries
            .keys()
            .find(|production| url.starts_with(production.as_str()))
            .map(String::as_str)
    }
}

impl<P: Into<String>, L: Into<String>> FromIterator<(P, L)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (P, L)>>(iter: I) -> Self {
        let mut table = MappingTable::new();
        for (production, local) in iter {
            table.insert(production, local);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MappingTable {
        MappingTable::from_iter([
            ("https://ext.azurestaticapps.net/", "http://localhost:3000/"),
            ("https://another.azurewebsites.net/app", "http://localhost:8080/app"),
        ])
    }

    #[test]
    fn exact_match_returns_value_without_suffix() {
        let table = sample();
        assert_eq!(
            table.resolve("https://another.azurewebsites.net/app").as_deref(),
            Some("http://localhost:8080/app")
        );
    }

    #[test]
    fn prefix_match_keeps_remainder() {
        let table = sample();
        assert_eq!(
            table.resolve("https://another.azurewebsites.net/app/settings#tab").as_deref(),
            Some("http://localhost:8080/app/settings#tab")
        );
        assert_eq!(
            table.resolve("https://ext.azurestaticapps.net/index.html?a=1&b=2").as_deref(),
            Some("http://localhost:3000/index.html?a=1&b=2")
        );
    }

    #[test]
    fn unmatched_and_empty_table() {
        assert_eq!(sample().resolve("https://dev.azure.com/org"), None);
        assert_eq!(MappingTable::new().resolve("https://ext.azurestaticapps.net/"), None);
    }

    #[test]
    fn rewritten_url_does_not_rewrite_again() {
        let table = sample();
        let once = table.resolve("https://ext.azurestaticapps.net/app?x=1").unwrap();
        assert_eq!(table.resolve(&once), None);
    }

    #[test]
    fn first_inserted_prefix_wins() {
        let table = MappingTable::from_iter([
            ("https://ext.azurestaticapps.net/", "http://localhost:1/"),
            ("https://ext.azurestaticapps.net/v2/", "http://localhost:2/"),
        ]);
        assert_eq!(
            table.resolve("https://ext.azurestaticapps.net/v2/page").as_deref(),
            Some("http://localhost:1/v2/page")
        );
        // exact match beats order
        assert_eq!(
            table.resolve("https://ext.azurestaticapps.net/v2/").as_deref(),
            Some("http://localhost:2/")
        );
        assert_eq!(
            table.shadowed(),
            vec![Shadowed {
                earlier: "https://ext.azurestaticapps.net/".to_string(),
                later: "https://ext.azurestaticapps.net/v2/".to_string(),
            }]
        );
    }

    #[test]
    fn overwrite_keeps_position_and_remove_keeps_order() {
        let mut table = MappingTable::from_iter([("a", "1"), ("b", "2"), ("c", "3")]);
        assert_eq!(table.insert("a", "9").as_deref(), Some("1"));
        assert_eq!(table.remove("b").as_deref(), Some("2"));
        assert_eq!(table.remove("b"), None);
        let order: Vec<_> = table.iter().collect();
        assert_eq!(order, vec![("a", "9"), ("c", "3")]);
    }

    #[test]
    fn conflicts_reports_local_urls_that_rematch() {
        let table = MappingTable::from_iter([
            ("http://localhost:3000/", "http://localhost:3000/dev/"),
            ("https://ok.azurestaticapps.net/", "http://localhost:4000/"),
        ]);
        let conflicts = table.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].production, "http://localhost:3000/");
        assert_eq!(conflicts[0].rematched_by, "http://localhost:3000/");
        assert!(sample().conflicts().is_empty());
    }

    #[test]
    fn key_for_prefers_exact_key() {
        let table = MappingTable::from_iter([
            ("https://ext.azurestaticapps.net/", "http://localhost:3000/"),
            ("https://ext.azurestaticapps.net/v2/", "http://localhost:3002/"),
        ]);
        let exact = String::from("https://ext.azurestaticapps.net/v2/");
        assert_eq!(table.key_for(&exact), Some("https://ext.azurestaticapps.net/v2/"));
        assert_eq!(
            table.key_for("https://ext.azurestaticapps.net/v2/page"),
            Some("https://ext.azurestaticapps.net/")
        );
        assert_eq!(table.key_for("https://other.example/"), None);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"https://ext.azurestaticapps.net/":"http://localhost:3000/","https://another.azurewebsites.net/app":"http://localhost:8080/app"}"#
        );
        let back: MappingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.iter().next(),
            Some(("https://ext.azurestaticapps.net/", "http://localhost:3000/"))
        );
    }
}
