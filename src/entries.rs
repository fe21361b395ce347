//! Ordered table of named script entry points.
use std::iter::FromIterator;
use std::path::Path;

use indexmap::{map::Iter, IndexMap};
use serde::{Deserialize, Serialize};

/// Mapping from a unique entry name to a source script path.
///
/// Iteration follows insertion order; overwriting a key keeps
/// the position of the original insert.
#[derive(Serialize, Deserialize, Clone, Default, Debug, Eq, PartialEq)]
#[serde(transparent)]
pub struct EntryTable {
    map: IndexMap<String, String>,
}

impl EntryTable {
    /// Create an empty entry table.
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert an entry, returning the path it replaced.
    pub fn insert<K: Into<String>, V: Into<String>>(
        &mut self,
        name: K,
        path: V,
    ) -> Option<String> {
        self.map.insert(name.into(), path.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(|s| &s[..])
    }

    /// Entry names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|k| &k[..])
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve relative entry paths against a base directory.
    pub fn resolve_against<P: AsRef<Path>>(&self, base: P) -> Self {
        let map = self
            .map
            .iter()
            .map(|(name, path)| {
                let resolved = if Path::new(path).is_absolute() {
                    path.clone()
                } else {
                    base.as_ref().join(path).to_string_lossy().into_owned()
                };
                (name.clone(), resolved)
            })
            .collect();
        Self { map }
    }
}

impl<'a> IntoIterator for &'a EntryTable {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EntryTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = EntryTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}
