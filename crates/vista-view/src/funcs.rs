//! Template function tables.

use minijinja::value::{Enumerator, Object, ValueKind};
use minijinja::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A table of functions made available to templates by name.
///
/// Entries are usually created with [`Value::from_function`]. A `FuncMap`
/// can be stored in the stash under [`keys::FUNCS`](crate::keys::FUNCS) to
/// override entries of the default table for a single request.
///
/// # Example
///
/// ```
/// use minijinja::Value;
/// use vista_view::FuncMap;
///
/// let mut funcs = FuncMap::new();
/// funcs.insert("shout", Value::from_function(|s: String| s.to_uppercase()));
///
/// assert!(funcs.contains("shout"));
/// assert_eq!(funcs.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FuncMap {
    entries: BTreeMap<String, Value>,
}

impl FuncMap {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, func: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), func.into())
    }

    /// Returns the entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns true if `name` has an entry.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Copies every entry of `other` into this table. Entries of `other` win
    /// on name collisions.
    pub fn overlay(&mut self, other: &FuncMap) {
        for (name, func) in other.iter() {
            self.entries.insert(name.clone(), func.clone());
        }
    }

    /// Reads a function table out of a template value.
    ///
    /// Accepts a `FuncMap` stored with [`Value::from_object`] or any map
    /// value with string keys. Entries with non-string keys are skipped.
    /// Returns `None` for any other kind of value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<FuncMap> {
        if let Some(funcs) = value.downcast_object_ref::<FuncMap>() {
            return Some(funcs.clone());
        }
        if value.kind() != ValueKind::Map {
            return None;
        }

        let mut funcs = FuncMap::new();
        for key in value.try_iter().ok()? {
            let Some(name) = key.as_str() else {
                continue;
            };
            match value.get_item(&key) {
                Ok(func) if !func.is_undefined() => {
                    funcs.insert(name, func);
                }
                _ => {}
            }
        }
        Some(funcs)
    }
}

impl From<FuncMap> for Value {
    fn from(funcs: FuncMap) -> Self {
        Value::from_object(funcs)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FuncMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, func)| (name.into(), func.into()))
                .collect(),
        }
    }
}

impl IntoIterator for FuncMap {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a FuncMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Object for FuncMap {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.entries.get(key.as_str()?).cloned()
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.entries.keys().map(|k| Value::from(k.as_str())).collect())
    }
}
