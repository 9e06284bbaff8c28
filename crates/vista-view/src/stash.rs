//! Per-request stash.
//!
//! A [`Stash`] collects the values a page is rendered with. The view
//! middleware attaches a fresh one to the [`MiddlewareContext`] before the
//! handler runs; handlers reach it through [`StashExt`].
//!
//! ```
//! use vista_middleware::MiddlewareContext;
//! use vista_view::{Stash, StashExt};
//!
//! let mut ctx = MiddlewareContext::new();
//! assert!(ctx.stash().is_none());
//!
//! ctx.attach_stash(Stash::new());
//! if let Some(stash) = ctx.stash_mut() {
//!     stash.insert("Name", "Gregory");
//! }
//!
//! assert_eq!(ctx.stash().unwrap().get_str("Name"), Some("Gregory"));
//! ```

use minijinja::Value;
use serde::Serialize;
use std::collections::hash_map;
use std::collections::HashMap;
use vista_middleware::MiddlewareContext;

/// String-keyed values passed to the template as its data.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Stash {
    values: HashMap<String, Value>,
}

impl Stash {
    /// Creates an empty stash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Stores any serializable value.
    pub fn insert_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Option<Value> {
        self.insert(key, Value::from_serialize(value))
    }

    /// Returns the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stashed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the stashed values in arbitrary order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Stash {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Stash {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Private slot type, so only this module can place a stash in a context.
struct StashSlot(Stash);

/// Stash access on [`MiddlewareContext`].
pub trait StashExt {
    /// Attaches `stash`, replacing any stash already attached.
    fn attach_stash(&mut self, stash: Stash);

    /// Returns the attached stash, if any.
    fn stash(&self) -> Option<&Stash>;

    /// Returns the attached stash for modification, if any.
    fn stash_mut(&mut self) -> Option<&mut Stash>;

    /// Detaches and returns the stash.
    fn take_stash(&mut self) -> Option<Stash>;
}

impl StashExt for MiddlewareContext {
    fn attach_stash(&mut self, stash: Stash) {
        self.set_extension(StashSlot(stash));
    }

    fn stash(&self) -> Option<&Stash> {
        self.get_extension::<StashSlot>().map(|slot| &slot.0)
    }

    fn stash_mut(&mut self) -> Option<&mut Stash> {
        self.get_extension_mut::<StashSlot>().map(|slot| &mut slot.0)
    }

    fn take_stash(&mut self) -> Option<Stash> {
        self.remove_extension::<StashSlot>().map(|slot| slot.0)
    }
}
