//! Ordered map type for dict values.
//!
//! This module provides [`LinoMap`], a wrapper around [`IndexMap`] that keeps
//! entries in insertion order. Decoding a dict must reproduce the order it was
//! encoded in, otherwise a second round trip would emit different text.
//!
//! ## Keys
//!
//! Keys may be any [`Value`]. Scalars are matched by value (floats by their
//! bit pattern, so a `NaN` key can be found again), containers are matched by
//! identity: the same list handle finds its entry, an equal but distinct list
//! does not.
//!
//! ## Examples
//!
//! ```rust
//! use lino_codec::{LinoMap, Value};
//!
//! let mut map = LinoMap::new();
//! map.insert(Value::from("name"), Value::from("Alice"));
//! map.insert(Value::from(7), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get_str("name").and_then(Value::as_str), Some("Alice"));
//! assert!(map.contains_key(&Value::from(7)));
//! ```

use crate::Value;
use indexmap::{Equivalent, IndexMap};
use std::hash::{Hash, Hasher};
use std::mem;

/// A dict key: a [`Value`] with hashing suited to map lookups.
#[derive(Clone, Debug)]
pub struct MapKey(Value);

impl MapKey {
    pub fn new(value: Value) -> Self {
        MapKey(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

fn hash_key<H: Hasher>(value: &Value, state: &mut H) {
    mem::discriminant(value).hash(state);
    match value {
        Value::None => {}
        Value::Bool(b) => b.hash(state),
        Value::Int(i) => i.hash(state),
        Value::Float(f) => f.to_bits().hash(state),
        Value::Str(s) => s.hash(state),
        Value::List(_) | Value::Dict(_) => value.container_addr().hash(state),
    }
}

fn key_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(_), Value::List(_)) | (Value::Dict(_), Value::Dict(_)) => a.ptr_eq(b),
        _ => false,
    }
}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(&self.0, state);
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        key_eq(&self.0, &other.0)
    }
}

impl Eq for MapKey {}

/// Borrowed lookup key, so `get` does not clone the probe value.
struct KeyRef<'a>(&'a Value);

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(self.0, state);
    }
}

impl Equivalent<MapKey> for KeyRef<'_> {
    fn equivalent(&self, key: &MapKey) -> bool {
        key_eq(self.0, &key.0)
    }
}

/// An insertion-ordered map of [`Value`] keys to [`Value`]s.
///
/// # Examples
///
/// ```rust
/// use lino_codec::{LinoMap, Value};
///
/// let mut map = LinoMap::new();
/// map.insert(Value::from("second"), Value::from(2));
/// map.insert(Value::from("first"), Value::from(1));
///
/// // Iteration follows insertion order, not key order
/// let keys: Vec<&str> = map.keys().filter_map(Value::as_str).collect();
/// assert_eq!(keys, vec!["second", "first"]);
/// ```
#[derive(Clone, Default)]
pub struct LinoMap(IndexMap<MapKey, Value>);

impl LinoMap {
    #[must_use]
    pub fn new() -> Self {
        LinoMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        LinoMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is replaced in place, keeping
    /// the original position, and the old value is returned.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(MapKey(key), value)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(&KeyRef(key))
    }

    /// Looks up a string key without building a [`Value`] by hand.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.get(&Value::Str(key.to_string()))
    }

    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        self.0.get_mut(&KeyRef(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.contains_key(&KeyRef(key))
    }

    /// Removes a key, shifting later entries down so order is preserved.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.0.shift_remove(&KeyRef(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.keys().map(MapKey::as_value)
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, MapKey, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_value(), v))
    }
}

impl IntoIterator for LinoMap {
    type Item = (Value, Value);
    type IntoIter = std::iter::Map<
        indexmap::map::IntoIter<MapKey, Value>,
        fn((MapKey, Value)) -> (Value, Value),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let unwrap_key: fn((MapKey, Value)) -> (Value, Value) = |(k, v)| (k.into_value(), v);
        self.0.into_iter().map(unwrap_key)
    }
}

impl FromIterator<(Value, Value)> for LinoMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        LinoMap(iter.into_iter().map(|(k, v)| (MapKey(k), v)).collect())
    }
}
