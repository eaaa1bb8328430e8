//! Per-call reference registries.
//!
//! An encode call numbers every container it meets (`obj_0`, `obj_1`, ...) in
//! pre-order; a decode call maps those ids back to live containers. Neither
//! registry outlives the call that created it, so ids never leak between calls.

use crate::{Error, Result, Value};
use std::collections::{HashMap, HashSet};

pub const REF_PREFIX: &str = "obj_";

/// Encode-side state: identity -> assigned id, plus the open recursion path.
#[derive(Debug, Default)]
pub struct EncodeRegistry {
    memo: HashMap<usize, String>,
    path: HashSet<usize>,
    counter: usize,
}

impl EncodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id already assigned to this container identity, if any.
    pub fn lookup(&self, identity: usize) -> Option<&str> {
        self.memo.get(&identity).map(String::as_str)
    }

    /// Whether the container is open on the current recursion path.
    pub fn on_path(&self, identity: usize) -> bool {
        self.path.contains(&identity)
    }

    /// Returns the id for `identity`, assigning the next one on first sight.
    pub fn assign(&mut self, identity: usize) -> String {
        if let Some(id) = self.memo.get(&identity) {
            return id.clone();
        }
        let id = format!("{}{}", REF_PREFIX, self.counter);
        self.counter += 1;
        self.memo.insert(identity, id.clone());
        id
    }

    pub fn enter(&mut self, identity: usize) {
        self.path.insert(identity);
    }

    /// Closes the container on the path; its id stays assigned.
    pub fn leave(&mut self, identity: usize) {
        self.path.remove(&identity);
    }

    /// Number of ids handed out so far.
    pub fn assigned(&self) -> usize {
        self.counter
    }
}

/// Decode-side state: reference id -> container being rebuilt.
#[derive(Debug, Default)]
pub struct DecodeRegistry {
    live: HashMap<String, Value>,
}

impl DecodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container before its children are decoded.
    ///
    /// Re-registering an id points it at the newer container.
    pub fn register(&mut self, id: &str, container: &Value) {
        self.live.insert(id.to_string(), container.clone());
    }

    /// Returns a handle to the registered container.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownReference`] if nothing was registered under `id`.
    pub fn resolve(&self, id: &str) -> Result<Value> {
        self.live
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown_reference(id))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
