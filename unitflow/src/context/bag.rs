//! The dynamic attribute store backing a context.

use parking_lot::RwLock;
use std::collections::HashMap;

/// A schemaless bag of named attribute values.
///
/// Keys are case-sensitive strings coerced at the call boundary; values
/// are arbitrary JSON values. Writes are last-write-wins and reads of
/// absent keys are not an error.
#[derive(Debug, Default)]
pub struct AttributeBag {
    data: RwLock<HashMap<String, serde_json::Value>>,
}

impl AttributeBag {
    /// Creates a new empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bag seeded from existing key/value pairs.
    #[must_use]
    pub fn from_values(values: HashMap<String, serde_json::Value>) -> Self {
        Self {
            data: RwLock::new(values),
        }
    }

    /// Gets a value from the bag, or `None` if the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.read().get(key).cloned()
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Sets a value in the bag, overwriting any previous value.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.data.write().insert(key.into(), value);
    }

    /// Merges key/value pairs into the bag, one `set` at a time.
    pub fn merge(&self, values: HashMap<String, serde_json::Value>) {
        let mut data = self.data.write();
        for (key, value) in values {
            data.insert(key, value);
        }
    }

    /// Returns a detached copy of all attributes.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        self.data.read().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }
}

impl Clone for AttributeBag {
    fn clone(&self) -> Self {
        Self {
            data: RwLock::new(self.data.read().clone()),
        }
    }
}
