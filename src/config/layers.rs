//! Override/default layering for one property store pair
//!
//! Lookup order:
//! 1. Override layer
//! 2. Default layer
//! 3. Absent
//!
//! Writes go through [`set_layered`], which skips creating an override
//! whose value would only repeat the default.

use std::collections::{BTreeMap, HashMap};

/// Apply a write to `map`, consulting `fallback` for the value that would
/// surface if `map` had no entry.
///
/// - `None` removes `key` from `map` and returns the removed value.
/// - `Some(v)` writes when `map` already holds `key` or `v` differs from the
///   fallback value, returning the previous entry of `map`. Otherwise nothing
///   is written and the fallback value is returned.
pub fn set_layered(
    map: &mut HashMap<String, String>,
    fallback: Option<&HashMap<String, String>>,
    key: &str,
    value: Option<&str>,
) -> Option<String> {
    let Some(value) = value else {
        return map.remove(key);
    };

    let fallback_value = fallback.and_then(|f| f.get(key));
    if map.contains_key(key) || fallback_value.map(String::as_str) != Some(value) {
        map.insert(key.to_string(), value.to_string())
    } else {
        fallback_value.cloned()
    }
}

/// A default layer with an override layer on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyLayers {
    overrides: HashMap<String, String>,
    defaults: HashMap<String, String>,
}

impl PropertyLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective value: override, else default.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.overrides
            .get(key)
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    pub fn get_default(&self, key: &str) -> Option<&str> {
        self.defaults.get(key).map(String::as_str)
    }

    /// Write to the override layer; see [`set_layered`].
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Option<String> {
        set_layered(&mut self.overrides, Some(&self.defaults), key, value)
    }

    /// Write to the default layer. Non-null writes always land.
    pub fn set_default(&mut self, key: &str, value: Option<&str>) -> Option<String> {
        set_layered(&mut self.defaults, None, key, value)
    }

    pub fn contains_override(&self, key: &str) -> bool {
        self.overrides.contains_key(key)
    }

    /// Drop every override, returning how many were removed.
    pub fn clear_overrides(&mut self) -> usize {
        let count = self.overrides.len();
        self.overrides.clear();
        count
    }

    /// Sorted copy of the override layer.
    pub fn overrides(&self) -> BTreeMap<String, String> {
        sorted(&self.overrides)
    }

    /// Sorted copy of the default layer.
    pub fn defaults(&self) -> BTreeMap<String, String> {
        sorted(&self.defaults)
    }
}

fn sorted(map: &HashMap<String, String>) -> BTreeMap<String, String> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}
