//! Opaque database connection settings
//!
//! The configuration core stores this bag on behalf of whichever component
//! owns the database connection. Nothing here reads individual properties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backend-specific connection properties, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseConfig {
    properties: BTreeMap<String, String>,
}

impl DatabaseConfig {
    /// Build from an externally supplied property bag.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// True when no properties were supplied.
    pub fn is_default(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(DatabaseConfig::default().is_default());
    }

    #[test]
    fn test_from_properties() {
        let cfg = DatabaseConfig::from_properties([("url", "jdbc:sqlite:links.db")]);
        assert!(!cfg.is_default());
        assert_eq!(
            cfg.properties().get("url").map(String::as_str),
            Some("jdbc:sqlite:links.db")
        );
    }
}
