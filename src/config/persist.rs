//! TOML persistence for link manager configuration
//!
//! A snapshot records both layers of each scope, the database settings and
//! the component prefixes. Restoring replays every default before any
//! override so the skip-if-equal-to-default rule sees the final defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::database::DatabaseConfig;
use super::store::{ComponentId, LinkManagerConfig, Scope, StoreError};

/// Schema version written to every snapshot
pub const SCHEMA_VERSION: u32 = 1;

/// Placeholder for private values in redacted output
pub const REDACTED: &str = "[REDACTED]";

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Both layers of one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

impl LayerSnapshot {
    fn entry_count(&self) -> usize {
        self.defaults.len() + self.overrides.len()
    }
}

/// Serializable image of a [`LinkManagerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// When the snapshot was taken (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub general: LayerSnapshot,

    #[serde(default)]
    pub private: LayerSnapshot,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Component id (decimal) -> key prefix
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: None,
            general: LayerSnapshot::default(),
            private: LayerSnapshot::default(),
            database: DatabaseConfig::default(),
            prefixes: BTreeMap::new(),
        }
    }
}

impl ConfigSnapshot {
    /// Capture the current state of `config`.
    pub fn capture(config: &LinkManagerConfig) -> Self {
        let layer = |scope| LayerSnapshot {
            defaults: config.defaults(scope),
            overrides: config.overrides(scope),
        };

        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Some(Utc::now()),
            general: layer(Scope::General),
            private: layer(Scope::Private),
            database: config.database_config(),
            prefixes: config
                .component_prefixes()
                .into_iter()
                .map(|(id, prefix)| (id.raw().to_string(), prefix))
                .collect(),
        }
    }

    /// Rebuild a configuration: defaults first, then overrides, per scope.
    pub fn restore(self) -> Result<LinkManagerConfig, PersistError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(PersistError::UnsupportedSchema(self.schema_version));
        }

        let config = LinkManagerConfig::with_database(self.database);

        for (scope, layer) in [(Scope::General, self.general), (Scope::Private, self.private)] {
            for (key, value) in &layer.defaults {
                config.set_default(scope, key, Some(value.as_str()))?;
            }
            for (key, value) in &layer.overrides {
                config.set(scope, key, Some(value.as_str()))?;
            }
        }

        for (raw, prefix) in &self.prefixes {
            let id = raw
                .parse::<u64>()
                .map_err(|_| PersistError::InvalidComponentId(raw.clone()))?;
            config.set_component_prefix(ComponentId::new(id), prefix);
        }

        Ok(config)
    }

    pub fn layer(&self, scope: Scope) -> &LayerSnapshot {
        match scope {
            Scope::General => &self.general,
            Scope::Private => &self.private,
        }
    }

    /// Copy with every private value replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for value in copy
            .private
            .defaults
            .values_mut()
            .chain(copy.private.overrides.values_mut())
        {
            *value = REDACTED.to_string();
        }
        copy
    }

    pub fn entry_count(&self) -> usize {
        self.general.entry_count() + self.private.entry_count()
    }

    pub fn to_toml(&self) -> Result<String, PersistError> {
        toml::to_string_pretty(self).map_err(|e| PersistError::SerializeError(e.to_string()))
    }

    pub fn from_toml(contents: &str) -> Result<Self, PersistError> {
        toml::from_str(contents)
            .map_err(|e| PersistError::ParseError(format!("TOML parse error: {}", e)))
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,

    /// SHA-256 digest of the raw file bytes (None when the file was missing)
    pub digest: Option<String>,
}

/// A configuration together with its provenance
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: LinkManagerConfig,
    pub source: ConfigSource,
}

/// Load a configuration file. A missing file yields an empty configuration.
pub fn load(path: &Path) -> Result<LoadedConfig, PersistError> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, starting empty");
        return Ok(LoadedConfig {
            config: LinkManagerConfig::new(),
            source: ConfigSource {
                path: path.to_path_buf(),
                digest: None,
            },
        });
    }

    let bytes = fs::read(path).map_err(|e| PersistError::IoError(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| PersistError::ParseError(format!("Invalid UTF-8: {}", e)))?;
    let snapshot = ConfigSnapshot::from_toml(&contents)?;
    let entries = snapshot.entry_count();
    let config = snapshot.restore()?;

    info!(path = %path.display(), %digest, entries, "loaded configuration");

    Ok(LoadedConfig {
        config,
        source: ConfigSource {
            path: path.to_path_buf(),
            digest: Some(digest),
        },
    })
}

/// Write `config` to `path`, replacing any existing file.
pub fn save(config: &LinkManagerConfig, path: &Path) -> Result<(), PersistError> {
    let snapshot = ConfigSnapshot::capture(config);
    let contents = snapshot.to_toml()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistError::IoError(e.to_string()))?;
    }

    // Write then rename so readers never see a truncated file
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, contents).map_err(|e| PersistError::IoError(e.to_string()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistError::IoError(e.to_string()));
    }

    info!(
        path = %path.display(),
        entries = snapshot.entry_count(),
        "saved configuration"
    );
    Ok(())
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unsupported schema version {0}")]
    UnsupportedSchema(u32),

    #[error("Invalid component id {0:?} in prefixes table")]
    InvalidComponentId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn sample() -> LinkManagerConfig {
        let config = LinkManagerConfig::with_database(DatabaseConfig::from_properties([(
            "url",
            "jdbc:sqlite:links.db",
        )]));
        config.set_default(Scope::General, "ui.theme", Some("light")).unwrap();
        config.set(Scope::General, "ui.theme", Some("dark")).unwrap();
        config.set(Scope::Private, "sync.password", Some("hunter2")).unwrap();
        config.set_component_prefix(ComponentId::new(7), "linkTable.");
        config
    }

    #[test]
    fn test_capture_restore() {
        let snapshot = ConfigSnapshot::capture(&sample());
        let restored = snapshot.restore().unwrap();

        assert_eq!(restored.get(Scope::General, "ui.theme"), Some("dark".to_string()));
        assert_eq!(
            restored.defaults(Scope::General).get("ui.theme").map(String::as_str),
            Some("light")
        );
        assert_eq!(
            restored.get(Scope::Private, "sync.password"),
            Some("hunter2".to_string())
        );
        assert_eq!(
            restored.component_prefix(ComponentId::new(7)),
            Some("linkTable.".to_string())
        );
        assert!(!restored.database_config().is_default());
    }

    #[test]
    fn test_restore_skips_override_equal_to_default() {
        let mut snapshot = ConfigSnapshot::default();
        snapshot.general.defaults.insert("k".into(), "v".into());
        snapshot.general.overrides.insert("k".into(), "v".into());

        let config = snapshot.restore().unwrap();
        assert!(!config.contains_override(Scope::General, "k"));
        assert_eq!(config.get(Scope::General, "k"), Some("v".to_string()));
    }

    #[test]
    fn test_redacted_hides_private_values() {
        let redacted = ConfigSnapshot::capture(&sample()).redacted();

        assert_eq!(
            redacted.private.overrides.get("sync.password").map(String::as_str),
            Some(REDACTED)
        );
        assert_eq!(
            redacted.general.overrides.get("ui.theme").map(String::as_str),
            Some("dark")
        );
    }

    #[test]
    fn test_unsupported_schema() {
        let snapshot = ConfigSnapshot {
            schema_version: 99,
            ..ConfigSnapshot::default()
        };
        assert!(matches!(
            snapshot.restore(),
            Err(PersistError::UnsupportedSchema(99))
        ));
    }

    #[test]
    fn test_invalid_component_id() {
        let mut snapshot = ConfigSnapshot::default();
        snapshot.prefixes.insert("table".into(), "t.".into());
        assert!(matches!(
            snapshot.restore(),
            Err(PersistError::InvalidComponentId(_))
        ));
    }

    #[test]
    fn test_empty_key_in_file_rejected() {
        let mut snapshot = ConfigSnapshot::default();
        snapshot.private.overrides.insert(String::new(), "x".into());
        assert!(matches!(
            snapshot.restore(),
            Err(PersistError::Store(StoreError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded = load(&dir.path().join("absent.toml")).unwrap();

        assert!(loaded.source.digest.is_none());
        assert!(loaded.config.overrides(Scope::General).is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[general.overrides]").unwrap();
        writeln!(temp, "\"ui.theme\" = \"dark\"").unwrap();

        let loaded = load(temp.path()).unwrap();
        assert_eq!(
            loaded.config.get(Scope::General, "ui.theme"),
            Some("dark".to_string())
        );
        assert_eq!(loaded.source.digest.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_load_parse_error() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[general.overrides").unwrap();

        let result = load(temp.path());
        assert!(matches!(result, Err(PersistError::ParseError(_))));
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("linkman.toml");
        fs::create_dir(&path).unwrap();

        let result = save(&LinkManagerConfig::new(), &path);
        assert!(matches!(result, Err(PersistError::IoError(_))));
        assert!(!path.with_extension("toml.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("linkman.toml");

        save(&sample(), &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
