//! linkman - configuration core for a link-management application
//!
//! This crate holds the non-UI core that the application's panels and
//! dialogs bind to: a layered general/private property store with
//! persistence, plus re-exports of the identifier codec and flag helpers
//! from `linkman-codec`.

pub mod config;

pub use config::{
    ComponentId, ConfigChange, ConfigSnapshot, DatabaseConfig, LinkManagerConfig, PersistError,
    Scope, StoreError,
};
pub use linkman_codec::{flags, uuid_hex, HexError};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "linkman.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "LINKMAN_CONFIG";
