//! Link manager configuration
//!
//! Each configuration instance carries two property stores:
//! 1. General settings
//! 2. Private settings (credentials and other sensitive values)
//!
//! Both stores layer an override map over a default map. The instance also
//! owns the component prefix map and the opaque database settings.

mod database;
mod layers;
mod persist;
mod store;

pub use database::DatabaseConfig;
pub use layers::{set_layered, PropertyLayers};
pub use persist::{
    load, save, ConfigSnapshot, ConfigSource, LayerSnapshot, LoadedConfig, PersistError,
    REDACTED, SCHEMA_VERSION,
};
pub use store::{
    ComponentId, ConfigChange, Layer, LinkManagerConfig, Scope, StoreError, SubscriptionId,
};
