//! Link manager configuration instance
//!
//! Holds the general and private property stores, the component prefix map
//! and the opaque database settings behind a single lock. Change listeners
//! run on the mutating thread after the lock is released.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::database::DatabaseConfig;
use super::layers::PropertyLayers;

/// Which store pair an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Ordinary settings
    General,
    /// Sensitive settings such as credentials
    Private,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::General, Scope::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::General => "general",
            Scope::Private => "private",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which layer of a store pair was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Override,
    Default,
}

/// Opaque identity of a UI component that namespaces its settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

impl ComponentId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate an identity not handed out by any earlier `next` call.
    pub fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by [`LinkManagerConfig::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// A change to the effective value of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub scope: Scope,
    pub layer: Layer,
    pub key: String,
    /// Effective value before the write
    pub old: Option<String>,
    /// Effective value after the write
    pub new: Option<String>,
}

type Listener = Arc<dyn Fn(&ConfigChange) + Send + Sync>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No settings prefix registered for component {0}")]
    UnknownComponent(ComponentId),
}

#[derive(Default)]
struct ConfigState {
    general: PropertyLayers,
    private: PropertyLayers,
    prefixes: HashMap<ComponentId, String>,
    database: DatabaseConfig,
}

impl ConfigState {
    fn layers(&self, scope: Scope) -> &PropertyLayers {
        match scope {
            Scope::General => &self.general,
            Scope::Private => &self.private,
        }
    }

    fn layers_mut(&mut self, scope: Scope) -> &mut PropertyLayers {
        match scope {
            Scope::General => &mut self.general,
            Scope::Private => &mut self.private,
        }
    }
}

/// Configuration for one link manager instance.
///
/// Share it between threads with `Arc<LinkManagerConfig>`.
#[derive(Default)]
pub struct LinkManagerConfig {
    state: RwLock<ConfigState>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl fmt::Debug for LinkManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values stay out of debug output; private ones may be credentials.
        let state = self.read_state();
        f.debug_struct("LinkManagerConfig")
            .field("general_overrides", &state.general.overrides().len())
            .field("private_overrides", &state.private.overrides().len())
            .field("components", &state.prefixes.len())
            .field("listeners", &self.read_listeners().len())
            .finish()
    }
}

impl LinkManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(database: DatabaseConfig) -> Self {
        let config = Self::new();
        config.write_state().database = database;
        config
    }

    // === Property access ===

    /// Effective value of `key`: override, else default, else `None`.
    ///
    /// Writes reject the empty key, so it is never stored and `get("")` is
    /// always `None`.
    pub fn get(&self, scope: Scope, key: &str) -> Option<String> {
        self.read_state().layers(scope).get(key).map(str::to_string)
    }

    /// Effective value of `key`, or `fallback` when neither layer has it
    /// (always the case for the empty key).
    pub fn get_or(&self, scope: Scope, key: &str, fallback: &str) -> String {
        self.get(scope, key).unwrap_or_else(|| fallback.to_string())
    }

    /// Write an override.
    ///
    /// `None` removes the override and returns it (never the default that
    /// surfaces afterwards). A value equal to the default, for a key with no
    /// override, is not stored and the default is returned.
    pub fn set(
        &self,
        scope: Scope,
        key: &str,
        value: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        self.write_layer(scope, Layer::Override, key, value)
    }

    /// Write a default. Returns the previous default.
    pub fn set_default(
        &self,
        scope: Scope,
        key: &str,
        value: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        self.write_layer(scope, Layer::Default, key, value)
    }

    pub fn contains_override(&self, scope: Scope, key: &str) -> bool {
        self.read_state().layers(scope).contains_override(key)
    }

    /// Sorted copy of the override layer.
    pub fn overrides(&self, scope: Scope) -> BTreeMap<String, String> {
        self.read_state().layers(scope).overrides()
    }

    /// Sorted copy of the default layer.
    pub fn defaults(&self, scope: Scope) -> BTreeMap<String, String> {
        self.read_state().layers(scope).defaults()
    }

    /// Reset every key in `scope` to its default. Returns the number of
    /// overrides dropped.
    pub fn clear_overrides(&self, scope: Scope) -> usize {
        let (count, changes) = {
            let mut state = self.write_state();
            let layers = state.layers_mut(scope);
            let before = layers.overrides();
            let count = layers.clear_overrides();
            let changes: Vec<_> = before
                .into_iter()
                .filter_map(|(key, old)| {
                    let new = layers.get(&key).map(str::to_string);
                    (new.as_deref() != Some(old.as_str())).then(|| ConfigChange {
                        scope,
                        layer: Layer::Override,
                        key,
                        old: Some(old),
                        new,
                    })
                })
                .collect();
            (count, changes)
        };

        for change in &changes {
            self.notify(change);
        }
        count
    }

    // === Component prefixes ===

    /// Register the settings-key prefix of a component. Returns the previous
    /// prefix.
    pub fn set_component_prefix(&self, id: ComponentId, prefix: &str) -> Option<String> {
        self.write_state().prefixes.insert(id, prefix.to_string())
    }

    pub fn component_prefix(&self, id: ComponentId) -> Option<String> {
        self.read_state().prefixes.get(&id).cloned()
    }

    pub fn remove_component_prefix(&self, id: ComponentId) -> Option<String> {
        self.write_state().prefixes.remove(&id)
    }

    /// Sorted copy of the prefix map.
    pub fn component_prefixes(&self) -> BTreeMap<ComponentId, String> {
        self.read_state()
            .prefixes
            .iter()
            .map(|(id, prefix)| (*id, prefix.clone()))
            .collect()
    }

    /// Full settings key for `name` under a component's prefix.
    pub fn component_key(&self, id: ComponentId, name: &str) -> Option<String> {
        self.read_state()
            .prefixes
            .get(&id)
            .map(|prefix| format!("{}{}", prefix, name))
    }

    pub fn get_component(
        &self,
        scope: Scope,
        id: ComponentId,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        let key = self
            .component_key(id, name)
            .ok_or(StoreError::UnknownComponent(id))?;
        Ok(self.get(scope, &key))
    }

    pub fn set_component(
        &self,
        scope: Scope,
        id: ComponentId,
        name: &str,
        value: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        let key = self
            .component_key(id, name)
            .ok_or(StoreError::UnknownComponent(id))?;
        self.set(scope, &key, value)
    }

    // === Database settings ===

    pub fn database_config(&self) -> DatabaseConfig {
        self.read_state().database.clone()
    }

    pub fn set_database_config(&self, database: DatabaseConfig) {
        self.write_state().database = database;
    }

    // === Subscriptions ===

    /// Register a listener for effective-value changes. Listeners run
    /// synchronously on the thread that performed the write.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ConfigChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    // === Internals ===

    fn write_layer(
        &self,
        scope: Scope,
        layer: Layer,
        key: &str,
        value: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument(
                "settings key must not be empty".to_string(),
            ));
        }

        let (previous, change) = {
            let mut state = self.write_state();
            let layers = state.layers_mut(scope);
            let old = layers.get(key).map(str::to_string);
            let previous = match layer {
                Layer::Override => layers.set(key, value),
                Layer::Default => layers.set_default(key, value),
            };
            let new = layers.get(key).map(str::to_string);
            let change = (old != new).then(|| ConfigChange {
                scope,
                layer,
                key: key.to_string(),
                old,
                new,
            });
            (previous, change)
        };

        if let Some(change) = change {
            self.notify(&change);
        }
        Ok(previous)
    }

    fn notify(&self, change: &ConfigChange) {
        // Snapshot so listeners may subscribe, unsubscribe or write back.
        let listeners: Vec<Listener> = self
            .read_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(change);
        }
    }

    // The state holds plain strings, so a writer that panicked cannot leave
    // it half-updated; recover from poisoning instead of propagating it.
    fn read_state(&self) -> RwLockReadGuard<'_, ConfigState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ConfigState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_listeners(&self) -> RwLockReadGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }
}
