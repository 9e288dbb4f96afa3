//! Name-keyed directory of configured providers.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::provider::EmailProvider;

/// Directory of provider adapters, keyed by name.
///
/// Built once by whatever composes the application and shared by `Arc`.
/// Registration is last-write-wins. Lookups clone the `Arc` out and release
/// the lock before any send is awaited, so an in-flight dispatch sees either
/// the old or the new adapter for a name, never a partial one.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn EmailProvider>>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry wrapped in an `Arc` for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace the adapter registered under `name`.
    ///
    /// Returns the adapter that was replaced, if any.
    pub fn register_provider(
        &self,
        name: impl Into<String>,
        provider: Arc<dyn EmailProvider>,
    ) -> Option<Arc<dyn EmailProvider>> {
        let name = name.into();
        let previous = self.providers.write().insert(name.clone(), provider);
        if previous.is_some() {
            tracing::debug!(provider = %name, "Replaced registered email provider");
        } else {
            tracing::debug!(provider = %name, "Registered email provider");
        }
        previous
    }

    /// Register an adapter under its own [`name`](EmailProvider::name).
    pub fn register(&self, provider: Arc<dyn EmailProvider>) -> Option<Arc<dyn EmailProvider>> {
        let name = provider.name().to_string();
        self.register_provider(name, provider)
    }

    /// Look up an adapter by name.
    pub fn get_provider(&self, name: &str) -> Option<Arc<dyn EmailProvider>> {
        self.providers.read().get(name).cloned()
    }

    /// Names of all registered adapters, sorted.
    pub fn available_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.read().contains_key(name)
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_providers())
            .finish()
    }
}
