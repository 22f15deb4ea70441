//! The catalog: one registry instance per registry type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use async_trait::async_trait;
use respak_types::ResourceId;
use tracing::{debug, info};

use super::{RegistryError, ResourceHandle, ResourcePack, ResourceRegistry, ResourceScope};

/// Object-safe view of a registry, for operations that do not need its
/// resource type.
#[async_trait]
trait ErasedRegistry: Send + Sync {
    fn category(&self) -> &str;

    async fn reload(&self, packs: &[ResourcePack]) -> Result<usize, RegistryError>;

    fn clear(&self);

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

#[async_trait]
impl<R: ResourceRegistry> ErasedRegistry for R {
    fn category(&self) -> &str {
        ResourceRegistry::category(self)
    }

    async fn reload(&self, packs: &[ResourcePack]) -> Result<usize, RegistryError> {
        ResourceRegistry::reload(self, packs).await
    }

    fn clear(&self) {
        ResourceRegistry::clear(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Process-wide set of registries, keyed by registry type.
///
/// Lookups never fail loudly: an unregistered registry type or unknown
/// identifier yields `None`.
#[derive(Default)]
pub struct ResourceCatalog {
    registries: RwLock<HashMap<TypeId, Arc<dyn ErasedRegistry>>>,
}

static GLOBAL: OnceLock<ResourceCatalog> = OnceLock::new();

impl ResourceCatalog {
    /// An empty catalog, independent of the global one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide catalog.
    pub fn global() -> &'static ResourceCatalog {
        GLOBAL.get_or_init(ResourceCatalog::new)
    }

    /// Register `R`, constructed with `Default`.
    ///
    /// Returns `false` if `R` was already registered; the existing instance
    /// is kept.
    pub fn register<R: ResourceRegistry + Default>(&self) -> bool {
        let mut registries = self.registries.write().unwrap_or_else(PoisonError::into_inner);
        if registries.contains_key(&TypeId::of::<R>()) {
            return false;
        }
        let registry = R::default();
        debug!(category = ResourceRegistry::category(&registry), "registry registered");
        registries.insert(TypeId::of::<R>(), Arc::new(registry));
        true
    }

    pub fn contains<R: ResourceRegistry>(&self) -> bool {
        self.registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<R>())
    }

    /// The registered instance of `R`.
    pub fn registry<R: ResourceRegistry>(&self) -> Option<Arc<R>> {
        let erased = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<R>())
            .cloned()?;
        erased.into_any().downcast::<R>().ok()
    }

    pub fn get_handle<R: ResourceRegistry>(&self, id: &ResourceId) -> Option<ResourceHandle<R::Resource>> {
        self.registry::<R>()?.handle(id)
    }

    /// Open a scope on `id` in registry `R`. `None` if the registry or the
    /// identifier is unknown, or if the resource fails to load.
    pub async fn get_scope<R: ResourceRegistry>(&self, id: &ResourceId) -> Option<ResourceScope<R::Resource>> {
        self.get_handle::<R>(id)?.get_scope().await
    }

    /// Reload every registered registry from `packs`.
    pub async fn reload(&self, packs: &[ResourcePack]) -> Result<(), RegistryError> {
        let registries: Vec<_> = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for registry in registries {
            registry.reload(packs).await?;
        }
        info!(registries = self.len(), packs = packs.len(), "catalog reloaded");
        Ok(())
    }

    /// Unregister everything.
    pub fn clear(&self) {
        let drained: Vec<_> = self
            .registries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, registry)| registry)
            .collect();
        for registry in &drained {
            registry.clear();
        }
        debug!(registries = drained.len(), "catalog cleared");
    }

    /// Categories of the registered registries, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|r| r.category().to_string())
            .collect();
        categories.sort();
        categories
    }

    pub fn len(&self) -> usize {
        self.registries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ResourceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCatalog")
            .field("registries", &self.categories())
            .finish()
    }
}
