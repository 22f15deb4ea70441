//! Registries map resource identifiers to handles for one category.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use respak_glob::{ExtensionFilter, WildcardPattern};
use respak_types::ResourceId;
use tracing::{debug, info, warn};

use super::loader::{CachedLoader, Decode};
use super::{RegistryError, ResourceHandle, ResourcePack};

/// A category of resources, keyed by [`ResourceId`].
///
/// Registries are shared behind `Arc` by the
/// [`ResourceCatalog`](super::ResourceCatalog), so every method takes
/// `&self`.
#[async_trait]
pub trait ResourceRegistry: Send + Sync + 'static {
    type Resource: Send + Sync + 'static;

    /// Short name used in logs, e.g. `"language"`.
    fn category(&self) -> &str;

    /// Rebuild the identifier map from `packs`. Later packs override
    /// earlier ones. Returns the number of identifiers registered.
    async fn reload(&self, packs: &[ResourcePack]) -> Result<usize, RegistryError>;

    fn handle(&self, id: &ResourceId) -> Option<ResourceHandle<Self::Resource>>;

    /// Registered identifiers, sorted.
    fn ids(&self) -> Vec<ResourceId>;

    /// Drop every entry.
    fn clear(&self);
}

/// Describes one kind of asset file.
///
/// Files of the kind live under `assets/<namespace>/<DIRECTORY>/` in a pack
/// and match one of `EXTENSIONS` (a `|`-separated list).
pub trait AssetKind: Send + Sync + 'static {
    type Asset: Decode;

    const CATEGORY: &'static str;
    const DIRECTORY: &'static str;
    const EXTENSIONS: &'static str;
}

/// A registry that indexes every file of an [`AssetKind`] across packs.
///
/// `assets/<ns>/<DIRECTORY>/sub/name.ext` becomes `ns:sub/name`. File names
/// that do not form a valid identifier are skipped with a warning.
pub struct AssetRegistry<K: AssetKind> {
    entries: RwLock<BTreeMap<ResourceId, ResourceHandle<K::Asset>>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: AssetKind> Default for AssetRegistry<K> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            _kind: PhantomData,
        }
    }
}

impl<K: AssetKind> AssetRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn scan(
        pack: &ResourcePack,
        pattern: &WildcardPattern,
        entries: &mut BTreeMap<ResourceId, ResourceHandle<K::Asset>>,
    ) -> Result<(), RegistryError> {
        for namespace_dir in pack.assets().list_directories().await? {
            let namespace = namespace_dir.name().as_str();
            let dir = namespace_dir.create_child(K::DIRECTORY);
            if !dir.directory_exists().await {
                continue;
            }

            for file in dir.list_all_files(Some(pattern)).await? {
                let relative = file.path().strip_prefix(dir.path()).without_extension();
                let id = match ResourceId::new(namespace, relative.as_str()) {
                    Ok(id) => id,
                    Err(e) => {
                        warn!(pack = %pack.name(), file = %file, error = %e, "skipping asset with invalid name");
                        continue;
                    }
                };
                let handle = ResourceHandle::new(file, CachedLoader::<K::Asset>::new());
                if entries.insert(id.clone(), handle).is_some() {
                    debug!(category = K::CATEGORY, id = %id, pack = %pack.name(), "overridden by later pack");
                }
            }
        }
        Ok(())
    }
}

impl<K: AssetKind> fmt::Debug for AssetRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("category", &K::CATEGORY)
            .field("entries", &self.len())
            .finish()
    }
}

#[async_trait]
impl<K: AssetKind> ResourceRegistry for AssetRegistry<K> {
    type Resource = K::Asset;

    fn category(&self) -> &str {
        K::CATEGORY
    }

    async fn reload(&self, packs: &[ResourcePack]) -> Result<usize, RegistryError> {
        let filter = ExtensionFilter::parse(K::EXTENSIONS)?;
        let pattern = WildcardPattern::from(&filter);

        let mut entries = BTreeMap::new();
        for pack in packs {
            Self::scan(pack, &pattern, &mut entries).await?;
        }

        let count = entries.len();
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries;
        info!(category = K::CATEGORY, packs = packs.len(), count, "registry reloaded");
        Ok(count)
    }

    fn handle(&self, id: &ResourceId) -> Option<ResourceHandle<K::Asset>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn ids(&self) -> Vec<ResourceId> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
