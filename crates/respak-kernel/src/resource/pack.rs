//! Resource packs: directories holding `pack.json` and `assets/`.

use respak_types::{ASSETS_DIR, PACK_DESCRIPTOR, PackDescriptor, Version};
use tracing::{debug, warn};

use super::RegistryError;
use crate::io::IoProvider;

/// A validated resource pack.
#[derive(Debug, Clone)]
pub struct ResourcePack {
    root: IoProvider,
    descriptor: PackDescriptor,
}

impl ResourcePack {
    /// Open the pack rooted at `root`.
    ///
    /// Returns `Ok(None)` when the directory is not a pack at all (no
    /// descriptor or no `assets/` directory) and an error when the
    /// descriptor is present but unreadable or malformed.
    pub async fn open(root: IoProvider) -> Result<Option<Self>, RegistryError> {
        let descriptor_file = root.create_child(PACK_DESCRIPTOR);
        if !descriptor_file.file_exists().await {
            return Ok(None);
        }
        if !root.create_child(ASSETS_DIR).directory_exists().await {
            return Ok(None);
        }

        let bytes = descriptor_file.read_all_bytes().await?;
        let descriptor = PackDescriptor::from_json(&bytes).map_err(|source| RegistryError::InvalidPack {
            path: descriptor_file.path().clone(),
            source,
        })?;
        Ok(Some(Self { root, descriptor }))
    }

    /// Every valid pack directly below `root`, in directory order.
    ///
    /// Directories that are not packs are skipped quietly; broken packs are
    /// skipped with a warning.
    pub async fn discover(root: &IoProvider) -> Result<Vec<Self>, RegistryError> {
        let mut packs = Vec::new();
        for dir in root.list_directories().await? {
            match Self::open(dir.clone()).await {
                Ok(Some(pack)) => {
                    debug!(pack = %pack.name(), version = %pack.version(), "discovered pack");
                    packs.push(pack);
                }
                Ok(None) => debug!(dir = %dir, "not a resource pack"),
                Err(e) => warn!(dir = %dir, error = %e, "skipping invalid resource pack"),
            }
        }
        Ok(packs)
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn version(&self) -> &Version {
        &self.descriptor.version
    }

    pub fn descriptor(&self) -> &PackDescriptor {
        &self.descriptor
    }

    /// The pack directory itself.
    pub fn root(&self) -> &IoProvider {
        &self.root
    }

    /// The pack's `assets/` directory.
    pub fn assets(&self) -> IoProvider {
        self.root.create_child(ASSETS_DIR)
    }

    /// Namespaces the pack provides, one per directory under `assets/`.
    pub async fn namespaces(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self
            .assets()
            .list_directories()
            .await?
            .into_iter()
            .map(|dir| dir.name().to_string())
            .collect())
    }

    /// Whether the pack declares compatibility with `host`.
    pub fn supports(&self, host: &Version) -> bool {
        self.descriptor.supports(host)
    }
}
