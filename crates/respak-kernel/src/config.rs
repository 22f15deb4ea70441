//! Catalog configuration: where packs live and which ones to use.

use std::path::PathBuf;

use respak_types::Version;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::io::IoProvider;
use crate::resource::{RegistryError, ResourcePack};

/// Configuration for pack discovery and selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory whose subdirectories are resource packs.
    pub packs_dir: PathBuf,
    /// Pack names to load, lowest priority first. Empty loads every
    /// discovered pack in directory order.
    pub enabled_packs: Vec<String>,
    /// Host version checked against each pack's `compatible_versions`.
    pub version: Option<Version>,
    /// Drop incompatible packs instead of only warning about them.
    pub strict_compatibility: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            packs_dir: PathBuf::from("packs"),
            enabled_packs: Vec::new(),
            version: None,
            strict_compatibility: false,
        }
    }
}

impl CatalogConfig {
    /// Load every pack found in `packs_dir`.
    pub fn new(packs_dir: impl Into<PathBuf>) -> Self {
        Self {
            packs_dir: packs_dir.into(),
            ..Self::default()
        }
    }

    /// Load only the named packs, in this order.
    pub fn with_enabled_packs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_packs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check packs against `version`, dropping incompatible ones when
    /// `strict` is set.
    pub fn with_version(mut self, version: Version, strict: bool) -> Self {
        self.version = Some(version);
        self.strict_compatibility = strict;
        self
    }

    /// Provider over `packs_dir`.
    pub fn packs_root(&self) -> IoProvider {
        IoProvider::disk(&self.packs_dir)
    }

    /// Order and filter discovered packs.
    pub fn select_packs(&self, discovered: Vec<ResourcePack>) -> Vec<ResourcePack> {
        let ordered = if self.enabled_packs.is_empty() {
            discovered
        } else {
            let mut ordered = Vec::with_capacity(self.enabled_packs.len());
            for name in &self.enabled_packs {
                match discovered.iter().find(|p| p.name() == name) {
                    Some(pack) => ordered.push(pack.clone()),
                    None => warn!(pack = %name, "enabled pack not found"),
                }
            }
            ordered
        };

        let Some(host) = &self.version else {
            return ordered;
        };
        ordered
            .into_iter()
            .filter(|pack| {
                if pack.supports(host) {
                    return true;
                }
                warn!(
                    pack = %pack.name(),
                    host = %host,
                    dropped = self.strict_compatibility,
                    "pack does not declare compatibility with this version"
                );
                !self.strict_compatibility
            })
            .collect()
    }

    /// Discover packs under `packs_dir` and select them.
    pub async fn load_packs(&self) -> Result<Vec<ResourcePack>, RegistryError> {
        let discovered = ResourcePack::discover(&self.packs_root()).await?;
        Ok(self.select_packs(discovered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;

    async fn discovered() -> Vec<ResourcePack> {
        let mem = MemoryBackend::new();
        for (dir, json) in [
            ("a", r#"{"name":"alpha","version":"1.0.0"}"#),
            ("b", r#"{"name":"beta","version":"1.0.0","compatible_versions":["^2"]}"#),
            ("c", r#"{"name":"gamma","version":"1.0.0","compatible_versions":["^1.4"]}"#),
        ] {
            mem.insert(&format!("{dir}/pack.json").as_str().into(), json.as_bytes().to_vec())
                .await
                .unwrap();
            mem.create_dir(&format!("{dir}/assets").as_str().into()).await.unwrap();
        }
        ResourcePack::discover(&IoProvider::memory(mem)).await.unwrap()
    }

    fn names(packs: &[ResourcePack]) -> Vec<&str> {
        packs.iter().map(ResourcePack::name).collect()
    }

    #[tokio::test]
    async fn default_keeps_everything() {
        let packs = CatalogConfig::default().select_packs(discovered().await);
        assert_eq!(names(&packs), vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn enabled_packs_set_order_and_skip_unknown() {
        let config = CatalogConfig::default().with_enabled_packs(["gamma", "missing", "alpha"]);
        let packs = config.select_packs(discovered().await);
        assert_eq!(names(&packs), vec!["gamma", "alpha"]);
    }

    #[tokio::test]
    async fn compatibility_warns_or_drops() {
        let lenient = CatalogConfig::default().with_version(Version::new(1, 5, 0), false);
        assert_eq!(names(&lenient.select_packs(discovered().await)).len(), 3);

        let strict = CatalogConfig::default().with_version(Version::new(1, 5, 0), true);
        assert_eq!(names(&strict.select_packs(discovered().await)), vec!["alpha", "gamma"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"packs_dir":"/srv/packs","strict_compatibility":true}"#).unwrap();
        assert_eq!(config.packs_dir, PathBuf::from("/srv/packs"));
        assert!(config.enabled_packs.is_empty());
        assert!(config.strict_compatibility);
    }

    #[tokio::test]
    async fn load_packs_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pack = dir.path().join("base");
        tokio::fs::create_dir_all(pack.join("assets")).await.unwrap();
        tokio::fs::write(pack.join("pack.json"), br#"{"name":"base","version":"0.1.0"}"#)
            .await
            .unwrap();

        let packs = CatalogConfig::new(dir.path()).load_packs().await.unwrap();
        assert_eq!(names(&packs), vec!["base"]);
    }
}
