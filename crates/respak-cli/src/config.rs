//! Configuration file loading.
//!
//! The file is TOML with the fields of [`CatalogConfig`]:
//!
//! ```toml
//! packs_dir = "/srv/game/packs"
//! enabled_packs = ["base", "hd-textures"]
//! version = "1.4.0"
//! strict_compatibility = false
//! ```
//!
//! Default location: `$XDG_CONFIG_HOME/respak/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use respak_kernel::CatalogConfig;

/// Default config file path.
pub fn default_config_path() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("respak")
        .join("config.toml")
}

fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// if present and built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<CatalogConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(CatalogConfig::default());
            }
            path
        }
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config = parse(&text).with_context(|| format!("parsing config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn parse(text: &str) -> Result<CatalogConfig> {
    Ok(toml::from_str(text)?)
}
