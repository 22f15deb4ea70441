//! `pack.json`, the resource pack descriptor.
//!
//! ```json
//! {
//!   "name": "faithful",
//!   "version": "1.4.0",
//!   "description": "32x textures",
//!   "compatible_versions": [">=1.2, <2.0"]
//! }
//! ```

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// File name of the descriptor at the root of a pack.
pub const PACK_DESCRIPTOR: &str = "pack.json";

/// Directory holding a pack's assets.
pub const ASSETS_DIR: &str = "assets";

/// Errors from reading a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid pack descriptor: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A resource pack descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDescriptor {
    /// Display name of the pack.
    pub name: String,
    /// Version of the pack itself.
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Host versions the pack works with. Empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compatible_versions: Vec<VersionReq>,
}

impl PackDescriptor {
    pub fn from_json(bytes: &[u8]) -> Result<Self, PackError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, PackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether the pack declares support for `host`.
    pub fn supports(&self, host: &Version) -> bool {
        self.compatible_versions.is_empty()
            || self.compatible_versions.iter().any(|req| req.matches(host))
    }
}
