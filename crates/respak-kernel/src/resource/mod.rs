//! Reference-counted resources loaded from resource packs.
//!
//! - [`ResourceHandle`] / [`ResourceScope`]: one resource, loaded on demand
//!   and unloaded once the last scope is returned
//! - [`ResourceLoader`] / [`CachedLoader`]: how bytes become a payload
//! - [`ResourcePack`]: a directory with `pack.json` and `assets/`
//! - [`ResourceRegistry`] / [`AssetRegistry`]: identifier to handle maps
//! - [`ResourceCatalog`]: registries keyed by type

mod catalog;
mod error;
mod handle;
mod language;
mod loader;
mod pack;
mod registry;

pub use catalog::ResourceCatalog;
pub use error::RegistryError;
pub use handle::{ResourceHandle, ResourceScope};
pub use language::{Language, LanguageFiles, LanguageRegistry};
pub use loader::{CachedLoader, Decode, ResourceLoader};
pub use pack::ResourcePack;
pub use registry::{AssetKind, AssetRegistry, ResourceRegistry};
