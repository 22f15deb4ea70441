//! respak-types: pure data types shared by the respak crates.
//!
//! - [`VfsPath`]: normalized `/`-separated virtual path
//! - [`ResourceId`]: `namespace:path` resource identifiers
//! - [`PackDescriptor`]: the `pack.json` resource pack descriptor
//!
//! No I/O happens here; everything is a value type.

mod identifier;
mod pack;
mod path;

pub use identifier::{DEFAULT_NAMESPACE, IdentifierError, NAMESPACE_SEPARATOR, ResourceId};
pub use pack::{ASSETS_DIR, PACK_DESCRIPTOR, PackDescriptor, PackError};
pub use path::{SEPARATOR, VfsPath};

// Re-exported so downstream crates can name pack versions without a direct dependency.
pub use semver::{Version, VersionReq};
