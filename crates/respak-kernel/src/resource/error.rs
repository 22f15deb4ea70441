use respak_glob::GlobError;
use respak_types::{PackError, VfsPath};

use crate::io::ProviderError;

/// Errors raised while discovering packs and repopulating registries.
///
/// Loading a single resource never produces one of these; load failures are
/// logged at the handle and surface as a missing scope.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// `pack.json` exists but does not describe a pack.
    #[error("invalid pack descriptor at {path}")]
    InvalidPack {
        path: VfsPath,
        #[source]
        source: PackError,
    },

    /// An asset kind declared an unusable extension list.
    #[error("invalid extension filter")]
    Filter(#[from] GlobError),
}
