//! respak-glob: file-name filters for respak enumeration.
//!
//! Two small value types describe which files an enumeration accepts:
//!
//! - [`ExtensionFilter`]: an ordered, pipe-delimited extension list such as
//!   `".png|.jpg"`. Order matters when probing for a file by extension.
//! - [`WildcardPattern`]: a pipe-delimited glob list such as `"*.png|*.jpg"`
//!   or `"*"`. Each glob is matched against a single file name, never a path.
//!
//! Matching is purely textual. Nothing here touches a filesystem.

mod extension;
mod wildcard;

pub use extension::ExtensionFilter;
pub use wildcard::{Glob, WildcardPattern};

/// Errors from parsing filters and patterns.
#[derive(Debug, thiserror::Error)]
pub enum GlobError {
    /// The input held no usable entries after splitting on `|`.
    #[error("empty pattern list: {0:?}")]
    Empty(String),

    /// A glob could not be compiled.
    #[error("invalid glob {glob:?}: {source}")]
    Invalid {
        glob: String,
        #[source]
        source: regex::Error,
    },
}

/// Separator between entries in filter and pattern lists.
pub const LIST_SEPARATOR: char = '|';
