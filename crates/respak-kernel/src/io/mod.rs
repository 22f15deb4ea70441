//! I/O providers.
//!
//! An [`IoProvider`] addresses a path on a [`Backend`]. Three backends ship
//! with the crate:
//!
//! - [`DiskBackend`]: a directory on the local filesystem
//! - [`MemoryBackend`]: an in-process tree, optionally with shortcut files
//! - [`NullBackend`]: nothing exists, every read fails
//!
//! Providers are immutable and cheap to clone. Walking down a path with
//! [`IoProvider::create_child`] yields a chain whose intermediate nodes stay
//! reachable through [`IoProvider::parent`].

mod backend;
mod disk;
mod error;
mod memory;
mod null;
mod provider;

pub use backend::{Backend, BackendKind, DirEntry, DirEntryKind, ReadStream};
pub use disk::DiskBackend;
pub use error::ProviderError;
pub use memory::MemoryBackend;
pub use null::NullBackend;
pub use provider::IoProvider;
