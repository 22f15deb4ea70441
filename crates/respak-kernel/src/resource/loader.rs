//! Loaders turn the bytes behind an [`IoProvider`] into a payload.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use async_trait::async_trait;

use crate::io::IoProvider;

/// Loads and unloads the payload of one resource.
///
/// A [`ResourceHandle`](super::ResourceHandle) calls `load` for every scope
/// it hands out and `unload` once the last scope is returned. Nothing
/// prevents two loads from running at the same time; a loader that must
/// load at most once has to guard that itself.
#[async_trait]
pub trait ResourceLoader<T>: Send + Sync + 'static {
    async fn load(&self, provider: &IoProvider) -> anyhow::Result<Arc<T>>;

    fn unload(&self, provider: &IoProvider) -> anyhow::Result<()>;
}

/// Payload types that can be built from raw bytes.
pub trait Decode: Sized + Send + Sync + 'static {
    fn decode(bytes: Vec<u8>) -> anyhow::Result<Self>;
}

impl Decode for Vec<u8> {
    fn decode(bytes: Vec<u8>) -> anyhow::Result<Self> {
        Ok(bytes)
    }
}

impl Decode for String {
    fn decode(bytes: Vec<u8>) -> anyhow::Result<Self> {
        String::from_utf8(bytes).context("resource is not valid UTF-8")
    }
}

/// Loader that reads and decodes once, then serves the cached payload until
/// unloaded.
///
/// Two first loads racing each other may both decode; the later one wins
/// the cache slot.
pub struct CachedLoader<D> {
    cached: Mutex<Option<Arc<D>>>,
    _payload: PhantomData<fn() -> D>,
}

impl<D> Default for CachedLoader<D> {
    fn default() -> Self {
        Self {
            cached: Mutex::new(None),
            _payload: PhantomData,
        }
    }
}

impl<D> CachedLoader<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a payload is currently held.
    pub fn is_loaded(&self) -> bool {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl<D> fmt::Debug for CachedLoader<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedLoader")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[async_trait]
impl<D: Decode> ResourceLoader<D> for CachedLoader<D> {
    async fn load(&self, provider: &IoProvider) -> anyhow::Result<Arc<D>> {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(payload) = cached {
            return Ok(payload);
        }

        let bytes = provider
            .read_all_bytes()
            .await
            .with_context(|| format!("reading {provider}"))?;
        let payload = Arc::new(D::decode(bytes).with_context(|| format!("decoding {provider}"))?);
        tracing::debug!(resource = %provider, "decoded resource");

        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&payload));
        Ok(payload)
    }

    fn unload(&self, provider: &IoProvider) -> anyhow::Result<()> {
        let dropped = self.cached.lock().unwrap_or_else(PoisonError::into_inner).take();
        if dropped.is_some() {
            tracing::debug!(resource = %provider, "unloaded resource");
        }
        Ok(())
    }
}
