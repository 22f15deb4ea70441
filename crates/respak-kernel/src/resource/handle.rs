//! Reference-counted access to one resource.

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::loader::ResourceLoader;
use crate::io::IoProvider;

struct HandleInner<T> {
    provider: IoProvider,
    loader: Arc<dyn ResourceLoader<T>>,
    /// Ids of scopes handed out and not yet returned.
    scopes: Mutex<HashSet<u64>>,
    next_scope: AtomicU64,
}

/// Shared entry point to one loadable resource.
///
/// Each [`get_scope`](Self::get_scope) loads the payload and hands out a
/// [`ResourceScope`]. When the last outstanding scope is returned the
/// loader's `unload` runs. Cloning the handle shares the scope bookkeeping.
pub struct ResourceHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> ResourceHandle<T> {
    pub fn new(provider: IoProvider, loader: impl ResourceLoader<T>) -> Self {
        Self::with_loader(provider, Arc::new(loader))
    }

    /// Build a handle around a loader shared with other handles.
    pub fn with_loader(provider: IoProvider, loader: Arc<dyn ResourceLoader<T>>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                provider,
                loader,
                scopes: Mutex::new(HashSet::new()),
                next_scope: AtomicU64::new(0),
            }),
        }
    }

    /// Where the resource is read from.
    pub fn provider(&self) -> &IoProvider {
        &self.inner.provider
    }

    /// Number of scopes handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.inner.scopes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether both handles share the same bookkeeping.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Load the resource and open a scope on it.
    ///
    /// A failed load is logged and yields `None`; it never reaches the caller
    /// as an error. Concurrent calls may each run the loader, and a load that
    /// races the final return can hand out a payload the loader has already
    /// unloaded.
    pub async fn get_scope(&self) -> Option<ResourceScope<T>> {
        let payload = match self.inner.loader.load(&self.inner.provider).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(resource = %self.inner.provider, error = %format!("{e:#}"), "resource load failed");
                return None;
            }
        };

        let id = self.inner.next_scope.fetch_add(1, Ordering::Relaxed);
        let outstanding = {
            let mut scopes = self.inner.scopes.lock().unwrap_or_else(PoisonError::into_inner);
            scopes.insert(id);
            scopes.len()
        };
        debug!(resource = %self.inner.provider, scope = id, outstanding, "scope opened");

        Some(ResourceScope {
            handle: self.clone(),
            payload,
            id,
        })
    }

    /// Take a scope back. Unloads when no scope remains outstanding.
    fn return_scope(&self, id: u64) {
        let mut scopes = self.inner.scopes.lock().unwrap_or_else(PoisonError::into_inner);
        if !scopes.remove(&id) {
            warn!(resource = %self.inner.provider, scope = id, "returned a scope this handle does not track");
            return;
        }
        debug!(resource = %self.inner.provider, scope = id, outstanding = scopes.len(), "scope returned");
        if !scopes.is_empty() {
            return;
        }

        // Unload while still holding the set so a concurrent return cannot
        // observe the empty set a second time. A load already in flight can
        // still register a scope right after this unload.
        if let Err(e) = self.inner.loader.unload(&self.inner.provider) {
            warn!(resource = %self.inner.provider, error = %format!("{e:#}"), "resource unload failed");
        }
    }
}

impl<T> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outstanding = self.inner.scopes.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("ResourceHandle")
            .field("provider", &self.inner.provider)
            .field("outstanding", &outstanding)
            .finish()
    }
}

/// A loaded resource on loan from its [`ResourceHandle`].
///
/// Scopes are move-only. Dropping one returns it to the handle, and
/// [`release`](Self::release) does the same explicitly.
pub struct ResourceScope<T: Send + Sync + 'static> {
    handle: ResourceHandle<T>,
    payload: Arc<T>,
    id: u64,
}

impl<T: Send + Sync + 'static> ResourceScope<T> {
    pub fn payload(&self) -> &Arc<T> {
        &self.payload
    }

    pub fn handle(&self) -> &ResourceHandle<T> {
        &self.handle
    }

    /// Return the scope to its handle now.
    pub fn release(self) {
        drop(self);
    }
}

impl<T: Send + Sync + 'static> Deref for ResourceScope<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.payload
    }
}

impl<T: Send + Sync + 'static> Drop for ResourceScope<T> {
    fn drop(&mut self) {
        self.handle.return_scope(self.id);
    }
}

impl<T: Send + Sync + fmt::Debug + 'static> fmt::Debug for ResourceScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceScope")
            .field("id", &self.id)
            .field("resource", &self.handle.inner.provider)
            .field("payload", &self.payload)
            .finish()
    }
}
