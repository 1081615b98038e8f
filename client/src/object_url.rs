//! Local `blob:` handles for in-memory images.
//!
//! [`ObjectUrlRegistry::create`] hands out an [`ObjectUrl`]. Clones share one
//! handle; the registry entry is released when the last clone is dropped, so
//! every handle has exactly one release point. Externally supplied URLs
//! (static assets, placeholders) travel as [`ImageSource::External`] and are
//! never released.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use uuid::Uuid;

use crate::blob::Blob;

pub const OBJECT_URL_SCHEME: &str = "blob:";

const DEFAULT_ORIGIN: &str = "classify-client";

/// How many recent releases the registry remembers for diagnostics.
pub const RELEASE_HISTORY: usize = 64;

pub fn is_object_url(url: &str) -> bool {
    url.starts_with(OBJECT_URL_SCHEME)
}

#[derive(Default)]
struct RegistryInner {
    origin: String,
    entries: Mutex<HashMap<String, Blob>>,
    released_total: AtomicUsize,
    recent: Mutex<VecDeque<String>>,
}

#[derive(Clone)]
pub struct ObjectUrlRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("origin", &self.inner.origin)
            .field("live", &self.live_count())
            .finish()
    }
}

impl ObjectUrlRegistry {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                origin: origin.into(),
                ..Default::default()
            }),
        }
    }

    /// Register `blob` under a fresh `blob:<origin>/<uuid>` URL.
    pub fn create(&self, blob: Blob) -> ObjectUrl {
        let url = format!("{OBJECT_URL_SCHEME}{}/{}", self.inner.origin, Uuid::new_v4());
        debug!("object url created: {url} ({} bytes)", blob.len());
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.clone(), blob);
        ObjectUrl {
            handle: Arc::new(Handle {
                url,
                registry: self.clone(),
            }),
        }
    }

    /// The blob behind a live URL.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn live_count(&self) -> usize {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of URLs released since the registry was created.
    pub fn released_total(&self) -> usize {
        self.inner.released_total.load(Ordering::SeqCst)
    }

    /// The last [`RELEASE_HISTORY`] released URLs, oldest first.
    pub fn released(&self) -> Vec<String> {
        self.inner
            .recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// How often `url` appears among the recent releases.
    pub fn release_count(&self, url: &str) -> usize {
        self.inner
            .recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|released| released.as_str() == url)
            .count()
    }

    fn release(&self, url: &str) -> bool {
        if !is_object_url(url) {
            return false;
        }
        let removed = self
            .inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url)
            .is_some();
        if removed {
            self.inner.released_total.fetch_add(1, Ordering::SeqCst);
            let mut recent = self
                .inner
                .recent
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if recent.len() == RELEASE_HISTORY {
                recent.pop_front();
            }
            recent.push_back(url.to_string());
            debug!("object url released: {url}");
        }
        removed
    }
}

struct Handle {
    url: String,
    registry: ObjectUrlRegistry,
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.registry.release(&self.url);
    }
}

/// Shared handle to a registered blob.
#[derive(Clone)]
pub struct ObjectUrl {
    handle: Arc<Handle>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.handle.url
    }

    /// Identity, not content: two uploads of equal bytes are different handles.
    pub fn same_handle(&self, other: &ObjectUrl) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }

    pub fn resolve(&self) -> Option<Blob> {
        self.handle.registry.resolve(&self.handle.url)
    }
}

impl PartialEq for ObjectUrl {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}

impl Eq for ObjectUrl {}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.handle.url).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an image element points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Local(ObjectUrl),
    External(String),
}

impl ImageSource {
    pub fn external(url: impl Into<String>) -> Self {
        Self::External(url.into())
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Local(url) => url.as_str(),
            Self::External(url) => url,
        }
    }
}

impl From<ObjectUrl> for ImageSource {
    fn from(url: ObjectUrl) -> Self {
        Self::Local(url)
    }
}
