//! Locally resolvable preview references.
//!
//! A [`PreviewHandle`] plays the role of an object URL: a short string
//! (`blob:depth-lens/<uuid>`) that resolves to the in-memory bytes of the
//! selected file through the [`PreviewStore`] that issued it. Dropping the
//! handle revokes the reference, so ownership of the handle is ownership of
//! the preview.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

const URL_PREFIX: &str = "blob:depth-lens/";

/// Registry of live preview references.
///
/// Cloning the store is cheap and every clone sees the same registry.
#[derive(Clone, Default)]
pub struct PreviewStore {
    entries: Arc<Mutex<HashMap<Uuid, Bytes>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `bytes` and returns the handle that owns the new reference.
    pub fn create(&self, bytes: Bytes) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.lock().insert(id, bytes);
        debug!(preview = %id, "preview reference created");

        PreviewHandle {
            id,
            url: format!("{URL_PREFIX}{id}"),
            store: self.clone(),
        }
    }

    /// Looks up the bytes behind a preview URL.
    ///
    /// Returns `None` for revoked or foreign references.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        let id = url.strip_prefix(URL_PREFIX)?.parse::<Uuid>().ok()?;
        self.lock().get(&id).cloned()
    }

    /// Number of references that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, id: Uuid) {
        if self.lock().remove(&id).is_some() {
            debug!(preview = %id, "preview reference revoked");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Bytes>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for PreviewStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewStore")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Exclusive owner of one preview reference. Revoked on drop.
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    store: PreviewStore,
}

impl PreviewHandle {
    /// The locally resolvable URL of this preview.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The bytes behind this handle.
    pub fn bytes(&self) -> Option<Bytes> {
        self.store.resolve(&self.url)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.revoke(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_resolves_until_dropped() {
        let store = PreviewStore::new();
        let handle = store.create(Bytes::from_static(b"pixels"));
        let url = handle.url().to_string();

        assert!(url.starts_with("blob:depth-lens/"));
        assert_eq!(store.resolve(&url).as_deref(), Some(&b"pixels"[..]));
        assert_eq!(handle.bytes(), store.resolve(&url));
        assert_eq!(store.live_count(), 1);

        drop(handle);
        assert!(store.resolve(&url).is_none());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn foreign_urls_do_not_resolve() {
        let store = PreviewStore::new();
        let _handle = store.create(Bytes::from_static(b"pixels"));

        assert!(store.resolve("https://example.com/a.png").is_none());
        assert!(store.resolve("blob:depth-lens/not-a-uuid").is_none());
        assert!(store.resolve(&format!("blob:depth-lens/{}", Uuid::new_v4())).is_none());
    }

    #[test]
    fn each_handle_is_distinct() {
        let store = PreviewStore::new();
        let a = store.create(Bytes::from_static(b"a"));
        let b = store.create(Bytes::from_static(b"b"));
        assert_ne!(a.url(), b.url());
        assert_eq!(store.live_count(), 2);
    }
}
