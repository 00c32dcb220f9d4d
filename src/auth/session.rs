//! Session state ownership
//!
//! Holds the one canonical current identity, or none. Only the authenticator
//! mutates it, and only after a confirmed backend operation; every other
//! component reads snapshots.

use crate::auth::types::Identity;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::RwLock;

/// Local persistent cache for the stable user key.
///
/// Stands in for the platform preference store of a real app; the
/// authenticator writes the key here on sign-in and clears it on sign-out.
pub trait KeyCache: Send + Sync {
    /// The cached key, if any.
    fn get(&self) -> Option<String>;
    /// Replace the cached key.
    fn set(&self, key: &str);
    /// Remove the cached key.
    fn clear(&self);
}

/// [`KeyCache`] backed by process memory, for tests and hosts without a
/// persistent preference store.
#[derive(Default)]
pub struct MemoryKeyCache {
    key: StdMutex<Option<String>>,
}

impl MemoryKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyCache for MemoryKeyCache {
    fn get(&self) -> Option<String> {
        self.key.lock().expect("key cache poisoned").clone()
    }

    fn set(&self, key: &str) {
        *self.key.lock().expect("key cache poisoned") = Some(key.to_owned());
    }

    fn clear(&self) {
        *self.key.lock().expect("key cache poisoned") = None;
    }
}

/// The current authenticated identity and its memoized stable key.
#[derive(Default)]
pub struct SessionState {
    current: RwLock<Option<Arc<Identity>>>,
    user_key: RwLock<Option<String>>,
}

impl SessionState {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current identity, if one is signed in.
    pub async fn current(&self) -> Option<Arc<Identity>> {
        self.current.read().await.clone()
    }

    /// The stable user key, if it has been resolved yet.
    ///
    /// Absent is a normal answer while resolution is pending; use
    /// [`Authenticator::resolve_user_key`](crate::auth::authenticator::Authenticator::resolve_user_key)
    /// to resolve and wait.
    pub async fn user_key(&self) -> Option<String> {
        self.user_key.read().await.clone()
    }

    pub(crate) async fn set_current(&self, identity: Arc<Identity>) {
        *self.current.write().await = Some(identity);
    }

    pub(crate) async fn set_user_key(&self, key: &str) {
        *self.user_key.write().await = Some(key.to_owned());
    }

    pub(crate) async fn clear(&self) {
        *self.current.write().await = None;
        *self.user_key.write().await = None;
    }
}
