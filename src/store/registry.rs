//! Profile registration
//!
//! Persists one profile record per signed-in identity. Writes are
//! fire-and-forget from the sign-in flow's perspective: failures are logged
//! and counted here, never surfaced through lifecycle events.

use crate::auth::types::Identity;
use crate::error::StoreError;
use crate::store::types::{DocumentStore, ProfileRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Collection holding one profile record per signed-in identity.
const USERS_COLLECTION: &str = "users";

/// Writes and reads profile records keyed by backend user id.
pub struct UserRegistry {
    store: Arc<dyn DocumentStore>,
    write_failures: AtomicU64,
}

impl UserRegistry {
    /// Create a registry over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_failures: AtomicU64::new(0),
        }
    }

    /// Upsert the profile record for `identity`.
    ///
    /// Repeated calls overwrite the same logical record; a failed write is
    /// logged and counted but not reported to the caller.
    pub async fn register(&self, identity: &Identity) {
        let record = ProfileRecord::from(identity);
        if let Err(error) = self.put_record(&record).await {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            warn!(id = %identity.id, %error, "profile registration failed");
        }
    }

    /// Fetch the profile record for `identity`.
    ///
    /// An identity known to the auth backend but missing its record (a
    /// previous write was lost) is repaired here: the record is re-registered
    /// from the identity snapshot before answering.
    pub async fn fetch(&self, identity: &Identity) -> Result<ProfileRecord, StoreError> {
        if let Some(value) = self.store.get(USERS_COLLECTION, &identity.id).await? {
            let record = serde_json::from_value(value)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?;
            return Ok(record);
        }

        let record = ProfileRecord::from(identity);
        self.put_record(&record).await?;
        Ok(record)
    }

    /// Number of profile writes that have failed since construction.
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    async fn put_record(&self, record: &ProfileRecord) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(record).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.store.put(USERS_COLLECTION, &record.id, value).await
    }
}
