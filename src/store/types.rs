//! Document store interface and record shapes

use crate::auth::types::Identity;
use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// External document store capability: idempotent upserts and point reads,
/// keyed by collection and document id.
///
/// The crate owns no store implementation beyond the in-memory one; a real
/// deployment adapts its database SDK behind this trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upsert `record` at `collection/id`. Last write wins.
    async fn put(&self, collection: &str, id: &str, record: Value) -> Result<(), StoreError>;

    /// Fetch the record at `collection/id`, if present.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
}

/// Canonical profile record persisted for every signed-in identity, keyed by
/// the backend user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Backend user id the record is keyed by
    pub id: String,

    /// Display name at registration time
    pub display_name: Option<String>,

    /// Email address at registration time
    pub email: Option<String>,

    /// Phone number at registration time
    pub phone_number: Option<String>,

    /// Photo URL at registration time
    pub photo_url: Option<String>,
}

impl From<&Identity> for ProfileRecord {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            phone_number: identity.phone_number.clone(),
            photo_url: identity.photo_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_record_from_identity() {
        let identity = Identity {
            id: "u1".to_string(),
            display_name: None,
            email: Some("a@x.com".to_string()),
            phone_number: None,
            photo_url: None,
            is_anonymous: false,
        };

        let record = ProfileRecord::from(&identity);
        assert_eq!(record.id, "u1");
        assert_eq!(record.email.as_deref(), Some("a@x.com"));
        assert!(record.display_name.is_none());
    }

    #[test]
    fn test_profile_record_serializes_camel_case() {
        let record = ProfileRecord {
            id: "u1".to_string(),
            display_name: Some("Test User".to_string()),
            email: None,
            phone_number: None,
            photo_url: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "u1");
        assert_eq!(value["displayName"], "Test User");
        assert!(value["phoneNumber"].is_null());
        assert!(value["photoUrl"].is_null());
    }
}
