//! In-memory auth backend
//!
//! Backed by process-local state, for tests and local development. Federated
//! credentials auto-provision an account on first sign-in, the way hosted
//! identity platforms behave.

use crate::auth::backend::AuthBackend;
use crate::auth::types::{Credential, Identity};
use crate::error::AuthError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// [`AuthBackend`] backed by process-local state.
#[derive(Default)]
pub struct MemoryAuthBackend {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    /// email -> account
    accounts: HashMap<String, PasswordAccount>,
    /// credential key -> owning identity
    federated: HashMap<String, Identity>,
    /// identity id -> linked provider ids
    links: HashMap<String, Vec<String>>,
    current: Option<Identity>,
    fail_next: Option<AuthError>,
}

struct PasswordAccount {
    password: String,
    identity: Identity,
}

impl MemoryAuthBackend {
    /// Create an empty backend with no accounts and no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `error` to be returned by the next backend operation.
    pub async fn fail_next(&self, error: AuthError) {
        self.state.lock().await.fail_next = Some(error);
    }

    /// Provider ids linked to the identity with `id`, in link order.
    pub async fn linked_providers(&self, id: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .links
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    fn credential_key(credential: &Credential) -> Result<String, AuthError> {
        match credential {
            Credential::Google {
                id_token,
                access_token,
            } => {
                let token = id_token
                    .as_deref()
                    .or(access_token.as_deref())
                    .ok_or_else(|| {
                        AuthError::InvalidCredential(
                            "Google credential requires id_token or access_token".to_string(),
                        )
                    })?;
                Ok(format!("google.com:{token}"))
            }
            Credential::Facebook { access_token } => Ok(format!("facebook.com:{access_token}")),
            Credential::Apple { id_token, .. } => Ok(format!("apple.com:{id_token}")),
            Credential::EmailPassword { .. } | Credential::Anonymous => {
                Err(AuthError::InvalidCredential(
                    "email and anonymous sign-in use their dedicated operations".to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl AuthBackend for MemoryAuthBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        if state.accounts.contains_key(email) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            display_name: None,
            email: Some(email.to_owned()),
            phone_number: None,
            photo_url: None,
            is_anonymous: false,
        };
        state.accounts.insert(
            email.to_owned(),
            PasswordAccount {
                password: password.to_owned(),
                identity: identity.clone(),
            },
        );
        state.current = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        let Some(account) = state.accounts.get(email) else {
            return Err(AuthError::UserNotFound);
        };
        if account.password != password {
            return Err(AuthError::WrongPassword);
        }

        let identity = account.identity.clone();
        state.current = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_in_with_credential(&self, credential: Credential) -> Result<Identity, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        let key = Self::credential_key(&credential)?;

        let identity = match state.federated.get(&key) {
            Some(identity) => identity.clone(),
            None => {
                let identity = Identity::new(Uuid::new_v4().to_string());
                state.federated.insert(key, identity.clone());
                identity
            }
        };
        state.current = Some(identity.clone());
        Ok(identity)
    }

    async fn link_credential(&self, credential: Credential) -> Result<Identity, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        let key = Self::credential_key(&credential)?;
        let Some(current) = state.current.clone() else {
            return Err(AuthError::NoSignedInUser);
        };
        if let Some(owner) = state.federated.get(&key) {
            if owner.id != current.id {
                return Err(AuthError::AccountExistsWithDifferentCredential);
            }
        }

        state.federated.insert(key, current.clone());
        state
            .links
            .entry(current.id.clone())
            .or_default()
            .push(credential.provider_id().to_owned());
        Ok(current)
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        let mut identity = Identity::new(Uuid::new_v4().to_string());
        identity.is_anonymous = true;
        state.current = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        state.current = None;
        Ok(())
    }

    async fn current_identity(&self) -> Option<Identity> {
        self.state.lock().await.current.clone()
    }

    async fn delete_current_identity(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        let Some(current) = state.current.take() else {
            return Err(AuthError::NoSignedInUser);
        };

        state.accounts.retain(|_, account| account.identity.id != current.id);
        state.federated.retain(|_, identity| identity.id != current.id);
        state.links.remove(&current.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_account_rejects_duplicate_email() {
        let backend = MemoryAuthBackend::new();
        backend.create_account("a@x.com", "secret").await.unwrap();

        let result = backend.create_account("a@x.com", "other").await;
        assert_eq!(result.unwrap_err(), AuthError::EmailAlreadyInUse);
    }

    #[tokio::test]
    async fn test_sign_in_with_password_checks_credentials() {
        let backend = MemoryAuthBackend::new();
        let created = backend.create_account("a@x.com", "secret").await.unwrap();

        let signed_in = backend.sign_in_with_password("a@x.com", "secret").await.unwrap();
        assert_eq!(signed_in.id, created.id);

        let wrong = backend.sign_in_with_password("a@x.com", "nope").await;
        assert_eq!(wrong.unwrap_err(), AuthError::WrongPassword);

        let missing = backend.sign_in_with_password("b@x.com", "secret").await;
        assert_eq!(missing.unwrap_err(), AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn test_federated_credential_auto_provisions_once() {
        let backend = MemoryAuthBackend::new();
        let credential = Credential::Google {
            id_token: Some("g-token".to_string()),
            access_token: None,
        };

        let first = backend
            .sign_in_with_credential(credential.clone())
            .await
            .unwrap();
        let second = backend.sign_in_with_credential(credential).await.unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_link_requires_session() {
        let backend = MemoryAuthBackend::new();
        let result = backend
            .link_credential(Credential::Facebook {
                access_token: "fb-token".to_string(),
            })
            .await;

        assert_eq!(result.unwrap_err(), AuthError::NoSignedInUser);
    }

    #[tokio::test]
    async fn test_link_rejects_credential_owned_by_other_account() {
        let backend = MemoryAuthBackend::new();
        let credential = Credential::Facebook {
            access_token: "fb-token".to_string(),
        };

        // First account claims the credential.
        backend
            .sign_in_with_credential(credential.clone())
            .await
            .unwrap();

        // Second account tries to link the same credential.
        backend.create_account("a@x.com", "secret").await.unwrap();
        let result = backend.link_credential(credential).await;

        assert_eq!(
            result.unwrap_err(),
            AuthError::AccountExistsWithDifferentCredential
        );
    }

    #[tokio::test]
    async fn test_link_records_provider() {
        let backend = MemoryAuthBackend::new();
        let identity = backend.create_account("a@x.com", "secret").await.unwrap();

        backend
            .link_credential(Credential::Facebook {
                access_token: "fb-token".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            backend.linked_providers(&identity.id).await,
            vec!["facebook.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_anonymous_identity_is_flagged() {
        let backend = MemoryAuthBackend::new();
        let identity = backend.sign_in_anonymously().await.unwrap();
        assert!(identity.is_anonymous);
    }

    #[tokio::test]
    async fn test_delete_removes_account_and_session() {
        let backend = MemoryAuthBackend::new();
        backend.create_account("a@x.com", "secret").await.unwrap();

        backend.delete_current_identity().await.unwrap();

        assert!(backend.current_identity().await.is_none());
        let result = backend.sign_in_with_password("a@x.com", "secret").await;
        assert_eq!(result.unwrap_err(), AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn test_fail_next_consumed_once() {
        let backend = MemoryAuthBackend::new();
        backend
            .fail_next(AuthError::NetworkRequestFailed("offline".to_string()))
            .await;

        let failed = backend.create_account("a@x.com", "secret").await;
        assert!(failed.is_err());

        let ok = backend.create_account("a@x.com", "secret").await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_email_credential_rejected_by_credential_exchange() {
        let backend = MemoryAuthBackend::new();
        let result = backend
            .sign_in_with_credential(Credential::EmailPassword {
                email: "a@x.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert!(matches!(
            result.unwrap_err(),
            AuthError::InvalidCredential(_)
        ));
    }
}
