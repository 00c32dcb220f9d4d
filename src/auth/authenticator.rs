//! Sign-in vs. link resolution
//!
//! The authenticator is the decision core of the crate: it exchanges a
//! credential for either a fresh backend session or a link onto the current
//! one, persists the resulting profile record, and broadcasts the outcome as
//! a lifecycle event. Recoverable failures never cross the sign-in boundary
//! as errors; each flow terminates in exactly one published event, and entry
//! points return the emitted tag for convenience.

use crate::auth::backend::AuthBackend;
use crate::auth::events::{AuthEvent, EventBus};
use crate::auth::nonce::{self, Nonce};
use crate::auth::provider::{
    AppleAuthorization, AppleChallenge, AppleIdentityProvider, IdentityProvider,
};
use crate::auth::session::{KeyCache, SessionState};
use crate::auth::types::{Credential, Identity};
use crate::error::{AuthError, SignonError};
use crate::store::registry::UserRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Length of an Apple sign-in challenge, in characters.
const CHALLENGE_LENGTH: usize = 32;

/// Resolves credentials into sessions and broadcasts lifecycle events.
///
/// Constructed once by the composition root and shared by handle; it holds
/// no global state. Session mutation happens here and nowhere else, always
/// after a confirmed backend success.
pub struct Authenticator {
    backend: Arc<dyn AuthBackend>,
    registry: Arc<UserRegistry>,
    session: Arc<SessionState>,
    events: Arc<EventBus>,
    key_cache: Arc<dyn KeyCache>,
    // At most one outstanding Apple challenge per authenticator; a second
    // request is rejected while the slot is occupied.
    apple_challenge: Mutex<Option<Nonce>>,
}

impl Authenticator {
    /// Assemble an authenticator from its collaborators.
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        registry: Arc<UserRegistry>,
        session: Arc<SessionState>,
        events: Arc<EventBus>,
        key_cache: Arc<dyn KeyCache>,
    ) -> Self {
        Self {
            backend,
            registry,
            session,
            events,
            key_cache,
            apple_challenge: Mutex::new(None),
        }
    }

    /// The session state this authenticator owns.
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// The event bus lifecycle events are published on.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Snapshot of the current identity, if one is signed in.
    pub async fn current(&self) -> Option<Arc<Identity>> {
        self.session.current().await
    }

    /// Adopt the backend's persisted session, if any, without emitting
    /// events. Intended for process startup, before any sign-in flow runs.
    pub async fn restore_session(&self) -> Option<Arc<Identity>> {
        let identity = Arc::new(self.backend.current_identity().await?);
        self.session.set_current(Arc::clone(&identity)).await;
        Some(identity)
    }

    /// Create an email/password account and sign it in.
    pub async fn sign_up_with_email(&self, email: &str, password: &str) -> AuthEvent {
        if email.is_empty() || password.is_empty() {
            return self.publish(AuthEvent::SignInError);
        }
        let outcome = self.backend.create_account(email, password).await;
        self.finish_sign_in(outcome).await
    }

    /// Sign in to an existing email/password account.
    ///
    /// Email is a primary credential: it always establishes a session and
    /// never links onto an existing one.
    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthEvent {
        if email.is_empty() || password.is_empty() {
            return self.publish(AuthEvent::SignInError);
        }
        let outcome = self.backend.sign_in_with_password(email, password).await;
        self.finish_sign_in(outcome).await
    }

    /// Sign in with a temporary anonymous account.
    pub async fn sign_in_anonymously(&self) -> AuthEvent {
        let outcome = self.backend.sign_in_anonymously().await;
        self.finish_sign_in(outcome).await
    }

    /// Resolve `credential` into either a fresh sign-in or a link onto the
    /// current session, emitting exactly one lifecycle event.
    pub async fn sign_in_with_credential(&self, credential: Credential) -> AuthEvent {
        self.resolve_credential(credential).await
    }

    /// Resolve a Google Sign-In token pair.
    ///
    /// At least one of the tokens must be present for the backend to accept
    /// the credential.
    pub async fn sign_in_with_google(
        &self,
        id_token: Option<String>,
        access_token: Option<String>,
    ) -> AuthEvent {
        self.resolve_credential(Credential::Google {
            id_token,
            access_token,
        })
        .await
    }

    /// Resolve a Facebook Login access token.
    pub async fn sign_in_with_facebook(&self, access_token: impl Into<String>) -> AuthEvent {
        self.resolve_credential(Credential::Facebook {
            access_token: access_token.into(),
        })
        .await
    }

    /// Run `provider`'s handshake and resolve the credential it yields.
    pub async fn sign_in_with_provider(&self, provider: &dyn IdentityProvider) -> AuthEvent {
        match provider.authenticate().await {
            Ok(credential) => self.resolve_credential(credential).await,
            Err(error) => {
                warn!(%error, "provider handshake failed");
                self.publish(AuthEvent::SignInError)
            }
        }
    }

    /// Issue the challenge for an Apple sign-in request.
    ///
    /// The challenge is generated and stored before the provider request is
    /// dispatched, and consumed exactly once by
    /// [`complete_sign_in_with_apple`](Self::complete_sign_in_with_apple).
    /// Returns [`SignonError::ChallengeOutstanding`] if a previous request
    /// has not resolved yet; the stored challenge is never overwritten.
    pub async fn begin_sign_in_with_apple(&self) -> Result<AppleChallenge, SignonError> {
        let mut slot = self.apple_challenge.lock().await;
        if slot.is_some() {
            return Err(SignonError::ChallengeOutstanding);
        }

        let nonce = nonce::generate(CHALLENGE_LENGTH);
        let challenge = AppleChallenge {
            hashed: nonce.hashed().to_owned(),
        };
        *slot = Some(nonce);
        Ok(challenge)
    }

    /// Resolve a completed Apple authorization against the outstanding
    /// challenge.
    ///
    /// # Panics
    /// Panics if no challenge is outstanding: a callback that arrives without
    /// a matching request was routed to the wrong instance, which is a wiring
    /// defect rather than a sign-in failure.
    pub async fn complete_sign_in_with_apple(
        &self,
        authorization: AppleAuthorization,
    ) -> AuthEvent {
        let nonce = self.apple_challenge.lock().await.take();
        let Some(nonce) = nonce else {
            panic!("apple sign-in callback received, but no sign-in request was sent");
        };

        let credential = Credential::Apple {
            id_token: authorization.identity_token,
            raw_nonce: Some(nonce.raw().to_owned()),
        };
        self.resolve_credential(credential).await
    }

    /// Abandon any outstanding Apple challenge and report the flow as failed.
    ///
    /// For when the provider dialog errors or the user dismisses it.
    pub async fn cancel_sign_in_with_apple(&self) -> AuthEvent {
        self.apple_challenge.lock().await.take();
        self.publish(AuthEvent::SignInError)
    }

    /// Full Apple flow: issue a challenge, dispatch the provider request,
    /// and resolve the resulting authorization.
    ///
    /// Fails fast with [`SignonError::ChallengeOutstanding`] if another
    /// Apple request is in flight; provider and backend failures terminate
    /// in a lifecycle event instead.
    pub async fn sign_in_with_apple(
        &self,
        provider: &dyn AppleIdentityProvider,
    ) -> Result<AuthEvent, SignonError> {
        let challenge = self.begin_sign_in_with_apple().await?;
        match provider.request_authorization(&challenge.hashed).await {
            Ok(authorization) => Ok(self.complete_sign_in_with_apple(authorization).await),
            Err(error) => {
                warn!(%error, "apple authorization failed");
                Ok(self.cancel_sign_in_with_apple().await)
            }
        }
    }

    /// End the current session.
    ///
    /// Session state and the cached user key are cleared only after the
    /// backend confirms; on failure everything is left untouched.
    pub async fn sign_out(&self) -> AuthEvent {
        match self.backend.sign_out().await {
            Ok(()) => {
                self.session.clear().await;
                self.key_cache.clear();
                debug!("signed out");
                self.publish(AuthEvent::SignOutSuccess)
            }
            Err(error) => {
                warn!(%error, "sign-out failed");
                self.publish(AuthEvent::SignOutError)
            }
        }
    }

    /// Permanently delete the signed-in account on the backend.
    ///
    /// Emits no lifecycle event; callers usually follow up with
    /// [`sign_out`](Self::sign_out).
    pub async fn delete_account(&self) -> Result<(), SignonError> {
        self.backend.delete_current_identity().await?;
        Ok(())
    }

    /// The stable user key, if already resolved.
    pub async fn user_key(&self) -> Option<String> {
        self.session.user_key().await
    }

    /// Resolve the stable user key, waiting on the slower sources if needed:
    /// session memo, then the local key cache, then the profile record in
    /// the document store.
    pub async fn resolve_user_key(&self) -> Result<String, SignonError> {
        if let Some(key) = self.session.user_key().await {
            return Ok(key);
        }

        if let Some(key) = self.key_cache.get() {
            self.session.set_user_key(&key).await;
            return Ok(key);
        }

        let Some(identity) = self.session.current().await else {
            return Err(SignonError::NoSignedInUser);
        };
        let record = self.registry.fetch(&identity).await?;
        self.key_cache.set(&record.id);
        self.session.set_user_key(&record.id).await;
        Ok(record.id)
    }

    async fn resolve_credential(&self, credential: Credential) -> AuthEvent {
        // Email and anonymous credentials are primary: they always establish
        // a session and never attempt linking.
        let credential = match credential {
            Credential::EmailPassword { email, password } => {
                return self.sign_in_with_email(&email, &password).await;
            }
            Credential::Anonymous => return self.sign_in_anonymously().await,
            federated => federated,
        };

        if self.session.current().await.is_some() {
            match self.backend.link_credential(credential).await {
                Ok(identity) => {
                    debug!(id = %identity.id, "credential linked to current session");
                    self.publish(AuthEvent::LinkSuccess)
                }
                Err(error) => {
                    warn!(%error, "credential link failed");
                    self.publish(AuthEvent::LinkError)
                }
            }
        } else {
            let outcome = self.backend.sign_in_with_credential(credential).await;
            self.finish_sign_in(outcome).await
        }
    }

    async fn finish_sign_in(&self, outcome: Result<Identity, AuthError>) -> AuthEvent {
        match outcome {
            Ok(identity) => {
                let identity = Arc::new(identity);
                self.session.set_current(Arc::clone(&identity)).await;
                // Fire-and-forget: a lost profile write is logged and counted
                // by the registry, never rolled into the sign-in outcome.
                self.registry.register(&identity).await;
                self.key_cache.set(&identity.id);
                self.session.set_user_key(&identity.id).await;
                debug!(id = %identity.id, "signed in");
                self.publish(AuthEvent::SignInSuccess)
            }
            Err(error) => {
                warn!(%error, "sign-in failed");
                self.publish(AuthEvent::SignInError)
            }
        }
    }

    fn publish(&self, event: AuthEvent) -> AuthEvent {
        self.events.publish(event);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::MemoryAuthBackend;
    use crate::auth::provider::AppleAuthorization;
    use crate::auth::session::MemoryKeyCache;
    use crate::store::memory::MemoryDocumentStore;

    fn authenticator() -> Authenticator {
        let store = Arc::new(MemoryDocumentStore::new());
        Authenticator::new(
            Arc::new(MemoryAuthBackend::new()),
            Arc::new(UserRegistry::new(store)),
            Arc::new(SessionState::new()),
            Arc::new(EventBus::new()),
            Arc::new(MemoryKeyCache::new()),
        )
    }

    #[tokio::test]
    async fn test_empty_email_short_circuits_to_error() {
        let authenticator = authenticator();

        let outcome = authenticator.sign_in_with_email("", "secret").await;
        assert_eq!(outcome, AuthEvent::SignInError);

        let outcome = authenticator.sign_up_with_email("a@x.com", "").await;
        assert_eq!(outcome, AuthEvent::SignInError);

        assert!(authenticator.current().await.is_none());
    }

    #[tokio::test]
    async fn test_second_apple_request_rejected_while_outstanding() {
        let authenticator = authenticator();

        let first = authenticator.begin_sign_in_with_apple().await.unwrap();
        let second = authenticator.begin_sign_in_with_apple().await;
        assert!(matches!(second, Err(SignonError::ChallengeOutstanding)));

        // The first challenge is still the one that resolves.
        assert_eq!(first.hashed.len(), 64);
        let outcome = authenticator
            .complete_sign_in_with_apple(AppleAuthorization {
                identity_token: "apple-token".to_string(),
            })
            .await;
        assert_eq!(outcome, AuthEvent::SignInSuccess);
    }

    #[tokio::test]
    async fn test_cancel_clears_challenge_and_reports_error() {
        let authenticator = authenticator();

        authenticator.begin_sign_in_with_apple().await.unwrap();
        let outcome = authenticator.cancel_sign_in_with_apple().await;
        assert_eq!(outcome, AuthEvent::SignInError);

        // A new request may be issued once the slot is free again.
        assert!(authenticator.begin_sign_in_with_apple().await.is_ok());
    }

    #[tokio::test]
    #[should_panic(expected = "no sign-in request was sent")]
    async fn test_apple_callback_without_request_panics() {
        let authenticator = authenticator();
        authenticator
            .complete_sign_in_with_apple(AppleAuthorization {
                identity_token: "apple-token".to_string(),
            })
            .await;
    }

    #[tokio::test]
    async fn test_resolve_user_key_without_session_is_explicit() {
        let authenticator = authenticator();
        let result = authenticator.resolve_user_key().await;
        assert!(matches!(result, Err(SignonError::NoSignedInUser)));
    }
}
