//! Signon Rust SDK
//!
//! Federated sign-in orchestration: unifies email/password, Google,
//! Facebook, Apple, and anonymous sign-in behind one authenticator that
//! decides whether a credential establishes a new session or links onto the
//! current one, persists the resulting profile record, and broadcasts the
//! outcome as lifecycle events that drive navigation.
//!
//! The vendor services (auth backend, document store, provider SDKs) sit
//! behind async traits; in-memory implementations ship for tests and local
//! development.
//!
//! # Example (email/password)
//! ```
//! # async fn example() {
//! use std::sync::Arc;
//! use signon_rust_sdk::{
//!     AuthEvent, Authenticator, EventBus, MemoryAuthBackend, MemoryDocumentStore,
//!     MemoryKeyCache, SessionState, UserRegistry,
//! };
//!
//! let events = Arc::new(EventBus::new());
//! let authenticator = Authenticator::new(
//!     Arc::new(MemoryAuthBackend::new()),
//!     Arc::new(UserRegistry::new(Arc::new(MemoryDocumentStore::new()))),
//!     Arc::new(SessionState::new()),
//!     Arc::clone(&events),
//!     Arc::new(MemoryKeyCache::new()),
//! );
//!
//! events.subscribe(AuthEvent::SignInSuccess, |_| println!("signed in"));
//!
//! let outcome = authenticator.sign_up_with_email("user@example.com", "password").await;
//! assert_eq!(outcome, AuthEvent::SignInSuccess);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

// Auth module
pub mod auth {
    //! Sign-in orchestration

    pub mod authenticator;
    pub mod backend;
    pub mod events;
    pub mod memory;
    pub mod nonce;
    pub mod provider;
    pub mod session;
    pub mod types;
}

// Store module
pub mod store {
    //! Document store boundary

    pub mod memory;
    pub mod registry;
    pub mod types;
}

pub mod routing;

// Re-exports for convenience
pub use error::{AuthError, ProviderError, SignonError, StoreError};

// Auth re-exports
pub use auth::{
    authenticator::Authenticator,
    backend::AuthBackend,
    events::{AuthEvent, EventBus, SubscriberId},
    memory::MemoryAuthBackend,
    provider::{AppleAuthorization, AppleChallenge, AppleIdentityProvider, IdentityProvider},
    session::{KeyCache, MemoryKeyCache, SessionState},
    types::{Credential, Identity},
};

// Store re-exports
pub use store::{
    memory::MemoryDocumentStore,
    registry::UserRegistry,
    types::{DocumentStore, ProfileRecord},
};

// Routing re-exports
pub use routing::{Screen, ViewRouter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types_exist() {
        // Basic smoke test
        let _err: SignonError = AuthError::InvalidEmail.into();
    }
}
