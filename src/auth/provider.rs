//! Provider handshake normalization
//!
//! Each provider SDK runs its own UI-driven flow; here they are normalized to
//! one shape before they reach the authenticator: an async call resolving to
//! a [`Credential`] or a [`ProviderError`]. Apple keeps a two-phase shape
//! because its request must carry a hashed challenge issued beforehand.

use crate::auth::types::Credential;
use crate::error::ProviderError;
use async_trait::async_trait;

/// A provider-side authentication flow (Google, Facebook, ...).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the provider's sign-in flow and produce a credential.
    async fn authenticate(&self) -> Result<Credential, ProviderError>;
}

/// An Apple-style authorization flow.
///
/// The request carries the hashed challenge; the resolved authorization
/// carries the identity token the backend validates against the raw
/// challenge.
#[async_trait]
pub trait AppleIdentityProvider: Send + Sync {
    /// Dispatch the authorization request with the given hashed challenge.
    async fn request_authorization(
        &self,
        hashed_nonce: &str,
    ) -> Result<AppleAuthorization, ProviderError>;
}

/// Outgoing half of an Apple sign-in.
///
/// Carries only the hashed challenge for the provider request; the raw
/// challenge never leaves the authenticator.
#[derive(Debug, Clone)]
pub struct AppleChallenge {
    /// Hex-encoded SHA-256 digest to place in the authorization request
    pub hashed: String,
}

/// Completed Apple authorization callback payload.
#[derive(Debug, Clone)]
pub struct AppleAuthorization {
    /// Identity token returned by the authorization
    pub identity_token: String,
}
