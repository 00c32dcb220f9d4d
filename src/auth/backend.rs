//! Abstract auth backend interface

use crate::auth::types::{Credential, Identity};
use crate::error::AuthError;
use async_trait::async_trait;

/// Vendor-neutral authentication backend.
///
/// Every operation is asynchronous and reports success with an [`Identity`]
/// or a backend [`AuthError`]. Implementations track their own notion of the
/// signed-in account across calls; the authenticator mirrors it into
/// [`SessionState`](crate::auth::session::SessionState) only after a
/// confirmed success.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create a new email/password account and sign it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Sign in to an existing email/password account.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Identity, AuthError>;

    /// Exchange a federated credential for a session.
    async fn sign_in_with_credential(&self, credential: Credential) -> Result<Identity, AuthError>;

    /// Attach `credential` to the currently signed-in account.
    async fn link_credential(&self, credential: Credential) -> Result<Identity, AuthError>;

    /// Create and sign in a temporary anonymous account.
    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError>;

    /// End the current backend session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The account the backend considers signed in, if any.
    async fn current_identity(&self) -> Option<Identity>;

    /// Permanently delete the currently signed-in account.
    async fn delete_current_identity(&self) -> Result<(), AuthError>;
}
