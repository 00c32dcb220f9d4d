//! Signon error types
//!
//! Provides a unified error type hierarchy for all sign-in operations.
//!
//! # Design
//! Uses thiserror for ergonomic error definitions. All errors implement
//! std::error::Error and can be converted to SignonError via From trait.

use thiserror::Error;

/// Top-level signon error type
///
/// Wraps specific error types (Auth, Store, Provider) into a unified type.
/// Supports conversion from all module-specific errors via `From` trait.
///
/// # Example
/// ```
/// use signon_rust_sdk::{SignonError, AuthError};
///
/// let auth_err: SignonError = AuthError::InvalidEmail.into();
/// ```
#[derive(Debug, Error)]
pub enum SignonError {
    /// Auth-backend errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Document-store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Provider handshake errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A sign-in challenge is already in flight on this authenticator
    #[error("A sign-in challenge is already outstanding")]
    ChallengeOutstanding,

    /// No user is currently signed in
    #[error("No user is currently signed in")]
    NoSignedInUser,

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Auth-backend errors
///
/// The vendor-neutral failure modes an authentication backend can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email address is invalid
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password is invalid
    #[error("Invalid password")]
    InvalidPassword,

    /// Email already in use by another account
    #[error("Email already in use")]
    EmailAlreadyInUse,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Wrong password
    #[error("Wrong password")]
    WrongPassword,

    /// User account has been disabled
    #[error("User account disabled")]
    UserDisabled,

    /// Too many failed attempts
    #[error("Too many requests, try again later")]
    TooManyRequests,

    /// Operation not allowed (e.g., provider disabled)
    #[error("Operation not allowed")]
    OperationNotAllowed,

    /// Invalid credential
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Account exists with different credential
    #[error("Account exists with different credential")]
    AccountExistsWithDifferentCredential,

    /// Network error
    #[error("Network error: {0}")]
    NetworkRequestFailed(String),

    /// No signed-in user
    #[error("No user is currently signed in")]
    NoSignedInUser,

    /// Unknown error
    #[error("Unknown auth error: {0}")]
    Unknown(String),
}

/// Document-store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Record not found
    #[error("Record not found")]
    NotFound,

    /// Permission denied
    #[error("Permission denied")]
    PermissionDenied,

    /// Store unavailable
    #[error("Store unavailable")]
    Unavailable,

    /// Invalid record data
    #[error("Invalid record data: {0}")]
    InvalidData(String),

    /// Internal store error
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Provider handshake errors
///
/// Failures from a provider's own UI-driven sign-in flow, normalized to one
/// shape before they reach the authenticator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The user dismissed the provider's dialog
    #[error("Sign-in cancelled")]
    Cancelled,

    /// The provider SDK failed to produce a credential
    #[error("Provider failed: {0}")]
    Failed(String),
}

impl SignonError {
    /// Create an internal error from a string
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::NetworkRequestFailed(_))
                | Self::Auth(AuthError::TooManyRequests)
                | Self::Store(StoreError::Unavailable)
        )
    }

    /// Check if error indicates authentication is required
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::NoSignedInUser) | Self::NoSignedInUser
        )
    }
}
