//! Identity and credential types

use serde::{Deserialize, Serialize};

/// The authenticated principal and its profile attributes.
///
/// Exactly one `Identity` is considered current at any time, or none. It is
/// owned by [`SessionState`](crate::auth::session::SessionState); other
/// components read `Arc<Identity>` snapshots and never mutate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable unique identifier assigned by the auth backend
    pub id: String,

    /// Display name (if the provider supplied one)
    pub display_name: Option<String>,

    /// Email address (if the provider supplied one)
    pub email: Option<String>,

    /// Phone number (if the provider supplied one)
    pub phone_number: Option<String>,

    /// Photo URL (if the provider supplied one)
    pub photo_url: Option<String>,

    /// Whether this is a temporary anonymous account
    #[serde(default)]
    pub is_anonymous: bool,
}

impl Identity {
    /// Create an identity with the given backend id and no profile attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            phone_number: None,
            photo_url: None,
            is_anonymous: false,
        }
    }
}

/// Proof of a successful provider-side authentication.
///
/// A credential is consumed exactly once: the authenticator takes it by value
/// and exchanges it for a backend session (or a link onto the current one).
/// It is never persisted.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Email and password credential
    EmailPassword {
        /// Email address
        email: String,
        /// Password
        password: String,
    },

    /// Google Sign-In credential
    Google {
        /// Google Sign-In ID token
        id_token: Option<String>,
        /// Google Sign-In access token
        access_token: Option<String>,
    },

    /// Facebook Login credential
    Facebook {
        /// Facebook access token
        access_token: String,
    },

    /// Sign in with Apple credential
    Apple {
        /// Apple identity token (OIDC)
        id_token: String,
        /// Raw challenge the identity token was requested with
        raw_nonce: Option<String>,
    },

    /// Anonymous credential
    Anonymous,
}

impl Credential {
    /// Get the provider ID for this credential
    pub fn provider_id(&self) -> &str {
        match self {
            Credential::EmailPassword { .. } => "password",
            Credential::Google { .. } => "google.com",
            Credential::Facebook { .. } => "facebook.com",
            Credential::Apple { .. } => "apple.com",
            Credential::Anonymous => "anonymous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_new_has_no_profile_attributes() {
        let identity = Identity::new("u1");

        assert_eq!(identity.id, "u1");
        assert!(identity.display_name.is_none());
        assert!(identity.email.is_none());
        assert!(identity.phone_number.is_none());
        assert!(identity.photo_url.is_none());
        assert!(!identity.is_anonymous);
    }

    #[test]
    fn test_credential_provider_ids() {
        let email = Credential::EmailPassword {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert_eq!(email.provider_id(), "password");

        let google = Credential::Google {
            id_token: Some("id_token".to_string()),
            access_token: None,
        };
        assert_eq!(google.provider_id(), "google.com");

        let facebook = Credential::Facebook {
            access_token: "token".to_string(),
        };
        assert_eq!(facebook.provider_id(), "facebook.com");

        let apple = Credential::Apple {
            id_token: "token".to_string(),
            raw_nonce: Some("nonce".to_string()),
        };
        assert_eq!(apple.provider_id(), "apple.com");

        assert_eq!(Credential::Anonymous.provider_id(), "anonymous");
    }

    #[test]
    fn test_identity_serialization_roundtrip() {
        let identity = Identity {
            id: "u1".to_string(),
            display_name: Some("Test User".to_string()),
            email: Some("test@example.com".to_string()),
            phone_number: None,
            photo_url: None,
            is_anonymous: false,
        };

        let json = serde_json::to_string(&identity).unwrap();
        let parsed: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, identity);
    }
}
