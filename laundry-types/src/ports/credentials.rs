//! Credential service port.

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token has been revoked")]
    Revoked,

    #[error("Could not issue token: {0}")]
    Issue(String),
}

/// Claims carried by a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the holder
    pub sub: String,
    pub role: Role,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issue time, seconds since the epoch
    pub iat: i64,
}

/// Issues, verifies and revokes bearer credentials.
pub trait CredentialService: Send + Sync + 'static {
    /// Issues a credential for `identity` acting as `role`.
    fn issue(&self, identity: &str, role: Role) -> Result<String, AuthError>;

    /// Verifies a credential, rejecting expired and revoked ones.
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;

    /// Revokes a credential until it would have expired anyway.
    fn revoke(&self, token: &str) -> Result<(), AuthError>;
}
