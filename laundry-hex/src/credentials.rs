//! JWT bearer credentials with an explicit revocation list.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use laundry_types::{AuthError, Claims, CredentialService, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Revocation list
// ─────────────────────────────────────────────────────────────────────────────

/// Tokens revoked before their natural expiry.
///
/// Each entry lives only until the token's own `exp`; after that the
/// signature check rejects the token anyway. Expired entries are pruned
/// whenever a token is revoked and dropped lazily when looked up.
#[derive(Debug, Default)]
pub struct RevocationList {
    entries: RwLock<HashMap<String, i64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revokes `token` until `expires_at` (seconds since the epoch).
    pub fn revoke(&self, token: &str, expires_at: i64) {
        let now = Utc::now().timestamp();
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|_, exp| *exp > now);
        if expires_at > now {
            entries.insert(token.to_string(), expires_at);
        }
    }

    /// Returns true while `token` is revoked and not yet expired.
    pub fn is_revoked(&self, token: &str) -> bool {
        let now = Utc::now().timestamp();
        let expires_at = {
            let entries = match self.entries.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match entries.get(token) {
                Some(exp) => *exp,
                None => return false,
            }
        };

        if expires_at > now {
            return true;
        }

        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.remove(token);
        false
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JWT credentials
// ─────────────────────────────────────────────────────────────────────────────

/// HS256 credential service.
pub struct JwtCredentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    revoked: Arc<RevocationList>,
}

impl JwtCredentials {
    /// Creates a credential service signing with `secret`.
    pub fn new(secret: &str, ttl: Duration, revoked: Arc<RevocationList>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            revoked,
        }
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Invalid("token expired".into()),
                _ => AuthError::Invalid(e.to_string()),
            })
    }
}

impl CredentialService for JwtCredentials {
    fn issue(&self, identity: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.to_string(),
            role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token)?;
        if self.revoked.is_revoked(token) {
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.decode(token)?;
        self.revoked.revoke(token, claims.exp);
        tracing::debug!(sub = %claims.sub, "Token revoked");
        Ok(())
    }
}
