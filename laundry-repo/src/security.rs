//! Password hashing for staff accounts.
//!
//! Stored form is the standard bcrypt string (`$2b$<cost>$<salt+hash>`), so
//! the salt and work factor travel with each hash.

/// Work factor for new hashes. Existing hashes keep the cost they were made with.
pub const PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;

/// Hashes a password with a fresh random salt.
///
/// CPU-bound; call it off the async executor.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, PASSWORD_COST)
}

/// Verifies a password against a stored hash. A malformed hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}
