use authkit_common::TokenPair;

use crate::error::AppError;
use crate::storage::User;

/// Hashes new passwords and checks presented ones.
///
/// Implementations are CPU bound; callers run them on the blocking pool.
pub trait CredentialHasher: Send + Sync {
    fn hash_password(&self, plain: &str) -> Result<String, AppError>;
    fn verify_password(&self, hash: &str, plain: &str) -> bool;
}

/// Mints a fresh access/refresh pair for a user.
pub trait TokenIssuer: Send + Sync {
    fn issue_for(&self, user: &User) -> Result<TokenPair, AppError>;
}
