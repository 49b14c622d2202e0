// ============================
// authkit-backend/src/auth/password.rs
// ============================
//! Password hashing and verification.
use anyhow::anyhow;
use argon2::{Argon2, Params as Argon2Params, Version};
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Params as ScryptParams, Scrypt,
};

use crate::auth::CredentialHasher;
use crate::config::{HashAlgorithm, HashingSettings};
use crate::error::AppError;

/// Hashes with the configured algorithm, verifies scrypt and Argon2id alike
#[derive(Clone)]
pub struct PasswordService {
    algorithm: HashAlgorithm,
    scrypt: ScryptParams,
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Build a hasher from settings
    pub fn new(settings: &HashingSettings) -> anyhow::Result<Self> {
        let scrypt = ScryptParams::new(
            settings.scrypt_log_n,
            ScryptParams::RECOMMENDED_R,
            ScryptParams::RECOMMENDED_P,
            ScryptParams::RECOMMENDED_LEN,
        )
        .map_err(|e| anyhow!("invalid scrypt parameters: {e}"))?;

        let argon2_params = Argon2Params::new(
            settings.argon2_memory_kib,
            settings.argon2_iterations,
            Argon2Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;

        Ok(Self {
            algorithm: settings.algorithm,
            scrypt,
            argon2: Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params),
        })
    }
}

impl CredentialHasher for PasswordService {
    fn hash_password(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = match self.algorithm {
            HashAlgorithm::Scrypt => {
                Scrypt.hash_password_customized(plain.as_bytes(), None, None, self.scrypt, &salt)
            },
            HashAlgorithm::Argon2 => self.argon2.hash_password(plain.as_bytes(), &salt),
        }
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, hash: &str, plain: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        let verifiers: [&dyn PasswordVerifier; 2] = [&Scrypt, &self.argon2];
        parsed_hash.verify_password(&verifiers, plain).is_ok()
    }
}
