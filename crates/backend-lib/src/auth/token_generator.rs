// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure random secret generation
Used to derive an ephemeral JWT signing secret when none is configured. */
use rand::{rngs::OsRng, RngCore};

/// Default secret size in bytes (48 bytes = 384 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 48;

/** Generate a cryptographically secure random token
# Returns
A base64 URL-safe encoded string without padding, long enough to serve as
an HS256 signing secret */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
