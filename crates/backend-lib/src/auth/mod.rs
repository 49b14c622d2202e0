// ============================
// authkit-backend/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod token;
pub mod token_generator;
mod service;

pub use password::PasswordService;
pub use service::{CredentialHasher, TokenIssuer};
pub use token::{Claims, JwtIssuer, TokenError, TokenType};
pub use token_generator::generate_secure_token;
