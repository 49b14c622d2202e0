// ============================
// authkit-backend/src/lib.rs
// ============================
//! Core backend functionality for the `authkit` registration and login API.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{CredentialHasher, JwtIssuer, PasswordService, TokenIssuer};
use crate::config::{Settings, StorageBackend};
use crate::storage::{FlatFileUserStore, InMemoryUserStore, UserStore};

pub use crate::error::{format_error, AppError};
pub use crate::router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// User persistence
    pub users: Arc<dyn UserStore>,
    /// Password hashing
    pub hasher: Arc<dyn CredentialHasher>,
    /// Token issuance
    pub tokens: Arc<dyn TokenIssuer>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create the application state from settings
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let users: Arc<dyn UserStore> = match settings.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryUserStore::new()),
            StorageBackend::File => Arc::new(FlatFileUserStore::open(&settings.storage.path).await?),
        };
        let hasher = Arc::new(PasswordService::new(&settings.hashing)?);
        let tokens = Arc::new(JwtIssuer::from_settings(&settings.jwt));

        Ok(Self::with_parts(users, hasher, tokens, settings))
    }

    /// Assemble state from explicit collaborators
    pub fn with_parts(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
        settings: Settings,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            settings: Arc::new(settings),
        }
    }
}
