// ============================
// authkit-backend/src/storage.rs
// ============================
//! User store abstraction with in-memory and flat-file implementations.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs as tokio_fs;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

const USERS_FILE: &str = "users.json";

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// PHC formatted, salted password hash
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Everything needed to create a user; the store assigns id and join date
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl UserDraft {
    fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            date_joined: Utc::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username or email already taken")]
    Conflict,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn conflicts(existing: &User, draft: &UserDraft) -> bool {
    existing.username == draft.username || existing.email == draft.email
}

/// Trait for user persistence backends.
///
/// `create_user` must be atomic with respect to the uniqueness check so that
/// concurrent registrations of the same username or email create one row.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user, or `StoreError::Conflict` if the username or email is taken
    async fn create_user(&self, draft: UserDraft) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Process-local store, lost on restart
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, draft: UserDraft) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| conflicts(u, &draft)) {
            return Err(StoreError::Conflict);
        }
        let user = draft.into_user();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

/// Flat-file implementation of the `UserStore` trait.
///
/// All users live in `<root>/users.json`. The file is read once on open and
/// rewritten (temp file + rename) on every registration.
#[derive(Clone)]
pub struct FlatFileUserStore {
    path: PathBuf,
    users: Arc<Mutex<Vec<User>>>,
}

impl FlatFileUserStore {
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref();
        tokio_fs::create_dir_all(root).await?;
        let path = root.join(USERS_FILE);

        let users: Vec<User> = if tokio_fs::try_exists(&path).await? {
            let content = tokio_fs::read_to_string(&path).await?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        info!(path = %path.display(), count = users.len(), "opened user store");

        Ok(Self {
            path,
            users: Arc::new(Mutex::new(users)),
        })
    }

    async fn persist(&self, users: &[User]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(users)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn create_user(&self, draft: UserDraft) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| conflicts(u, &draft)) {
            return Err(StoreError::Conflict);
        }
        let user = draft.into_user();
        users.push(user.clone());
        if let Err(e) = self.persist(&users).await {
            users.pop();
            return Err(e);
        }
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}
