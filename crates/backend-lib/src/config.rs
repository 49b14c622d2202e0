// ============================
// authkit-backend/src/config.rs
// ============================
//! Configuration management.
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Prefix of environment variables that override file settings
pub const ENV_PREFIX: &str = "AUTHKIT_";

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "authkit.toml";

/// Shortest accepted JWT signing secret, in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Longest password accepted at registration
pub const MAX_PASSWORD_LENGTH: usize = 128;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// User store selection
    pub storage: StorageSettings,
    /// Token issuance
    pub jwt: JwtSettings,
    /// Password hashing cost and algorithm
    pub hashing: HashingSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

/// Where users are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Directory of the flat-file store
    pub path: PathBuf,
}

/// JWT signing settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    /// HS256 signing secret. When unset an ephemeral one is generated at startup.
    pub secret: Option<String>,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

// keep the secret out of logs
impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Scrypt,
    Argon2,
}

/// Password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    /// Algorithm used for new hashes; verification accepts either
    pub algorithm: HashAlgorithm,
    /// scrypt CPU/memory cost as a power of two
    pub scrypt_log_n: u8,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    /// Argon2 number of passes
    pub argon2_iterations: u32,
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            storage: StorageSettings::default(),
            jwt: JwtSettings::default(),
            hashing: HashingSettings::default(),
            password_requirements: PasswordRequirements::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: PathBuf::from("data"),
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: None,
            access_ttl_secs: 5 * 60,
            refresh_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Scrypt,
            scrypt_log_n: 15,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl Settings {
    /// Load settings from `authkit.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        let settings: Settings = Self::figment(None).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an explicit config file, then the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        let settings: Settings = Self::figment(Some(path)).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, then the config file, then `AUTHKIT_*` variables
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Settings::default()));

        let figment = match path {
            Some(p) => match p.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(p)),
                Some("json") => figment.merge(Json::file(p)),
                _ => figment.merge(Toml::file(p)),
            },
            None => figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        };

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!("invalid log level '{}'", self.log_level);
        }

        if self.jwt.access_ttl_secs == 0 || self.jwt.refresh_ttl_secs == 0 {
            bail!("token lifetimes must be greater than zero");
        }

        if self.jwt.access_ttl_secs > MAX_TOKEN_TTL_SECS || self.jwt.refresh_ttl_secs > MAX_TOKEN_TTL_SECS {
            bail!("token lifetimes must not exceed {MAX_TOKEN_TTL_SECS} seconds");
        }

        if let Some(secret) = &self.jwt.secret {
            if secret.len() < MIN_JWT_SECRET_LENGTH {
                bail!("JWT secret must be at least {MIN_JWT_SECRET_LENGTH} bytes");
            }
        }

        let min_length = self.password_requirements.min_length;
        if min_length == 0 || min_length > MAX_PASSWORD_LENGTH {
            bail!("password min_length must be between 1 and {MAX_PASSWORD_LENGTH}");
        }

        if !(1..=20).contains(&self.hashing.scrypt_log_n) {
            bail!("scrypt_log_n must be between 1 and 20");
        }

        if self.hashing.argon2_memory_kib < 8 || self.hashing.argon2_iterations == 0 {
            bail!("argon2 needs at least 8 KiB of memory and one iteration");
        }

        Ok(())
    }
}
