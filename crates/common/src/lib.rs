// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the `authkit` server and its clients.
//! This module defines the JSON bodies of the register and login endpoints
//! and the uniform error envelope returned on every failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name -> list of human readable problems with that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Body of `POST /register/`
///
/// Fields are kept as raw JSON values so that a missing field, an explicit
/// `null` and a value of the wrong type are each reported per field by
/// validation instead of rejecting the whole body.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "present")]
    pub username: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Value>,
}

/// Body of `POST /login/`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub password: Option<Value>,
}

/// `None` only when the key is absent; an explicit `null` is `Some(Value::Null)`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Access + refresh token pair returned on successful register or login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived token presented on each request
    pub access: String,
    /// Longer-lived token used to mint new access tokens
    pub refresh: String,
}

/// The `message` member of an error envelope
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// A single human readable sentence
    Detail(String),
    /// Per-field validation problems
    Fields(FieldErrors),
}

impl ErrorMessage {
    /// The detail sentence, if this is not a field map
    pub fn as_detail(&self) -> Option<&str> {
        match self {
            ErrorMessage::Detail(s) => Some(s),
            ErrorMessage::Fields(_) => None,
        }
    }

    /// The field map, if this is a validation message
    pub fn as_fields(&self) -> Option<&FieldErrors> {
        match self {
            ErrorMessage::Detail(_) => None,
            ErrorMessage::Fields(f) => Some(f),
        }
    }
}

impl From<String> for ErrorMessage {
    fn from(s: String) -> Self {
        ErrorMessage::Detail(s)
    }
}

impl From<&str> for ErrorMessage {
    fn from(s: &str) -> Self {
        ErrorMessage::Detail(s.to_string())
    }
}

impl From<FieldErrors> for ErrorMessage {
    fn from(f: FieldErrors) -> Self {
        ErrorMessage::Fields(f)
    }
}

/// Uniform JSON body of every non-2xx response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// When the error was produced (RFC 3339, UTC)
    pub timestamp: DateTime<Utc>,
    /// HTTP status code
    pub status: u16,
    /// Short label, e.g. "Bad Request"
    pub error: String,
    /// Detail sentence or field errors
    pub message: ErrorMessage,
    /// Path of the request that failed
    pub path: String,
}

impl ErrorEnvelope {
    /// Build an envelope stamped with an explicit time
    pub fn new(
        path: impl Into<String>,
        status: u16,
        error: impl Into<String>,
        message: impl Into<ErrorMessage>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            status,
            error: error.into(),
            message: message.into(),
            path: path.into(),
        }
    }
}
