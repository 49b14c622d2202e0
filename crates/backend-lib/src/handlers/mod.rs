//! HTTP request handlers.

pub mod auth;

pub use auth::{login, register};
