// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const REGISTER_SUCCESS: &str = "auth.register.success";
pub const REGISTER_CONFLICT: &str = "auth.register.conflict";
pub const REGISTER_INVALID: &str = "auth.register.invalid";
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const ERROR_INTERNAL: &str = "auth.error.internal";
