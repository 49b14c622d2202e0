// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request payload validation.
//!
//! Each validator either returns the cleaned input or every problem it found,
//! keyed by field name.

use authkit_common::{FieldErrors, LoginRequest, RegisterRequest};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use zeroize::Zeroizing;

use crate::config::{PasswordRequirements, MAX_PASSWORD_LENGTH};

const MAX_USERNAME_LENGTH: usize = 150;
const MAX_NAME_LENGTH: usize = 150;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());
// Dot-separated atoms on the left; on the right, labels that neither start
// nor end with a hyphen, then an alphabetic TLD
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9_%+-]+(?:\.[a-zA-Z0-9_%+-]+)*@(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$",
    )
    .unwrap()
});

/// Validated registration input
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub first_name: String,
    pub last_name: String,
}

/// Validated login input
pub struct LoginCredentials {
    pub email: String,
    pub password: Zeroizing<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// A raw JSON field after type checking
enum Text {
    Absent,
    Present(String),
    /// null or a non-scalar; the problem is already recorded
    Rejected,
}

fn text(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Text {
    match value {
        None => Text::Absent,
        Some(Value::String(s)) => Text::Present(s),
        // numbers are taken in their JSON spelling, booleans are not
        Some(Value::Number(n)) => Text::Present(n.to_string()),
        Some(Value::Null) => {
            push(errors, field, NULL);
            Text::Rejected
        },
        Some(_) => {
            push(errors, field, NOT_A_STRING);
            Text::Rejected
        },
    }
}

/// Present and not blank; `trim` strips surrounding whitespace from the result
fn required(errors: &mut FieldErrors, field: &str, value: Option<Value>, trim: bool) -> Option<String> {
    match text(errors, field, value) {
        Text::Absent => {
            push(errors, field, REQUIRED);
            None
        },
        Text::Rejected => None,
        Text::Present(v) if v.trim().is_empty() => {
            push(errors, field, BLANK);
            None
        },
        Text::Present(v) if trim => Some(v.trim().to_string()),
        Text::Present(v) => Some(v),
    }
}

fn check_max(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        push(errors, field, max_length_message(max));
        return false;
    }
    true
}

/// Lowercase the domain part, leave the local part alone
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn check_email(errors: &mut FieldErrors, value: Option<Value>) -> Option<String> {
    let email = required(errors, "email", value, true)?;
    if !check_max(errors, "email", &email, MAX_EMAIL_LENGTH) {
        return None;
    }
    if !EMAIL_REGEX.is_match(&email) {
        push(errors, "email", INVALID_EMAIL);
        return None;
    }
    Some(normalize_email(&email))
}

fn optional_name(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> String {
    let name = match text(errors, field, value) {
        Text::Present(v) => v.trim().to_string(),
        Text::Absent | Text::Rejected => String::new(),
    };
    check_max(errors, field, &name, MAX_NAME_LENGTH);
    name
}

/// Validate a registration payload
pub fn validate_register(
    req: RegisterRequest,
    requirements: &PasswordRequirements,
) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = required(&mut errors, "username", req.username, true).filter(|username| {
        if !check_max(&mut errors, "username", username, MAX_USERNAME_LENGTH) {
            return false;
        }
        if !USERNAME_REGEX.is_match(username) {
            push(&mut errors, "username", INVALID_USERNAME);
            return false;
        }
        true
    });

    let email = check_email(&mut errors, req.email);

    let password = required(&mut errors, "password", req.password, false)
        .map(Zeroizing::new)
        .filter(|password| {
            let len = password.chars().count();
            if len < requirements.min_length {
                push(
                    &mut errors,
                    "password",
                    format!(
                        "Ensure this field has at least {} characters.",
                        requirements.min_length
                    ),
                );
                return false;
            }
            check_max(&mut errors, "password", password, MAX_PASSWORD_LENGTH)
        });

    let first_name = optional_name(&mut errors, "first_name", req.first_name);
    let last_name = optional_name(&mut errors, "last_name", req.last_name);

    match (username, email, password) {
        (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(NewUser {
            username,
            email,
            password,
            first_name,
            last_name,
        }),
        _ => Err(errors),
    }
}

/// Validate a login payload
pub fn validate_login(req: LoginRequest) -> Result<LoginCredentials, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = check_email(&mut errors, req.email);
    let password = required(&mut errors, "password", req.password, false).map(Zeroizing::new);

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(LoginCredentials { email, password }),
        _ => Err(errors),
    }
}
