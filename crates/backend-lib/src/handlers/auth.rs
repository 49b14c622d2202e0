// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Register and login handlers.
//!
//! Both handlers are a single request/response transform: validate the body,
//! call the user store, password hasher and token issuer, then answer with a
//! token pair or an error envelope.
use authkit_common::{LoginRequest, RegisterRequest, TokenPair};
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use tracing::{info, instrument, warn};
use zeroize::Zeroizing;

use crate::error::AppError;
use crate::metrics::{LOGIN_FAILURE, LOGIN_SUCCESS, REGISTER_CONFLICT, REGISTER_INVALID, REGISTER_SUCCESS};
use crate::storage::UserDraft;
use crate::validation::{validate_login, validate_register};
use crate::AppState;

fn respond(path: &str, result: Result<TokenPair, AppError>) -> Response {
    match result {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(err) => err.into_response_at(path),
    }
}

/// Rejects bodies that are not a JSON object or lack the JSON content type.
/// Per-field type problems are left to validation.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))
}

/// `POST /register/`
pub async fn register(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    respond(uri.path(), register_user(&state, payload).await)
}

/// `POST /login/`
pub async fn login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    respond(uri.path(), login_user(&state, payload).await)
}

#[instrument(skip_all)]
async fn register_user(
    state: &AppState,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<TokenPair, AppError> {
    let new_user = validate_register(body(payload)?, &state.settings.password_requirements)
        .map_err(|errors| {
            counter!(REGISTER_INVALID).increment(1);
            AppError::Validation(errors)
        })?;

    let hasher = state.hasher.clone();
    let password = new_user.password;
    let password_hash =
        tokio::task::spawn_blocking(move || hasher.hash_password(&password)).await??;

    let draft = UserDraft {
        username: new_user.username,
        email: new_user.email,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        password_hash,
    };

    let user = match state.users.create_user(draft).await {
        Ok(user) => user,
        Err(err) => {
            let err = AppError::from(err);
            if matches!(err, AppError::UserExists) {
                counter!(REGISTER_CONFLICT).increment(1);
                warn!("registration rejected: username or email taken");
            }
            return Err(err);
        },
    };

    let pair = state.tokens.issue_for(&user)?;
    counter!(REGISTER_SUCCESS).increment(1);
    info!(user_id = %user.id, "user registered");
    Ok(pair)
}

#[instrument(skip_all)]
async fn login_user(
    state: &AppState,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<TokenPair, AppError> {
    let credentials = validate_login(body(payload)?).map_err(AppError::Validation)?;

    let Some(user) = state.users.find_by_email(&credentials.email).await? else {
        counter!(LOGIN_FAILURE, "reason" => "unknown_email").increment(1);
        return Err(AppError::UserNotFound);
    };

    let hasher = state.hasher.clone();
    let hash = user.password_hash.clone();
    let password: Zeroizing<String> = credentials.password;
    let verified =
        tokio::task::spawn_blocking(move || hasher.verify_password(&hash, &password)).await?;

    if !verified {
        counter!(LOGIN_FAILURE, "reason" => "bad_password").increment(1);
        warn!(user_id = %user.id, "login rejected: password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let pair = state.tokens.issue_for(&user)?;
    counter!(LOGIN_SUCCESS).increment(1);
    info!(user_id = %user.id, "user logged in");
    Ok(pair)
}
