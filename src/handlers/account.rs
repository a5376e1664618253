use super::extractors::ValidJson;
use super::{set_session_cookie, store_for, ApiError};
use crate::models::{CreateAccountForm, SignInForm};
use crate::session::CurrentSession;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Check credentials and move the caller onto a fresh signed-in session
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    ValidJson(form): ValidJson<SignInForm>,
) -> Result<Response, ApiError> {
    let store = store_for(&state, &current);
    let username = form.username.trim();

    if !store.authenticate(username, &form.password).await? {
        tracing::info!(username, "sign in rejected");
        return Err(ApiError::Unauthorized {
            message: "Did not recognize username or password".to_string(),
        });
    }

    let (token, redirect) = state.sessions.sign_in(&current.token, username);
    let redirect = redirect.unwrap_or_else(|| "/".to_string());

    tracing::info!(username, "signed in");
    let mut response = Json(json!({
        "username": username,
        "redirect": redirect
    }))
    .into_response();
    set_session_cookie(&mut response, &token);
    Ok(response)
}

pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Json<Value> {
    state.sessions.end(&current.token);
    Json(json!({ "redirect": "/signin" }))
}

pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    ValidJson(form): ValidJson<CreateAccountForm>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (email, password) = form.validate()?;
    let store = store_for(&state, &current);

    // The accounts primary key still rejects a duplicate that races past this
    if store.exists_email_address(email.as_str()).await? {
        return Err(ApiError::Conflict {
            message: "This email already has an account".to_string(),
        });
    }

    if !store.create_account(email.as_str(), password.as_str()).await? {
        return Err(ApiError::Internal {
            message: "Could not create account.".to_string(),
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account successfully created. Please log in",
            "redirect": "/signin"
        })),
    ))
}
