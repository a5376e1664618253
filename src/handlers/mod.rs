mod account;
mod class;
mod entry;
pub mod error;
mod extractors;

pub use error::ApiError;

use crate::auth::Role;
use crate::db::{QueryExecutor, ShowStore};
use crate::session::{session_cookie, CurrentSession};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderValue, Uri},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/signin", post(account::sign_in))
        .route("/signout", post(account::sign_out))
        .route("/accounts", post(account::create_account))
        .route("/classes", get(class::list_classes).post(class::add_class))
        .route(
            "/classes/:class_id",
            get(class::show_class)
                .put(class::update_class)
                .delete(class::delete_class),
        )
        .route("/classes/:class_id/entries", post(entry::create_entry))
        .route(
            "/classes/:class_id/entries/:entry_id",
            get(entry::show_entry)
                .put(entry::edit_entry)
                .delete(entry::delete_entry),
        )
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Attach the caller's session to the request. A new session gets its
/// cookie only if the handler stored something in it.
async fn session_layer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let current = state.sessions.resolve(request.headers());
    let new_token = current.is_new.then(|| current.token.clone());
    request.extensions_mut().insert(current);

    let mut response = next.run(request).await;
    if let Some(token) = new_token.filter(|token| state.sessions.contains(token)) {
        set_session_cookie(&mut response, &token);
    }
    response
}

fn set_session_cookie(response: &mut Response, token: &str) {
    match HeaderValue::from_str(&session_cookie(token).to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Invalid session cookie: {}", e),
    }
}

/// Build the persistence facade for one request
fn store_for(state: &AppState, current: &CurrentSession) -> ShowStore {
    ShowStore::new(
        QueryExecutor::new(state.db_pool.clone()),
        current.session.username.clone(),
        state.store_settings,
    )
}

fn require_user(state: &AppState, current: &CurrentSession, uri: &Uri) -> Result<(), ApiError> {
    if current.session.role().is_signed_in() {
        return Ok(());
    }
    deny(state, current, uri)
}

fn require_admin(state: &AppState, current: &CurrentSession, uri: &Uri) -> Result<(), ApiError> {
    if current.session.role() == Role::Admin {
        return Ok(());
    }
    deny(state, current, uri)
}

/// Remember where the caller was headed so sign-in can send them back
fn deny(state: &AppState, current: &CurrentSession, uri: &Uri) -> Result<(), ApiError> {
    let target = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| uri.path())
        .to_string();
    tracing::warn!(path = %target, user = ?current.session.username, "access denied");
    state
        .sessions
        .update(&current.token, |s| s.redirect_to = Some(target));

    Err(ApiError::Unauthorized {
        message: "You do not have access to this page.".to_string(),
    })
}

fn parse_id(raw: &str, what: &str, redirect: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::not_found(format!("Invalid {} number", what), redirect))
}
