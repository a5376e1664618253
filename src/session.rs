//! In-process session storage keyed by the session cookie

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use cookie::{Cookie, SameSite};

use crate::auth::Role;

pub const SESSION_COOKIE: &str = "horseshows_session";

/// 31 days
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(31 * 24 * 60 * 60);

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub username: Option<String>,
    pub signed_in: bool,
    /// Page to return to after signing in
    pub redirect_to: Option<String>,
}

impl Session {
    pub fn role(&self) -> Role {
        Role::for_session(self.signed_in, self.username.as_deref())
    }
}

/// Session resolved for the current request
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub session: Session,
    /// True when the request carried no known session. The token is only
    /// stored once something is written to it.
    pub is_new: bool,
}

struct StoredSession {
    session: Session,
    last_seen: Instant,
}

impl StoredSession {
    fn fresh(session: Session) -> Self {
        Self {
            session,
            last_seen: Instant::now(),
        }
    }

    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.last_seen) >= SESSION_MAX_AGE
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, StoredSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session named by the request cookie. Without one, hand
    /// out an unsaved anonymous session under a new token.
    pub fn resolve(&self, headers: &HeaderMap) -> CurrentSession {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(token) = token_from_headers(headers) {
            if let Some(stored) = sessions.get_mut(&token) {
                if !stored.expired(now) {
                    stored.last_seen = now;
                    return CurrentSession {
                        token,
                        session: stored.session.clone(),
                        is_new: false,
                    };
                }
            }
            sessions.remove(&token);
        }

        CurrentSession {
            token: uuid::Uuid::new_v4().to_string(),
            session: Session::default(),
            is_new: true,
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.contains_key(token)
    }

    /// Mutate the session for `token`, storing it first if it is new, and
    /// return what `f` returns.
    pub fn update<R>(&self, token: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if !sessions.contains_key(token) {
            let now = Instant::now();
            sessions.retain(|_, stored| !stored.expired(now));
        }
        let stored = sessions
            .entry(token.to_string())
            .or_insert_with(|| StoredSession::fresh(Session::default()));
        f(&mut stored.session)
    }

    /// Sign `username` in under a brand new token, retiring `old_token`.
    ///
    /// Returns the new token and the page the old session was headed to.
    pub fn sign_in(&self, old_token: &str, username: &str) -> (String, Option<String>) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let redirect_to = sessions
            .remove(old_token)
            .and_then(|stored| stored.session.redirect_to);

        let token = uuid::Uuid::new_v4().to_string();
        sessions.insert(
            token.clone(),
            StoredSession::fresh(Session {
                username: Some(username.to_string()),
                signed_in: true,
                redirect_to: None,
            }),
        );
        (token, redirect_to)
    }

    /// Forget the session for `token`
    pub fn end(&self, token: &str) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(token);
    }
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value).filter_map(Result::ok))
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
}

pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(SESSION_MAX_AGE.as_secs() as i64))
        .build()
}
