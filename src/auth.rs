// Password hashing and role derivation

use bcrypt::{hash, verify};

/// Username that carries admin privileges
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Privilege tier of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anonymous,
    User,
    Admin,
}

impl Role {
    /// Derive the role from session state. Only a signed-in `admin` is an admin.
    pub fn for_session(signed_in: bool, username: Option<&str>) -> Self {
        match (signed_in, username) {
            (true, Some(ADMIN_USERNAME)) => Role::Admin,
            (true, Some(_)) => Role::User,
            _ => Role::Anonymous,
        }
    }

    pub fn is_signed_in(self) -> bool {
        self != Role::Anonymous
    }
}

/// Hash a password with bcrypt (salt included in the output).
///
/// Runs on the blocking thread pool since bcrypt is CPU-bound.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("Task join error: {}", e)))?
}

/// Verify a password against a bcrypt hash.
///
/// `Ok(false)` on mismatch, `Err` only if the stored hash is unreadable.
pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hashed = hashed.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &hashed).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("Task join error: {}", e)))?
}
