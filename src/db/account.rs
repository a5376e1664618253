use sqlx::Row;

use super::store::ShowStore;
use super::StoreError;
use crate::auth::{hash_password, verify_password};
use crate::models::MAX_PASSWORD_LENGTH;

const CREATE_ACCOUNT: &str = "INSERT INTO accounts (email, password) VALUES ($1, $2)";
const FIND_HASHED_PASSWORD: &str = "SELECT password FROM accounts WHERE email = $1";
const FIND_EMAIL: &str = "SELECT 1 FROM accounts WHERE email = $1";

impl ShowStore {
    /// Check a username/password pair.
    ///
    /// Unknown accounts and wrong passwords both come back as `Ok(false)`.
    /// So does any password longer than an account can hold, since bcrypt
    /// would compare only its prefix.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        if username.is_empty() || password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
            return Ok(false);
        }

        let outcome = self
            .executor
            .fetch(FIND_HASHED_PASSWORD, &[username.into()])
            .await?;
        let Some(row) = outcome.rows.first() else {
            return Ok(false);
        };

        let hashed: String = row.try_get("password")?;
        Ok(verify_password(password, &hashed).await?)
    }

    /// Store a new account with a bcrypt-hashed password.
    ///
    /// The email primary key is the authority on uniqueness: a duplicate
    /// insert is reported as `StoreError::AccountExists`.
    pub async fn create_account(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let hashed = hash_password(password, self.settings.bcrypt_cost).await?;

        match self
            .executor
            .execute(CREATE_ACCOUNT, &[username.into(), hashed.into()])
            .await
        {
            Ok(outcome) => {
                tracing::info!(email = username, "account created");
                Ok(outcome.affected_any())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::AccountExists {
                    email: username.to_owned(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists_email_address(&self, email: &str) -> Result<bool, StoreError> {
        let outcome = self.executor.fetch(FIND_EMAIL, &[email.into()]).await?;
        Ok(outcome.row_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{test_store, ClassDeletePolicy};
    use sqlx::PgPool;

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn create_then_authenticate(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);

        assert!(store.create_account("rider@example.com", "Buttercup42").await.unwrap());
        assert!(store.authenticate("rider@example.com", "Buttercup42").await.unwrap());
        assert!(!store.authenticate("rider@example.com", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn overlong_password_is_rejected_before_lookup() {
        // Never connects: the length check answers first
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/horseshows_unused")
            .unwrap();
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let password = format!("{}WRONG", "p".repeat(72));

        assert!(!store.authenticate("rider@example.com", &password).await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn longest_password_must_match_in_full(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let longest = "p".repeat(MAX_PASSWORD_LENGTH);
        store.create_account("rider@example.com", &longest).await.unwrap();

        assert!(store.authenticate("rider@example.com", &longest).await.unwrap());
        let suffixed = format!("{}WRONG", longest);
        assert!(!store.authenticate("rider@example.com", &suffixed).await.unwrap());
        let shortened = &longest[..MAX_PASSWORD_LENGTH - 1];
        assert!(!store.authenticate("rider@example.com", shortened).await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn password_is_stored_hashed(pool: PgPool) {
        let store = test_store(pool.clone(), ClassDeletePolicy::Cascade);
        store.create_account("rider@example.com", "Buttercup42").await.unwrap();

        let (stored,): (String,) = sqlx::query_as("SELECT password FROM accounts WHERE email = $1")
            .bind("rider@example.com")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(stored, "Buttercup42");
        assert!(stored.starts_with("$2"));
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn unknown_email(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);

        assert!(!store.exists_email_address("nobody@example.com").await.unwrap());
        assert!(!store.authenticate("nobody@example.com", "anything").await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn existing_email_is_found(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        store.create_account("rider@example.com", "pw").await.unwrap();

        assert!(store.exists_email_address("rider@example.com").await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn duplicate_account_is_rejected(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        store.create_account("rider@example.com", "first").await.unwrap();

        let err = store.create_account("rider@example.com", "second").await.unwrap_err();
        assert!(matches!(err, StoreError::AccountExists { .. }));

        // The original password still works
        assert!(store.authenticate("rider@example.com", "first").await.unwrap());
        assert!(!store.authenticate("rider@example.com", "second").await.unwrap());
    }
}
