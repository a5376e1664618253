//! Persistence facade over the query executor.
//!
//! One `ShowStore` is built per request from the executor and the session's
//! username. It performs no authorization of its own; callers decide who may
//! call what. Results are normalised: writes return `bool` (a row was
//! affected), reads-by-id return `Option`, listings return a possibly-empty
//! `Vec`.

use std::str::FromStr;

use sqlx::Row;

use super::executor::{Param, QueryExecutor, QueryOutcome};
use super::StoreError;

/// What happens to a class's entries when the class is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClassDeletePolicy {
    /// Scratch the entries together with the class
    #[default]
    Cascade,
    /// Refuse to delete a class that still has entries
    Restrict,
}

impl FromStr for ClassDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cascade" => Ok(ClassDeletePolicy::Cascade),
            "restrict" => Ok(ClassDeletePolicy::Restrict),
            _ => Err(format!("Unknown class delete policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub bcrypt_cost: u32,
    pub class_delete_policy: ClassDeletePolicy,
}

pub struct ShowStore {
    pub(super) executor: QueryExecutor,
    pub(super) settings: StoreSettings,
    username: Option<String>,
}

impl ShowStore {
    pub fn new(executor: QueryExecutor, username: Option<String>, settings: StoreSettings) -> Self {
        Self {
            executor,
            settings,
            username,
        }
    }

    /// Username recorded against writes in the log
    pub(super) fn actor(&self) -> &str {
        self.username.as_deref().unwrap_or("anonymous")
    }

    /// Apply every write in one transaction, committing only if each one
    /// affected a row. Any failure rolls the whole set back.
    pub(super) async fn write_all(&self, writes: &[(&str, Vec<Param>)]) -> Result<bool, StoreError> {
        let mut tx = self.executor.begin().await?;

        for (statement, params) in writes {
            let outcome = self.executor.execute_in(&mut tx, statement, params).await?;
            if !outcome.affected_any() {
                tx.rollback().await?;
                return Ok(false);
            }
        }

        tx.commit().await?;
        Ok(true)
    }
}

/// Read the `count` column of a `SELECT COUNT(*) AS count` result.
pub(super) fn count_of(outcome: &QueryOutcome) -> Result<i64, sqlx::Error> {
    match outcome.rows.first() {
        Some(row) => row.try_get("count"),
        None => Ok(0),
    }
}

#[cfg(test)]
pub(crate) fn test_store(pool: sqlx::PgPool, policy: ClassDeletePolicy) -> ShowStore {
    ShowStore::new(
        QueryExecutor::new(pool),
        Some("admin".to_string()),
        StoreSettings {
            bcrypt_cost: 4,
            class_delete_policy: policy,
        },
    )
}
