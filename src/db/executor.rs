//! Query executor: runs one parameterized statement and logs it.
//!
//! Every value reaches PostgreSQL through a `$n` placeholder; statements are
//! never built by string interpolation.

use chrono::Utc;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i32),
    BigInt(i64),
    Text(String),
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::BigInt(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

/// Rows returned by a read, or the affected-row count of a write
pub struct QueryOutcome {
    pub rows: Vec<PgRow>,
    pub row_count: u64,
}

impl QueryOutcome {
    pub fn affected_any(&self) -> bool {
        self.row_count > 0
    }

    /// Decode the first row, if any.
    pub fn first_as<T>(&self) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        self.rows.first().map(T::from_row).transpose()
    }

    pub fn all_as<T>(&self) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        self.rows.iter().map(T::from_row).collect()
    }
}

#[derive(Clone)]
pub struct QueryExecutor {
    pool: PgPool,
}

impl QueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a read and return every row.
    pub async fn fetch(&self, statement: &str, params: &[Param]) -> Result<QueryOutcome, sqlx::Error> {
        log_query(statement, params);
        let rows = bind_params(statement, params).fetch_all(&self.pool).await?;
        let row_count = rows.len() as u64;
        Ok(QueryOutcome { rows, row_count })
    }

    /// Run a write and return the affected-row count.
    pub async fn execute(&self, statement: &str, params: &[Param]) -> Result<QueryOutcome, sqlx::Error> {
        log_query(statement, params);
        let result = bind_params(statement, params).execute(&self.pool).await?;
        Ok(QueryOutcome {
            rows: Vec::new(),
            row_count: result.rows_affected(),
        })
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Run a read inside an open transaction.
    pub async fn fetch_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        statement: &str,
        params: &[Param],
    ) -> Result<QueryOutcome, sqlx::Error> {
        log_query(statement, params);
        let rows = bind_params(statement, params).fetch_all(&mut **tx).await?;
        let row_count = rows.len() as u64;
        Ok(QueryOutcome { rows, row_count })
    }

    /// Run a write inside an open transaction.
    pub async fn execute_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        statement: &str,
        params: &[Param],
    ) -> Result<QueryOutcome, sqlx::Error> {
        log_query(statement, params);
        let result = bind_params(statement, params).execute(&mut **tx).await?;
        Ok(QueryOutcome {
            rows: Vec::new(),
            row_count: result.rows_affected(),
        })
    }
}

fn bind_params<'q>(statement: &'q str, params: &'q [Param]) -> Query<'q, Postgres, PgArguments> {
    params
        .iter()
        .fold(sqlx::query(statement), |query, param| match param {
            Param::Int(value) => query.bind(*value),
            Param::BigInt(value) => query.bind(*value),
            Param::Text(value) => query.bind(value.as_str()),
        })
}

fn log_query(statement: &str, params: &[Param]) {
    let at = Utc::now().format("%b %d %Y %H:%M:%S");
    tracing::debug!(target: "horseshows::query", %at, statement, ?params, "executing query");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[test]
    fn params_convert_from_plain_values() {
        assert_eq!(Param::from(42_i32), Param::Int(42));
        assert_eq!(Param::from(5_i64), Param::BigInt(5));
        assert_eq!(Param::from("Clover"), Param::Text("Clover".into()));
        assert_eq!(Param::from(String::from("J. Smith")), Param::Text("J. Smith".into()));
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn binds_parameters_positionally(pool: PgPool) {
        let executor = QueryExecutor::new(pool);
        let outcome = executor
            .fetch("SELECT $1::int AS n, $2::text AS s", &[7_i32.into(), "x'; DROP TABLE classes; --".into()])
            .await
            .unwrap();

        assert_eq!(outcome.row_count, 1);
        let row = &outcome.rows[0];
        assert_eq!(row.get::<i32, _>("n"), 7);
        assert_eq!(row.get::<String, _>("s"), "x'; DROP TABLE classes; --");
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn write_reports_affected_rows(pool: PgPool) {
        let executor = QueryExecutor::new(pool);
        let inserted = executor
            .execute(
                "INSERT INTO classes (name, prize_money) VALUES ($1, $2), ($3, $4)",
                &["A".into(), 1_i32.into(), "B".into(), 2_i32.into()],
            )
            .await
            .unwrap();
        assert_eq!(inserted.row_count, 2);
        assert!(inserted.rows.is_empty());

        let updated = executor
            .execute("UPDATE classes SET prize_money = 0 WHERE name = $1", &["missing".into()])
            .await
            .unwrap();
        assert!(!updated.affected_any());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn query_errors_propagate(pool: PgPool) {
        let executor = QueryExecutor::new(pool);
        let err = executor.fetch("SELECT * FROM no_such_table", &[]).await;
        assert!(matches!(err, Err(sqlx::Error::Database(_))));
    }
}
