use sqlx::Row;

use super::store::{count_of, ClassDeletePolicy, ShowStore};
use super::StoreError;
use crate::models::{Class, ClassName, Offset, PrizeMoney, PAGE_SIZE};

const FIND_CLASS: &str = "SELECT id, name, prize_money FROM classes WHERE id = $1";
const FIND_CLASS_NAME: &str = "SELECT name FROM classes WHERE id = $1";
const SORTED_CLASSES: &str =
    "SELECT id, name, prize_money FROM classes ORDER BY id ASC LIMIT $1 OFFSET $2";
const COUNT_CLASSES: &str = "SELECT COUNT(*) AS count FROM classes";
const ADD_CLASS: &str = "INSERT INTO classes (name, prize_money) VALUES ($1, $2)";
const UPDATE_NAME: &str = "UPDATE classes SET name = $1 WHERE id = $2";
const UPDATE_PRIZE_MONEY: &str = "UPDATE classes SET prize_money = $1 WHERE id = $2";
const DELETE_CLASS: &str = "DELETE FROM classes WHERE id = $1";
const COUNT_CLASS_ENTRIES: &str = "SELECT COUNT(*) AS count FROM entries WHERE class_id = $1";
const DELETE_CLASS_ENTRIES: &str = "DELETE FROM entries WHERE class_id = $1";

impl ShowStore {
    pub async fn load_class(&self, class_id: i32) -> Result<Option<Class>, StoreError> {
        let outcome = self.executor.fetch(FIND_CLASS, &[class_id.into()]).await?;
        Ok(outcome.first_as()?)
    }

    pub async fn class_name(&self, class_id: i32) -> Result<Option<String>, StoreError> {
        let outcome = self.executor.fetch(FIND_CLASS_NAME, &[class_id.into()]).await?;
        match outcome.rows.first() {
            Some(row) => Ok(Some(row.try_get("name")?)),
            None => Ok(None),
        }
    }

    /// One page of classes, oldest first
    pub async fn sorted_classes(&self, offset: Offset) -> Result<Vec<Class>, StoreError> {
        let outcome = self
            .executor
            .fetch(SORTED_CLASSES, &[PAGE_SIZE.into(), offset.value().into()])
            .await?;
        Ok(outcome.all_as()?)
    }

    pub async fn count_classes(&self) -> Result<i64, StoreError> {
        let outcome = self.executor.fetch(COUNT_CLASSES, &[]).await?;
        Ok(count_of(&outcome)?)
    }

    pub async fn add_class(&self, name: &ClassName, prize_money: PrizeMoney) -> Result<bool, StoreError> {
        let outcome = self
            .executor
            .execute(ADD_CLASS, &[name.as_str().into(), prize_money.value().into()])
            .await?;
        tracing::info!(actor = self.actor(), name = name.as_str(), "class added");
        Ok(outcome.affected_any())
    }

    /// Rename a class and set its prize money together; neither change
    /// sticks unless both apply.
    pub async fn update_class(
        &self,
        class_id: i32,
        name: &ClassName,
        prize_money: PrizeMoney,
    ) -> Result<bool, StoreError> {
        let updated = self
            .write_all(&[
                (UPDATE_NAME, vec![name.as_str().into(), class_id.into()]),
                (UPDATE_PRIZE_MONEY, vec![prize_money.value().into(), class_id.into()]),
            ])
            .await?;
        if updated {
            tracing::info!(actor = self.actor(), class_id, "class updated");
        }
        Ok(updated)
    }

    /// Delete a class, handling its entries per the configured policy.
    ///
    /// `Ok(false)` when no such class exists.
    pub async fn delete_class(&self, class_id: i32) -> Result<bool, StoreError> {
        let mut tx = self.executor.begin().await?;

        match self.settings.class_delete_policy {
            ClassDeletePolicy::Restrict => {
                let outcome = self
                    .executor
                    .fetch_in(&mut tx, COUNT_CLASS_ENTRIES, &[class_id.into()])
                    .await?;
                let entries = count_of(&outcome)?;
                if entries > 0 {
                    tx.rollback().await?;
                    return Err(StoreError::ClassHasEntries { class_id, entries });
                }
            }
            ClassDeletePolicy::Cascade => {
                let scratched = self
                    .executor
                    .execute_in(&mut tx, DELETE_CLASS_ENTRIES, &[class_id.into()])
                    .await?;
                if scratched.affected_any() {
                    tracing::debug!(class_id, entries = scratched.row_count, "scratching entries of deleted class");
                }
            }
        }

        let deleted = match self
            .executor
            .execute_in(&mut tx, DELETE_CLASS, &[class_id.into()])
            .await
        {
            Ok(outcome) => outcome.affected_any(),
            // An entry was filed after the check above
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                tx.rollback().await?;
                let entries = self.count_entries(class_id).await?;
                return Err(StoreError::ClassHasEntries { class_id, entries });
            }
            Err(e) => return Err(e.into()),
        };

        if deleted {
            tx.commit().await?;
            tracing::info!(actor = self.actor(), class_id, "class deleted");
        } else {
            tx.rollback().await?;
        }
        Ok(deleted)
    }
}
