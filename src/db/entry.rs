use super::executor::Param;
use super::store::{count_of, ShowStore};
use super::StoreError;
use crate::models::{Entry, HorseName, HorseNumber, Offset, RiderName, PAGE_SIZE};

const FIND_ENTRY: &str =
    "SELECT id, class_id, horse_id, horse_name, rider_name FROM entries WHERE id = $1";
const FIND_ENTRIES: &str = "SELECT id, class_id, horse_id, horse_name, rider_name FROM entries
     WHERE class_id = $1
     ORDER BY horse_id, id
     LIMIT $2 OFFSET $3";
const COUNT_ENTRIES: &str = "SELECT COUNT(*) AS count FROM entries WHERE class_id = $1";
const ADD_ENTRY: &str =
    "INSERT INTO entries (horse_id, horse_name, rider_name, class_id) VALUES ($1, $2, $3, $4)";
const EDIT_HORSE_NAME: &str = "UPDATE entries SET horse_name = $1 WHERE id = $2";
const EDIT_RIDER_NAME: &str = "UPDATE entries SET rider_name = $1 WHERE id = $2";
const DELETE_ENTRY: &str = "DELETE FROM entries WHERE id = $1";

impl ShowStore {
    pub async fn load_entry(&self, entry_id: i32) -> Result<Option<Entry>, StoreError> {
        let outcome = self.executor.fetch(FIND_ENTRY, &[entry_id.into()]).await?;
        Ok(outcome.first_as()?)
    }

    /// One page of a class's entries, by horse number
    pub async fn load_entries(&self, class_id: i32, offset: Offset) -> Result<Vec<Entry>, StoreError> {
        let outcome = self
            .executor
            .fetch(
                FIND_ENTRIES,
                &[class_id.into(), PAGE_SIZE.into(), offset.value().into()],
            )
            .await?;
        Ok(outcome.all_as()?)
    }

    pub async fn count_entries(&self, class_id: i32) -> Result<i64, StoreError> {
        let outcome = self.executor.fetch(COUNT_ENTRIES, &[class_id.into()]).await?;
        Ok(count_of(&outcome)?)
    }

    /// Enter a horse into a class. `Ok(false)` if the class is gone.
    pub async fn create_entry(
        &self,
        class_id: i32,
        horse_number: HorseNumber,
        horse_name: &HorseName,
        rider_name: &RiderName,
    ) -> Result<bool, StoreError> {
        let params: [Param; 4] = [
            horse_number.value().into(),
            horse_name.as_str().into(),
            rider_name.as_str().into(),
            class_id.into(),
        ];

        match self.executor.execute(ADD_ENTRY, &params).await {
            Ok(outcome) => {
                tracing::info!(actor = self.actor(), class_id, horse = horse_number.value(), "entry created");
                Ok(outcome.affected_any())
            }
            // The class was deleted between the caller's lookup and this insert
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Change the horse and rider names of an entry. The horse number stays.
    pub async fn edit_entry(
        &self,
        entry_id: i32,
        horse_name: &HorseName,
        rider_name: &RiderName,
    ) -> Result<bool, StoreError> {
        let edited = self
            .write_all(&[
                (EDIT_HORSE_NAME, vec![horse_name.as_str().into(), entry_id.into()]),
                (EDIT_RIDER_NAME, vec![rider_name.as_str().into(), entry_id.into()]),
            ])
            .await?;
        if edited {
            tracing::info!(actor = self.actor(), entry_id, "entry edited");
        }
        Ok(edited)
    }

    /// Scratch an entry
    pub async fn delete_entry(&self, entry_id: i32) -> Result<bool, StoreError> {
        let outcome = self.executor.execute(DELETE_ENTRY, &[entry_id.into()]).await?;
        if outcome.affected_any() {
            tracing::info!(actor = self.actor(), entry_id, "entry scratched");
        }
        Ok(outcome.affected_any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{test_store, ClassDeletePolicy};
    use crate::models::{ClassName, Page, PrizeMoney};
    use sqlx::PgPool;

    async fn green_hunters(store: &ShowStore) -> i32 {
        store
            .add_class(
                &ClassName::new("Green Hunters").unwrap(),
                PrizeMoney::parse("100").unwrap(),
            )
            .await
            .unwrap();
        store.sorted_classes(Page::default().offset()).await.unwrap()[0].id
    }

    async fn enter(store: &ShowStore, class_id: i32, number: &str, horse: &str, rider: &str) -> bool {
        store
            .create_entry(
                class_id,
                HorseNumber::parse(number).unwrap(),
                &HorseName::new(horse).unwrap(),
                &RiderName::new(rider).unwrap(),
            )
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn create_list_and_edit_entry(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let class_id = green_hunters(&store).await;

        assert!(enter(&store, class_id, "42", "Buttercup", "J. Smith").await);

        let entries = store.load_entries(class_id, Page::default().offset()).await.unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.horse_id, 42);
        assert_eq!(entry.horse_name, "Buttercup");
        assert_eq!(entry.rider_name, "J. Smith");
        assert_eq!(entry.class_id, class_id);

        assert!(store
            .edit_entry(
                entry.id,
                &HorseName::new("Clover").unwrap(),
                &RiderName::new("J. Smith").unwrap(),
            )
            .await
            .unwrap());

        let reloaded = store.load_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(reloaded.horse_name, "Clover");
        assert_eq!(reloaded.rider_name, "J. Smith");
        assert_eq!(reloaded.horse_id, 42);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn entries_ordered_by_horse_number_and_paged(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let class_id = green_hunters(&store).await;
        for number in ["7", "3", "99", "12", "1", "50"] {
            assert!(enter(&store, class_id, number, "Horse", "Rider").await);
        }

        let first = store.load_entries(class_id, Page::default().offset()).await.unwrap();
        let numbers: Vec<i32> = first.iter().map(|e| e.horse_id).collect();
        assert_eq!(numbers, vec![1, 3, 7, 12, 50]);

        let second = store
            .load_entries(class_id, Page::parse(Some("1")).unwrap().offset())
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].horse_id, 99);

        assert_eq!(store.count_entries(class_id).await.unwrap(), 6);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn entry_for_missing_class_is_false(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        assert!(!enter(&store, 9_999_999, "42", "Buttercup", "J. Smith").await);
        assert_eq!(store.count_entries(9_999_999).await.unwrap(), 0);
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn edit_and_delete_missing_entry_are_false(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let horse = HorseName::new("Clover").unwrap();
        let rider = RiderName::new("J. Smith").unwrap();

        assert!(!store.edit_entry(9_999_999, &horse, &rider).await.unwrap());
        assert!(!store.delete_entry(9_999_999).await.unwrap());
        assert!(store.load_entry(9_999_999).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn scratch_entry(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let class_id = green_hunters(&store).await;
        enter(&store, class_id, "42", "Buttercup", "J. Smith").await;
        let entry_id = store.load_entries(class_id, Page::default().offset()).await.unwrap()[0].id;

        assert!(store.delete_entry(entry_id).await.unwrap());
        assert!(store.load_entry(entry_id).await.unwrap().is_none());
        assert!(!store.delete_entry(entry_id).await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "requires database"]
    async fn failed_rider_write_keeps_horse_name(pool: PgPool) {
        let store = test_store(pool, ClassDeletePolicy::Cascade);
        let class_id = green_hunters(&store).await;
        enter(&store, class_id, "42", "Buttercup", "J. Smith").await;
        let entry_id = store.load_entries(class_id, Page::default().offset()).await.unwrap()[0].id;

        // 31 characters breaks the rider_name column limit
        let result = store
            .write_all(&[
                (EDIT_HORSE_NAME, vec!["Clover".into(), entry_id.into()]),
                (EDIT_RIDER_NAME, vec![Param::Text("r".repeat(31)), entry_id.into()]),
            ])
            .await;
        assert!(matches!(result, Err(StoreError::Sqlx(_))));

        let entry = store.load_entry(entry_id).await.unwrap().unwrap();
        assert_eq!(entry.horse_name, "Buttercup");
        assert_eq!(entry.rider_name, "J. Smith");
    }
}
