//! Persistence boundary for imported records.
//!
//! The importer only needs a bulk insert; [`RecordStore::find_by_owner`] backs the roster view.
//! [`InMemoryStore`] is a complete implementation suitable for tests and single-process use.

use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{ImportRecord, NewRecord, OwnerId};

/// Record persistence used by the importer.
pub trait RecordStore: Send + Sync {
    /// Insert all records, assigning ids and timestamps.
    ///
    /// An error means none of the batch should be considered committed.
    fn insert_many(
        &self,
        records: Vec<NewRecord>,
    ) -> impl Future<Output = Result<Vec<ImportRecord>, StoreError>> + Send;

    /// All records owned by `owner`, newest first.
    fn find_by_owner(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<ImportRecord>, StoreError>> + Send;
}

impl<T: RecordStore> RecordStore for Arc<T> {
    fn insert_many(
        &self,
        records: Vec<NewRecord>,
    ) -> impl Future<Output = Result<Vec<ImportRecord>, StoreError>> + Send {
        (**self).insert_many(records)
    }

    fn find_by_owner(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<ImportRecord>, StoreError>> + Send {
        (**self).find_by_owner(owner)
    }
}

/// Mutex-guarded in-memory store. Each `insert_many` is applied atomically.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<ImportRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (all owners).
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryStore {
    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<Vec<ImportRecord>, StoreError> {
        let now = Utc::now();
        let inserted: Vec<ImportRecord> = records
            .into_iter()
            .map(|r| ImportRecord {
                id: Uuid::new_v4(),
                owner: r.owner,
                fields: r.fields,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::new("record store lock poisoned"))?;
        guard.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<ImportRecord>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::new("record store lock poisoned"))?;
        // Insertion order breaks created_at ties, so iterate in reverse before the stable sort.
        let mut out: Vec<ImportRecord> = guard.iter().rev().filter(|r| &r.owner == owner).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryStore, RecordStore};
    use crate::types::{CanonicalFields, Gender, NewRecord, OwnerId};

    fn record(owner: &str, name: &str) -> NewRecord {
        NewRecord {
            owner: OwnerId::new(owner),
            fields: CanonicalFields {
                name: name.to_string(),
                instagramurl: String::new(),
                followers: 0,
                average_view: 0,
                er: 0.0,
                language: String::new(),
                gender: Gender::Other,
                state: "MH".to_string(),
                city: "Pune".to_string(),
                contactno: String::new(),
                commercial: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_find_filters_by_owner() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert_many(vec![record("u1", "a"), record("u2", "b"), record("u1", "c")])
            .await
            .unwrap();
        assert_eq!(inserted.len(), 3);
        assert_ne!(inserted[0].id, inserted[1].id);
        assert_eq!(store.len(), 3);

        let mine = store.find_by_owner(&OwnerId::new("u1")).await.unwrap();
        let names: Vec<&str> = mine.iter().map(|r| r.fields.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }
}
