//! In-process implementation of the link repository.
//!
//! Transactions hold the table lock for their whole lifetime, so allocations
//! are serialized and never observe each other's uncommitted rows. Ids are
//! never reused, including ids from rolled-back transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entities::{Link, NewAlias, PendingLink};
use crate::domain::repositories::{KeyClaim, LinkRepository, LinkTransaction, PendingInsert};
use crate::error::AppError;

#[derive(Debug, Clone)]
struct StoredLink {
    id: i64,
    key: Option<String>,
    long_url: String,
    is_custom: bool,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    is_disabled: bool,
}

impl StoredLink {
    fn to_link(&self) -> Option<Link> {
        let key = self.key.clone()?;
        Some(Link {
            id: self.id,
            key,
            long_url: self.long_url.clone(),
            is_custom: self.is_custom,
            created_at: self.created_at,
            expires_at: self.expires_at,
            is_disabled: self.is_disabled,
        })
    }
}

#[derive(Debug, Default)]
struct LinkTable {
    last_id: i64,
    rows: BTreeMap<i64, StoredLink>,
    by_key: HashMap<String, i64>,
    system_by_url: HashMap<String, i64>,
}

impl LinkTable {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn lookup_key(&self, key: &str) -> Option<Link> {
        self.by_key
            .get(key)
            .and_then(|id| self.rows.get(id))
            .and_then(StoredLink::to_link)
    }

    fn lookup_id(&self, id: i64) -> Option<Link> {
        self.rows.get(&id).and_then(StoredLink::to_link)
    }

    fn remove(&mut self, id: i64) {
        if let Some(row) = self.rows.remove(&id) {
            if let Some(key) = row.key {
                self.by_key.remove(&key);
            }
            if !row.is_custom {
                self.system_by_url.remove(&row.long_url);
            }
        }
    }
}

/// Link repository backed by process memory.
///
/// Used when `STORAGE_BACKEND=memory` and by the integration tests. Data does
/// not survive a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryLinkRepository {
    table: Arc<Mutex<LinkTable>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, pending rows of an open transaction included.
    pub async fn row_count(&self) -> usize {
        self.table.lock().await.rows.len()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn get_by_key(&self, key: &str) -> Result<Option<Link>, AppError> {
        Ok(self.table.lock().await.lookup_key(key))
    }

    async fn get_by_canonical_url(&self, long_url: &str) -> Result<Option<Link>, AppError> {
        let table = self.table.lock().await;
        Ok(table
            .system_by_url
            .get(long_url)
            .and_then(|id| table.rows.get(id))
            .and_then(StoredLink::to_link))
    }

    async fn begin(&self) -> Result<Box<dyn LinkTransaction>, AppError> {
        let guard = self.table.clone().lock_owned().await;
        Ok(Box::new(MemoryLinkTransaction {
            table: guard,
            inserted: Vec::new(),
        }))
    }

    async fn insert_alias(&self, new_alias: NewAlias) -> Result<Link, AppError> {
        let mut table = self.table.lock().await;

        if table.by_key.contains_key(&new_alias.alias) {
            return Err(AppError::AliasInUse {
                alias: new_alias.alias,
            });
        }

        let id = table.next_id();
        let row = StoredLink {
            id,
            key: Some(new_alias.alias.clone()),
            long_url: new_alias.long_url,
            is_custom: true,
            created_at: Utc::now(),
            expires_at: new_alias.expires_at,
            is_disabled: false,
        };
        table.by_key.insert(new_alias.alias, id);
        table.rows.insert(id, row);

        table
            .lookup_id(id)
            .ok_or_else(|| AppError::internal("Inserted alias not found", json!({ "id": id })))
    }

    async fn disable(&self, key: &str) -> Result<(), AppError> {
        let mut table = self.table.lock().await;

        let id = table.by_key.get(key).copied().ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "key": key }))
        })?;
        if let Some(row) = table.rows.get_mut(&id) {
            row.is_disabled = true;
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Allocation transaction holding the table lock.
///
/// Rows inserted through it are removed on drop unless it was committed.
struct MemoryLinkTransaction {
    table: OwnedMutexGuard<LinkTable>,
    inserted: Vec<i64>,
}

#[async_trait]
impl LinkTransaction for MemoryLinkTransaction {
    async fn insert_pending(
        &mut self,
        long_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PendingInsert, AppError> {
        if self.table.system_by_url.contains_key(long_url) {
            return Ok(PendingInsert::DuplicateUrl);
        }

        let id = self.table.next_id();
        let created_at = Utc::now();
        self.table.rows.insert(
            id,
            StoredLink {
                id,
                key: None,
                long_url: long_url.to_string(),
                is_custom: false,
                created_at,
                expires_at,
                is_disabled: false,
            },
        );
        self.table.system_by_url.insert(long_url.to_string(), id);
        self.inserted.push(id);

        Ok(PendingInsert::Inserted(PendingLink {
            id,
            long_url: long_url.to_string(),
            created_at,
            expires_at,
        }))
    }

    async fn try_set_key(&mut self, id: i64, key: &str) -> Result<KeyClaim, AppError> {
        let table = &mut *self.table;
        if table.by_key.contains_key(key) {
            return Ok(KeyClaim::Taken);
        }

        let row = table.rows.get_mut(&id).ok_or_else(|| {
            AppError::internal(
                "Pending link row vanished during allocation",
                json!({ "id": id }),
            )
        })?;
        if let Some(previous) = row.key.replace(key.to_string()) {
            table.by_key.remove(&previous);
        }
        table.by_key.insert(key.to_string(), id);

        Ok(KeyClaim::Claimed)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AppError> {
        self.inserted.clear();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

impl Drop for MemoryLinkTransaction {
    fn drop(&mut self) {
        for id in std::mem::take(&mut self.inserted) {
            self.table.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(alias: &str, long_url: &str) -> NewAlias {
        NewAlias {
            alias: alias.to_string(),
            long_url: long_url.to_string(),
            expires_at: None,
        }
    }

    async fn insert_system(repo: &MemoryLinkRepository, long_url: &str, key: &str) -> Link {
        let mut tx = repo.begin().await.unwrap();
        let PendingInsert::Inserted(pending) = tx.insert_pending(long_url, None).await.unwrap()
        else {
            panic!("expected a fresh row");
        };
        assert_eq!(
            tx.try_set_key(pending.id, key).await.unwrap(),
            KeyClaim::Claimed
        );
        tx.commit().await.unwrap();
        pending.into_link(key.to_string())
    }

    #[tokio::test]
    async fn test_committed_system_link_is_visible() {
        let repo = MemoryLinkRepository::new();
        let link = insert_system(&repo, "https://example.com/", "000001").await;

        assert_eq!(repo.get_by_key("000001").await.unwrap(), Some(link.clone()));
        assert_eq!(
            repo.get_by_canonical_url("https://example.com/")
                .await
                .unwrap(),
            Some(link)
        );
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let repo = MemoryLinkRepository::new();
        {
            let mut tx = repo.begin().await.unwrap();
            tx.insert_pending("https://example.com/", None).await.unwrap();
        }

        assert_eq!(repo.row_count().await, 0);
        assert!(
            repo.get_by_canonical_url("https://example.com/")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_rolled_back_ids_are_not_reused() {
        let repo = MemoryLinkRepository::new();
        let mut tx = repo.begin().await.unwrap();
        tx.insert_pending("https://a.example/", None).await.unwrap();
        tx.rollback().await.unwrap();

        let link = insert_system(&repo, "https://b.example/", "000002").await;
        assert_eq!(link.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_system_url_is_reported() {
        let repo = MemoryLinkRepository::new();
        insert_system(&repo, "https://example.com/", "000001").await;

        let mut tx = repo.begin().await.unwrap();
        assert!(matches!(
            tx.insert_pending("https://example.com/", None).await.unwrap(),
            PendingInsert::DuplicateUrl
        ));
    }

    #[tokio::test]
    async fn test_custom_alias_does_not_block_system_row_for_same_url() {
        let repo = MemoryLinkRepository::new();
        repo.insert_alias(alias("promo", "https://example.com/"))
            .await
            .unwrap();

        let mut tx = repo.begin().await.unwrap();
        assert!(matches!(
            tx.insert_pending("https://example.com/", None).await.unwrap(),
            PendingInsert::Inserted(_)
        ));
    }

    #[tokio::test]
    async fn test_taken_key_leaves_transaction_usable() {
        let repo = MemoryLinkRepository::new();
        repo.insert_alias(alias("000001", "https://other.example/"))
            .await
            .unwrap();

        let mut tx = repo.begin().await.unwrap();
        let PendingInsert::Inserted(pending) = tx
            .insert_pending("https://example.com/", None)
            .await
            .unwrap()
        else {
            panic!("expected a fresh row");
        };

        assert_eq!(
            tx.try_set_key(pending.id, "000001").await.unwrap(),
            KeyClaim::Taken
        );
        assert_eq!(
            tx.try_set_key(pending.id, "0000010").await.unwrap(),
            KeyClaim::Claimed
        );
        tx.commit().await.unwrap();

        let link = repo.get_by_key("0000010").await.unwrap().unwrap();
        assert_eq!(link.long_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_alias_in_use() {
        let repo = MemoryLinkRepository::new();
        repo.insert_alias(alias("promo", "https://a.example/"))
            .await
            .unwrap();

        let err = repo
            .insert_alias(alias("promo", "https://b.example/"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AliasInUse { alias } if alias == "promo"));
    }

    #[tokio::test]
    async fn test_disable() {
        let repo = MemoryLinkRepository::new();
        repo.insert_alias(alias("promo", "https://a.example/"))
            .await
            .unwrap();

        repo.disable("promo").await.unwrap();

        assert!(repo.get_by_key("promo").await.unwrap().unwrap().is_disabled);
        assert!(matches!(
            repo.disable("missing").await,
            Err(AppError::NotFound { .. })
        ));
    }
}
