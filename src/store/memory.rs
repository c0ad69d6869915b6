//! In-process store: a map guarded by one lock.

use crate::error::AppError;
use crate::model::{Item, ItemCreate, ItemUpdate};
use crate::store::{ItemStore, Listing};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug)]
struct Entry {
    item: Item,
    /// Insertion order; breaks `created_at` ties.
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Uuid, Entry>,
    next_seq: u64,
}

/// Owned per instance, so every test (or server) gets its own map.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    inner: RwLock<Inner>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, AppError> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("item store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, AppError> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("item store lock poisoned".into()))
    }

    fn page<'a>(
        matching: impl Iterator<Item = &'a Entry>,
        skip: u64,
        limit: u64,
    ) -> Listing {
        let mut entries: Vec<&Entry> = matching.collect();
        entries.sort_by(|a, b| {
            b.item
                .created_at
                .cmp(&a.item.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        let total = entries.len() as u64;
        let items = entries
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|e| e.item.clone())
            .collect();
        Listing { items, total }
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, input: ItemCreate) -> Result<Item, AppError> {
        let item = Item::new(input);
        let mut inner = self.write()?;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            item.id,
            Entry {
                item: item.clone(),
                seq,
            },
        );
        tracing::debug!(id = %item.id, "item created");
        Ok(item)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Item>, AppError> {
        Ok(self.read()?.entries.get(&id).map(|e| e.item.clone()))
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Listing, AppError> {
        let inner = self.read()?;
        Ok(Self::page(inner.entries.values(), skip, limit))
    }

    async fn update(&self, id: Uuid, update: ItemUpdate) -> Result<Option<Item>, AppError> {
        let mut inner = self.write()?;
        let Some(entry) = inner.entries.get_mut(&id) else {
            return Ok(None);
        };
        entry.item.apply(update);
        tracing::debug!(id = %id, "item updated");
        Ok(Some(entry.item.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let removed = self.write()?.entries.remove(&id).is_some();
        if removed {
            tracing::debug!(id = %id, "item deleted");
        }
        Ok(removed)
    }

    async fn search(&self, query: &str, skip: u64, limit: u64) -> Result<Listing, AppError> {
        let needle = query.to_lowercase();
        let inner = self.read()?;
        let matching = inner
            .entries
            .values()
            .filter(|e| e.item.name.to_lowercase().contains(&needle));
        Ok(Self::page(matching, skip, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn create(name: &str) -> ItemCreate {
        ItemCreate {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemoryItemStore::new();
        let created = store.create(create("A")).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);
        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_pages_cover_everything_once() {
        let store = MemoryItemStore::new();
        let mut created = Vec::new();
        for i in 0..23 {
            created.push(store.create(create(&format!("Item {i}"))).await.unwrap());
        }

        let first = store.list(0, 10).await.unwrap();
        assert_eq!(first.total, 23);
        assert_eq!(first.items[0].id, created[22].id);

        let mut seen = Vec::new();
        for page in 0..3 {
            let listing = store.list(page * 10, 10).await.unwrap();
            seen.extend(listing.items.into_iter().map(|i| i.id));
        }
        assert_eq!(seen.len(), 23);
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 23);
        let expected: Vec<_> = created.iter().rev().map(|i| i.id).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn skip_past_end_is_empty() {
        let store = MemoryItemStore::new();
        store.create(create("only")).await.unwrap();
        let listing = store.list(10, 10).await.unwrap();
        assert!(listing.items.is_empty());
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = MemoryItemStore::new();
        store.create(create("Test Item")).await.unwrap();
        store.create(create("Other")).await.unwrap();
        for q in ["test", "TEST", "tEsT", "t it"] {
            let listing = store.search(q, 0, 10).await.unwrap();
            assert_eq!(listing.total, 1, "query {q}");
            assert_eq!(listing.items[0].name, "Test Item");
        }
        assert_eq!(store.search("missing", 0, 10).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn search_treats_query_literally() {
        let store = MemoryItemStore::new();
        store.create(create("a.c")).await.unwrap();
        store.create(create("abc")).await.unwrap();
        let listing = store.search(".", 0, 10).await.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].name, "a.c");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let store = MemoryItemStore::new();
        let missing = Uuid::new_v4();
        let update = ItemUpdate {
            name: Some("x".into()),
            description: None,
        };
        assert_eq!(store.update(missing, update).await.unwrap(), None);
        assert!(!store.delete(missing).await.unwrap());
    }

    #[tokio::test]
    async fn update_preserves_id_and_created_at() {
        let store = MemoryItemStore::new();
        let created = store
            .create(ItemCreate {
                name: "Test Item".into(),
                description: Some("desc".into()),
            })
            .await
            .unwrap();
        let updated = store
            .update(
                created.id,
                ItemUpdate {
                    name: None,
                    description: Some(None),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Test Item");
        assert_eq!(updated.description, None);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn delete_then_get_is_none() {
        let store = MemoryItemStore::new();
        let created = store.create(create("gone")).await.unwrap();
        assert!(store.delete(created.id).await.unwrap());
        assert_eq!(store.get(created.id).await.unwrap(), None);
        assert!(!store.delete(created.id).await.unwrap());
    }
}
