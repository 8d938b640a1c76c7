//! An item repository that keeps everything in memory.

use crate::{
    feature::item::{
        item_model::{Item, ItemChanges, NewItem},
        item_repository::{ItemFilter, ItemRepository},
    },
    infra::{
        error::{ApiResult, ClientError},
        pagination::PaginationParams,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Debug, Default)]
struct Items {
    last_id: i64,
    by_id: BTreeMap<i64, Item>,
}

/// An in-memory item repository.
/// Ids are never reused, even after the item with the highest id is deleted.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: RwLock<Items>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    #[instrument(skip(self))]
    async fn create_item(&self, new_item: NewItem) -> ApiResult<Item> {
        let mut items = self.items.write().await;
        items.last_id += 1;
        let item = Item {
            id: items.last_id,
            name: new_item.name,
            category: new_item.category,
            description: new_item.description,
            created_at: Utc::now(),
        };
        items.by_id.insert(item.id, item.clone());
        tracing::info!(item_id = item.id, "Created item");
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn fetch_item(&self, id: i64) -> ApiResult<Item> {
        let items = self.items.read().await;
        Ok(items.by_id.get(&id).cloned().ok_or(ClientError::NotFound)?)
    }

    #[instrument(skip(self))]
    async fn list_items(
        &self,
        filter: &ItemFilter,
        page: &PaginationParams,
    ) -> ApiResult<(Vec<Item>, i64)> {
        let items = self.items.read().await;
        let matching: Vec<&Item> = items.by_id.values().filter(|i| filter.matches(i)).collect();
        let count = matching.len() as i64;
        let page_items = match page.offset().and_then(|o| usize::try_from(o).ok()) {
            Some(offset) => matching
                .into_iter()
                .skip(offset)
                .take(page.limit() as usize)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        tracing::info!("Listed {} of {} items", page_items.len(), count);
        Ok((page_items, count))
    }

    #[instrument(skip(self))]
    async fn update_item(&self, id: i64, changes: ItemChanges) -> ApiResult<Item> {
        let mut items = self.items.write().await;
        let item = items.by_id.get_mut(&id).ok_or(ClientError::NotFound)?;
        changes.apply_to(item);
        tracing::info!(item_id = id, "Updated item");
        Ok(item.clone())
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, id: i64) -> ApiResult<()> {
        let mut items = self.items.write().await;
        items.by_id.remove(&id).ok_or(ClientError::NotFound)?;
        tracing::info!(item_id = id, "Deleted item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{feature::item::item_model::Category, infra::error::ApiError};

    fn new_item(name: &str, category: Category) -> NewItem {
        NewItem {
            name: name.to_string(),
            category,
            description: String::new(),
        }
    }

    fn is_not_found<T>(result: ApiResult<T>) -> bool {
        matches!(result, Err(ApiError::ClientError(ClientError::NotFound)))
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let repo = InMemoryItemRepository::new();
        let first = repo.create_item(new_item("A", Category::Books)).await.unwrap();
        let second = repo.create_item(new_item("B", Category::Books)).await.unwrap();
        repo.delete_item(second.id).await.unwrap();
        let third = repo.create_item(new_item("C", Category::Books)).await.unwrap();
        assert_eq!(1, first.id);
        assert_eq!(2, second.id);
        assert_eq!(3, third.id);
    }

    #[tokio::test]
    async fn list_is_ordered_and_paged() {
        let repo = InMemoryItemRepository::new();
        for i in 0..25 {
            repo.create_item(new_item(&format!("Item {i}"), Category::Electronics))
                .await
                .unwrap();
        }
        let (items, count) = repo
            .list_items(&ItemFilter::default(), &PaginationParams::new(Some(3), Some(10)))
            .await
            .unwrap();
        assert_eq!(25, count);
        assert_eq!(vec![21, 22, 23, 24, 25], items.iter().map(|i| i.id).collect::<Vec<_>>());

        let (items, count) = repo
            .list_items(&ItemFilter::default(), &PaginationParams::new(Some(0), Some(10)))
            .await
            .unwrap();
        assert_eq!(25, count);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_id_and_creation_time() {
        let repo = InMemoryItemRepository::new();
        let created = repo.create_item(new_item("Dune", Category::Books)).await.unwrap();
        let changes = ItemChanges {
            category: Some(Category::Electronics),
            ..Default::default()
        };
        let updated = repo.update_item(created.id, changes).await.unwrap();
        assert_eq!(created.id, updated.id);
        assert_eq!(created.created_at, updated.created_at);
        assert_eq!("Dune", updated.name);
        assert_eq!(Category::Electronics, updated.category);
        assert_eq!(updated, repo.fetch_item(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_items_are_not_found() {
        let repo = InMemoryItemRepository::new();
        assert!(is_not_found(repo.fetch_item(1).await));
        assert!(is_not_found(repo.update_item(1, ItemChanges::default()).await));
        assert!(is_not_found(repo.delete_item(1).await));
    }
}
