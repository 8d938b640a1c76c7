//! Types and functions for storing and loading items.

use crate::{
    feature::item::item_model::{Item, ItemChanges, NewItem},
    infra::{
        database::DbPool,
        error::{ApiResult, ClientError},
        pagination::PaginationParams,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::{instrument, Instrument};
use utoipa::IntoParams;

/// Narrows a listing down to matching items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    /// Only list items whose name or category contains every given term, ignoring case.
    /// Terms are separated by whitespace or commas.
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
        }
    }

    /// The individual search terms.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.search
            .as_deref()
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|term| !term.is_empty())
    }

    /// Whether an item matches every search term.
    pub fn matches(&self, item: &Item) -> bool {
        let name = item.name.to_lowercase();
        let category = item.category.as_str().to_lowercase();
        self.terms().all(|term| {
            let term = term.to_lowercase();
            name.contains(&term) || category.contains(&term)
        })
    }
}

/// Anything that can store items.
///
/// Operations on a single item fail with [`ClientError::NotFound`] if there is no item with the given id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Stores a new item, assigning its id and creation time.
    async fn create_item(&self, new_item: NewItem) -> ApiResult<Item>;

    /// Fetches an item.
    async fn fetch_item(&self, id: i64) -> ApiResult<Item>;

    /// Lists one page of the items matching `filter`, ordered by id,
    /// along with the total number of matching items.
    async fn list_items(
        &self,
        filter: &ItemFilter,
        page: &PaginationParams,
    ) -> ApiResult<(Vec<Item>, i64)>;

    /// Changes an item.
    async fn update_item(&self, id: i64, changes: ItemChanges) -> ApiResult<Item>;

    /// Deletes an item.
    async fn delete_item(&self, id: i64) -> ApiResult<()>;
}

/// A shareable handle to an item repository.
pub type ItemStore = Arc<dyn ItemRepository>;

const COLUMNS: &str = "id, name, category, description, created_at";

/// An item repository backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgItemRepository {
    db: DbPool,
}

impl PgItemRepository {
    /// Creates a new repository.
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

/// Escapes the `LIKE` wildcards in a search term.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_search(query: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    for (i, term) in filter.terms().enumerate() {
        query.push(if i == 0 { " WHERE " } else { " AND " });
        let pattern = like_pattern(term);
        query
            .push("(name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    #[instrument(skip(self))]
    async fn create_item(&self, new_item: NewItem) -> ApiResult<Item> {
        tracing::info!("Creating item {:?}", new_item);
        let mut tx = self.db.begin().await?;
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (name, category, description)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&new_item.name)
        .bind(new_item.category.as_str())
        .bind(&new_item.description)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn fetch_item(&self, id: i64) -> ApiResult<Item> {
        tracing::info!("Reading item");
        let item = sqlx::query_as::<_, Item>(&format!("SELECT {COLUMNS} FROM items WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .instrument(tracing::info_span!("fetch_optional"))
            .await?;
        tracing::info!("Found item: {:?}", item);
        item.ok_or_else(|| ClientError::NotFound.into())
    }

    #[instrument(skip(self))]
    async fn list_items(
        &self,
        filter: &ItemFilter,
        page: &PaginationParams,
    ) -> ApiResult<(Vec<Item>, i64)> {
        tracing::info!("Listing items");
        let mut tx = self.db.begin().await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items");
        push_search(&mut count, filter);
        let count: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .instrument(tracing::info_span!("count"))
            .await?;

        let items = match page.offset() {
            Some(offset) => {
                let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM items"));
                push_search(&mut query, filter);
                query
                    .push(" ORDER BY id LIMIT ")
                    .push_bind(page.limit())
                    .push(" OFFSET ")
                    .push_bind(offset);
                query
                    .build_query_as::<Item>()
                    .fetch_all(&mut *tx)
                    .instrument(tracing::info_span!("fetch_all"))
                    .await?
            }
            None => Vec::new(),
        };
        tx.commit().await?;

        tracing::info!("Listed {} of {} items", items.len(), count);
        Ok((items, count))
    }

    #[instrument(skip(self))]
    async fn update_item(&self, id: i64, changes: ItemChanges) -> ApiResult<Item> {
        tracing::info!("Updating item");
        let mut tx = self.db.begin().await?;
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET name = COALESCE($1, name),
                category = COALESCE($2, category),
                description = COALESCE($3, description)
            WHERE id = $4
            RETURNING {COLUMNS}
            "#
        ))
        .bind(changes.name)
        .bind(changes.category.map(|c| c.as_str()))
        .bind(changes.description)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        let Some(item) = item else {
            tracing::warn!("Item not found");
            return Err(ClientError::NotFound)?;
        };
        tracing::info!("Updated item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, id: i64) -> ApiResult<()> {
        tracing::info!("Deleting item");
        let mut tx = self.db.begin().await?;
        let rows = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if rows.rows_affected() == 0 {
            tracing::warn!("Item not found");
            return Err(ClientError::NotFound)?;
        }

        tracing::info!("Deleted item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::item::item_model::Category,
        infra::error::ApiError,
    };
    use chrono::Utc;

    fn item(name: &str, category: Category) -> Item {
        Item {
            id: 1,
            name: name.to_string(),
            category,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn new_item(name: &str, category: Category) -> NewItem {
        NewItem {
            name: name.to_string(),
            category,
            description: String::new(),
        }
    }

    #[test]
    fn filter_splits_terms() {
        let filter = ItemFilter::new("  red, shirt ");
        assert_eq!(vec!["red", "shirt"], filter.terms().collect::<Vec<_>>());
        assert_eq!(0, ItemFilter::default().terms().count());
    }

    #[test]
    fn filter_matches_name_or_category_ignoring_case() {
        let filter = ItemFilter::new("book");
        assert!(filter.matches(&item("Dune", Category::Books)));
        assert!(filter.matches(&item("Notebook", Category::Electronics)));
        assert!(!filter.matches(&item("Red shirt", Category::Clothing)));
        assert!(ItemFilter::default().matches(&item("Anything", Category::Clothing)));
    }

    #[test]
    fn every_term_must_match() {
        let filter = ItemFilter::new("red clothing");
        assert!(filter.matches(&item("Red shirt", Category::Clothing)));
        assert!(!filter.matches(&item("Blue shirt", Category::Clothing)));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!("%100\\%%", like_pattern("100%"));
        assert_eq!("%a\\_b%", like_pattern("a_b"));
        assert_eq!("%plain%", like_pattern("plain"));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a postgres server"]
    async fn create_then_fetch_returns_item(db: DbPool) {
        let repo = PgItemRepository::new(db);
        let created = repo
            .create_item(new_item("Dune", Category::Books))
            .await
            .unwrap();
        let fetched = repo.fetch_item(created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!("", fetched.description);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a postgres server"]
    async fn list_searches_and_paginates(db: DbPool) {
        let repo = PgItemRepository::new(db);
        for i in 0..15 {
            repo.create_item(new_item(&format!("Shirt {i}"), Category::Clothing))
                .await
                .unwrap();
        }
        repo.create_item(new_item("Dune", Category::Books))
            .await
            .unwrap();
        repo.create_item(new_item("E-book reader", Category::Electronics))
            .await
            .unwrap();

        let (items, count) = repo
            .list_items(&ItemFilter::new("BOOK"), &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(2, count);
        assert_eq!(vec!["Dune", "E-book reader"], items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>());

        let (items, count) = repo
            .list_items(&ItemFilter::default(), &PaginationParams::new(Some(2), Some(10)))
            .await
            .unwrap();
        assert_eq!(17, count);
        assert_eq!(7, items.len());

        let (items, count) = repo
            .list_items(&ItemFilter::default(), &PaginationParams::new(Some(5), Some(10)))
            .await
            .unwrap();
        assert_eq!(17, count);
        assert!(items.is_empty());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a postgres server"]
    async fn update_keeps_unchanged_fields(db: DbPool) {
        let repo = PgItemRepository::new(db);
        let created = repo
            .create_item(new_item("Dune", Category::Books))
            .await
            .unwrap();
        let changes = ItemChanges {
            description: Some("Sand".to_string()),
            ..Default::default()
        };
        let updated = repo.update_item(created.id, changes).await.unwrap();
        assert_eq!("Dune", updated.name);
        assert_eq!("Sand", updated.description);
        assert_eq!(created.created_at, updated.created_at);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a postgres server"]
    async fn missing_items_are_not_found(db: DbPool) {
        let repo = PgItemRepository::new(db);
        let not_found = |r: ApiResult<_>| matches!(r, Err(ApiError::ClientError(ClientError::NotFound)));
        assert!(not_found(repo.fetch_item(42).await.map(|_| ())));
        assert!(not_found(repo.update_item(42, ItemChanges::default()).await.map(|_| ())));
        assert!(not_found(repo.delete_item(42).await));
    }
}
