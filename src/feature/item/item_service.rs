//! A service for interacting with items.

use crate::{
    feature::item::{
        item_model::{Item, ItemChanges, ItemPatch, ItemPayload, NewItem},
        item_repository::{ItemFilter, ItemRepository},
    },
    infra::{error::ApiResult, pagination::PaginationParams, validation::Valid},
};
use tracing::instrument;

/// Creates a new item.
#[instrument(skip(items))]
pub async fn create_item(items: &dyn ItemRepository, payload: Valid<ItemPayload>) -> ApiResult<Item> {
    let new_item = NewItem::try_from(payload)?;
    items.create_item(new_item).await
}

/// Read an item.
#[instrument(skip(items))]
pub async fn read_item(items: &dyn ItemRepository, id: i64) -> ApiResult<Item> {
    items.fetch_item(id).await
}

/// Replaces every mutable field of an item.
#[instrument(skip(items))]
pub async fn update_item(
    items: &dyn ItemRepository,
    id: i64,
    payload: Valid<ItemPayload>,
) -> ApiResult<Item> {
    let changes = ItemChanges::try_from(payload)?;
    items.update_item(id, changes).await
}

/// Changes the fields of an item that are present in the patch.
#[instrument(skip(items))]
pub async fn patch_item(items: &dyn ItemRepository, id: i64, patch: Valid<ItemPatch>) -> ApiResult<Item> {
    let changes = ItemChanges::try_from(patch)?;
    items.update_item(id, changes).await
}

/// Delete an item.
#[instrument(skip(items))]
pub async fn delete_item(items: &dyn ItemRepository, id: i64) -> ApiResult<()> {
    items.delete_item(id).await
}

/// Lists one page of items, and how many items match in total.
#[instrument(skip(items))]
pub async fn list_items(
    items: &dyn ItemRepository,
    filter: &ItemFilter,
    params: &PaginationParams,
) -> ApiResult<(Vec<Item>, i64)> {
    items.list_items(filter, params).await
}
