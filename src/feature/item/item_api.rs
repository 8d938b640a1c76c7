//! The item API implementation.

use crate::{
    feature::item::{
        item_model::{Item, ItemPatch, ItemPayload},
        item_repository::{ItemFilter, ItemStore},
        item_service,
    },
    infra::{
        error::{ApiResult, ClientError},
        extract::{Json, Query},
        pagination::{Page, PaginationParams},
        state::AppState,
        validation::Valid,
    },
};
use axum::{
    extract::{rejection::PathRejection, OriginalUri, State},
    response::{IntoResponse, Response},
    Router,
};
use axum_extra::routing::{RouterExt, TypedPath};
use http::{header::HOST, HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::instrument;

/// The item API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_get(list_items)
        .typed_post(create_item)
        .typed_get(get_item)
        .typed_put(update_item)
        .typed_patch(patch_item)
        .typed_delete(delete_item)
}

#[derive(Deserialize, TypedPath)]
#[typed_path("/items/", rejection(ClientError))]
pub struct Items;

#[derive(Deserialize, TypedPath)]
#[typed_path("/items/:id/", rejection(ItemPathRejection))]
pub struct ItemsId(i64);

/// An id that is not an integer names no item, so it is not found.
#[derive(Debug)]
pub struct ItemPathRejection(ClientError);

impl From<PathRejection> for ItemPathRejection {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                tracing::debug!("Not an item id: {e}");
                ItemPathRejection(ClientError::NotFound)
            }
            other => ItemPathRejection(other.into()),
        }
    }
}

impl IntoResponse for ItemPathRejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

/// Lists items, one page at a time.
#[utoipa::path(
    get,
    path = "/api/items/",
    params(ItemFilter, PaginationParams),
    responses(
        (status = 200, description = "Success", body = ItemPage),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn list_items(
    Items: Items,
    State(items): State<ItemStore>,
    Query(filter): Query<ItemFilter>,
    Query(params): Query<PaginationParams>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Json<Page<Item>>> {
    tracing::debug!(?filter, ?params, "Listing items");
    let (results, count) = item_service::list_items(items.as_ref(), &filter, &params).await?;
    let host = headers.get(HOST).and_then(|h| h.to_str().ok());
    Ok(Json(Page::new(results, count, &params, &uri, host)))
}

/// Creates a new item.
#[utoipa::path(
    post,
    path = "/api/items/",
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Created", body = Item),
        (status = 400, description = "Invalid fields", body = FieldErrors),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn create_item(
    Items: Items,
    State(items): State<ItemStore>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let payload = Valid::new(payload)?;
    let item = item_service::create_item(items.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Gets an item.
#[utoipa::path(
    get,
    path = "/api/items/{id}/",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id))]
pub async fn get_item(ItemsId(id): ItemsId, State(items): State<ItemStore>) -> ApiResult<Json<Item>> {
    let item = item_service::read_item(items.as_ref(), id).await?;
    Ok(Json(item))
}

/// Replaces an item.
#[utoipa::path(
    put,
    path = "/api/items/{id}/",
    params(("id" = i64, Path, description = "The item's id")),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 400, description = "Invalid fields", body = FieldErrors),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip(items, payload))]
pub async fn update_item(
    ItemsId(id): ItemsId,
    State(items): State<ItemStore>,
    Json(payload): Json<ItemPayload>,
) -> ApiResult<Json<Item>> {
    let payload = Valid::new(payload)?;
    let item = item_service::update_item(items.as_ref(), id, payload).await?;
    Ok(Json(item))
}

/// Changes some fields of an item.
#[utoipa::path(
    patch,
    path = "/api/items/{id}/",
    params(("id" = i64, Path, description = "The item's id")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 400, description = "Invalid fields", body = FieldErrors),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip(items, patch))]
pub async fn patch_item(
    ItemsId(id): ItemsId,
    State(items): State<ItemStore>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<Json<Item>> {
    let patch = Valid::new(patch)?;
    let item = item_service::patch_item(items.as_ref(), id, patch).await?;
    Ok(Json(item))
}

/// Deletes an item.
#[utoipa::path(
    delete,
    path = "/api/items/{id}/",
    params(("id" = i64, Path, description = "The item's id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id))]
pub async fn delete_item(ItemsId(id): ItemsId, State(items): State<ItemStore>) -> ApiResult<StatusCode> {
    item_service::delete_item(items.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
