//! OpenAPI configuration.

use crate::feature::item::{item_api, item_model};
use crate::feature::info::info_api;
use crate::infra::{error, pagination};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    paths(
        info_api::info,
        item_api::list_items,
        item_api::create_item,
        item_api::get_item,
        item_api::update_item,
        item_api::patch_item,
        item_api::delete_item,
    ),
    components(
        schemas(
            info_api::AppInfo,
            item_model::Category,
            item_model::Item,
            item_model::ItemPayload,
            item_model::ItemPatch,
            pagination::ItemPage,
            error::ErrorBody,
            error::FieldErrors,
        )
    ),
    tags(
        (name = "items", description = "Item management endpoints")
    )
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;
