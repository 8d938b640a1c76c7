//! Page number pagination.
//!
//! Pages are 1-indexed. A request for a page past the end is not an error,
//! it simply yields no results.

use crate::feature::item::item_model::Item;
use http::Uri;
use serde::{Deserialize, Deserializer, Serialize};
use url::form_urlencoded;
use utoipa::{IntoParams, ToSchema};

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// The largest page size a client may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// The 1-indexed page to fetch.
    page: Option<i64>,
    /// The number of elements per page, at most 100.
    #[serde(default, deserialize_with = "lenient_size")]
    page_size: Option<i64>,
}

/// A page size that is not a number is treated as not given.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|size| size.trim().parse().ok()))
}

impl PaginationParams {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    /// The requested page size, clamped to [`MAX_PAGE_SIZE`].
    /// Non-positive sizes fall back to [`DEFAULT_PAGE_SIZE`].
    pub fn page_size(&self) -> i64 {
        match self.page_size {
            Some(size) if size > 0 => size.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size()
    }

    /// Rows to skip, or `None` if the page cannot contain anything.
    pub fn offset(&self) -> Option<i64> {
        let page = self.page();
        if page < 1 {
            return None;
        }
        (page - 1).checked_mul(self.page_size())
    }

    /// The number of pages needed for `count` elements. Always at least one.
    pub fn num_pages(&self, count: i64) -> i64 {
        let size = self.page_size();
        ((count + size - 1) / size).max(1)
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[aliases(ItemPage = Page<Item>)]
pub struct Page<T> {
    /// Total number of elements across all pages.
    #[schema(example = 150)]
    pub count: i64,
    /// Link to the next page.
    #[schema(example = "http://localhost:8000/api/items/?page=3")]
    pub next: Option<String>,
    /// Link to the previous page.
    #[schema(example = "http://localhost:8000/api/items/?page=1")]
    pub previous: Option<String>,
    /// The elements on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Builds a page with links relative to the request that asked for it.
    pub fn new(
        results: Vec<T>,
        count: i64,
        params: &PaginationParams,
        uri: &Uri,
        host: Option<&str>,
    ) -> Self {
        let page = params.page();
        let num_pages = params.num_pages(count);
        let next = (page >= 1 && page < num_pages).then(|| page_link(uri, host, page + 1));
        let previous = (page > 1).then(|| page_link(uri, host, (page - 1).min(num_pages)));
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Rewrites the `page` parameter of `uri`, keeping every other parameter.
/// The first page is linked without a `page` parameter.
fn page_link(uri: &Uri, host: Option<&str>, page: i64) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(existing) = uri.query() {
        query.extend_pairs(form_urlencoded::parse(existing.as_bytes()).filter(|(k, _)| k != "page"));
    }
    if page != 1 {
        query.append_pair("page", &page.to_string());
    }
    let query = query.finish();

    let mut link = match host {
        Some(host) => format!("http://{host}{}", uri.path()),
        None => uri.path().to_string(),
    };
    if !query.is_empty() {
        link.push('?');
        link.push_str(&query);
    }
    link
}
