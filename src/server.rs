//! The HTTP server.
//!
//! # Examples
//!
//! Create an item and read it back.
//!
//! ```rust
//! # use item_catalog::{feature::item::memory_item_repository::InMemoryItemRepository, infra::{config::Config, state::AppState}};
//! # use axum::body::Body;
//! # use http::{Request, StatusCode};
//! # use tower::ServiceExt;
//! # use std::sync::Arc;
//! # tokio_test::block_on(async {
//! let state = AppState::new(Arc::new(InMemoryItemRepository::new()), Config::default());
//! let app = item_catalog::server::app(state);
//! let req = Request::post("/api/items/")
//!     .header("Content-Type", "application/json")
//!     .body(Body::from(r#"{"name": "Dune", "category": "BOOKS"}"#))
//!     .unwrap();
//! let res = app.clone().oneshot(req).await.unwrap();
//! assert_eq!(StatusCode::CREATED, res.status());
//!
//! let res = app.oneshot(Request::get("/api/items/1/").body(Body::empty()).unwrap()).await.unwrap();
//! assert_eq!(StatusCode::OK, res.status());
//! # });
//! ```

use crate::feature::{info::info_api, item::item_api};
use crate::infra::{
    config::{Config, ServerConfig},
    error::{ClientError, InternalError, PanicHandler},
    middleware::{log_request_response, MakeRequestIdSpan},
    openapi::ApiDoc,
    shutdown::shutdown_signal,
    state::AppState,
};
use crate::feature::item::item_repository::ItemStore;
use axum::{
    error_handling::HandleErrorLayer,
    response::{IntoResponse, Response},
    Router,
};
use http::{header, HeaderName, HeaderValue, Method, StatusCode};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::{timeout::error::Elapsed, BoxError, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Constructs the REST API without middleware.
pub fn api(state: AppState) -> Router {
    Router::new()
        .merge(info_api::routes())
        .merge(item_api::routes())
        .with_state(state)
}

/// Constructs the full axum application.
pub fn app(state: AppState) -> Router {
    let server = state.config().server.clone();

    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .concurrency_limit(server.concurrency_limit)
        .timeout(server.request_timeout);

    Router::new()
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .nest("/api", api(state))
        // Layers
        .layer(axum::middleware::from_fn(log_request_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(tower_middleware)
        .layer(cors_layer(&server))
        .layer(CatchPanicLayer::custom(PanicHandler))
}

async fn handle_middleware_error(error: BoxError) -> Response {
    if error.is::<Elapsed>() {
        ClientError::Custom(StatusCode::REQUEST_TIMEOUT, "Request timed out.".to_string())
            .into_response()
    } else {
        InternalError::Other(format!("Tower middleware failed: {error}")).into_response()
    }
}

/// Lets browsers on the configured origins call the API.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let allow_origin = if server.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins = server.allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| tracing::warn!("Ignoring allowed origin {origin:?}: {e}"))
                .ok()
        });
        AllowOrigin::list(origins)
    };
    let request_id = HeaderName::from_static("x-request-id");
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, request_id.clone()])
        .expose_headers([request_id])
        .max_age(Duration::from_secs(3600))
}

/// Starts the axum server and runs it until ctrl-c is pressed.
pub async fn run_app(listener: TcpListener, items: ItemStore, config: Config) -> std::io::Result<()> {
    let state = AppState::new(items, config);
    let app = app(state);

    tracing::info!("Starting axum on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Successfully shut down");

    Ok(())
}
