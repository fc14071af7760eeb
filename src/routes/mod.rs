//! Router assembly: product routes under the configured prefix, common routes
//! at the root, plus request tracing, CORS and a body size limit.

mod common;
mod product;

pub use common::common_routes;
pub use product::product_routes;

use crate::config::{CorsOrigin, Settings};
use crate::state::AppState;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub fn app_router(state: AppState, settings: &Settings) -> Router {
    let products = product_routes(state.clone());
    let api = if settings.api_prefix.is_empty() {
        Router::new().merge(products)
    } else {
        Router::new().nest(&settings.api_prefix, products)
    };

    Router::new()
        .merge(common_routes(state))
        .merge(api)
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(cors_layer(&settings.cors_allow_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &CorsOrigin) -> CorsLayer {
    let allow_origin = match origin {
        CorsOrigin::Any => AllowOrigin::any(),
        CorsOrigin::Exact(value) => AllowOrigin::exact(value.clone()),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
