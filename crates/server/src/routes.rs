use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;

use common::types::Health;
use service::store_product::{repo::seaorm::SeaOrmStoreProductRepository, StoreProductService};

use crate::openapi::ApiDoc;

pub mod store_products;

pub type StoreProducts = StoreProductService<SeaOrmStoreProductRepository>;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub store_products: Arc<StoreProducts>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmStoreProductRepository::new(db.clone()));
        Self { db, store_products: Arc::new(StoreProductService::new(repo)) }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses(
        (status = 200, description = "OK", body = crate::openapi::HealthResponse),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health { status: "ok" })),
        Err(e) => {
            warn!(error = %e, "database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health { status: "degraded" }))
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: health, API document and store products.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let store_product_routes = Router::new()
        .route(
            "/store-products",
            get(store_products::list).post(store_products::create),
        )
        .route("/store-products/search-summary", get(store_products::search_summary))
        .route("/store-products/options/:product_id", get(store_products::store_options))
        .route(
            "/store-products/:id",
            get(store_products::get)
                .put(store_products::update)
                .delete(store_products::delete),
        );

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(store_product_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and transport failures
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
