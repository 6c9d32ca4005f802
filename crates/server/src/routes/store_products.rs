use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use service::store_product::domain::{
    CreateStoreProductInput, ListStoreProductsQuery, SummaryQuery, UpdateStoreProductInput,
};

use crate::errors::ApiError;
use crate::routes::ServerState;

#[utoipa::path(
    post, path = "/store-products", tag = "store-products",
    request_body = crate::openapi::CreateStoreProductDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Missing field or malformed identifier"),
        (status = 404, description = "Product or store not found"),
        (status = 409, description = "Product already listed in this store"),
        (status = 500, description = "Server error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<CreateStoreProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = body?;
    let created = state.store_products.create(input).await?;
    info!(id = %created.id, "created store product");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Store product created successfully",
            "storeProduct": created,
        })),
    ))
}

#[utoipa::path(
    get, path = "/store-products", tag = "store-products",
    params(
        ("storeId" = Option<String>, Query, description = "Only this store"),
        ("category" = Option<String>, Query, description = "Exact product category"),
        ("recommended" = Option<String>, Query, description = "\"true\" keeps recommended only"),
        ("discount" = Option<String>, Query, description = "\"true\" keeps discounted only"),
        ("search" = Option<String>, Query, description = "Case-insensitive product name fragment")
    ),
    responses(
        (status = 200, description = "List OK"),
        (status = 400, description = "Malformed storeId"),
        (status = 500, description = "Server error")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListStoreProductsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query?;
    let rows = state.store_products.list(q).await?;
    info!(count = rows.len(), "list store products");
    Ok(Json(json!({"success": true, "storeProducts": rows})))
}

#[utoipa::path(
    get, path = "/store-products/{id}", tag = "store-products",
    params(("id" = String, Path, description = "Store product ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = path?;
    let found = state.store_products.get(&id).await?;
    Ok(Json(json!({"success": true, "storeProduct": found})))
}

#[utoipa::path(
    put, path = "/store-products/{id}", tag = "store-products",
    params(("id" = String, Path, description = "Store product ID")),
    request_body = crate::openapi::UpdateStoreProductDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Product already listed in that store"),
        (status = 500, description = "Server error")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateStoreProductInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = path?;
    let Json(input) = body?;
    let updated = state.store_products.update(&id, input).await?;
    info!(id = %updated.id, "updated store product");
    Ok(Json(json!({
        "success": true,
        "message": "Store product updated successfully",
        "storeProduct": updated,
    })))
}

#[utoipa::path(
    delete, path = "/store-products/{id}", tag = "store-products",
    params(("id" = String, Path, description = "Store product ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Server error")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = path?;
    state.store_products.delete(&id).await?;
    info!(id = %id, "deleted store product");
    Ok(Json(json!({"success": true, "message": "Store product deleted successfully"})))
}

#[utoipa::path(
    get, path = "/store-products/search-summary", tag = "store-products",
    params(
        ("category" = Option<String>, Query, description = "Exact product category"),
        ("search" = Option<String>, Query, description = "Case-insensitive product name fragment")
    ),
    responses(
        (status = 200, description = "One summary per available product"),
        (status = 500, description = "Server error")
    )
)]
pub async fn search_summary(
    State(state): State<ServerState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(q) = query?;
    let summaries = state.store_products.search_summary(q).await?;
    Ok(Json(json!({"success": true, "productSummaries": summaries})))
}

#[utoipa::path(
    get, path = "/store-products/options/{product_id}", tag = "store-products",
    params(("product_id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Stores carrying the product"),
        (status = 400, description = "Malformed product ID"),
        (status = 404, description = "No store carries the product"),
        (status = 500, description = "Server error")
    )
)]
pub async fn store_options(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(product_id) = path?;
    let rows = state.store_products.store_options(&product_id).await?;
    Ok(Json(json!({"success": true, "storeProducts": rows})))
}
