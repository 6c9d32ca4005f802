use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CreateStoreProductDoc {
    pub product_id: String,
    pub store_id: String,
    pub price: f64,
    pub stock: i32,
    pub is_available: Option<bool>,
    pub recommended: Option<bool>,
    pub discount: Option<bool>,
    pub store_specific_images: Option<Vec<String>>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateStoreProductDoc {
    pub product_id: Option<String>,
    pub store_id: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub recommended: Option<bool>,
    pub discount: Option<bool>,
    pub store_specific_images: Option<Vec<String>>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductSummaryDoc {
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub store_product_id: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::store_products::create,
        crate::routes::store_products::list,
        crate::routes::store_products::get,
        crate::routes::store_products::update,
        crate::routes::store_products::delete,
        crate::routes::store_products::search_summary,
        crate::routes::store_products::store_options,
    ),
    components(
        schemas(
            HealthResponse,
            CreateStoreProductDoc,
            UpdateStoreProductDoc,
            ProductSummaryDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "store-products")
    )
)]
pub struct ApiDoc;
