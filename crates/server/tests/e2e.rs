use std::net::SocketAddr;

use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use models::db::{connect_with_config, DatabaseConfig};
use server::routes::{self, ServerState};

struct TestApp {
    base_url: String,
    db: DatabaseConnection,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn product(&self, name: &str, category: &str) -> anyhow::Result<Uuid> {
        let images = vec![format!("{name}.png")];
        Ok(models::product::create(&self.db, name, category, Some("fresh"), &images).await?.id)
    }

    async fn store(&self, name: &str) -> anyhow::Result<Uuid> {
        Ok(models::store::create(&self.db, name, Some("Main St 1")).await?.id)
    }

    async fn create(&self, body: Value) -> anyhow::Result<(HttpStatusCode, Value)> {
        let res = self.client.post(self.url("/store-products")).json(&body).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    async fn get_json(&self, path: &str) -> anyhow::Result<(HttpStatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }
}

/// Serve the real router over a fresh in-memory database.
async fn start_server() -> anyhow::Result<TestApp> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = connect_with_config(&DatabaseConfig { url, ..DatabaseConfig::default() }).await?;
    migration::Migrator::up(&db, None).await?;

    let app = routes::build_router(ServerState::new(db.clone()), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url: format!("http://{}", addr), db, client: reqwest::Client::new() })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (status, body) = app.get_json("/health").await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = app.get_json("/api-docs/openapi.json").await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert!(doc["paths"]["/store-products"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_create_get_update_delete() -> anyhow::Result<()> {
    let app = start_server().await?;
    let pid = app.product("Milk", "dairy").await?;
    let sid = app.store("Corner").await?;

    let (status, body) = app
        .create(json!({"productId": pid, "storeId": sid, "price": 1.25, "stock": 10}))
        .await?;
    assert_eq!(status, HttpStatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Store product created successfully");
    let sp = &body["storeProduct"];
    assert_eq!(sp["productId"]["name"], "Milk");
    assert_eq!(sp["storeId"]["name"], "Corner");
    assert_eq!(sp["isAvailable"], true);
    assert_eq!(sp["recommended"], false);
    assert_eq!(sp["storeSpecificImages"], json!([]));
    let id = sp["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app.get_json(&format!("/store-products/{id}")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["storeProduct"]["price"], 1.25);

    let res = app
        .client
        .put(app.url(&format!("/store-products/{id}")))
        .json(&json!({"stock": 3, "discount": true}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Store product updated successfully");
    assert_eq!(body["storeProduct"]["stock"], 3);
    assert_eq!(body["storeProduct"]["discount"], true);
    assert_eq!(body["storeProduct"]["price"], 1.25);

    let res = app.client.delete(app.url(&format!("/store-products/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Store product deleted successfully");

    let (status, body) = app.get_json(&format!("/store-products/{id}")).await?;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Store product not found");
    Ok(())
}

#[tokio::test]
async fn e2e_create_errors() -> anyhow::Result<()> {
    let app = start_server().await?;
    let pid = app.product("Bread", "bakery").await?;
    let sid = app.store("Bakery Lane").await?;

    let (status, body) = app.create(json!({"productId": pid, "price": 2.0, "stock": 1})).await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .create(json!({"productId": "abc", "storeId": sid, "price": 2.0, "stock": 1}))
        .await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product ID");

    let (status, body) = app
        .create(json!({"productId": Uuid::new_v4(), "storeId": sid, "price": 2.0, "stock": 1}))
        .await?;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, body) = app
        .create(json!({"productId": pid, "storeId": Uuid::new_v4(), "price": 2.0, "stock": 1}))
        .await?;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found");

    let ok = json!({"productId": pid, "storeId": sid, "price": 2.0, "stock": 1});
    assert_eq!(app.create(ok.clone()).await?.0, HttpStatusCode::CREATED);
    let (status, body) = app.create(ok).await?;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["message"], "This product already exists in the store");

    // malformed JSON still gets the envelope
    let res = app
        .client
        .post(app.url("/store-products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn e2e_list_filters() -> anyhow::Result<()> {
    let app = start_server().await?;
    let milk = app.product("Whole Milk", "dairy").await?;
    let bread = app.product("Rye Bread", "bakery").await?;
    let a = app.store("A").await?;
    let b = app.store("B").await?;

    app.create(json!({"productId": milk, "storeId": a, "price": 1.0, "stock": 1, "recommended": true})).await?;
    app.create(json!({"productId": milk, "storeId": b, "price": 1.5, "stock": 1, "discount": true})).await?;
    app.create(json!({"productId": bread, "storeId": a, "price": 3.0, "stock": 1})).await?;

    let count = |v: &Value| v["storeProducts"].as_array().map(|a| a.len()).unwrap_or(0);

    let (status, body) = app.get_json("/store-products").await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(count(&body), 3);

    let (_, body) = app.get_json(&format!("/store-products?storeId={a}")).await?;
    assert_eq!(count(&body), 2);
    let (_, body) = app.get_json("/store-products?recommended=true").await?;
    assert_eq!(count(&body), 1);
    let (_, body) = app.get_json("/store-products?recommended=yes").await?;
    assert_eq!(count(&body), 3);
    let (_, body) = app.get_json("/store-products?discount=true").await?;
    assert_eq!(count(&body), 1);
    let (_, body) = app.get_json("/store-products?category=bakery").await?;
    assert_eq!(count(&body), 1);
    let (_, body) = app.get_json("/store-products?search=MILK").await?;
    assert_eq!(count(&body), 2);
    let (_, body) = app.get_json("/store-products?search=milk&storeId=").await?;
    assert_eq!(count(&body), 2);

    let (status, body) = app.get_json("/store-products?storeId=nope").await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid store ID");
    Ok(())
}

#[tokio::test]
async fn e2e_search_summary_and_options() -> anyhow::Result<()> {
    let app = start_server().await?;
    let milk = app.product("Milk", "dairy").await?;
    let cheese = app.product("Cheese", "dairy").await?;
    let a = app.store("A").await?;
    let b = app.store("B").await?;
    let c = app.store("C").await?;

    app.create(json!({"productId": milk, "storeId": a, "price": 2.0, "stock": 1})).await?;
    app.create(json!({"productId": milk, "storeId": b, "price": 1.5, "stock": 1})).await?;
    app.create(json!({"productId": milk, "storeId": c, "price": 9.0, "stock": 1, "isAvailable": false})).await?;
    app.create(json!({"productId": cheese, "storeId": a, "price": 5.0, "stock": 1, "isAvailable": false})).await?;

    let (status, body) = app.get_json("/store-products/search-summary").await?;
    assert_eq!(status, HttpStatusCode::OK);
    let summaries = body["productSummaries"].as_array().cloned().unwrap_or_default();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["productId"], milk.to_string());
    assert_eq!(summaries[0]["minPrice"], 1.5);
    assert_eq!(summaries[0]["maxPrice"], 2.0);
    assert_eq!(summaries[0]["images"], json!(["Milk.png"]));

    let (_, body) = app.get_json("/store-products/search-summary?search=chee").await?;
    assert_eq!(body["productSummaries"], json!([]));

    let (status, body) = app.get_json(&format!("/store-products/options/{milk}")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["storeProducts"].as_array().map(|a| a.len()), Some(3));

    let lonely = app.product("Salt", "pantry").await?;
    let (status, body) = app.get_json(&format!("/store-products/options/{lonely}")).await?;
    assert_eq!(status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No stores found for this product");

    let (status, _) = app.get_json("/store-products/options/xyz").await?;
    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_update_conflicts_and_validation() -> anyhow::Result<()> {
    let app = start_server().await?;
    let pid = app.product("Eggs", "dairy").await?;
    let a = app.store("A").await?;
    let b = app.store("B").await?;
    app.create(json!({"productId": pid, "storeId": a, "price": 2.0, "stock": 1})).await?;
    let (_, body) = app.create(json!({"productId": pid, "storeId": b, "price": 2.5, "stock": 1})).await?;
    let id = body["storeProduct"]["id"].as_str().unwrap_or_default().to_string();

    let put = |body: Value| {
        let req = app.client.put(app.url(&format!("/store-products/{id}"))).json(&body);
        async move { req.send().await }
    };

    let res = put(json!({"storeId": a})).await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let res = put(json!({"price": -1.0})).await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = put(json!({"storeId": Uuid::new_v4(), "price": 9.0})).await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Store not found");
    let (status, body) = app.get_json(&format!("/store-products/{id}")).await?;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["storeProduct"]["storeId"]["id"], b.to_string());
    assert_eq!(body["storeProduct"]["price"], 2.5);

    let res = app
        .client
        .put(app.url(&format!("/store-products/{}", Uuid::new_v4())))
        .json(&json!({"stock": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = app.client.delete(app.url("/store-products/123")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid store product ID");
    Ok(())
}

#[tokio::test]
async fn e2e_undecodable_path_gets_json_envelope() -> anyhow::Result<()> {
    let app = start_server().await?;
    for path in ["/store-products/%FF", "/store-products/options/%FF"] {
        let (status, body) = app.get_json(path).await?;
        assert_eq!(status, HttpStatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body["success"], false, "{path}");
        assert!(body["message"].is_string(), "{path}");
    }
    let res = app.client.delete(app.url("/store-products/%FF")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}
