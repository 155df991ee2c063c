use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use table_admin::{AdminLayer, SqliteAccessor};
use tempfile::TempDir;
use tower::ServiceExt;

async fn admin_router() -> (TempDir, Router) {
    let directory = tempfile::tempdir().unwrap();
    let accessor = SqliteAccessor::connect(directory.path().join("data")).await.unwrap();
    let router = AdminLayer::new("/admin", accessor).into_router();
    (directory, router)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn databases_can_be_created_and_listed() {
    let (_directory, router) = admin_router().await;

    let (status, body) = send(&router, Method::POST, "/admin/api/databases", Some(json!({ "name": "shop" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Database 'shop' created successfully!");

    let (status, body) = send(&router, Method::GET, "/admin/api/databases", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "databases": ["shop"] }));

    let (status, body) = send(&router, Method::POST, "/admin/api/databases", Some(json!({ "name": "shop" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("database exists"));
}

#[tokio::test]
async fn table_lifecycle_over_http() {
    let (directory, router) = admin_router().await;
    send(&router, Method::POST, "/admin/api/databases", Some(json!({ "name": "shop" }))).await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/admin/api/databases/shop/tables",
        Some(json!({
            "name": "items",
            "columns": [
                { "name": "id", "type": "INTEGER", "primaryKey": true },
                { "name": "label", "type": "text" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&router, Method::GET, "/admin/api/databases/shop/tables", None).await;
    assert_eq!(body, json!({ "tables": ["items"] }));

    let source = directory.path().join("items.csv");
    std::fs::write(&source, "id,label\n1,bolt\n2,nut\n").unwrap();
    let (status, body) = send(
        &router,
        Method::POST,
        "/admin/api/databases/shop/tables/items/import",
        Some(json!({ "path": source })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "table": "items", "rowsImported": 2, "createdTable": false }));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/admin/api/databases/shop/tables/items/rows",
        Some(json!({
            "values": { "label": "washer" },
            "filter": [{ "column": "id", "value": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "affectedRows": 1 }));

    let (status, body) = send(
        &router,
        Method::DELETE,
        "/admin/api/databases/shop/tables/items/rows",
        Some(json!({ "filter": [{ "column": "label", "operator": "=", "value": "bolt" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "affectedRows": 1 }));

    let (status, body) = send(&router, Method::GET, "/admin/api/databases/shop/tables/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "items");
    assert_eq!(body["primaryKey"], json!(["id"]));
    assert_eq!(body["rows"], json!([[2, "washer"]]));
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let (directory, router) = admin_router().await;
    send(&router, Method::POST, "/admin/api/databases", Some(json!({ "name": "shop" }))).await;

    let (status, body) = send(&router, Method::GET, "/admin/api/databases/shop/tables/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&router, Method::GET, "/admin/api/databases/bad-name/tables", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let source = directory.path().join("ragged.csv");
    std::fs::write(&source, "id,label\n1,bolt\n2\n").unwrap();
    let (status, _) = send(
        &router,
        Method::POST,
        "/admin/api/databases/shop/tables/items/import",
        Some(json!({ "path": source })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
