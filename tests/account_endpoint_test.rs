use axum::http::StatusCode;
use serde_json::{json, Value};
use starnight::api::{self, AppState};
use starnight::catalog::Catalog;
use starnight::db::init_db;
use starnight::orchestration::GachaService;
use starnight::SqliteAccountStore;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

/// These tests run against the embedded default catalog, so they double as
/// a sanity check of the shipped configuration.
async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let catalog = Arc::new(Catalog::load(None).expect("default catalog must validate"));
    let store = Arc::new(SqliteAccountStore::new(
        pool,
        catalog.starting_balances().clone(),
    ));
    let service = Arc::new(GachaService::new(store, catalog));
    let app = api::create_router(AppState { service });

    TestApp {
        app,
        _temp: temp_dir,
    }
}

async fn request(
    app: &TestApp,
    method: &str,
    uri: &str,
    account: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(account) = account {
        builder = builder.header("x-account-id", account);
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let res = app.app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = setup_test_app().await;
    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = request(&app, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_fresh_account_defaults() {
    let app = setup_test_app().await;
    let (status, body) = request(&app, "GET", "/v1/account", Some("tg:42"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Starting balances of the shipped catalog.
    assert_eq!(body["balances"]["star_night_crystals"], 1200);
    assert_eq!(body["balances"]["lumen_orbs"], 5);
    assert_eq!(body["balances"]["halo_orbs"], 2);
    assert_eq!(body["balances"]["auric_crescents"], 50);

    // Both banners report zeroed tracked counters before any pull.
    for banner in ["standard", "limited"] {
        assert_eq!(body["pity"][banner]["4"], 0);
        assert_eq!(body["pity"][banner]["5"], 0);
    }

    assert_eq!(body["inventorySize"], 0);
}

#[tokio::test]
async fn test_account_requires_identity() {
    let app = setup_test_app().await;
    let (status, body) = request(&app, "GET", "/v1/account", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorKind"], "unauthorized");
}

#[tokio::test]
async fn test_account_reflects_pull_activity() {
    let app = setup_test_app().await;

    let (status, pull) = request(
        &app,
        "POST",
        "/v1/pull",
        Some("tg:42"),
        Some(json!({"bannerId": "limited", "pullType": "single"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pull["balances"]["halo_orbs"], 1);

    let (status, body) = request(&app, "GET", "/v1/account", Some("tg:42"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inventorySize"], 1);
    assert_eq!(body["balances"]["halo_orbs"], 1);
    // The standard banner's counters are untouched by a limited pull.
    assert_eq!(body["pity"]["standard"]["4"], 0);
    assert_eq!(body["pity"]["standard"]["5"], 0);
}

#[tokio::test]
async fn test_default_catalog_pull_grants_crescent_reward() {
    let app = setup_test_app().await;

    let (status, pull) = request(
        &app,
        "POST",
        "/v1/pull",
        Some("tg:42"),
        Some(json!({"bannerId": "standard", "pullType": "single"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Every rarity tier of the shipped catalog rewards some crescents, so
    // the balance must have grown past the starting 50.
    let crescents = pull["balances"]["auric_crescents"].as_u64().unwrap();
    assert!(crescents > 50);
    assert!(!pull["rewards"].as_object().unwrap().is_empty());
}
