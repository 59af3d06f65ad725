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

// One banner, no rarity rewards, so balance assertions stay exact.
const CATALOG: &str = r#"{
    "primaryCurrency": "crystals",
    "startingBalances": {"crystals": 1000, "orbs": 5},
    "banners": [{
        "id": "standard",
        "orbCurrency": "orbs",
        "pullCostOrbs": 1,
        "pullCostPrimary": 70,
        "multiPullCostPrimary": 595,
        "softPityStart": 74,
        "softPityStep": 0.06,
        "hardPity": {"4": 10, "5": 90},
        "baseRates": {"3": 0.943, "4": 0.051, "5": 0.006},
        "pool": [
            {"id": "epic", "displayName": "Epic", "rarity": 5, "category": "character"},
            {"id": "rare", "displayName": "Rare", "rarity": 4, "category": "weapon"},
            {"id": "common", "displayName": "Common", "rarity": 3, "category": "armor"}
        ]
    }],
    "exchanges": []
}"#;

async fn setup_test_app(catalog_json: &str) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let catalog = Arc::new(Catalog::from_json_str(catalog_json).expect("catalog must validate"));
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

async fn post_json(
    app: &TestApp,
    uri: &str,
    account: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(account) = account {
        builder = builder.header("x-account-id", account);
    }
    let req = builder
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let res = app.app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_account(app: &TestApp, account: &str) -> Value {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri("/v1/account")
        .header("x-account-id", account)
        .body(axum::body::Body::empty())
        .unwrap();
    let res = app.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn pull_body(pull_type: &str) -> Value {
    json!({"bannerId": "standard", "pullType": pull_type})
}

#[tokio::test]
async fn test_single_pull_fresh_account() {
    let app = setup_test_app(CATALOG).await;

    let (status, body) = post_json(&app, "/v1/pull", Some("acct-1"), pull_body("single")).await;
    assert_eq!(status, StatusCode::OK);

    // One orb paid, primary currency untouched, one item resolved.
    assert_eq!(body["payment"]["currency"], "orbs");
    assert_eq!(body["payment"]["amount"], 1);
    assert_eq!(body["balances"]["orbs"], 4);
    assert_eq!(body["balances"]["crystals"], 1000);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // Every tracked rarity the pull did not reach increments by one.
    let pulled = body["items"][0]["rarity"].as_u64().unwrap();
    for tier in [4u64, 5u64] {
        let counter = body["pity"][tier.to_string()].as_u64().unwrap();
        if pulled >= tier {
            assert_eq!(counter, 0, "rarity {} should have reset", tier);
        } else {
            assert_eq!(counter, 1, "rarity {} should have incremented", tier);
        }
    }

    let account = get_account(&app, "acct-1").await;
    assert_eq!(account["inventorySize"], 1);
}

#[tokio::test]
async fn test_multi_pull_falls_back_to_discounted_primary() {
    let app = setup_test_app(CATALOG).await;

    // 5 orbs cannot cover a 10-pull; the flat discounted primary price
    // applies instead of 10x the single price.
    let (status, body) = post_json(&app, "/v1/pull", Some("acct-1"), pull_body("multi")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["currency"], "crystals");
    assert_eq!(body["payment"]["amount"], 595);
    assert_eq!(body["balances"]["crystals"], 405);
    assert_eq!(body["balances"]["orbs"], 5);
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_pull_requires_identity() {
    let app = setup_test_app(CATALOG).await;
    let (status, body) = post_json(&app, "/v1/pull", None, pull_body("single")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorKind"], "unauthorized");
}

#[tokio::test]
async fn test_unknown_banner_is_client_error() {
    let app = setup_test_app(CATALOG).await;
    let (status, body) = post_json(
        &app,
        "/v1/pull",
        Some("acct-1"),
        json!({"bannerId": "collab_event", "pullType": "single"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "unknown_banner");
}

#[tokio::test]
async fn test_invalid_pull_type_rejected() {
    let app = setup_test_app(CATALOG).await;
    let (status, body) = post_json(&app, "/v1/pull", Some("acct-1"), pull_body("eleven")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "bad_request");
}

#[tokio::test]
async fn test_insufficient_funds_leaves_account_untouched() {
    // No orbs and not enough crystals for even a single pull.
    let broke = CATALOG.replace(
        r#""startingBalances": {"crystals": 1000, "orbs": 5}"#,
        r#""startingBalances": {"crystals": 69, "orbs": 0}"#,
    );
    let app = setup_test_app(&broke).await;

    let before = get_account(&app, "acct-1").await;

    let (status, body) = post_json(&app, "/v1/pull", Some("acct-1"), pull_body("single")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "insufficient_funds");

    let after = get_account(&app, "acct-1").await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_accounts_are_isolated() {
    let app = setup_test_app(CATALOG).await;

    let (status, _) = post_json(&app, "/v1/pull", Some("acct-1"), pull_body("single")).await;
    assert_eq!(status, StatusCode::OK);

    // A different account still has its full starting balances.
    let other = get_account(&app, "acct-2").await;
    assert_eq!(other["balances"]["orbs"], 5);
    assert_eq!(other["inventorySize"], 0);
}

#[tokio::test]
async fn test_pulls_accumulate_inventory_and_pity() {
    let app = setup_test_app(CATALOG).await;

    for _ in 0..3 {
        let (status, _) = post_json(&app, "/v1/pull", Some("acct-1"), pull_body("single")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let account = get_account(&app, "acct-1").await;
    assert_eq!(account["inventorySize"], 3);
    assert_eq!(account["balances"]["orbs"], 2);

    // Counters stay within [0, hard pity] whatever was pulled.
    for tier in ["4", "5"] {
        let counter = account["pity"]["standard"][tier].as_u64().unwrap();
        assert!(counter <= 90);
    }
}
