pub mod account;
pub mod exchange;
pub mod health;
pub mod pull;

use crate::domain::AccountId;
use crate::error::AppError;
use crate::orchestration::GachaService;
use axum::http::HeaderMap;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Header carrying the opaque, already-authenticated account identifier.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GachaService>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/pull", post(pull::post_pull))
        .route("/v1/exchange", post(exchange::post_exchange))
        .route("/v1/account", get(account::get_account))
        .layer(cors)
        .with_state(state)
}

/// Extract the account id supplied by the upstream identity layer.
///
/// The value is trusted as-is; a missing or empty header means the request
/// never passed authentication.
pub(crate) fn require_account_id(headers: &HeaderMap) -> Result<AccountId, AppError> {
    let value = headers
        .get(ACCOUNT_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing x-account-id header".to_string()))?;
    let id = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid x-account-id header".to_string()))?
        .trim();
    if id.is_empty() {
        return Err(AppError::Unauthorized(
            "empty x-account-id header".to_string(),
        ));
    }
    Ok(AccountId::new(id.to_string()))
}
