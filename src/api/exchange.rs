use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{require_account_id, AppState};
use crate::domain::{CurrencyId, ExchangeId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub exchange_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub balances: BTreeMap<CurrencyId, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_uses: Option<u32>,
}

pub async fn post_exchange(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExchangeRequest>,
) -> Result<Json<ExchangeResponse>, AppError> {
    let account_id = require_account_id(&headers)?;

    let exchange_id = req.exchange_id.trim();
    if exchange_id.is_empty() {
        return Err(AppError::BadRequest(
            "exchangeId must not be empty".to_string(),
        ));
    }

    let result = state
        .service
        .exchange(&account_id, &ExchangeId::new(exchange_id.to_string()))
        .await?;

    Ok(Json(ExchangeResponse {
        balances: result.balances,
        monthly_uses: result.monthly_uses,
    }))
}
