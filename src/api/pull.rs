use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::{require_account_id, AppState};
use crate::domain::{BannerId, CurrencyId, Item, PityCounters};
use crate::engine::PullType;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub banner_id: String,
    pub pull_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub currency: CurrencyId,
    pub amount: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    pub items: Vec<Item>,
    pub payment: PaymentView,
    pub rewards: BTreeMap<CurrencyId, u64>,
    pub balances: BTreeMap<CurrencyId, u64>,
    pub pity: PityCounters,
}

fn parse_pull_type(input: &str) -> Result<PullType, AppError> {
    match input {
        "single" => Ok(PullType::Single),
        "multi" => Ok(PullType::Multi),
        other => Err(AppError::BadRequest(format!(
            "pullType must be single or multi, got {}",
            other
        ))),
    }
}

pub async fn post_pull(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PullRequest>,
) -> Result<Json<PullResponse>, AppError> {
    let account_id = require_account_id(&headers)?;
    let pull_type = parse_pull_type(&req.pull_type)?;

    let banner_id = req.banner_id.trim();
    if banner_id.is_empty() {
        return Err(AppError::BadRequest("bannerId must not be empty".to_string()));
    }

    let result = state
        .service
        .pull(&account_id, &BannerId::new(banner_id.to_string()), pull_type)
        .await?;

    Ok(Json(PullResponse {
        items: result.items,
        payment: PaymentView {
            currency: result.payment.currency,
            amount: result.payment.amount,
        },
        rewards: result.rewards,
        balances: result.balances,
        pity: result.pity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pull_type() {
        assert_eq!(parse_pull_type("single").unwrap(), PullType::Single);
        assert_eq!(parse_pull_type("multi").unwrap(), PullType::Multi);
        assert!(matches!(
            parse_pull_type("eleven"),
            Err(AppError::BadRequest(_))
        ));
    }
}
