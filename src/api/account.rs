use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::api::{require_account_id, AppState};
use crate::error::AppError;
use crate::orchestration::AccountSummary;

pub async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountSummary>, AppError> {
    let account_id = require_account_id(&headers)?;
    let summary = state.service.account_summary(&account_id).await?;
    Ok(Json(summary))
}
