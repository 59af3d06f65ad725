use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::LedgerError;
use crate::orchestration::ServiceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unknown banner: {0}")]
    UnknownBanner(String),
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Limit reached: {0}")]
    LimitReached(String),
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

impl AppError {
    /// Machine-readable error kind for the response body.
    fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "configuration_error",
            AppError::Internal(_) => "internal_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::UnknownBanner(_) => "unknown_banner",
            AppError::UnknownExchange(_) => "unknown_exchange",
            AppError::InsufficientFunds(_) => "insufficient_funds",
            AppError::LimitReached(_) => "limit_reached",
            AppError::Storage(_) => "storage_unavailable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Internal(_) | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::UnknownBanner(_)
            | AppError::UnknownExchange(_)
            | AppError::InsufficientFunds(_)
            | AppError::LimitReached(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Ledger(ledger) => match ledger {
                LedgerError::UnknownBanner(banner) => AppError::UnknownBanner(banner.to_string()),
                LedgerError::UnknownExchange(exchange) => {
                    AppError::UnknownExchange(exchange.to_string())
                }
                LedgerError::InsufficientFunds(detail) => {
                    AppError::InsufficientFunds(detail.to_string())
                }
                LedgerError::LimitReached { exchange, limit } => AppError::LimitReached(format!(
                    "exchange {} allows {} uses per month",
                    exchange, limit
                )),
                LedgerError::Configuration(detail) => AppError::Config(detail.to_string()),
            },
            ServiceError::Store(store) => AppError::Storage(store.to_string()),
            ServiceError::Contention => AppError::Storage(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::Config(_)) {
            // A banner/pool mismatch means corrupt results, not bad luck.
            tracing::error!("configuration failure: {}", self);
        }

        let status = self.status();
        let body = Json(json!({
            "errorKind": self.kind(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}
