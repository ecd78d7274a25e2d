use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::ledger::LedgerError;

/// A bid turned away by the validator. These are expected, user-correctable
/// outcomes — the caller fixes the input and retries; nothing was written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BidRejection {
    #[error("auction not found")]
    AuctionNotFound,

    #[error("auction is closed")]
    AuctionClosed,

    #[error("bid amount must be a finite positive number")]
    InvalidAmount,

    #[error("bidder not found")]
    BidderNotFound,

    #[error("insufficient wallet balance: bid {required} exceeds available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("bid amount must be higher than {minimum}")]
    BidTooLow { minimum: f64 },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Rejected(#[from] BidRejection),

    /// Concurrent writers collided on the same auction past the retry budget.
    #[error("auction was modified concurrently, retry the bid")]
    Conflict,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid listing: {0}")]
    InvalidListing(String),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Conflict => AppError::Conflict,
            LedgerError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Ledger(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Rejected(BidRejection::AuctionNotFound)
            | AppError::Rejected(BidRejection::BidderNotFound)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Rejected(_) | AppError::InvalidListing(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
