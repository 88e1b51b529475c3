pub mod account;
pub mod rate;
pub mod transaction;
pub mod wallet;

use actix_web::{
    HttpResponse,
    body::BoxBody,
    error::{self, JsonPayloadError},
    http::StatusCode,
};

use crate::models::responses::{ApiError, ApiResponse, None};

#[derive(Debug, thiserror::Error)]
pub enum KantorError {
    #[error("Resource not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Account(#[from] account::AccountError),

    #[error(transparent)]
    Wallet(#[from] wallet::WalletError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] transaction::TransactionError),

    #[error("Rate error: {0}")]
    Rate(#[from] rate::RateError),

    #[error("Something went wrong: {0}")]
    Internal(&'static str),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    JsonPayload(#[from] JsonPayloadError),
}

impl error::ResponseError for KantorError {
    fn status_code(&self) -> StatusCode {
        match self {
            KantorError::NotFound => StatusCode::NOT_FOUND,
            KantorError::Validation(..) => StatusCode::BAD_REQUEST,
            KantorError::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
            KantorError::Account(e) => e.status_code(),
            KantorError::Wallet(e) => e.status_code(),
            KantorError::Transaction(e) => e.status_code(),
            KantorError::Rate(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let message = self.to_string();

        let error = ApiError {
            code: match self {
                KantorError::NotFound => "resource_not_found_error",
                KantorError::Validation(..) => "validation_error",
                KantorError::Database(..) => "database_error",
                KantorError::Account(..) => "account_error",
                KantorError::Wallet(..) => "wallet_error",
                KantorError::Transaction(..) => "transaction_error",
                KantorError::Rate(..) => "rate_error",
                _ => "internal_server_error",
            },
            message: &message,
            details: &[],
        };

        let response: ApiResponse<'_, None> = ApiResponse {
            error: Some(error),
            ..Default::default()
        };

        HttpResponse::build(self.status_code()).json(response)
    }
}
