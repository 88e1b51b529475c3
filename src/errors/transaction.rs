use actix_web::{error, http::StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Same wallet transfer is not allowed")]
    SameWalletTransfer,

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Clearing wallet for {0} cannot cover this conversion")]
    InsufficientLiquidity(String),

    #[error("Spread rate must lie in [0, 1)")]
    InvalidSpread,

    #[error("Transaction conflict, try again")]
    Conflict,

    #[error("Transaction not found")]
    NotFound,
}

impl error::ResponseError for TransactionError {
    fn status_code(&self) -> StatusCode {
        match self {
            TransactionError::SameWalletTransfer => StatusCode::FORBIDDEN,
            TransactionError::NonPositiveAmount => StatusCode::BAD_REQUEST,
            TransactionError::InsufficientFunds => StatusCode::BAD_REQUEST,
            TransactionError::InsufficientLiquidity(_) => StatusCode::CONFLICT,
            TransactionError::InvalidSpread => StatusCode::BAD_REQUEST,
            TransactionError::Conflict => StatusCode::CONFLICT,
            TransactionError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}
