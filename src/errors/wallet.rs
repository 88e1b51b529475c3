use actix_web::error;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet {0} was not found")]
    NotFound(String),

    #[error("Wallet limit for this account has been reached")]
    LimitReached,

    #[error("Wallet still holds funds and cannot be deleted")]
    NonZeroBalance,

    #[error("Unsupported currency code: {0}")]
    InvalidCurrency(String),
}

impl error::ResponseError for WalletError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            WalletError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            WalletError::LimitReached => actix_web::http::StatusCode::FORBIDDEN,
            WalletError::NonZeroBalance => actix_web::http::StatusCode::CONFLICT,
            WalletError::InvalidCurrency(_) => actix_web::http::StatusCode::BAD_REQUEST,
        }
    }
}
