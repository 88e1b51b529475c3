use actix_web::{error, http::StatusCode};

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("No exchange rate is available for {0}")]
    Unavailable(String),

    #[error("Rate must be positive")]
    NonPositiveRate,
}

impl error::ResponseError for RateError {
    fn status_code(&self) -> StatusCode {
        match self {
            RateError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RateError::NonPositiveRate => StatusCode::BAD_REQUEST,
        }
    }
}
