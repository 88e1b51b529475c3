use actix_web::error;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Account was not found")]
    NotFound,
}

impl error::ResponseError for AccountError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AccountError::NotFound => actix_web::http::StatusCode::NOT_FOUND,
        }
    }
}
