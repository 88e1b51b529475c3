pub mod internal;
pub mod v1;

use actix_web::{HttpResponse, get, web};

use crate::errors::KantorError;
use crate::guards;

#[get("/")]
pub async fn index_get() -> Result<HttpResponse, KantorError> {
    Ok(HttpResponse::Ok().body("kantor is up"))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(v1::config));
    cfg.service(
        web::scope("/api/_internal")
            .guard(actix_web::guard::fn_guard(guards::internal_key_guard))
            .configure(internal::config),
    );
    cfg.service(web::scope("").service(index_get));
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(50),
            offset: Some(0),
        }
    }
}
