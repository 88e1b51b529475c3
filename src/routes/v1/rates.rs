use actix_web::{HttpResponse, get, web};
use chrono::Utc;

use crate::database::rate::Model as Rate;
use crate::models::rates::{RateJson, RateListResponse, RateQuery};
use crate::{AppState, errors::KantorError};

#[get("")]
async fn rate_list(
    state: web::Data<AppState>,
    query: web::Query<RateQuery>,
) -> Result<HttpResponse, KantorError> {
    let pool = &state.pool;
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let rates = Rate::latest_all(pool, as_of).await?;
    let rates: Vec<RateJson> = rates.into_iter().map(|rate| rate.into()).collect();

    let response = RateListResponse {
        ok: true,
        count: rates.len(),
        rates,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/rates").service(rate_list));
}
