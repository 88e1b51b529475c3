use actix_web::{HttpResponse, post, web};
use rust_decimal::Decimal;
use serde_json::json;

use crate::database::rate::{Model as Rate, REFERENCE_CURRENCY};
use crate::errors::rate::RateError;
use crate::models::rates::PublishRateDetails;
use crate::utils::validation;
use crate::{AppState, errors::KantorError};

/// Write side of the daily rate feed. The worker that talks to the feed
/// lives outside this service and publishes through here.
#[post("")]
async fn rates_publish(
    state: web::Data<AppState>,
    details: web::Json<Vec<PublishRateDetails>>,
) -> Result<HttpResponse, KantorError> {
    let batch = details.into_inner();
    let pool = &state.pool;

    for quote in &batch {
        let currency = quote.currency.trim().to_uppercase();
        if !validation::is_valid_currency(&currency) || currency == REFERENCE_CURRENCY {
            return Err(KantorError::Validation(format!(
                "not a quotable currency: {currency}"
            )));
        }
        if quote.rate <= Decimal::ZERO {
            return Err(RateError::NonPositiveRate.into());
        }
    }

    let mut tx = pool.begin().await?;
    for quote in &batch {
        let currency = quote.currency.trim().to_uppercase();
        Rate::upsert(&mut *tx, &currency, quote.date, quote.rate).await?;
    }
    tx.commit().await?;

    tracing::info!("Published {} exchange rate quotes", batch.len());

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "count": batch.len(),
    })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/rates").service(rates_publish));
}
