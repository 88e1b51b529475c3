use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::rate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateJson {
    pub currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl From<rate::Model> for RateJson {
    fn from(value: rate::Model) -> Self {
        Self {
            currency: value.currency,
            date: value.date,
            rate: value.rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateListResponse {
    pub ok: bool,
    pub count: usize,
    pub rates: Vec<RateJson>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct RateQuery {
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublishRateDetails {
    pub currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}
