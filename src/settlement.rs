pub mod engine;
pub mod plan;
pub mod spread;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::database::{rate, wallet};
use crate::errors::KantorError;

pub use engine::{Settlement, deposit, settle_transfer};
pub use plan::{TransferPlan, WriteSet, validate_request};
pub use spread::spread_for_month;

/// Which end of a conversion a clearing wallet stands on: `Buy` receives
/// the source currency the user pays in, `Sell` funds the destination
/// currency the user receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// Latest-quote lookup the engine settles against. Injected per call so
/// tests can substitute deterministic fixtures; implementations must
/// return the most recent quote with `date <= as_of`.
#[async_trait]
pub trait QuoteResolver: Send + Sync {
    async fn latest_rate(
        &self,
        currency: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Decimal>, KantorError>;
}

/// Resolves the clearing counterparty wallet for a currency and side.
#[async_trait]
pub trait MasterWalletResolver: Send + Sync {
    async fn master_wallet(&self, currency: &str, side: Side)
    -> Result<wallet::Model, KantorError>;
}

/// Quotes as published to the rate store.
pub struct StoredQuotes {
    pool: Pool<Postgres>,
}

impl StoredQuotes {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteResolver for StoredQuotes {
    async fn latest_rate(
        &self,
        currency: &str,
        as_of: NaiveDate,
    ) -> Result<Option<Decimal>, KantorError> {
        let rate = rate::Model::latest_for(&self.pool, currency, as_of).await?;
        Ok(rate)
    }
}

/// Clearing wallets of the configured master account, one per currency.
/// Buy and sell resolve to the same wallet; the side distinguishes the
/// direction of the leg being cleared.
pub struct MasterWallets {
    pool: Pool<Postgres>,
    account_id: Uuid,
}

impl MasterWallets {
    pub fn new(pool: Pool<Postgres>, account_id: Uuid) -> Self {
        Self { pool, account_id }
    }
}

#[async_trait]
impl MasterWalletResolver for MasterWallets {
    async fn master_wallet(
        &self,
        currency: &str,
        side: Side,
    ) -> Result<wallet::Model, KantorError> {
        tracing::debug!(currency, ?side, "resolving clearing wallet");

        wallet::Model::fetch_master(&self.pool, self.account_id, currency)
            .await?
            .ok_or(KantorError::Internal(
                "no clearing wallet is configured for this currency",
            ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::dec;

    use super::*;
    use crate::database::rate::REFERENCE_CURRENCY;

    /// In-memory stand-in for the rate store.
    pub(crate) struct StaticQuotes {
        quotes: Vec<(String, NaiveDate, Decimal)>,
    }

    impl StaticQuotes {
        pub(crate) fn new(quotes: &[(&str, &str, Decimal)]) -> Self {
            let quotes = quotes
                .iter()
                .map(|(currency, date, rate)| {
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
                    (currency.to_string(), date, *rate)
                })
                .collect();
            Self { quotes }
        }
    }

    #[async_trait]
    impl QuoteResolver for StaticQuotes {
        async fn latest_rate(
            &self,
            currency: &str,
            as_of: NaiveDate,
        ) -> Result<Option<Decimal>, KantorError> {
            if currency == REFERENCE_CURRENCY {
                return Ok(Some(Decimal::ONE));
            }

            let rate = self
                .quotes
                .iter()
                .filter(|(c, date, _)| c == currency && *date <= as_of)
                .max_by_key(|(_, date, _)| *date)
                .map(|(_, _, rate)| *rate);
            Ok(rate)
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_latest_quote_wins_up_to_date() {
        let quotes = StaticQuotes::new(&[
            ("EUR", "2024-01-01", dec!(4.30)),
            ("EUR", "2024-01-03", dec!(4.35)),
        ]);

        let rate = quotes.latest_rate("EUR", day("2024-01-02")).await.unwrap();
        assert_eq!(rate, Some(dec!(4.30)));

        let rate = quotes.latest_rate("EUR", day("2024-01-05")).await.unwrap();
        assert_eq!(rate, Some(dec!(4.35)));
    }

    #[tokio::test]
    async fn test_unquoted_currency_is_unavailable() {
        let quotes = StaticQuotes::new(&[("EUR", "2024-01-01", dec!(4.30))]);

        let rate = quotes.latest_rate("EUR", day("2023-12-31")).await.unwrap();
        assert_eq!(rate, None);

        let rate = quotes.latest_rate("CHF", day("2024-01-05")).await.unwrap();
        assert_eq!(rate, None);
    }

    #[tokio::test]
    async fn test_reference_currency_is_always_one() {
        let quotes = StaticQuotes::new(&[]);

        let rate = quotes
            .latest_rate(REFERENCE_CURRENCY, day("2024-01-01"))
            .await
            .unwrap();
        assert_eq!(rate, Some(Decimal::ONE));
    }
}
