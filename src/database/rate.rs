use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Executor, Postgres};

/// Reference currency of the rate table. Quotes are "units of reference
/// currency per 1 unit of the quoted currency"; the reference itself is
/// never stored and always resolves to 1.
pub const REFERENCE_CURRENCY: &str = "PLN";

/// A dated quote against the reference currency. At most one row exists
/// per (currency, date); publication upserts.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Model {
    pub currency: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl<'q> Model {
    /// Most recent quote with `date <= as_of`, or `None` if the currency
    /// has never been quoted. Total over the reference currency.
    pub async fn latest_for<E>(
        pool: E,
        currency: &str,
        as_of: NaiveDate,
    ) -> sqlx::Result<Option<Decimal>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        if currency == REFERENCE_CURRENCY {
            return Ok(Some(Decimal::ONE));
        }

        let q = "SELECT rate FROM exchange_rates WHERE currency = $1 AND date <= $2 ORDER BY date DESC LIMIT 1";
        sqlx::query_scalar(q)
            .bind(currency)
            .bind(as_of)
            .fetch_optional(pool)
            .await
    }

    /// Latest known quote per currency as of the given date.
    pub async fn latest_all<E>(pool: E, as_of: NaiveDate) -> sqlx::Result<Vec<Self>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = r#"
        SELECT DISTINCT ON (currency) currency, date, rate
        FROM exchange_rates WHERE date <= $1
        ORDER BY currency ASC, date DESC;
        "#;

        sqlx::query_as(q).bind(as_of).fetch_all(pool).await
    }

    pub async fn upsert<E>(
        pool: E,
        currency: &str,
        date: NaiveDate,
        rate: Decimal,
    ) -> sqlx::Result<Model>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = r#"
        INSERT INTO exchange_rates(currency, date, rate) VALUES ($1, $2, $3)
        ON CONFLICT (currency, date) DO UPDATE SET rate = EXCLUDED.rate
        RETURNING *;
        "#;

        sqlx::query_as(q)
            .bind(currency)
            .bind(date)
            .bind(rate)
            .fetch_one(pool)
            .await
    }
}
