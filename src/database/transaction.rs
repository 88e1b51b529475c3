use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Encode, Executor, Postgres, Type};
use uuid::Uuid;

use crate::database::ModelExt;
use crate::routes::PaginationParams;

/// One append-only ledger row. Rows are never updated or deleted; the
/// `visibility` tag partitions the ledger into what end users see and the
/// internal clearing/profit bookkeeping.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Model {
    pub id: i64,
    pub account_id: Uuid,
    pub source_iban: String,
    pub source_currency: String,
    pub destination_iban: String,
    pub destination_currency: String,
    pub amount: Decimal,
    pub rate: Decimal,
    pub result_amount: Decimal,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_visibility")]
pub enum Visibility {
    #[default]
    #[sqlx(rename = "user")]
    #[serde(rename = "user")]
    User,

    #[sqlx(rename = "deposit")]
    #[serde(rename = "deposit")]
    Deposit,

    #[sqlx(rename = "admin-noprofit")]
    #[serde(rename = "admin-noprofit")]
    AdminNoProfit,

    #[sqlx(rename = "admin-profit")]
    #[serde(rename = "admin-profit")]
    AdminProfit,
}

impl From<Visibility> for &str {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::User => "user",
            Visibility::Deposit => "deposit",
            Visibility::AdminNoProfit => "admin-noprofit",
            Visibility::AdminProfit => "admin-profit",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreateData {
    pub account_id: Uuid,
    pub source_iban: String,
    pub source_currency: String,
    pub destination_iban: String,
    pub destination_currency: String,
    pub amount: Decimal,
    pub rate: Decimal,
    pub result_amount: Decimal,
    pub visibility: Visibility,
}

#[async_trait]
impl<'q> ModelExt<'q> for Model {
    async fn fetch_by_id<T, E>(pool: E, id: T) -> sqlx::Result<Option<Self>>
    where
        Self: Sized,
        T: 'q + Encode<'q, Postgres> + Type<Postgres> + Send,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT * FROM transactions WHERE id = $1";

        sqlx::query_as(q).bind(id).fetch_optional(pool).await
    }

    async fn fetch_all<E>(pool: E, limit: i64, offset: i64) -> sqlx::Result<Vec<Self>>
    where
        Self: Sized,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let limit = limit.clamp(1, 1000);
        let q = "SELECT * FROM transactions LIMIT $1 OFFSET $2";

        sqlx::query_as(q)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    async fn total_count<E>(pool: E) -> sqlx::Result<usize>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT COUNT(*) FROM transactions";
        let result: i64 = sqlx::query_scalar(q).fetch_one(pool).await?;

        Ok(result as usize)
    }
}

impl<'q> Model {
    /// Appends one ledger row. Balances are the settlement engine's job;
    /// this only writes the audit trail.
    pub async fn create<E>(executor: E, creation_data: TransactionCreateData) -> sqlx::Result<Model>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = r#"INSERT INTO transactions(account_id, source_iban, source_currency, destination_iban, destination_currency, amount, rate, result_amount, visibility, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) RETURNING *"#;

        sqlx::query_as(q)
            .bind(creation_data.account_id)
            .bind(&creation_data.source_iban)
            .bind(&creation_data.source_currency)
            .bind(&creation_data.destination_iban)
            .bind(&creation_data.destination_currency)
            .bind(creation_data.amount)
            .bind(creation_data.rate)
            .bind(creation_data.result_amount)
            .bind(creation_data.visibility)
            .fetch_one(executor)
            .await
    }

    /// Rows of the given visibility created by the account in the current
    /// calendar month, on the database clock. Drives the spread policy.
    pub async fn count_for_month<E>(
        executor: E,
        account_id: Uuid,
        visibility: Visibility,
    ) -> sqlx::Result<i64>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = r#"SELECT COUNT(*) FROM transactions WHERE account_id = $1 AND visibility = $2 AND date_trunc('month', created_at) = date_trunc('month', NOW())"#;

        sqlx::query_scalar(q)
            .bind(account_id)
            .bind(visibility)
            .fetch_one(executor)
            .await
    }

    /// End-user history of one wallet: rows the wallet sent or received
    /// plus deposits into it, newest first. Clearing legs stay hidden.
    pub async fn history_for_wallet<E>(
        pool: E,
        iban: &str,
        query: &PaginationParams,
    ) -> sqlx::Result<Vec<Model>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let limit = query.limit.unwrap_or(50).clamp(1, 1000);
        let offset = query.offset.unwrap_or(0);

        let q = r#"
        SELECT * FROM transactions
        WHERE (visibility = 'user' AND (source_iban = $1 OR destination_iban = $1))
           OR (visibility = 'deposit' AND destination_iban = $1)
        ORDER BY created_at DESC LIMIT $2 OFFSET $3;
        "#;

        sqlx::query_as(q)
            .bind(iban)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
