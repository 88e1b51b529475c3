use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Encode, Executor, Postgres, Type};
use uuid::Uuid;

use crate::database::ModelExt;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Model {
    pub id: Uuid,
    pub username: String,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "account_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Personal,
    Business,
}

impl AccountType {
    /// Tier limits as (monthly transaction allowance, wallet limit).
    pub fn limits(self) -> (i32, i32) {
        match self {
            AccountType::Personal => (10, 5),
            AccountType::Business => (100, 50),
        }
    }
}

impl Model {
    /// Monthly allowance of user-visible settlements for this tier.
    pub fn transaction_limit(&self) -> i32 {
        self.account_type.limits().0
    }

    /// How many active wallets this tier may hold.
    pub fn wallet_limit(&self) -> i32 {
        self.account_type.limits().1
    }
}

#[async_trait]
impl<'q> ModelExt<'q> for Model {
    async fn fetch_by_id<T, E>(pool: E, id: T) -> sqlx::Result<Option<Self>>
    where
        Self: Sized,
        T: 'q + Encode<'q, Postgres> + Type<Postgres> + Send,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT * FROM accounts WHERE id = $1";

        sqlx::query_as(q).bind(id).fetch_optional(pool).await
    }

    async fn fetch_all<E>(pool: E, limit: i64, offset: i64) -> sqlx::Result<Vec<Self>>
    where
        Self: Sized,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let limit = limit.clamp(1, 1000);
        let q = "SELECT * FROM accounts LIMIT $1 OFFSET $2";

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
        let q = "SELECT COUNT(*) FROM accounts";
        let result: i64 = sqlx::query_scalar(q).fetch_one(pool).await?;

        Ok(result as usize)
    }
}
