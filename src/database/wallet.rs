use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Encode, Executor, Postgres, Type};
use uuid::Uuid;

use crate::database::ModelExt;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Model {
    pub id: i32,
    pub account_id: Uuid,
    pub currency: String,
    pub iban: String,
    pub balance: Decimal,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "wallet_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    #[default]
    Active,
    Deleted,
}

#[async_trait]
impl<'q> ModelExt<'q> for Model {
    async fn fetch_by_id<T, E>(pool: E, id: T) -> sqlx::Result<Option<Self>>
    where
        Self: Sized,
        T: 'q + Encode<'q, Postgres> + Type<Postgres> + Send,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT * FROM wallets WHERE id = $1";

        sqlx::query_as(q).bind(id).fetch_optional(pool).await
    }

    async fn fetch_all<E>(pool: E, limit: i64, offset: i64) -> sqlx::Result<Vec<Self>>
    where
        Self: Sized,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let limit = limit.clamp(1, 1000);
        let q = "SELECT * FROM wallets LIMIT $1 OFFSET $2";

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
        let q = "SELECT COUNT(*) FROM wallets";
        let result: i64 = sqlx::query_scalar(q).fetch_one(pool).await?;

        Ok(result as usize)
    }
}

impl<'q> Model {
    pub async fn fetch_by_iban<S, E>(pool: E, iban: S) -> sqlx::Result<Option<Self>>
    where
        S: AsRef<str>,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let iban = iban.as_ref();

        let q = "SELECT * FROM wallets WHERE iban = $1";
        sqlx::query_as(q).bind(iban).fetch_optional(pool).await
    }

    /// Active wallet owned by the given account. Deleted wallets are
    /// invisible to every caller-facing operation.
    pub async fn fetch_active<S, E>(
        pool: E,
        account_id: Uuid,
        iban: S,
    ) -> sqlx::Result<Option<Self>>
    where
        S: AsRef<str>,
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let iban = iban.as_ref();

        let q = "SELECT * FROM wallets WHERE iban = $1 AND account_id = $2 AND status = 'active'";
        sqlx::query_as(q)
            .bind(iban)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn fetch_for_account<E>(pool: E, account_id: Uuid) -> sqlx::Result<Vec<Self>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT * FROM wallets WHERE account_id = $1 AND status = 'active' ORDER BY created_at ASC";
        sqlx::query_as(q).bind(account_id).fetch_all(pool).await
    }

    pub async fn active_count_for_account<E>(pool: E, account_id: Uuid) -> sqlx::Result<i64>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT COUNT(*) FROM wallets WHERE account_id = $1 AND status = 'active'";
        sqlx::query_scalar(q).bind(account_id).fetch_one(pool).await
    }

    pub async fn create<E>(
        pool: E,
        account_id: Uuid,
        currency: &str,
        iban: &str,
    ) -> sqlx::Result<Model>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "INSERT INTO wallets(account_id, currency, iban, balance, status, created_at) VALUES ($1, $2, $3, 0, 'active', NOW()) RETURNING *";

        sqlx::query_as(q)
            .bind(account_id)
            .bind(currency)
            .bind(iban)
            .fetch_one(pool)
            .await
    }

    /// Clearing wallet of the master account for a currency.
    pub async fn fetch_master<E>(
        pool: E,
        master_account: Uuid,
        currency: &str,
    ) -> sqlx::Result<Option<Self>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT * FROM wallets WHERE account_id = $1 AND currency = $2 AND status = 'active' ORDER BY id ASC LIMIT 1";
        sqlx::query_as(q)
            .bind(master_account)
            .bind(currency)
            .fetch_optional(pool)
            .await
    }

    /// Locks the given wallet rows for the remainder of the enclosing
    /// transaction. The fixed IBAN sort keeps concurrent settlements that
    /// touch the same master wallets from deadlocking each other.
    pub async fn lock_many<E>(pool: E, ibans: &[String]) -> sqlx::Result<Vec<Self>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "SELECT * FROM wallets WHERE iban = ANY($1) ORDER BY iban ASC FOR UPDATE";
        sqlx::query_as(q).bind(ibans).fetch_all(pool).await
    }

    pub async fn set_balance<E>(&self, executor: E, balance: Decimal) -> sqlx::Result<Model>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "UPDATE wallets SET balance = $1 WHERE iban = $2 RETURNING *";

        sqlx::query_as(q)
            .bind(balance)
            .bind(&self.iban)
            .fetch_one(executor)
            .await
    }

    /// A wallet may only leave service once it holds exactly nothing.
    pub fn deletable(&self) -> bool {
        self.status == WalletStatus::Active && self.balance.is_zero()
    }

    /// Soft delete. The WHERE clause re-checks the zero-balance and status
    /// guards so a concurrent deposit cannot slip funds into a dying wallet;
    /// `None` means the guard rejected the transition.
    pub async fn mark_deleted<E>(&self, executor: E) -> sqlx::Result<Option<Model>>
    where
        E: 'q + Executor<'q, Database = Postgres>,
    {
        let q = "UPDATE wallets SET status = 'deleted' WHERE iban = $1 AND status = 'active' AND balance = 0 RETURNING *";

        sqlx::query_as(q).bind(&self.iban).fetch_optional(executor).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::dec;
    use uuid::Uuid;

    use super::*;

    fn wallet(balance: Decimal, status: WalletStatus) -> Model {
        Model {
            id: 1,
            account_id: Uuid::new_v4(),
            currency: "EUR".to_string(),
            iban: "PL17252632410000000000000001".to_string(),
            balance,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_empty_active_wallets_are_deletable() {
        assert!(wallet(dec!(0), WalletStatus::Active).deletable());
        assert!(wallet(dec!(0.00), WalletStatus::Active).deletable());
        assert!(!wallet(dec!(0.01), WalletStatus::Active).deletable());
        assert!(!wallet(dec!(0), WalletStatus::Deleted).deletable());
    }
}
