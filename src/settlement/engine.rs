use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::database::transaction;
use crate::database::wallet::{self, WalletStatus};
use crate::errors::KantorError;
use crate::errors::rate::RateError;
use crate::errors::transaction::TransactionError;
use crate::errors::wallet::WalletError;

use super::plan::{self, TransferPlan};
use super::{MasterWalletResolver, QuoteResolver, Side};

const MAX_COMMIT_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Outcome of one committed settlement: the four ledger rows in creation
/// order and the post-commit state of every touched wallet.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub records: Vec<transaction::Model>,
    pub wallets: Vec<wallet::Model>,
}

/// Converts `amount` from `source` into `destination` at the latest
/// quotes, marked down by `spread_rate`. The only operation that mutates
/// more than one wallet: all four balance writes and all four ledger rows
/// commit as one transaction, with every touched row locked in IBAN order
/// first and balances re-validated under those locks. Lock conflicts are
/// retried from a fresh snapshot a bounded number of times.
pub async fn settle_transfer(
    pool: &Pool<Postgres>,
    source: &wallet::Model,
    destination: &wallet::Model,
    amount: Decimal,
    spread_rate: Decimal,
    quotes: &dyn QuoteResolver,
    masters: &dyn MasterWalletResolver,
) -> Result<Settlement, KantorError> {
    plan::validate_request(source, destination, amount, spread_rate)?;

    let as_of = chrono::Utc::now().date_naive();
    let source_rate = resolve_rate(quotes, &source.currency, as_of).await?;
    let destination_rate = resolve_rate(quotes, &destination.currency, as_of).await?;

    let plan = TransferPlan::compute(
        source,
        destination,
        amount,
        spread_rate,
        source_rate,
        destination_rate,
    )?;

    let buy_master = masters.master_wallet(&source.currency, Side::Buy).await?;
    let sell_master = masters.master_wallet(&destination.currency, Side::Sell).await?;

    let mut ibans = vec![
        source.iban.clone(),
        destination.iban.clone(),
        buy_master.iban.clone(),
        sell_master.iban.clone(),
    ];
    ibans.sort();
    ibans.dedup();

    for attempt in 1..=MAX_COMMIT_ATTEMPTS {
        let result = try_commit(
            pool,
            &plan,
            source,
            destination,
            &buy_master,
            &sell_master,
            &ibans,
        )
        .await;

        match result {
            Ok(settlement) => {
                tracing::info!(
                    "Settled {} {} into {} {} at rate {} (transaction {})",
                    plan.amount,
                    source.currency,
                    plan.converted_amount,
                    destination.currency,
                    plan.effective_rate,
                    settlement.records[0].id,
                );
                return Ok(settlement);
            }
            Err(KantorError::Database(e)) if is_lock_conflict(&e) => {
                if attempt == MAX_COMMIT_ATTEMPTS {
                    break;
                }
                tracing::warn!(attempt, "Settlement commit hit a lock conflict, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(TransactionError::Conflict.into())
}

/// Credits `amount` to a wallet and appends the single deposit row, as one
/// transaction against the locked row.
pub async fn deposit(
    pool: &Pool<Postgres>,
    target: &wallet::Model,
    amount: Decimal,
) -> Result<(transaction::Model, wallet::Model), KantorError> {
    if amount <= Decimal::ZERO {
        return Err(TransactionError::NonPositiveAmount.into());
    }

    let mut tx = pool.begin().await?;

    let ibans = [target.iban.clone()];
    let locked = wallet::Model::lock_many(&mut *tx, &ibans).await?;
    let current = locked
        .iter()
        .find(|w| w.status == WalletStatus::Active)
        .ok_or_else(|| WalletError::NotFound(target.iban.clone()))?;

    let updated = current
        .set_balance(&mut *tx, current.balance + amount)
        .await?;
    let record = transaction::Model::create(&mut *tx, plan::deposit_record(current, amount)).await?;

    tx.commit().await?;

    tracing::info!(
        "Deposited {} {} into {} (transaction {})",
        amount,
        updated.currency,
        updated.iban,
        record.id,
    );

    Ok((record, updated))
}

async fn resolve_rate(
    quotes: &dyn QuoteResolver,
    currency: &str,
    as_of: NaiveDate,
) -> Result<Decimal, KantorError> {
    match quotes.latest_rate(currency, as_of).await? {
        Some(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(RateError::Unavailable(currency.to_string()).into()),
    }
}

async fn try_commit(
    pool: &Pool<Postgres>,
    plan: &TransferPlan,
    source: &wallet::Model,
    destination: &wallet::Model,
    buy_master: &wallet::Model,
    sell_master: &wallet::Model,
    ibans: &[String],
) -> Result<Settlement, KantorError> {
    let mut tx = pool.begin().await?;

    let locked = wallet::Model::lock_many(&mut *tx, ibans).await?;
    let by_iban: HashMap<&str, &wallet::Model> =
        locked.iter().map(|w| (w.iban.as_str(), w)).collect();

    let write_set = plan.write_set(
        fresh(&by_iban, &source.iban)?,
        fresh(&by_iban, &destination.iban)?,
        fresh(&by_iban, &buy_master.iban)?,
        fresh(&by_iban, &sell_master.iban)?,
    )?;

    let mut wallets = Vec::with_capacity(write_set.balances.len());
    for (iban, new_balance) in &write_set.balances {
        let row = fresh(&by_iban, iban)?;
        wallets.push(row.set_balance(&mut *tx, *new_balance).await?);
    }

    let mut records = Vec::with_capacity(write_set.records.len());
    for data in write_set.records {
        records.push(transaction::Model::create(&mut *tx, data).await?);
    }

    tx.commit().await?;

    Ok(Settlement { records, wallets })
}

/// The locked, current row for an IBAN. A wallet deleted since the caller
/// fetched its snapshot fails the settlement here, before any write.
fn fresh<'a>(
    by_iban: &HashMap<&str, &'a wallet::Model>,
    iban: &str,
) -> Result<&'a wallet::Model, KantorError> {
    let row = by_iban
        .get(iban)
        .copied()
        .ok_or_else(|| WalletError::NotFound(iban.to_string()))?;

    if row.status != WalletStatus::Active {
        return Err(WalletError::NotFound(iban.to_string()).into());
    }

    Ok(row)
}

fn is_lock_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}
