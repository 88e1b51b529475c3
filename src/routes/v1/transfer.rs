use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::ModelExt;
use crate::database::account::Model as Account;
use crate::database::transaction::{Model as Transaction, Visibility};
use crate::database::wallet::Model as Wallet;

use crate::errors::account::AccountError;
use crate::errors::rate::RateError;
use crate::errors::wallet::WalletError;
use crate::models::transactions::{
    EstimateQuery, EstimateResponse, TransferDetails, TransferResponse,
};
use crate::settlement::{self, MasterWallets, QuoteResolver, StoredQuotes, TransferPlan};
use crate::{AppState, errors::KantorError};

#[post("")]
async fn transfer_create(
    state: web::Data<AppState>,
    account_id: web::Path<Uuid>,
    details: web::Json<TransferDetails>,
) -> Result<HttpResponse, KantorError> {
    let account_id = account_id.into_inner();
    let details = details.into_inner();
    let pool = &state.pool;
    let amount = details.amount.round_dp(2); // Do not allow more than 2 decimals after the dot.

    let account = Account::fetch_by_id(pool, account_id)
        .await?
        .ok_or(AccountError::NotFound)?;

    let source = Wallet::fetch_active(pool, account.id, &details.source_iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(details.source_iban.clone()))?;
    let destination = Wallet::fetch_active(pool, account.id, &details.destination_iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(details.destination_iban.clone()))?;

    // Evaluated fresh on every request; the promo spread applies while the
    // account is under its monthly allowance.
    let settled = Transaction::count_for_month(pool, account.id, Visibility::User).await?;
    let spread = settlement::spread_for_month(settled, account.transaction_limit());

    let quotes = StoredQuotes::new(pool.clone());
    let masters = MasterWallets::new(pool.clone(), state.master_account);

    let outcome = settlement::settle_transfer(
        pool,
        &source,
        &destination,
        amount,
        spread,
        &quotes,
        &masters,
    )
    .await?;

    let user_row = outcome
        .records
        .first()
        .cloned()
        .ok_or(KantorError::Internal("settlement produced no ledger rows"))?;
    let updated = |iban: &str| {
        outcome
            .wallets
            .iter()
            .find(|w| w.iban == iban)
            .cloned()
            .ok_or(KantorError::Internal("settlement lost a wallet"))
    };

    let response = TransferResponse {
        ok: true,
        transaction: user_row.into(),
        source_wallet: updated(&source.iban)?.into(),
        destination_wallet: updated(&destination.iban)?.into(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Same arithmetic as the transfer itself, with no side effects.
#[get("/estimate")]
async fn transfer_estimate(
    state: web::Data<AppState>,
    account_id: web::Path<Uuid>,
    query: web::Query<EstimateQuery>,
) -> Result<HttpResponse, KantorError> {
    let account_id = account_id.into_inner();
    let query = query.into_inner();
    let pool = &state.pool;
    let amount = query.amount.round_dp(2);

    let account = Account::fetch_by_id(pool, account_id)
        .await?
        .ok_or(AccountError::NotFound)?;

    let source = Wallet::fetch_active(pool, account.id, &query.source_iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(query.source_iban.clone()))?;
    let destination = Wallet::fetch_active(pool, account.id, &query.destination_iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(query.destination_iban.clone()))?;

    let settled = Transaction::count_for_month(pool, account.id, Visibility::User).await?;
    let spread = settlement::spread_for_month(settled, account.transaction_limit());

    let as_of = Utc::now().date_naive();
    let quotes = StoredQuotes::new(pool.clone());
    let source_rate = quotes
        .latest_rate(&source.currency, as_of)
        .await?
        .filter(|rate| *rate > Decimal::ZERO)
        .ok_or_else(|| RateError::Unavailable(source.currency.clone()))?;
    let destination_rate = quotes
        .latest_rate(&destination.currency, as_of)
        .await?
        .filter(|rate| *rate > Decimal::ZERO)
        .ok_or_else(|| RateError::Unavailable(destination.currency.clone()))?;

    let plan = TransferPlan::compute(
        &source,
        &destination,
        amount,
        spread,
        source_rate,
        destination_rate,
    )?;

    let response = EstimateResponse {
        ok: true,
        rate: plan.effective_rate.round_dp(4),
        spread,
        result: plan.converted_amount,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts/{account_id}/transfer")
            .service(transfer_estimate)
            .service(transfer_create),
    );
}
