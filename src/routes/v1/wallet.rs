use actix_web::{HttpResponse, delete, get, post, web};
use uuid::Uuid;

use crate::database::ModelExt;
use crate::database::account::Model as Account;
use crate::database::transaction::{Model as Transaction, Visibility};
use crate::database::wallet::Model as Wallet;

use crate::errors::account::AccountError;
use crate::errors::wallet::WalletError;
use crate::models::transactions::TransactionJson;
use crate::models::wallets::{
    CreateWalletDetails, WalletHistoryResponse, WalletJson, WalletListResponse, WalletResponse,
};
use crate::utils::{iban, validation};
use crate::{AppState, errors::KantorError, routes::PaginationParams};

#[get("")]
async fn wallet_list(
    state: web::Data<AppState>,
    account_id: web::Path<Uuid>,
) -> Result<HttpResponse, KantorError> {
    let account_id = account_id.into_inner();
    let pool = &state.pool;

    let account = Account::fetch_by_id(pool, account_id)
        .await?
        .ok_or(AccountError::NotFound)?;

    let wallets = Wallet::fetch_for_account(pool, account.id).await?;
    let settled = Transaction::count_for_month(pool, account.id, Visibility::User).await?;

    let wallets: Vec<WalletJson> = wallets.into_iter().map(|wallet| wallet.into()).collect();

    let response = WalletListResponse {
        ok: true,
        count: wallets.len(),
        wallets_remaining: i64::from(account.wallet_limit()) - wallets.len() as i64,
        transactions_this_month: settled,
        transactions_remaining: i64::from(account.transaction_limit()) - settled,
        wallets,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[post("")]
async fn wallet_create(
    state: web::Data<AppState>,
    account_id: web::Path<Uuid>,
    details: web::Json<CreateWalletDetails>,
) -> Result<HttpResponse, KantorError> {
    let account_id = account_id.into_inner();
    let pool = &state.pool;

    let currency = details.currency.trim().to_uppercase();
    if !validation::is_valid_currency(&currency) {
        return Err(WalletError::InvalidCurrency(currency).into());
    }

    let account = Account::fetch_by_id(pool, account_id)
        .await?
        .ok_or(AccountError::NotFound)?;

    let active = Wallet::active_count_for_account(pool, account.id).await?;
    if active >= i64::from(account.wallet_limit()) {
        return Err(WalletError::LimitReached.into());
    }

    // Random core numbers collide eventually; re-roll a few times before
    // giving up.
    let mut allocated = None;
    for _ in 0..8 {
        let candidate = iban::generate_iban(&iban::generate_core_number());
        if Wallet::fetch_by_iban(pool, &candidate).await?.is_none() {
            allocated = Some(candidate);
            break;
        }
    }
    let allocated = allocated.ok_or(KantorError::Internal(
        "could not allocate a unique account number",
    ))?;

    let wallet = Wallet::create(pool, account.id, &currency, &allocated).await?;
    tracing::info!(
        "Created wallet {} ({}) for account {}",
        wallet.iban,
        wallet.currency,
        account.id
    );

    let response = WalletResponse {
        ok: true,
        wallet: wallet.into(),
    };

    Ok(HttpResponse::Ok().json(response))
}

#[get("/{iban}")]
async fn wallet_get(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, KantorError> {
    let (account_id, iban) = path.into_inner();
    let params = query.into_inner();
    let pool = &state.pool;

    let wallet = Wallet::fetch_active(pool, account_id, &iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(iban.clone()))?;

    let transactions = Transaction::history_for_wallet(pool, &wallet.iban, &params).await?;
    let transactions: Vec<TransactionJson> =
        transactions.into_iter().map(|trans| trans.into()).collect();

    let response = WalletHistoryResponse {
        ok: true,
        wallet: wallet.into(),
        count: transactions.len(),
        transactions,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[delete("/{iban}")]
async fn wallet_delete(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, KantorError> {
    let (account_id, iban) = path.into_inner();
    let pool = &state.pool;

    let wallet = Wallet::fetch_active(pool, account_id, &iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(iban.clone()))?;

    if !wallet.deletable() {
        return Err(WalletError::NonZeroBalance.into());
    }

    // The UPDATE re-checks the guard, so a deposit racing us cannot strand
    // funds in a deleted wallet.
    let deleted = wallet
        .mark_deleted(pool)
        .await?
        .ok_or(WalletError::NonZeroBalance)?;
    tracing::info!("Deleted wallet {} of account {}", deleted.iban, account_id);

    let response = WalletResponse {
        ok: true,
        wallet: deleted.into(),
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts/{account_id}/wallets")
            .service(wallet_list)
            .service(wallet_create)
            .service(wallet_get)
            .service(wallet_delete),
    );
}
