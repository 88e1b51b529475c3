use actix_web::{HttpResponse, post, web};
use uuid::Uuid;

use crate::database::ModelExt;
use crate::database::account::Model as Account;
use crate::database::wallet::Model as Wallet;

use crate::errors::account::AccountError;
use crate::errors::wallet::WalletError;
use crate::models::transactions::{DepositDetails, DepositResponse};
use crate::settlement;
use crate::{AppState, errors::KantorError};

#[post("")]
async fn deposit_create(
    state: web::Data<AppState>,
    account_id: web::Path<Uuid>,
    details: web::Json<DepositDetails>,
) -> Result<HttpResponse, KantorError> {
    let account_id = account_id.into_inner();
    let details = details.into_inner();
    let pool = &state.pool;
    let amount = details.amount.round_dp(2);

    let account = Account::fetch_by_id(pool, account_id)
        .await?
        .ok_or(AccountError::NotFound)?;

    let wallet = Wallet::fetch_active(pool, account.id, &details.iban)
        .await?
        .ok_or_else(|| WalletError::NotFound(details.iban.clone()))?;

    let (record, wallet) = settlement::deposit(pool, &wallet, amount).await?;

    let response = DepositResponse {
        ok: true,
        transaction: record.into(),
        wallet: wallet.into(),
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/accounts/{account_id}/deposit").service(deposit_create));
}
