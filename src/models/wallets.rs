//! Wallet wire models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::wallet::{self, WalletStatus};
use crate::models::transactions::TransactionJson;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletJson {
    pub iban: String,
    pub currency: String,
    pub balance: Decimal,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
}

impl From<wallet::Model> for WalletJson {
    fn from(value: wallet::Model) -> Self {
        Self {
            iban: value.iban,
            currency: value.currency,
            balance: value.balance,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateWalletDetails {
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletResponse {
    pub ok: bool,
    pub wallet: WalletJson,
}

/// Active wallets plus how much of the account's monthly and wallet
/// allowances is left, mirroring what the wallet overview screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletListResponse {
    pub ok: bool,
    pub count: usize,
    pub wallets_remaining: i64,
    pub transactions_this_month: i64,
    pub transactions_remaining: i64,
    pub wallets: Vec<WalletJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletHistoryResponse {
    pub ok: bool,
    pub wallet: WalletJson,
    pub count: usize,
    pub transactions: Vec<TransactionJson>,
}
