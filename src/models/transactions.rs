use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::transaction::{self, Visibility};
use crate::models::wallets::WalletJson;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionJson {
    /// The ID of this ledger entry.
    pub id: i64,

    pub source_iban: String,
    pub source_currency: String,
    pub destination_iban: String,
    pub destination_currency: String,

    /// Amount debited, in the source currency.
    pub amount: Decimal,

    /// The applied conversion rate.
    pub rate: Decimal,

    /// Amount credited, in the destination currency.
    pub result_amount: Decimal,

    pub visibility: Visibility,

    /// Creation time as an ISO-8601 string.
    pub time: String,
}

impl From<transaction::Model> for TransactionJson {
    fn from(transaction: transaction::Model) -> Self {
        Self {
            id: transaction.id,
            source_iban: transaction.source_iban,
            source_currency: transaction.source_currency,
            destination_iban: transaction.destination_iban,
            destination_currency: transaction.destination_currency,
            amount: transaction.amount,
            rate: transaction.rate,
            result_amount: transaction.result_amount,
            visibility: transaction.visibility,
            time: transaction.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferDetails {
    pub source_iban: String,
    pub destination_iban: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResponse {
    pub ok: bool,
    /// The user-visible leg of the settlement.
    pub transaction: TransactionJson,
    pub source_wallet: WalletJson,
    pub destination_wallet: WalletJson,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EstimateQuery {
    pub source_iban: String,
    pub destination_iban: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResponse {
    pub ok: bool,
    pub rate: Decimal,
    pub spread: Decimal,
    pub result: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepositDetails {
    pub iban: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositResponse {
    pub ok: bool,
    pub transaction: TransactionJson,
    pub wallet: WalletJson,
}
