use rust_decimal::{Decimal, RoundingStrategy};

use crate::database::transaction::{TransactionCreateData, Visibility};
use crate::database::wallet::Model as Wallet;
use crate::errors::transaction::TransactionError;

/// Fractional digits of every settled amount.
pub const AMOUNT_SCALE: u32 = 2;

/// The computed side of one transfer: rates and amounts only, no wallet
/// state. Everything here is deterministic given the inputs; each derived
/// amount is rounded exactly once, to [`AMOUNT_SCALE`] digits.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub amount: Decimal,
    pub spread_rate: Decimal,
    /// `source_rate / destination_rate`, before the spread markdown.
    pub mid_rate: Decimal,
    pub effective_rate: Decimal,
    pub converted_amount: Decimal,
    /// Spread capture, kept at the pre-spread `mid_rate` scale.
    pub broker_fee: Decimal,
}

/// Fail-fast request checks, in fixed precedence order. No side effects;
/// rate availability is the caller's fourth check, after these pass.
pub fn validate_request(
    source: &Wallet,
    destination: &Wallet,
    amount: Decimal,
    spread_rate: Decimal,
) -> Result<(), TransactionError> {
    if source.iban == destination.iban {
        return Err(TransactionError::SameWalletTransfer);
    }
    if amount <= Decimal::ZERO {
        return Err(TransactionError::NonPositiveAmount);
    }
    if amount > source.balance {
        return Err(TransactionError::InsufficientFunds);
    }
    if spread_rate < Decimal::ZERO || spread_rate >= Decimal::ONE {
        return Err(TransactionError::InvalidSpread);
    }

    Ok(())
}

impl TransferPlan {
    /// Computes the conversion for `amount` from `source` to `destination`
    /// at the given quotes. Quotes are units of the reference currency per
    /// 1 unit of the respective wallet currency and must be positive.
    pub fn compute(
        source: &Wallet,
        destination: &Wallet,
        amount: Decimal,
        spread_rate: Decimal,
        source_rate: Decimal,
        destination_rate: Decimal,
    ) -> Result<Self, TransactionError> {
        validate_request(source, destination, amount, spread_rate)?;

        let mid_rate = source_rate / destination_rate;
        let effective_rate = mid_rate * (Decimal::ONE - spread_rate);

        let converted_amount = (amount * effective_rate)
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let broker_fee = (amount * mid_rate * spread_rate)
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);

        Ok(Self {
            amount,
            spread_rate,
            mid_rate,
            effective_rate,
            converted_amount,
            broker_fee,
        })
    }

    /// Materializes the atomic unit to persist: final balances for every
    /// touched wallet and the four ledger rows, in order. Balances come
    /// from the snapshots passed in, so the caller hands over rows it
    /// holds locks on and gets back exactly what may be written.
    pub fn write_set(
        &self,
        source: &Wallet,
        destination: &Wallet,
        buy_master: &Wallet,
        sell_master: &Wallet,
    ) -> Result<WriteSet, TransactionError> {
        if self.amount > source.balance {
            return Err(TransactionError::InsufficientFunds);
        }

        // Deltas are folded per IBAN before materializing: when both
        // wallet currencies match, buy and sell clear through the same
        // master wallet and must not overwrite each other.
        let legs: [(&Wallet, Decimal); 4] = [
            (source, -self.amount),
            (buy_master, self.amount),
            (destination, self.converted_amount),
            (sell_master, -self.converted_amount),
        ];

        let mut balances: Vec<(String, Decimal)> = Vec::with_capacity(4);
        for (wallet, delta) in legs {
            match balances.iter_mut().find(|(iban, _)| *iban == wallet.iban) {
                Some((_, balance)) => *balance += delta,
                None => balances.push((wallet.iban.clone(), wallet.balance + delta)),
            }
        }

        for (iban, balance) in &balances {
            if *balance < Decimal::ZERO {
                return Err(if *iban == source.iban {
                    TransactionError::InsufficientFunds
                } else {
                    TransactionError::InsufficientLiquidity(sell_master.currency.clone())
                });
            }
        }

        let account_id = source.account_id;
        let records = vec![
            // What the user sees: source to destination at the spread rate.
            TransactionCreateData {
                account_id,
                source_iban: source.iban.clone(),
                source_currency: source.currency.clone(),
                destination_iban: destination.iban.clone(),
                destination_currency: destination.currency.clone(),
                amount: self.amount,
                rate: self.effective_rate,
                result_amount: self.converted_amount,
                visibility: Visibility::User,
            },
            // Clearing leg: the user's debit lands in the buy master.
            TransactionCreateData {
                account_id,
                source_iban: source.iban.clone(),
                source_currency: source.currency.clone(),
                destination_iban: buy_master.iban.clone(),
                destination_currency: source.currency.clone(),
                amount: self.amount,
                rate: Decimal::ONE,
                result_amount: self.amount,
                visibility: Visibility::AdminNoProfit,
            },
            // Clearing leg: the sell master funds the user's credit.
            TransactionCreateData {
                account_id,
                source_iban: sell_master.iban.clone(),
                source_currency: destination.currency.clone(),
                destination_iban: destination.iban.clone(),
                destination_currency: destination.currency.clone(),
                amount: self.converted_amount,
                rate: Decimal::ONE,
                result_amount: self.converted_amount,
                visibility: Visibility::AdminNoProfit,
            },
            // The captured spread, retained by the sell master.
            TransactionCreateData {
                account_id,
                source_iban: source.iban.clone(),
                source_currency: destination.currency.clone(),
                destination_iban: sell_master.iban.clone(),
                destination_currency: destination.currency.clone(),
                amount: self.broker_fee,
                rate: self.effective_rate,
                result_amount: self.broker_fee,
                visibility: Visibility::AdminProfit,
            },
        ];

        Ok(WriteSet { balances, records })
    }
}

/// Everything one settlement persists, as one unit: `(iban, new balance)`
/// pairs and the ledger rows to append.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSet {
    pub balances: Vec<(String, Decimal)>,
    pub records: Vec<TransactionCreateData>,
}

/// The single row a deposit appends, alongside its one balance write.
pub fn deposit_record(wallet: &Wallet, amount: Decimal) -> TransactionCreateData {
    TransactionCreateData {
        account_id: wallet.account_id,
        source_iban: wallet.iban.clone(),
        source_currency: wallet.currency.clone(),
        destination_iban: wallet.iban.clone(),
        destination_currency: wallet.currency.clone(),
        amount,
        rate: Decimal::ONE,
        result_amount: amount,
        visibility: Visibility::Deposit,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::dec;
    use uuid::Uuid;

    use super::*;
    use crate::database::wallet::WalletStatus;

    fn wallet(iban: &str, currency: &str, balance: Decimal, account_id: Uuid) -> Wallet {
        Wallet {
            id: 1,
            account_id,
            currency: currency.to_string(),
            iban: iban.to_string(),
            balance,
            status: WalletStatus::Active,
            created_at: Utc::now(),
        }
    }

    fn fixtures() -> (Wallet, Wallet, Wallet, Wallet) {
        let account = Uuid::new_v4();
        let master = Uuid::new_v4();
        (
            wallet("PL17252632410000000000000001", "PLN", dec!(500.00), account),
            wallet("PL15252632410000000018315965", "USD", dec!(20.00), account),
            wallet("PL77252632410000000090957373", "PLN", dec!(10000.00), master),
            wallet("PL40252632410000000000000777", "USD", dec!(10000.00), master),
        )
    }

    #[test]
    fn test_worked_spread_example() {
        let (source, destination, _, _) = fixtures();

        let plan = TransferPlan::compute(
            &source,
            &destination,
            dec!(100),
            dec!(0.02),
            dec!(1.0),
            dec!(3.95),
        )
        .unwrap();

        assert_eq!(plan.mid_rate, dec!(1.0) / dec!(3.95));
        assert_eq!(plan.effective_rate, plan.mid_rate * dec!(0.98));
        assert_eq!(plan.converted_amount, dec!(24.81));
        // Fee stays at the pre-spread ratio, not the discounted rate.
        assert_eq!(plan.broker_fee, dec!(0.51));
    }

    #[test]
    fn test_validation_precedence() {
        let (source, destination, _, _) = fixtures();

        // Same wallet wins over the bad amount.
        assert!(matches!(
            validate_request(&source, &source, dec!(-5), dec!(0.02)),
            Err(TransactionError::SameWalletTransfer)
        ));
        // Non-positive amount wins over insufficient funds.
        assert!(matches!(
            validate_request(&source, &destination, dec!(0), dec!(0.02)),
            Err(TransactionError::NonPositiveAmount)
        ));
        assert!(matches!(
            validate_request(&source, &destination, dec!(500.01), dec!(0.02)),
            Err(TransactionError::InsufficientFunds)
        ));
        assert!(matches!(
            validate_request(&source, &destination, dec!(100), dec!(1)),
            Err(TransactionError::InvalidSpread)
        ));
        assert!(validate_request(&source, &destination, dec!(500.00), dec!(0.02)).is_ok());
    }

    #[test]
    fn test_write_set_four_rows_in_order() {
        let (source, destination, buy_master, sell_master) = fixtures();

        let plan = TransferPlan::compute(
            &source,
            &destination,
            dec!(100),
            dec!(0.02),
            dec!(1.0),
            dec!(3.95),
        )
        .unwrap();
        let ws = plan
            .write_set(&source, &destination, &buy_master, &sell_master)
            .unwrap();

        let tags: Vec<Visibility> = ws.records.iter().map(|r| r.visibility).collect();
        assert_eq!(
            tags,
            vec![
                Visibility::User,
                Visibility::AdminNoProfit,
                Visibility::AdminNoProfit,
                Visibility::AdminProfit,
            ]
        );

        assert_eq!(ws.records[0].amount, dec!(100));
        assert_eq!(ws.records[0].result_amount, dec!(24.81));
        assert_eq!(ws.records[1].rate, Decimal::ONE);
        assert_eq!(ws.records[1].destination_iban, buy_master.iban);
        assert_eq!(ws.records[2].rate, Decimal::ONE);
        assert_eq!(ws.records[2].source_iban, sell_master.iban);
        assert_eq!(ws.records[3].amount, dec!(0.51));
        assert_eq!(ws.records[3].rate, plan.effective_rate);
    }

    #[test]
    fn test_balance_conservation_per_currency() {
        let (source, destination, buy_master, sell_master) = fixtures();

        let plan = TransferPlan::compute(
            &source,
            &destination,
            dec!(100),
            dec!(0.02),
            dec!(1.0),
            dec!(3.95),
        )
        .unwrap();
        let ws = plan
            .write_set(&source, &destination, &buy_master, &sell_master)
            .unwrap();

        let new = |iban: &str| ws.balances.iter().find(|(i, _)| i == iban).unwrap().1;

        // Source currency: whatever leaves the user lands in clearing.
        let d_source = new(&source.iban) - source.balance;
        let d_buy = new(&buy_master.iban) - buy_master.balance;
        assert_eq!(d_source + d_buy, Decimal::ZERO);

        // Destination currency: whatever the user gains, clearing funds.
        let d_destination = new(&destination.iban) - destination.balance;
        let d_sell = new(&sell_master.iban) - sell_master.balance;
        assert_eq!(d_destination + d_sell, Decimal::ZERO);
    }

    #[test]
    fn test_same_currency_transfer_folds_master_deltas() {
        let account = Uuid::new_v4();
        let master = Uuid::new_v4();
        let source = wallet("PL17252632410000000000000001", "EUR", dec!(300.00), account);
        let destination = wallet("PL15252632410000000018315965", "EUR", dec!(0.00), account);
        let eur_master = wallet("PL77252632410000000090957373", "EUR", dec!(1000.00), master);

        let plan = TransferPlan::compute(
            &source,
            &destination,
            dec!(100),
            dec!(0.02),
            dec!(4.30),
            dec!(4.30),
        )
        .unwrap();
        // Both clearing legs hit the one EUR master wallet.
        let ws = plan
            .write_set(&source, &destination, &eur_master, &eur_master)
            .unwrap();

        assert_eq!(ws.balances.len(), 3);
        let master_balance = ws
            .balances
            .iter()
            .find(|(iban, _)| *iban == eur_master.iban)
            .unwrap()
            .1;
        // +100 in, -98 out: the master nets exactly the captured spread.
        assert_eq!(master_balance, dec!(1000.00) + dec!(100) - dec!(98.00));
        assert_eq!(plan.broker_fee, dec!(2.00));
    }

    #[test]
    fn test_sell_master_cannot_go_negative() {
        let (source, destination, buy_master, mut sell_master) = fixtures();
        sell_master.balance = dec!(10.00);

        let plan = TransferPlan::compute(
            &source,
            &destination,
            dec!(100),
            dec!(0.02),
            dec!(1.0),
            dec!(3.95),
        )
        .unwrap();
        let result = plan.write_set(&source, &destination, &buy_master, &sell_master);

        assert!(matches!(
            result,
            Err(TransactionError::InsufficientLiquidity(ref c)) if c == "USD"
        ));
    }

    #[test]
    fn test_deposit_record_shape() {
        let (source, ..) = fixtures();

        let record = deposit_record(&source, dec!(250.00));

        assert_eq!(record.visibility, Visibility::Deposit);
        assert_eq!(record.source_iban, record.destination_iban);
        assert_eq!(record.source_currency, record.destination_currency);
        assert_eq!(record.rate, Decimal::ONE);
        assert_eq!(record.result_amount, dec!(250.00));
    }
}
