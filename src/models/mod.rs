pub mod rates;
pub mod responses;
pub mod transactions;
pub mod wallets;
