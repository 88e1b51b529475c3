mod deposit;
mod rates;
mod transfer;
mod wallet;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(wallet::config);
    cfg.configure(transfer::config);
    cfg.configure(deposit::config);
    cfg.configure(rates::config);
}
