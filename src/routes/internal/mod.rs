mod rates;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(rates::config);
}
