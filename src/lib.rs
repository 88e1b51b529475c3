use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub mod database;
pub mod errors;
pub mod guards;
pub mod models;
pub mod routes;
pub mod settlement;
pub mod utils;

#[derive(Debug)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    /// Account owning the per-currency clearing wallets.
    pub master_account: Uuid,
}
