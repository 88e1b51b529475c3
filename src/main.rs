use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use sqlx::postgres::PgPool;
use std::env;
use uuid::Uuid;

use kantor::{AppState, routes};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let server_url = env::var("SERVER_URL").expect("SERVER_URL is not set in .env file");
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL is not set in .env file");
    let master_account = env::var("MASTER_ACCOUNT_ID")
        .expect("MASTER_ACCOUNT_ID is not set in .env file")
        .parse::<Uuid>()?;

    let pool = PgPool::connect(&database_url).await?;

    let state = web::Data::new(AppState {
        pool,
        master_account,
    });

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .wrap(Cors::permissive())
            .configure(routes::config)
    })
    .bind(&server_url)?
    .run();

    http_server.await?;

    Ok(())
}
