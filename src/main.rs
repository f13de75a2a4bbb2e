use std::error::Error;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, Environment, File};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use dotenvy::dotenv;

use blog_backend::auth::TokenKeys;
use blog_backend::db::establish_connection_pool_with_size;
use blog_backend::models::config::ServerConfig;
use blog_backend::repository::DieselRepository;
use blog_backend::routes::configure;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine; real deployments use the environment.
    dotenv().ok();

    let server_config = load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(server_config.log_level.as_str()),
    )
    .init();

    let pool = establish_connection_pool_with_size(
        &server_config.database_url,
        server_config.pool_size,
    )?;

    {
        let mut conn = pool.get()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to run migrations: {e}"))?;
        log::info!("Applied {} pending migration(s)", applied.len());
    }

    let repo = web::Data::new(DieselRepository::new(pool));
    let keys = web::Data::new(TokenKeys::new(
        &server_config.secret_key,
        server_config.access_token_expire_minutes,
    ));

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting blog server on {}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(keys.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
