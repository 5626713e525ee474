use anyhow::{Context, Result};
use dotenv::dotenv;
use shared::{
    config::{Config, ConnectionManager},
    di::Repositories,
    utils::init_logger,
};
use storefront::{handler::AppRouter, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let _log_guard = init_logger("storefront");

    let config = Config::init().context("Failed to load configuration")?;

    let pool = ConnectionManager::new_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        ConnectionManager::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations applied");
    }

    let repositories = Repositories::postgres(pool.clone(), config.order_tx_timeout);
    let state = AppState::new(repositories, &config).await;

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        state
            .di_container
            .auth_service
            .ensure_admin_exists(email, password)
            .await
            .context("Failed to ensure admin user")?;
    }

    AppRouter::serve(&config.host, config.port, state)
        .await
        .context("Failed to start server")?;

    info!("Shutting down, closing database pool");
    pool.close().await;

    Ok(())
}
