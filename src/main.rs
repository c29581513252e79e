use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fintrack_api::app::{build_router, AppState};
use fintrack_api::auth::PasswordHasher;
use fintrack_api::config;
use fintrack_api::database::DatabaseManager;
use fintrack_api::storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, STORAGE_BACKEND, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fintrack_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting fintrack API in {:?} mode", config.environment);
    if fintrack_api::is_production!() && !config.session.cookie_secure {
        warn!("Session cookies are not marked Secure in production");
    }

    let database = DatabaseManager::connect(&config.database)?;
    if config.database.auto_migrate {
        // an unreachable database should not keep the server from answering /health
        if let Err(e) = database.migrate().await {
            error!("Migrations failed: {}", e);
        }
    }

    let documents = storage::from_config(&config.storage).context("document storage")?;
    let hasher = PasswordHasher::from_config(&config.password)?;

    let state = AppState::new(
        database.repositories(),
        documents,
        hasher,
        &config.session,
        &config.password,
    );
    let app = build_router(state, config);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
