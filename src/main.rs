use clap::Parser;
use community_library::{
    adapters::{logging, memory, postgres},
    api::{handlers::AppState, router::create_router},
    application::{ServiceDependencies, catalog},
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "community_library=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::parse();

    let service_deps = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to PostgreSQL");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            ServiceDependencies {
                catalog_store: Arc::new(postgres::PostgresCatalogStore::new(pool.clone())),
                lending_ledger: Arc::new(postgres::PostgresLendingLedger::new(pool.clone())),
                reservation_queue: Arc::new(postgres::PostgresReservationQueue::new(pool)),
                notification_service: Arc::new(logging::NotificationService::new()),
            }
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using in-memory stores");

            ServiceDependencies {
                catalog_store: Arc::new(memory::CatalogStore::new()),
                lending_ledger: Arc::new(memory::LendingLedger::new()),
                reservation_queue: Arc::new(memory::ReservationQueue::new()),
                notification_service: Arc::new(logging::NotificationService::new()),
            }
        }
    };

    if config.seed_defaults {
        let seeded = catalog::seed_defaults(&service_deps).await?;
        if seeded > 0 {
            tracing::info!("Seeded {} sample books", seeded);
        }
    }

    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    tracing::info!("Shutting down");
}
