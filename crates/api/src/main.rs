//! API server entry point.

use std::net::SocketAddr;

use api::config::{Config, DatabaseProvider, LogFormat};
use api::{AppState, TodoStore};
use sqlx::postgres::PgPoolOptions;
use store::{InMemoryStore, PostgresStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

async fn open_store(config: &Config) -> Result<TodoStore, Box<dyn std::error::Error>> {
    let database = &config.database;

    let store = match database.provider {
        DatabaseProvider::InMemory => {
            if database.apply_migrations {
                tracing::info!("skipping migrations for the in-memory store");
            }
            TodoStore::InMemory(InMemoryStore::new())
        }
        DatabaseProvider::Postgres => {
            let url = database
                .url
                .as_deref()
                .ok_or(api::config::ConfigError::MissingDatabaseUrl)?;
            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(url)
                .await?;
            let store = PostgresStore::new(pool);
            if database.apply_migrations {
                store.run_migrations().await.inspect_err(|e| {
                    tracing::error!(error = %e, "an error occurred while migrating the database");
                })?;
                tracing::info!("database migrations applied");
            }
            TodoStore::Postgres(store)
        }
    };

    if database.seed_data {
        tracing::info!(store = store.name(), "no seed data defined, skipping seeding");
    }

    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env()?;
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Open the store, migrating and seeding as configured
    let store = open_store(&config).await?;
    tracing::info!(store = store.name(), "store ready");

    // 4. Build the application
    let app = api::create_app(AppState::new(store), metrics_handle, &config);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
