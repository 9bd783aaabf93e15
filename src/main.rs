use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::watch;

use parkpulse_backend::collector::PeriodicCollector;
use parkpulse_backend::config::CollectorConfig;
use parkpulse_backend::db::PgHistoryStore;
use parkpulse_backend::external::{LiveDataProvider, QueueTimesProvider, ThemeParksProvider};
use parkpulse_backend::state::AppState;
use parkpulse_backend::{app, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(logging::LoggingConfig::from_env())?;

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let provider_name =
        std::env::var("DATA_PROVIDER").unwrap_or_else(|_| "themeparks".to_string());
    let provider: Arc<dyn LiveDataProvider> = match provider_name.to_lowercase().as_str() {
        "themeparks" => {
            tracing::info!("Using live data provider: themeparks.wiki");
            Arc::new(ThemeParksProvider::new()?)
        }
        "queuetimes" => {
            tracing::info!("Using live data provider: queue-times.com (legacy)");
            Arc::new(QueueTimesProvider::new()?)
        }
        _ => {
            bail!("Invalid DATA_PROVIDER: {provider_name}. Must be 'themeparks' or 'queuetimes'");
        }
    };

    let config = CollectorConfig::from_env();
    let store = Arc::new(PgHistoryStore::new(pool));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let collector = PeriodicCollector::new(store.clone(), provider.clone(), config.clone());
    let collector_handle = tokio::spawn(collector.run(shutdown_rx));
    tracing::info!("Automated data collection started");

    let state = AppState {
        store,
        provider,
        config,
    };
    let app = app::create_app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("parkpulse backend running at http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Server is down; stop the collection loop before exiting.
    let _ = shutdown_tx.send(true);
    let _ = collector_handle.await;
    tracing::info!("Data collection stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
