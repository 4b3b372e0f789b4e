use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use marbnb_server::config::{DashConfig, ServerConfig};
use marbnb_server::market::{router, seed::seed_demo_data, AppState, MarketStore, PasswordHasher};
use marbnb_server::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("MarBnB Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        anyhow::bail!(e);
    }
    let dash = DashConfig::load_or_default();
    if let Err(e) = dash.validate() {
        error!("Invalid Dash configuration: {}", e);
        anyhow::bail!(e);
    }
    info!(
        "Configuration loaded: {}:{}, dash session={}s, reward={} pts",
        config.bind_address,
        config.port,
        dash.duration_secs(),
        dash.reward_points
    );

    // Initialize shared state
    let metrics = Arc::new(Metrics::new());
    let store = MarketStore::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))?;
    let hasher = PasswordHasher::new(config.password_iterations);

    if config.seed_demo_data {
        tokio::task::block_in_place(|| seed_demo_data(&store, &hasher))
            .context("seeding demo data")?;
    }

    let state = AppState::new(store, hasher, metrics);
    let app = router(state, &config);

    let address = SocketAddr::new(config.bind_address, config.port);
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Server ready on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
