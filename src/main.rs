use anyhow::Context;
use dalal::config::Config;
use dalal::services::load_instruments;
use dalal::types::default_instruments;
use dalal::{open_store, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dalal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting Dalal server on {}:{}", config.host, config.port);

    let instruments = match &config.instruments_file {
        Some(path) => load_instruments(path)
            .with_context(|| format!("loading instruments from {}", path.display()))?,
        None => default_instruments(),
    };
    info!("Loaded {} instruments", instruments.len());

    let store = open_store(&config).context("opening key-value store")?;
    let state = AppState::new(config.clone(), instruments, store);

    // Price ticks run for the life of the process
    let ticker = state.simulator.start(config.tick_interval());
    info!(
        "Price simulator ticking every {}ms (band ±{}%)",
        config.tick_interval_ms,
        config.price_band_pct * 100.0
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dalal server listening on {}", addr);

    axum::serve(listener, dalal::app(state)).await?;

    ticker.abort();
    Ok(())
}
