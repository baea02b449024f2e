//! API Gateway for the banking ledger

use std::sync::Arc;

use api_gateway::config::AppConfig;
use api_gateway::{app_router_with_log_level, demo, AppState};
use banking_service::{
    BankingService, BankingServiceConfig, CurrencyConverter, HttpRateSource, InMemoryLedgerStore,
};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

/// Banking ledger API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address, overrides API_ADDR / PORT
    #[clap(short, long)]
    addr: Option<String>,

    /// Seed the in-memory store with sample clients and accounts
    #[clap(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging with debug level when DEBUG=1 env var is set
    let env = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("tower_http=debug,api_gateway=debug,banking_service=debug")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

    // Initialize services
    let config = AppConfig::new();
    let service_config = BankingServiceConfig::from_env();

    let banking_service = match &config.database_url {
        Some(url) => {
            info!("Using PostgreSQL ledger store");
            let service_config = service_config.with_database_url(url.clone());
            BankingService::with_config(&service_config).await?
        }
        None => {
            info!("DATABASE_URL not set, using in-memory ledger store");
            let store = Arc::new(InMemoryLedgerStore::new());
            if args.demo || config.demo {
                demo::seed(&store).await;
            }
            let live = Arc::new(HttpRateSource::from_config(&service_config)?);
            let converter = Arc::new(CurrencyConverter::new(live, store.clone()));
            BankingService::new(store, converter)
        }
    };

    let state = Arc::new(AppState::new(Arc::new(banking_service)));
    let app = app_router_with_log_level(state, log_level);

    // Start the server
    let addr: std::net::SocketAddr = args.addr.unwrap_or(config.addr).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install signal handler: {}", err);
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

    info!("Shutdown signal received, starting graceful shutdown");
}
