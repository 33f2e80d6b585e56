use clap::Parser;
use inventory_ledger::cli::{Cli, Menu};
use inventory_ledger::utils::logging::redact_url;
use inventory_ledger::{Inventory, RetryExecutor, SqlStore};
use mimalloc::MiMalloc;
use tokio::io::{BufReader, stdin, stdout};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    info!(
        database_url = %redact_url(&cfg.basic.database_url),
        loglevel = %cfg.basic.loglevel,
        max_connections = cfg.basic.max_connections,
        retry_base_delay_ms = cfg.retry.base_delay_ms,
        retry_max_delay_ms = cfg.retry.max_delay_ms,
        retry_max_attempts = cfg.retry.max_attempts,
        retry_deadline_ms = cfg.retry.deadline_ms
    );

    let store = SqlStore::connect(&cfg.basic).await?;
    let inventory = Inventory::new(store, RetryExecutor::from_config(&cfg.retry));
    inventory.bootstrap().await?;

    let menu = Menu::new(&inventory, BufReader::new(stdin()), stdout());
    let session = tokio::select! {
        res = menu.run() => res,
        () = shutdown_signal() => {
            warn!("Interrupted; closing the store connection.");
            Ok(())
        }
    };

    inventory.client().close().await;
    session?;
    info!("Session ended.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
