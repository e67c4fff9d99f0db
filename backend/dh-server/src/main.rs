use dh_server::{Cli, Services, build_router, logger};

use dh_config::Config;

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

/// How long queued gateway events get to flush after the HTTP server stops
const DISPATCHER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load and validate configuration
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::config_dir()?,
    };
    let config = Config::load_from(&config_dir)?;
    config.validate_in(&config_dir)?;

    // Construct log file path if configured
    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let log_dir = config_dir.join(&config.logging.dir);
        std::fs::create_dir_all(&log_dir)?;
        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting dh-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());
    config.log_summary();

    if cli.check_config {
        let catalog = config.load_tabs(&config_dir)?;
        info!(
            "Configuration OK: {} tabs, {} restartable deployments",
            catalog.len(),
            catalog.deployments().len()
        );
        return Ok(());
    }

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| dh_server::ServerError::Metrics {
            message: e.to_string(),
        })?;

    let Services { state, dispatcher } = Services::build(&config, &config_dir, Some(metrics))?;
    let shutdown = state.shutdown.clone();
    let orchestrator = state.orchestrator.clone();

    let app = build_router(state);

    // Create TCP listener
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    let actual_addr = listener.local_addr()?;
    info!("Server listening on {}", actual_addr);

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown_for_signal.shutdown();
    });

    info!("Server ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            info!("HTTP server stopped accepting connections");
        })
        .await?;

    // Let accepted restarts publish their final state
    let drain_timeout = config.restart.drain_timeout();
    let in_flight = orchestrator.in_flight_count();
    if in_flight > 0 {
        info!("Waiting up to {drain_timeout:?} for {in_flight} in-flight restarts");
    }
    if !orchestrator.wait_until_idle(drain_timeout).await {
        warn!("Shutting down with restarts still in flight");
    }
    drop(orchestrator);

    if let Some(dispatcher) = dispatcher
        && tokio::time::timeout(DISPATCHER_FLUSH_TIMEOUT, dispatcher)
            .await
            .is_err()
    {
        warn!("Gateway dispatcher did not flush before shutdown");
    }

    info!("Graceful shutdown complete");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
