//! remindd - Payment reminder scheduling service.
//!
//! Main entry point: loads configuration, wires the store, queue,
//! scheduler, dispatcher, and API server together, and runs until
//! interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use remindd_api::{ApiServer, AppState};
use remindd_channels::{EmailGateway, SmsGateway};
use remindd_config::{Config, ConfigLoader, ConfigValidator};
use remindd_dispatch::{ChannelSet, Dispatcher};
use remindd_queue::MemoryQueue;
use remindd_scheduler::Scheduler;
use remindd_store::FileStore;

/// remindd CLI.
#[derive(Parser)]
#[command(name = "remindd")]
#[command(about = "Payment reminder scheduling service")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the service in the foreground (default)
    Run {
        /// Override the API bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the API bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let _log_guard = init_tracing(&config);

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config warning: {}", warning);
    }
    if !validation.is_valid() {
        for issue in &validation.errors {
            error!("Config error: {}", issue);
        }
        anyhow::bail!("configuration is invalid");
    }

    match cli.command.unwrap_or(Commands::Run {
        host: None,
        port: None,
    }) {
        Commands::CheckConfig => {
            info!("Configuration OK");
            Ok(())
        }
        Commands::Run { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run(config).await
        }
    }
}

/// Load configuration, falling back to built-in defaults when the file is
/// absent.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        ConfigLoader::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))
    } else {
        eprintln!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        Ok(Config::default())
    }
}

/// Initialize tracing; returns the appender guard when file logging is on.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    match &config.log.dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "remindd.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            None
        }
    }
}

/// Wire the components together and serve until Ctrl-C.
async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting remindd {}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(
        FileStore::open(&config.store.data_dir)
            .await
            .with_context(|| format!("opening data directory {:?}", config.store.data_dir))?,
    );
    let queue = Arc::new(MemoryQueue::new(config.queue.clone()));
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        queue.clone(),
        config.scheduler.clone(),
    ));

    let mut channels = ChannelSet::new();
    if let Some(sms) = &config.channels.sms {
        if sms.enabled {
            channels = channels.with_sms(Arc::new(SmsGateway::new(
                sms.api_url.clone(),
                sms.api_token.clone(),
                sms.sender.clone(),
            )));
            info!("SMS gateway configured ({})", sms.api_url);
        }
    }
    if let Some(email) = &config.channels.email {
        if email.enabled {
            channels = channels.with_email(Arc::new(EmailGateway::new(
                email.api_url.clone(),
                email.api_token.clone(),
                email.sender.clone(),
            )));
            info!("Email gateway configured ({})", email.api_url);
        }
    }
    if channels.is_empty() {
        warn!("No notification gateway configured; deliveries will fail until one is");
    }

    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        queue.clone(),
        scheduler.clone(),
        channels,
        config.dispatcher.clone(),
    ));
    let state = Arc::new(AppState::new(store, queue, scheduler.clone()));
    let server = ApiServer::new(config.server.clone(), state);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx.clone()));
    let dispatcher_task = tokio::spawn(dispatcher.run(shutdown_rx.clone()));
    let server_shutdown = shutdown_rx.clone();
    let mut server_task = tokio::spawn(async move { server.run(server_shutdown).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            let _ = shutdown_tx.send(true);
            let _ = (&mut server_task).await;
        }
        result = &mut server_task => {
            let _ = shutdown_tx.send(true);
            result
                .context("API server task panicked")?
                .context("API server failed")?;
        }
    }

    let _ = scheduler_task.await;
    let _ = dispatcher_task.await;
    info!("Shutdown complete");
    Ok(())
}
