//! chatdraw server
//!
//! Runs Twitch chat giveaways: watches chat for a keyword, keeps the
//! participant list and draws winners on request from the control panel.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use chatdraw_core::config::ConfigStore;
use chatdraw_core::events::{
    announcement_channel, check_request_channel, coordinator_channel, feed_channel,
};
use chatdraw_core::ledger::Ledger;
use chatdraw_core::processors::{
    AccountChecker, ChatRelay, CoordinatorHandle, GiveawayCoordinator, HelixLookup,
};
use clap::Parser;
use config::ConfigLoader;
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// chatdraw - Twitch chat giveaway coordinator
#[derive(Parser, Debug)]
#[command(name = "chatdraw-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./chatdraw.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Chat token, overrides `twitch.oauth`
    #[arg(long, env = "TWITCH_OAUTH", hide_env_values = true)]
    oauth: Option<String>,

    /// Run without connecting to Twitch chat
    #[arg(long, default_value = "false")]
    no_chat: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting chatdraw-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(
        &args.config,
        args.listen,
        args.oauth.clone(),
        !args.no_chat,
    ));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Channels
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (events_tx, events_rx) = coordinator_channel();
    let (announce_tx, announce_rx) = announcement_channel();
    let feed_tx = feed_channel();
    let channel_store = ConfigStore::new(loaded_config.channels.clone());

    let mut tasks = Vec::new();

    // Coordinator, with account checks when Helix credentials are configured
    let mut coordinator = GiveawayCoordinator::new(
        Ledger::new(),
        loaded_config.giveaway,
        feed_tx,
        announce_tx.clone(),
    );
    if let Some(helix) = loaded_config.helix.clone() {
        let (check_tx, check_rx) = check_request_channel();
        coordinator = coordinator.with_account_checks(check_tx);
        let checker = AccountChecker::new(HelixLookup::new(helix), announce_tx.clone());
        tasks.push(tokio::spawn(checker.run(shutdown_rx.clone(), check_rx)));
    } else {
        tracing::info!("No [helix] section, !check is disabled");
    }
    tasks.push(tokio::spawn(coordinator.run(shutdown_rx.clone(), events_rx)));

    // Chat relay
    match loaded_config.twitch.clone() {
        Some(twitch) => {
            let relay = ChatRelay::new(twitch, channel_store.clone(), events_tx.clone(), announce_rx);
            tasks.push(tokio::spawn(relay.run(shutdown_rx.clone())));
        }
        None => {
            tracing::warn!("Chat relay disabled (--no-chat), announcements are dropped");
            drop(announce_rx);
        }
    }
    drop(announce_tx);

    // Create application state
    let state = AppState::new(CoordinatorHandle::new(events_tx));

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(config_loader, channel_store);

    // Build the router
    let router = build_router(state, loaded_config.server.web_dir.as_deref());

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background tasks
    reload_notify.notify_one();
    let _ = shutdown_tx.send(true);
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Background task panicked");
        }
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
