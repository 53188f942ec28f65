//! Pit Fight Server
//!
//! A headless matchmaking, fight-lifecycle and wagering engine for an
//! underground fight club game mode.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use pitfight_core::economy::MemoryEconomy;
use pitfight_core::events::{
    CommandSenders, fight_command_channel, outbound_channel, queue_command_channel,
};
use pitfight_core::leaderboard::Leaderboard;
use pitfight_core::presenter::TracingPresenter;
use pitfight_core::processors::{FightEngine, Matchmaker, Notifier};
use pitfight_core::store::JsonStore;
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Pit Fight - headless fight club matchmaking and wagering engine
#[derive(Parser, Debug)]
#[command(name = "pitfight-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./pitfight-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override the data directory for the JSON store
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting pitfight-server v{}", env!("CARGO_PKG_VERSION"));

    let loader = ConfigLoader::new(&args.config, args.listen);
    let file_config = loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = file_config.server.listen;
    let data_dir = args.data_dir.unwrap_or(file_config.storage.data_dir);
    let game = Arc::new(file_config.game);

    tracing::info!("Opening store at {:?}", data_dir);
    let store = Arc::new(JsonStore::open(&data_dir).await.map_err(|e| {
        tracing::error!("Failed to open store: {}", e);
        e
    })?);

    let economy = Arc::new(MemoryEconomy::new(file_config.economy.starting_balance));
    let leaderboard = Arc::new(Leaderboard::default());

    // Channels between the processors and the HTTP surface.
    let (queue_tx, queue_rx) = queue_command_channel();
    let (fight_tx, fight_rx) = fight_command_channel();
    let (outbound_tx, outbound_rx) = outbound_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let matchmaker = Matchmaker::new(
        game.clone(),
        economy.clone(),
        store.clone(),
        queue_rx,
        fight_tx.clone(),
        outbound_tx.clone(),
        shutdown_rx.clone(),
    );
    let engine = FightEngine::new(
        game.clone(),
        economy,
        store.clone(),
        leaderboard.clone(),
        fight_rx,
        fight_tx.clone(),
        outbound_tx.clone(),
        shutdown_rx.clone(),
    );
    let notifier = Notifier::new(Arc::new(TracingPresenter), outbound_rx, shutdown_rx);

    let matchmaker_handle = tokio::spawn(matchmaker.run());
    let engine_handle = tokio::spawn(engine.run());
    let notifier_handle = tokio::spawn(notifier.run());

    let state = AppState::new(
        CommandSenders {
            queue: queue_tx,
            fight: fight_tx,
            outbound: outbound_tx,
        },
        store,
        leaderboard,
        game,
        file_config.admin.secret,
    );

    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Wind the processors down before exiting.
    tracing::info!("Stopping processors...");
    if shutdown_tx.send(true).is_err() {
        tracing::warn!("all processors already stopped");
    }
    for (name, handle) in [
        ("matchmaker", matchmaker_handle),
        ("fight engine", engine_handle),
        ("notifier", notifier_handle),
    ] {
        if let Err(e) = handle.await {
            tracing::error!("{} task panicked: {}", name, e);
        }
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
