mod config;
mod game;
mod handlers;
mod textures;

use std::time::{Duration, Instant};

use classic_rs_net::{
    event_channel, DispatchTable, Multiplayer, ServerConnection, Singleplayer, TcpConnector,
};
use config::ClientConfig;
use game::Game;
use textures::LoggingFetcher;
use tokio::io::AsyncBufReadExt;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// Network tick period, 60 times a second.
const TICK_INTERVAL: Duration = Duration::from_micros(16_667);

#[tokio::main]
async fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "client.toml".into());
    let config = match ClientConfig::load(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "classic-rs client v{} ({})",
        env!("CARGO_PKG_VERSION"),
        if config.use_cpe() { "CPE" } else { "classic" }
    );

    let (events_tx, mut events) = event_channel();
    let mut game = match Game::new(
        config.use_cpe(),
        config.load_options(),
        Box::new(LoggingFetcher::default()),
    ) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create game: {e}");
            std::process::exit(1);
        }
    };

    let mut conn = match config.connection() {
        Some(conn_config) => {
            info!(
                "Connecting to {}:{} as {}",
                conn_config.address, conn_config.port, conn_config.username
            );
            let mut table = DispatchTable::new();
            handlers::register(&mut table);
            let connector = TcpConnector::new(Handle::current());
            ServerConnection::Multiplayer(Multiplayer::new(
                conn_config,
                Box::new(connector),
                table,
                events_tx,
            ))
        }
        None => {
            let dims = (config.world.width, config.world.height, config.world.length);
            if let Err(e) = game.start_singleplayer(config.world.load.as_deref(), dims) {
                error!("Failed to start singleplayer: {e}");
                std::process::exit(1);
            }
            ServerConnection::Singleplayer(Singleplayer::new(events_tx))
        }
    };

    conn.begin_connect(&mut game.level.blocks, config.use_cpe(), Instant::now());

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console: every stdin line is sent as chat
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    'session: loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let now = Instant::now();
                match conn.tick(&mut game, now) {
                    Ok(true) => {
                        if let Err(e) = game.maintenance(&mut conn, now) {
                            warn!("Maintenance failed: {e}");
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        error!("Protocol error: {e}");
                        conn.disconnect("Disconnected", e.to_string());
                    }
                }
                while let Ok(event) = events.try_recv() {
                    if !game.handle_event(event) {
                        break 'session;
                    }
                }
            }
            Some(line) = console_rx.recv() => {
                if let Err(e) = conn.send_chat(&line) {
                    warn!("Failed to send chat: {e}");
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    conn.disconnect("Disconnected", "Client closed");
                    break;
                }
            }
        }
    }

    if let Some(save) = &config.world.save {
        if game.has_world() {
            match game.save_map(save) {
                Ok(()) => info!("Saved map to {}", save.display()),
                Err(e) => error!("Failed to save map to {}: {e}", save.display()),
            }
        }
    }
    info!("Client shut down.");
}
