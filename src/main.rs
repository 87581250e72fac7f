use std::sync::Arc;
use std::time::Duration;

use scorehub::{
    arguments::{self, patterns, print_help},
    config,
    coordinator::ScoreUpdateCoordinator,
    hub::BroadcastHub,
    limiter::{MemoryWindowBackend, SlidingWindowLimiter},
    logger::{self, LogTag},
    store::{MemoryScoreBackend, RankedScoreStore},
    webserver,
    webserver::state::AppState,
};

/// Main entry point for scorehub
///
/// Startup order matters: directories first (the logger needs the logs
/// directory), then the logger, then configuration, then the service wiring.
#[tokio::main]
async fn main() {
    // Ensure all directories exist BEFORE logger initialization
    if let Err(e) = scorehub::paths::ensure_all_directories() {
        eprintln!("Failed to create required directories: {:#}", e);
        std::process::exit(1);
    }

    // Initialize logger system (now safe to create log files)
    logger::init();

    // Check for help request first
    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "scorehub starting up...");

    // Load configuration (defaults when the file is absent)
    let config_result = match arguments::get_arg_value("--config") {
        Some(path) => config::load_config_from_path(&path),
        None => config::load_config(),
    };
    if let Err(e) = config_result {
        logger::error(LogTag::Config, &format!("Failed to load config: {}", e));
        std::process::exit(1);
    }

    let (rate_limit, heartbeat_secs) = config::with_config(|cfg| {
        (cfg.rate_limit.clone(), cfg.leaderboard.heartbeat_secs)
    });

    // Wire the core components
    let store = Arc::new(RankedScoreStore::new(Arc::new(MemoryScoreBackend::new())));
    let limiter = Arc::new(SlidingWindowLimiter::new(
        Arc::new(MemoryWindowBackend::new()),
        rate_limit,
    ));
    let hub = BroadcastHub::new(Duration::from_secs(heartbeat_secs));
    let coordinator = Arc::new(ScoreUpdateCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&limiter),
        Arc::clone(&hub),
    ));

    let state = Arc::new(AppState::new(store, limiter, Arc::clone(&hub), coordinator));

    // Graceful shutdown on Ctrl-C
    if let Err(e) = ctrlc::set_handler(move || {
        webserver::shutdown();
    }) {
        logger::warning(
            LogTag::System,
            &format!("Failed to install signal handler: {}", e),
        );
    }

    // Blocks until shutdown() is triggered
    if let Err(e) = webserver::start_server(state).await {
        logger::error(LogTag::Webserver, &e);
        logger::flush();
        std::process::exit(1);
    }

    // Server stopped: say goodbye to subscribers and flush logs
    hub.close_all().await;
    logger::info(LogTag::System, "scorehub stopped");
    logger::flush();
}
