//! gopherd Server Binary
//!
//! Starts the TCP server for gopherd.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use gopherd::network::Server;
use gopherd::store::MemoryStore;
use gopherd::{AtomicCounter, Config, GopherService};
use tracing_subscriber::{fmt, EnvFilter};

/// gopherd Server
#[derive(Parser, Debug)]
#[command(name = "gopherd-server")]
#[command(about = "Sequential-identifier service over a versioned key-value store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4311")]
    listen: String,

    /// Store bucket holding the counter record
    #[arg(short, long, default_value = "atomic_counter")]
    bucket: String,

    /// Counter key inside the bucket
    #[arg(short, long, default_value = "last_user_id")]
    key: String,

    /// Highest identifier value to issue (inclusive)
    #[arg(long, default_value = "99")]
    max_value: i64,

    /// Retry backoff on write conflicts, in milliseconds
    #[arg(long, default_value = "10")]
    backoff_ms: u64,

    /// Per-key revision history depth kept by the store
    #[arg(long, default_value = "10")]
    history: usize,

    /// Number of connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gopherd=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("gopherd Server v{}", gopherd::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Counter: {}/{} (max {})", args.bucket, args.key, args.max_value);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .bucket(&args.bucket)
        .key(&args.key)
        .max_value(args.max_value)
        .retry_backoff(Duration::from_millis(args.backoff_ms))
        .history_depth(args.history)
        .worker_threads(args.workers)
        .build();

    // Bind the counter to its bucket
    let store = MemoryStore::new();
    let counter = match AtomicCounter::create(&store, &config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("failed to create atomic counter: {}", e);
            std::process::exit(1);
        }
    };

    let service = GopherService::new(counter);

    // Bind the server before installing the signal handler so the token exists
    let server = match Server::bind(config, service) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("failed to bind server: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = server.shutdown_token();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("received Ctrl+C, initiating shutdown...");
        shutdown.cancel();
    }) {
        tracing::error!("failed to install Ctrl+C handler: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = server.run() {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("server stopped");
}
