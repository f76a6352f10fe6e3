//! Mine Environmental Monitoring Service - Main Daemon
//!
//! A field-side daemon that continuously:
//! 1. Reads sensor frames from the mine concentrator's serial line
//! 2. Persists every reading through a three-tier failover chain
//!    (PostgreSQL → monitoring API → local SQLite fallback)
//! 3. Evaluates danger thresholds once a reading is durable and records
//!    alerts with automatic acknowledgment responses
//!
//! Usage:
//!   cargo run --release                        # Use ./minemon.toml
//!   cargo run --release -- --config PATH       # Explicit configuration file
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string (primary store)
//!   RUST_LOG     - log verbosity (tracing env-filter syntax)

use minemon_service::config;
use minemon_service::daemon::Daemon;
use minemon_service::transport::LineReader;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    println!("⛏️  Mine Environmental Monitoring Service");
    println!("=========================================\n");

    init_tracing();
    dotenv::dotenv().ok();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    let config = config::load_config(config_path.as_deref());
    let device = config.transport.device.clone();

    // Initialize: connect stores and assemble the pipeline
    println!("📊 Initializing daemon...");
    let mut daemon = Daemon::new(config);
    if let Err(e) = daemon.initialize() {
        eprintln!("\n❌ Initialization failed: {}\n", e);
        std::process::exit(1);
    }
    println!("✓ Daemon initialized\n");

    // Open the serial transport
    let mut transport = match LineReader::open_device(Path::new(&device)) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("\n❌ Cannot open transport device {}: {}\n", device, e);
            std::process::exit(1);
        }
    };

    // Run the ingest loop until the transport fails
    println!("🔄 Listening on {} for sensor frames...", device);
    println!("   Press Ctrl+C to stop\n");

    if let Err(e) = daemon.run(&mut transport) {
        eprintln!("\n❌ Daemon stopped: {}", e);
        std::process::exit(1);
    }
}

/// Install the global tracing subscriber. RUST_LOG controls verbosity;
/// the default keeps per-frame noise at info and above.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("minemon_service=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}
