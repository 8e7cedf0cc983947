use clap::Parser;
use ephemcache::config::Config;
use ephemcache::server::CacheServer;
use ephemcache::Result;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ephemcache")]
#[command(about = "Volatile in-memory key-value cache server", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bind host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Memory limit in MiB (overrides config)
    #[arg(long = "memory-limit")]
    memory_limit: Option<u64>,

    /// Log verbosity, 0-3 (overrides config)
    #[arg(long)]
    verbosity: Option<u8>,

    /// Generate example configuration file
    #[arg(long, value_name = "FILE")]
    generate_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle config generation
    if let Some(config_path) = args.generate_config {
        println!("Generating example configuration file: {:?}", config_path);
        Config::create_example(&config_path)?;
        println!("Example configuration file created successfully!");
        println!("Edit the file and run: ephemcache --config {:?}", config_path);
        return Ok(());
    }

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(memory_limit) = args.memory_limit {
        config.cache.memorylimit = memory_limit;
    }
    if let Some(verbosity) = args.verbosity {
        config.logging.verbosity = verbosity;
    }
    config.validate()?;

    init_logging(config.logging.verbosity)?;

    info!("ephemcache v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(config_path) = &args.config {
        info!("Loaded configuration from {:?}", config_path);
    } else {
        info!("No configuration file specified, using defaults");
    }

    let server = CacheServer::new(config).await?;

    info!("Server initialized, starting listener...");

    let shutdown = tokio::spawn(async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        info!("Received Ctrl+C, shutting down gracefully...");
    });

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
        _ = shutdown => {
            info!("Server shutdown complete");
        }
    }

    server.shutdown().await;

    Ok(())
}

/// Maps the 0..=3 verbosity knob onto tracing's severity filter: errors and
/// warnings are always on, info/debug/trace are added as verbosity rises.
fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_new(level)
        .map_err(|e| ephemcache::CacheError::Config(format!("Invalid log level: {}", e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    Ok(())
}
