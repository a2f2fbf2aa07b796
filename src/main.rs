//! coinscan - RSI market scanner for crypto assets
//!
//! # Usage
//! ```sh
//! coinscan serve --port 5000
//! coinscan scan --min-mcap 10 --json
//! ```
//!
//! Configuration comes from the environment (and `.env`); see `Config`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coinscan::config::Config;
use coinscan::domain::scan::ScanResult;
use coinscan::infrastructure::ServiceFactory;
use coinscan::infrastructure::observability::Metrics;
use coinscan::interfaces::{AppState, router};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the scan API over HTTP
    Serve {
        /// Bind host (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one scan and print the result
    Scan {
        /// Minimum market cap in billions
        #[arg(short, long, default_value = "0")]
        min_mcap: f64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `scan --json` output stays machine readable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "coinscan {} starting: Mode={:?}, Symbols={}",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.scanner.symbols.len()
    );

    let metrics = Arc::new(Metrics::new()?);
    let provider = ServiceFactory::create_provider(&config);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let scanner = ServiceFactory::create_scan_service(&config, provider, metrics.clone());
            let app = router(AppState { scanner, metrics }, config.server.metrics_enabled);

            let address = config.server.bind_address();
            let listener = tokio::net::TcpListener::bind(&address)
                .await
                .with_context(|| format!("Failed to bind {}", address))?;
            info!("Server listening on http://{}", address);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    tokio::signal::ctrl_c().await.ok();
                    info!("Shutdown signal received. Exiting...");
                })
                .await
                .context("HTTP server failed")?;
        }
        Commands::Scan { min_mcap, json } => {
            let scanner = ServiceFactory::create_scan_service(&config, provider, metrics);
            let results = scanner.scan(min_mcap).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_table(&results);
            }
        }
    }

    Ok(())
}

fn print_table(results: &[ScanResult]) {
    println!(
        "{:<8} {:>16} {:>12} {:>8} {:>8} {:>8} {:>8}",
        "SYMBOL", "PRICE", "MCAP (B)", "RSI15M", "RSI1H", "RSI4H", "RSI1D"
    );
    println!("{}", "-".repeat(76));
    for r in results {
        println!(
            "{:<8} {:>16} {:>12.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            r.symbol,
            r.price,
            r.market_cap / 1e9,
            r.rsi_15m,
            r.rsi_1h,
            r.rsi_4h,
            r.rsi_1d
        );
    }
    println!("{} instruments", results.len());
}
