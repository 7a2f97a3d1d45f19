use iss_tracker::config;
use iss_tracker::service::{self, AppState};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "iss-tracker", version, about = "HTTP API over the live ISS trajectory feed")]
struct Args {
    /// Log level: trace, debug, info, warning, error or critical
    #[arg(short = 'l', long = "loglevel")]
    log_level: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = config::read_config(&args.config, args.log_level.as_deref())?;

    // Initialize logging
    let _logging_guard = iss_tracker::logging::init_logging(
        &config.log_dir,
        "iss-tracker",
        &config.log_level,
    )?;

    tracing::info!("ISS Tracker starting...");
    tracing::info!("Feed: {}", config.feed_url);

    let state = AppState::from_config(config)?;

    // Report on the feed once on stdout, independent of the log level;
    // the service still starts if upstream is down
    if let Some(report) = service::startup_report(state.feed.as_ref(), Utc::now().naive_utc()).await {
        println!("{}", report);
    }

    let app = service::router(state);
    let addr = config.server_address();
    tracing::info!("HTTP server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
