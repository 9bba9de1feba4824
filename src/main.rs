//! RequestMon - Reddit request-thread monitor
//!
//! A CLI bot that scans a request subreddit for new threads and
//! replies with a karma report on the requesting user plus a
//! moderator roster for the target subreddit.
//!
//! Exit codes:
//!   0 - Batch completed (individual thread failures do not fail the run)
//!   1 - Startup error (arguments, config, authentication, feed listing)

mod cli;
mod config;
mod karma;
mod models;
mod monitor;
mod reddit;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use monitor::{MonitorOptions, RequestMonitor};
use reddit::RedditClient;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("RequestMon v{}", env!("CARGO_PKG_VERSION"));

    // Run the batch
    match run_monitor(args).await {
        Ok(()) => {
            std::process::exit(0);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .requestmon.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".requestmon.toml");

    if path.exists() {
        eprintln!("⚠️  .requestmon.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .requestmon.toml")?;

    println!("✅ Created .requestmon.toml with default settings.");
    println!("   Edit it to customize the monitored subreddit, limits, and endpoints.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run one complete monitoring batch.
async fn run_monitor(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let credentials = args.credentials();

    // The duplicate check matches the posting account unless the
    // config pins a different name.
    let bot_username = if config.monitor.bot_username.is_empty() {
        credentials.username.clone()
    } else {
        config.monitor.bot_username.clone()
    };

    let options = MonitorOptions {
        subreddit: config.monitor.subreddit.clone(),
        thread_limit: config.monitor.thread_limit,
        activity_limit: config.monitor.activity_limit,
        bot_username,
        ignore_dup: args.ignore_dup,
        print_comment: args.print_comment,
        no_comment: args.no_comment,
    };

    debug!(
        "Monitoring /r/{} (thread limit {}, activity limit {})",
        options.subreddit, options.thread_limit, options.activity_limit
    );

    println!("📥 Monitoring /r/{}", options.subreddit);

    let mut client = RedditClient::new(config.reddit.clone(), credentials);
    client
        .authenticate()
        .await
        .context("Reddit authentication failed")?;

    let request_monitor = RequestMonitor::new(client, options);
    let summary = request_monitor.run().await?;

    // Print summary
    println!("\n📊 Run Summary:");
    println!("   Delivered: {}", summary.delivered);
    if summary.printed > 0 {
        println!("   Printed only: {}", summary.printed);
    }
    if summary.suppressed > 0 {
        println!("   Suppressed: {}", summary.suppressed);
    }
    println!("   Skipped (already answered): {}", summary.skipped);
    println!("   Failed: {}", summary.failed);

    if summary.failed > 0 {
        warn!("{} threads failed; see log output above", summary.failed);
    }

    println!("\n✅ Batch complete.");

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .requestmon.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
