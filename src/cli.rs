//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::reddit::Credentials;
use clap::Parser;
use std::path::PathBuf;

/// RequestMon - Reddit request-thread monitor
///
/// Watches a request subreddit for new threads and replies with a
/// karma report on the requesting user and a moderator roster for the
/// target subreddit.
///
/// Examples:
///   requestmon
///   requestmon --subreddit redditrequest --print-comment --no-comment
///   requestmon --ignore-dup --thread-limit 5
///   requestmon --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subreddit to monitor for request threads
    ///
    /// Overrides the config file value. Defaults to the placeholder
    /// test community when neither is set.
    #[arg(short, long, value_name = "NAME")]
    pub subreddit: Option<String>,

    /// Do not publish the composed report as a reply
    #[arg(long)]
    pub no_comment: bool,

    /// Print the composed report to standard output
    ///
    /// Independent of publishing; useful together with --no-comment
    /// for a dry inspection run.
    #[arg(long)]
    pub print_comment: bool,

    /// Skip the duplicate-reply check
    ///
    /// The replies fetch is elided entirely, so threads the bot
    /// already answered will be answered again.
    #[arg(long)]
    pub ignore_dup: bool,

    /// Maximum candidate threads to process per run
    #[arg(long, value_name = "COUNT")]
    pub thread_limit: Option<usize>,

    /// Maximum recent items per activity listing
    #[arg(long, value_name = "COUNT")]
    pub activity_limit: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .requestmon.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Reddit script-app client id
    #[arg(long, value_name = "ID", env = "REQUESTMON_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Reddit script-app client secret
    #[arg(
        long,
        value_name = "SECRET",
        env = "REQUESTMON_CLIENT_SECRET",
        hide_env_values = true
    )]
    pub client_secret: Option<String>,

    /// Bot account username
    #[arg(long, value_name = "USER", env = "REQUESTMON_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// Bot account password
    #[arg(long, value_name = "PASS", env = "REQUESTMON_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .requestmon.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Script-app credentials (validated present before use).
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone().unwrap_or_default(),
            client_secret: self.client_secret.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        for (value, flag, env_var) in [
            (&self.client_id, "--client-id", "REQUESTMON_CLIENT_ID"),
            (&self.client_secret, "--client-secret", "REQUESTMON_CLIENT_SECRET"),
            (&self.username, "--username", "REQUESTMON_USERNAME"),
            (&self.password, "--password", "REQUESTMON_PASSWORD"),
        ] {
            if value.as_deref().unwrap_or("").is_empty() {
                return Err(format!("Missing credential: set {} or {}", flag, env_var));
            }
        }

        if let Some(ref subreddit) = self.subreddit {
            if subreddit.is_empty() {
                return Err("Subreddit name must not be empty".to_string());
            }
        }

        if self.thread_limit == Some(0) {
            return Err("Thread limit must be at least 1".to_string());
        }

        if self.activity_limit == Some(0) {
            return Err("Activity limit must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
