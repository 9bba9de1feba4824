//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.requestmon.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Reddit API settings.
    #[serde(default)]
    pub reddit: RedditConfig,

    /// Monitor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { verbose: false }
    }
}

/// Reddit API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// OAuth API host.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token endpoint for the password grant.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// User agent sent with every request. Reddit throttles generic
    /// agents aggressively, so keep it descriptive.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_auth_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}

fn default_user_agent() -> String {
    format!(
        "requestmon/{} (request-thread monitor)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_timeout() -> u64 {
    30
}

/// Monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Subreddit whose request threads are monitored.
    #[serde(default = "default_subreddit")]
    pub subreddit: String,

    /// Maximum candidate threads per run.
    #[serde(default = "default_thread_limit")]
    pub thread_limit: usize,

    /// Maximum recent items per activity listing.
    #[serde(default = "default_activity_limit")]
    pub activity_limit: usize,

    /// Account name used for the duplicate-reply check. Empty means
    /// "use the authenticating username".
    #[serde(default)]
    pub bot_username: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            subreddit: default_subreddit(),
            thread_limit: default_thread_limit(),
            activity_limit: default_activity_limit(),
            bot_username: String::new(),
        }
    }
}

fn default_subreddit() -> String {
    // Placeholder test community; override with --subreddit.
    "fakefakefake".to_string()
}

fn default_thread_limit() -> usize {
    25
}

fn default_activity_limit() -> usize {
    100
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".requestmon.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref subreddit) = args.subreddit {
            self.monitor.subreddit = subreddit.clone();
        }

        if let Some(thread_limit) = args.thread_limit {
            self.monitor.thread_limit = thread_limit;
        }

        if let Some(activity_limit) = args.activity_limit {
            self.monitor.activity_limit = activity_limit;
        }

        if let Some(timeout) = args.timeout {
            self.reddit.timeout_seconds = timeout;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
