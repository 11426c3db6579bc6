//! Configuration file handling with TOML support.

use crate::api::{DEFAULT_FAILURE_RATE, SourceDelays};
use crate::cli::{Args, RunMode};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Simulated source behaviour
    #[serde(default)]
    pub source: SourceConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// User whose content is fetched
    #[serde(default = "default_user_id")]
    pub user_id: u32,

    /// Strategy used by batch mode
    #[serde(default)]
    pub mode: RunMode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            mode: RunMode::default(),
        }
    }
}

fn default_user_id() -> u32 {
    1
}

/// Latency and failure settings for the simulated source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Profile delay in milliseconds
    #[serde(default = "default_profile_delay")]
    pub profile_delay_ms: u64,

    /// Posts delay in milliseconds
    #[serde(default = "default_posts_delay")]
    pub posts_delay_ms: u64,

    /// Per-post comments delay in milliseconds
    #[serde(default = "default_comments_delay")]
    pub comments_delay_ms: u64,

    /// Probability that a comment fetch fails
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    /// Optional RNG seed for reproducible failures
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            profile_delay_ms: default_profile_delay(),
            posts_delay_ms: default_posts_delay(),
            comments_delay_ms: default_comments_delay(),
            failure_rate: default_failure_rate(),
            seed: None,
        }
    }
}

fn default_profile_delay() -> u64 {
    1000
}
fn default_posts_delay() -> u64 {
    1500
}
fn default_comments_delay() -> u64 {
    2000
}
fn default_failure_rate() -> f64 {
    DEFAULT_FAILURE_RATE
}

impl SourceConfig {
    /// Delays as durations.
    pub fn delays(&self) -> SourceDelays {
        SourceDelays {
            profile: Duration::from_millis(self.profile_delay_ms),
            posts: Duration::from_millis(self.posts_delay_ms),
            comments: Duration::from_millis(self.comments_delay_ms),
        }
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or fall back to defaults.
    pub fn load_or_default() -> Self {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Failed to load config: {:#}", e);
                    }
                }
            }
        }
        Config::default()
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fanout").join("config.toml"))
    }

    /// Apply command line overrides on top of file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(mode) = args.mode {
            self.general.mode = mode;
        }
        if let Some(user_id) = args.user_id {
            self.general.user_id = user_id;
        }
        if let Some(rate) = args.failure_rate {
            self.source.failure_rate = rate;
        }
        if args.seed.is_some() {
            self.source.seed = args.seed;
        }
        if let Some(delay) = args.profile_delay {
            self.source.profile_delay_ms = duration_ms(delay);
        }
        if let Some(delay) = args.posts_delay {
            self.source.posts_delay_ms = duration_ms(delay);
        }
        if let Some(delay) = args.comments_delay {
            self.source.comments_delay_ms = duration_ms(delay);
        }
    }

    /// Reject settings the source cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.source.failure_rate) {
            bail!(
                "failure_rate must be between 0 and 1, got {}",
                self.source.failure_rate
            );
        }
        Ok(())
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Generate a sample configuration file content.
pub fn sample_config() -> &'static str {
    r##"# fanout configuration file

[general]
# User whose profile, posts and comments are fetched
user_id = 1
# Strategy for batch mode: sequential, parallel, combined
mode = "parallel"

[source]
# Simulated latency of each call, in milliseconds
profile_delay_ms = 1000
posts_delay_ms = 1500
comments_delay_ms = 2000
# Probability that a single comment fetch fails (0.0 - 1.0)
failure_rate = 0.3
# Uncomment for reproducible failures
# seed = 42
"##
}
