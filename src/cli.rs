//! Command-line interface.

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Compare sequential and parallel fan-out over simulated network calls.
///
/// fanout fetches a user's profile, their posts, and every post's comments
/// from a simulated API with artificial latency and random comment failures,
/// then shows what each strategy gathered and how long it took.
#[derive(Parser, Debug, Clone)]
#[command(name = "fanout")]
#[command(author = "Thomas Vincent")]
#[command(version)]
#[command(about = "Sequential vs parallel fan-out over simulated network calls", long_about = None)]
pub struct Args {
    /// Fetch strategy for batch mode
    #[arg(short = 'm', long, value_enum, env = "FANOUT_MODE")]
    pub mode: Option<RunMode>,

    /// User whose content is fetched
    #[arg(short = 'u', long, env = "FANOUT_USER_ID")]
    pub user_id: Option<u32>,

    /// Batch mode - run without the TUI and print results to stdout
    #[arg(short = 'b', long)]
    pub batch: bool,

    /// Number of runs in batch mode
    #[arg(short = 'n', long, default_value = "1")]
    pub iterations: u64,

    /// Configuration file path
    #[arg(short = 'c', long, env = "FANOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Probability that a single comment fetch fails (0.0 - 1.0)
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Seed for reproducible comment failures
    #[arg(long)]
    pub seed: Option<u64>,

    /// Profile fetch delay (e.g. 1s, 250ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub profile_delay: Option<Duration>,

    /// Posts fetch delay (e.g. 1500ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub posts_delay: Option<Duration>,

    /// Per-post comments fetch delay (e.g. 2s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub comments_delay: Option<Duration>,

    /// Output format for batch mode
    #[arg(long, value_enum, default_value = "text")]
    pub export: ExportFormat,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose output - debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet output - errors only
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Which orchestration to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Await each call in turn
    Sequential,
    /// Overlap independent calls (default)
    #[default]
    Parallel,
    /// Sequential legs, concurrent comments, leg failures abort the run
    Combined,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Sequential => write!(f, "sequential"),
            RunMode::Parallel => write!(f, "parallel"),
            RunMode::Combined => write!(f, "combined"),
        }
    }
}

/// Export format for batch output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ExportFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JavaScript Object Notation (JSON)
    Json,
}

impl Args {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate argument combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.iterations == 0 {
            return Err("Iterations must be at least 1".to_string());
        }

        if let Some(rate) = self.failure_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("Failure rate must be between 0 and 1, got {}", rate));
            }
        }

        Ok(())
    }

    /// Log level implied by -v / -q.
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
