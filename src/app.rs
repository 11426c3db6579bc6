//! Application state and logic.

use crate::aggregate::{fetch_combined, fetch_parallel, fetch_sequential};
use crate::api::{SimulatedSource, failure_policy};
use crate::cli::{Args, ExportFormat, RunMode};
use crate::config::Config;
use crate::models::{FetchReport, UserContent};
use anyhow::Result;
use tokio::time::Instant;
use tracing::info;

/// What the last run produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A sequential or parallel report, possibly partial
    Report(FetchReport),
    /// A successful combined fetch
    Combined { content: UserContent, time_ms: u64 },
    /// A combined fetch that failed on the profile or posts leg
    Failed { time_ms: u64, message: String },
}

impl Outcome {
    pub fn mode_label(&self) -> String {
        match self {
            Outcome::Report(report) => report.mode.to_string(),
            Outcome::Combined { .. } | Outcome::Failed { .. } => RunMode::Combined.to_string(),
        }
    }

    pub fn time_ms(&self) -> u64 {
        match self {
            Outcome::Report(report) => report.time_ms,
            Outcome::Combined { time_ms, .. } | Outcome::Failed { time_ms, .. } => *time_ms,
        }
    }

    /// Whether the run ended without any result to show.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Application state.
pub struct App {
    /// Source every run fetches from
    source: SimulatedSource,
    /// User whose content is fetched
    pub user_id: u32,
    /// Strategy for batch runs and the last interactive run
    pub mode: RunMode,
    /// Result of the most recent run
    pub outcome: Option<Outcome>,
    /// Strategy currently in flight, if any
    pub loading: Option<RunMode>,
    /// Completed runs
    pub runs: u64,
    /// Completed runs whose outcome was a failure
    pub failed_runs: u64,
    /// Batch runs before exiting
    pub max_iterations: u64,
    /// Is the app running
    pub running: bool,
    /// Show help overlay
    pub show_help: bool,
    /// Vertical scroll of the results pane
    pub scroll: u16,
    /// Batch mode (non-interactive)
    pub batch_mode: bool,
    /// Batch output format
    pub export: ExportFormat,
}

impl App {
    /// Create a new application from CLI args and merged config.
    pub fn new(args: &Args, config: &Config) -> Result<Self> {
        let failures = failure_policy(config.source.failure_rate, config.source.seed)?;
        let source = SimulatedSource::new(config.source.delays(), failures);

        Ok(Self {
            source,
            user_id: config.general.user_id,
            mode: config.general.mode,
            outcome: None,
            loading: None,
            runs: 0,
            failed_runs: 0,
            max_iterations: args.iterations,
            running: true,
            show_help: false,
            scroll: 0,
            batch_mode: args.batch,
            export: args.export,
        })
    }

    /// Mark `mode` as in flight so the UI can show a loading state.
    pub fn begin(&mut self, mode: RunMode) {
        self.mode = mode;
        self.loading = Some(mode);
    }

    /// Run one strategy to completion and keep its outcome.
    pub async fn run(&mut self, mode: RunMode) {
        self.begin(mode);

        let outcome = match mode {
            RunMode::Sequential => Outcome::Report(fetch_sequential(&self.source, self.user_id).await),
            RunMode::Parallel => Outcome::Report(fetch_parallel(&self.source, self.user_id).await),
            RunMode::Combined => {
                let start = Instant::now();
                let result = fetch_combined(&self.source, self.user_id).await;
                let time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                match result {
                    Ok(content) => Outcome::Combined { content, time_ms },
                    Err(e) => Outcome::Failed {
                        time_ms,
                        message: e.to_string(),
                    },
                }
            }
        };

        info!(mode = %mode, time_ms = outcome.time_ms(), "Run finished");
        self.record(outcome);
    }

    /// Keep `outcome` as the latest result and count it.
    pub fn record(&mut self, outcome: Outcome) {
        if outcome.is_failure() {
            self.failed_runs += 1;
        }
        self.outcome = Some(outcome);
        self.loading = None;
        self.scroll = 0;
        self.runs += 1;
    }

    /// Scroll results up.
    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Scroll results down.
    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    /// Scroll back to the top.
    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    /// Toggle help display.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Check if the app should stop.
    pub fn should_quit(&self) -> bool {
        !self.running || (self.batch_mode && self.runs >= self.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn app_with(extra: &[&str]) -> App {
        let mut argv = vec!["fanout", "-b", "--profile-delay", "10ms", "--posts-delay", "10ms"];
        argv.extend_from_slice(extra);
        let args = Args::parse_from(argv);
        let mut config = Config::default();
        config.merge_with_args(&args);
        App::new(&args, &config).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_failure_rate() {
        let args = Args::parse_from(["fanout"]);
        let mut config = Config::default();
        config.source.failure_rate = 3.0;
        assert!(App::new(&args, &config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sequential_stores_report() {
        let mut app = app_with(&["--failure-rate", "0"]);

        app.run(RunMode::Sequential).await;

        assert_eq!(app.runs, 1);
        assert!(app.loading.is_none());
        match app.outcome.as_ref().unwrap() {
            Outcome::Report(report) => {
                assert_eq!(report.posts.len(), 3);
                assert!(report.errors.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_combined_with_failing_comments() {
        let mut app = app_with(&["--failure-rate", "1"]);

        app.run(RunMode::Combined).await;

        let outcome = app.outcome.as_ref().unwrap();
        assert!(!outcome.is_failure());
        assert_eq!(outcome.mode_label(), "combined");
        match outcome {
            Outcome::Combined { content, .. } => {
                assert!(content.posts.iter().all(|p| p.comment_error.is_some()));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_quits_after_iterations() {
        let mut app = app_with(&["-n", "2", "--failure-rate", "0"]);

        app.run(RunMode::Parallel).await;
        assert!(!app.should_quit());
        app.run(RunMode::Parallel).await;
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_is_remembered_after_later_success() {
        let mut app = app_with(&["-n", "2", "--failure-rate", "0"]);

        app.begin(RunMode::Combined);
        app.record(Outcome::Failed {
            time_ms: 2500,
            message: "Failed to fetch posts".to_string(),
        });
        app.run(RunMode::Combined).await;

        assert!(!app.outcome.as_ref().unwrap().is_failure());
        assert_eq!(app.runs, 2);
        assert_eq!(app.failed_runs, 1);
        assert!(app.should_quit());
    }

    #[test]
    fn test_scroll_saturates() {
        let mut app = app_with(&[]);
        app.scroll_up();
        assert_eq!(app.scroll, 0);
        app.scroll_down();
        app.scroll_down();
        assert_eq!(app.scroll, 2);
        app.scroll_top();
        assert_eq!(app.scroll, 0);
    }
}
