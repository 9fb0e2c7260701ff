use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use dashboard_core::{JobParams, Msg, DEFAULT_CITY, DEFAULT_MONTHS};
use log::LevelFilter;

use super::config::DashboardConfig;

/// Submit and track review-scraping jobs against the dashboard backend.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version)]
pub(crate) struct Cli {
    /// Config file (RON). Defaults to ./dashboard.ron.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base url, e.g. http://127.0.0.1:5000.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,

    /// Where downloads and word-cloud images are written.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Crawl reviews for a restaurant.
    Crawl {
        restaurant_name: String,
        #[arg(long, default_value = DEFAULT_CITY)]
        city: String,
        #[arg(long, default_value_t = DEFAULT_MONTHS)]
        months: u32,
    },
    /// Run sentiment and keyword analysis on a comment file.
    Analyze { filename: String },
    /// Generate word clouds from an analysis file.
    Wordcloud { analysis_filename: String },
    /// List the data files on the backend.
    Files,
    /// Show a stored analysis result.
    Show { analysis_filename: String },
    /// Download a data file into the output directory.
    Download { filename: String },
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum ConfigCommand {
    /// Write the default configuration to the config path.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

impl Command {
    /// Messages that start this command's work; empty for local-only commands.
    pub fn into_messages(self) -> Vec<Msg> {
        match self {
            Command::Crawl {
                restaurant_name,
                city,
                months,
            } => vec![Msg::SubmitRequested(JobParams::crawl(
                restaurant_name,
                city,
                months,
            ))],
            Command::Analyze { filename } => {
                vec![Msg::SubmitRequested(JobParams::analyze(filename))]
            }
            Command::Wordcloud { analysis_filename } => {
                vec![Msg::SubmitRequested(JobParams::wordcloud(analysis_filename))]
            }
            Command::Files => vec![Msg::RefreshFilesRequested],
            Command::Show { analysis_filename } => vec![Msg::AnalysisRequested {
                filename: analysis_filename,
            }],
            Command::Download { filename } => vec![Msg::DownloadRequested { filename }],
            Command::Config(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn crawl_defaults_match_the_backend() {
        let cli = Cli::parse_from(["dashboard", "crawl", "海底捞"]);
        assert_eq!(
            cli.command.into_messages(),
            vec![Msg::SubmitRequested(JobParams::crawl("海底捞", "北京", 3))]
        );
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::parse_from([
            "dashboard",
            "files",
            "--base-url",
            "http://backend:9000",
            "--poll-interval-ms",
            "500",
            "-vv",
        ]);
        let mut config = DashboardConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.base_url, "http://backend:9000");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
        assert_eq!(cli.command.into_messages(), vec![Msg::RefreshFilesRequested]);
    }
}
