use crate::core::fetcher::{DEFAULT_TIMEOUT, USER_AGENT};
use crate::core::ConfigProvider;
use crate::utils::error::{CrawlError, Result};
use crate::utils::validation::{validate_crawl_settings, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Command-line settings shared by the CSV-in, file-out tools.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(about = "Discover book club event feeds on library event sites")]
pub struct CliConfig {
    /// Input CSV
    pub input: String,

    /// Output file
    pub output: String,

    #[arg(long, default_value = USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Pause after every request, in milliseconds
    #[arg(long, default_value = "250")]
    pub delay_ms: u64,

    /// Print a progress line every N libraries
    #[arg(long, default_value = "25")]
    pub progress_every: usize,

    /// Libraries processed at the same time
    #[arg(long, default_value = "1")]
    pub concurrent_libraries: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log memory and CPU usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn progress_every(&self) -> usize {
        self.progress_every
    }

    fn concurrent_libraries(&self) -> usize {
        self.concurrent_libraries
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output", &self.output)?;
        if self.input == self.output {
            return Err(CrawlError::ConfigError {
                message: "input and output must be different files".to_string(),
            });
        }
        validate_crawl_settings(
            &self.user_agent,
            self.timeout_secs,
            self.progress_every,
            self.concurrent_libraries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["bookclub-feeds", "libraries.csv", "bookclubs.csv"]);

        assert_eq!(config.input_path(), "libraries.csv");
        assert_eq!(config.output_path(), "bookclubs.csv");
        assert_eq!(config.user_agent(), USER_AGENT);
        assert_eq!(config.timeout(), Duration::from_secs(25));
        assert_eq!(config.request_delay(), Duration::from_millis(250));
        assert_eq!(config.progress_every(), 25);
        assert_eq!(config.concurrent_libraries(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_same_input_and_output() {
        let config = CliConfig::parse_from(["bookclub-feeds", "a.csv", "a.csv"]);
        assert!(matches!(config.validate(), Err(CrawlError::ConfigError { .. })));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let config = CliConfig::parse_from([
            "bookclub-feeds",
            "in.csv",
            "out.csv",
            "--concurrent-libraries",
            "0",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_arguments_fail_to_parse() {
        assert!(CliConfig::try_parse_from(["bookclub-feeds", "only-input.csv"]).is_err());
    }
}
