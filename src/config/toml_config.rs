use crate::core::fetcher::{DEFAULT_TIMEOUT, USER_AGENT};
use crate::core::ConfigProvider;
use crate::utils::error::{CrawlError, Result};
use crate::utils::validation::{validate_crawl_settings, validate_path, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// A crawl described in a TOML file.
///
/// ```toml
/// [pipeline]
/// name = "bibliocommons-bookclubs"
///
/// [source]
/// input_path = "libraries.csv"
///
/// [crawl]
/// request_delay_ms = 250
///
/// [load]
/// output_path = "bookclubs.csv"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlConfig {
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub request_delay_ms: Option<u64>,
    pub progress_every: Option<usize>,
    pub concurrent_libraries: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| CrawlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are
    /// left in place and reported by validation.
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.crawl
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT.as_secs())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn user_agent(&self) -> &str {
        self.crawl.user_agent.as_deref().unwrap_or(USER_AGENT)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.crawl.request_delay_ms.unwrap_or(250))
    }

    fn progress_every(&self) -> usize {
        self.crawl.progress_every.unwrap_or(25)
    }

    fn concurrent_libraries(&self) -> usize {
        self.crawl.concurrent_libraries.unwrap_or(1)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        let paths = [
            ("source.input_path", self.source.input_path.as_str()),
            ("load.output_path", self.load.output_path.as_str()),
        ];
        for (field, value) in paths {
            if ENV_PLACEHOLDER.is_match(value) {
                return Err(CrawlError::MissingConfigError {
                    field: format!("{} (unset variable in {})", field, value),
                });
            }
            validate_path(field, value)?;
        }

        validate_crawl_settings(
            self.user_agent(),
            self.timeout_seconds(),
            self.progress_every(),
            self.concurrent_libraries(),
        )
    }
}
