use crate::core::fetcher::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Fetch failed: {0}")]
    FetchError(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("XML parsing error: {message}")]
    XmlError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a run that failed with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CrawlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CrawlError::FetchError(_) | CrawlError::HttpError(_) => ErrorCategory::Network,
            CrawlError::CsvError(_)
            | CrawlError::SerializationError(_)
            | CrawlError::UrlError(_)
            | CrawlError::XmlError { .. }
            | CrawlError::ProcessingError { .. } => ErrorCategory::Data,
            CrawlError::ConfigError { .. }
            | CrawlError::ConfigValidationError { .. }
            | CrawlError::InvalidConfigValueError { .. }
            | CrawlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CrawlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CrawlError::FetchError(_) | CrawlError::HttpError(_) => {
                "Check network connectivity and that the library site is reachable, then run again"
            }
            CrawlError::CsvError(_) => {
                "Make sure the input CSV has a header row with library_name and library_base_url"
            }
            CrawlError::IoError(_) => "Check that the input file exists and the output path is writable",
            CrawlError::SerializationError(_) => "Check that the JSON input was produced by fetch-events",
            CrawlError::UrlError(_) => "Base URLs must be absolute http(s) URLs",
            CrawlError::XmlError { .. } => "The feed is not well-formed XML; re-run verify-feeds on it",
            CrawlError::ConfigError { .. }
            | CrawlError::ConfigValidationError { .. }
            | CrawlError::InvalidConfigValueError { .. }
            | CrawlError::MissingConfigError { .. } => {
                "Review the command-line flags or TOML configuration file"
            }
            CrawlError::ProcessingError { .. } => "Re-run with --verbose to see which record failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl CrawlError {
    /// Logs the failure, prints it for the user and returns the exit code
    /// the binary should use.
    pub fn report(&self, context: &str) -> i32 {
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            context,
            self,
            self.category(),
            self.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", self.recovery_suggestion());

        eprintln!("❌ {}", self.user_friendly_message());
        eprintln!("💡 Suggestion: {}", self.recovery_suggestion());

        self.severity().exit_code()
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
