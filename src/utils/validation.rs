use crate::utils::error::{CrawlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CrawlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CrawlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Checks the crawl knobs shared by every configuration source.
pub fn validate_crawl_settings(
    user_agent: &str,
    timeout_secs: u64,
    progress_every: usize,
    concurrent_libraries: usize,
) -> Result<()> {
    validate_non_empty_string("crawl.user_agent", user_agent)?;
    validate_range("crawl.timeout_secs", timeout_secs, 1, 300)?;
    validate_positive_number("crawl.progress_every", progress_every, 1)?;
    validate_range("crawl.concurrent_libraries", concurrent_libraries, 1, 32)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("library_base_url", "https://example.bibliocommons.com").is_ok());
        assert!(validate_url("library_base_url", "http://example.com").is_ok());
        assert!(validate_url("library_base_url", "").is_err());
        assert!(validate_url("library_base_url", "invalid-url").is_err());
        assert!(validate_url("library_base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("crawl.progress_every", 25, 1).is_ok());
        assert!(validate_positive_number("crawl.progress_every", 0, 1).is_err());
    }

    #[test]
    fn test_validate_crawl_settings() {
        assert!(validate_crawl_settings("bot/1.0", 25, 25, 1).is_ok());
        assert!(validate_crawl_settings("  ", 25, 25, 1).is_err());
        assert!(validate_crawl_settings("bot/1.0", 0, 25, 1).is_err());
        assert!(validate_crawl_settings("bot/1.0", 25, 25, 0).is_err());
    }
}
