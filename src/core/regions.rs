use crate::domain::ports::RegionLookup;
use crate::utils::error::{CrawlError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_REGIONS: &str = include_str!("../../data/regions.toml");

/// Region names loaded from a `[regions]` TOML table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionTable {
    regions: HashMap<String, String>,
}

impl RegionTable {
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_REGIONS)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CrawlError::ConfigValidationError {
            field: "regions".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl RegionLookup for RegionTable {
    fn full_name(&self, code: &str) -> Option<&str> {
        self.regions
            .get(&code.trim().to_ascii_uppercase())
            .map(String::as_str)
    }
}
