//! Grid configuration

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

/// Tunables for a grid instance.
///
/// # Example
///
/// ```
/// use sheet_lib::GridConfig;
///
/// let config = GridConfig::default().with_page_size(50);
/// assert_eq!(config.page_size, 50);
///
/// let parsed = GridConfig::from_json(r#"{"pageSize": 25}"#).unwrap();
/// assert_eq!(parsed.page_size, 25);
/// assert_eq!(parsed.lookup_limit, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Rows requested per page.
    ///
    /// Default: 100
    pub page_size: usize,

    /// Limit used when re-querying a single row by ID.
    ///
    /// Default: 1
    pub lookup_limit: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            lookup_limit: 1,
        }
    }
}

impl GridConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the single-row lookup limit.
    pub fn with_lookup_limit(mut self, lookup_limit: usize) -> Self {
        self.lookup_limit = lookup_limit;
        self
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(Error::Config("pageSize must be greater than zero".into()));
        }
        if self.lookup_limit == 0 {
            return Err(Error::Config("lookupLimit must be greater than zero".into()));
        }
        Ok(())
    }
}
