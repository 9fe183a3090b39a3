//! Store configuration.

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::Result;
use crate::node::WriterId;

/// Default number of nodes moved per replication request.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Settings for opening a [`Store`](super::Store).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use polylog::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{"writer": "laptop", "batch_size": 64}"#).unwrap();
/// assert_eq!(config.batch_size, 64);
/// assert_eq!(StoreConfig::from_json("{}").unwrap(), StoreConfig::default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Identity of the local writer. A fresh random id is generated when
    /// absent, so set it to reopen an existing log as its writer.
    pub writer: Option<WriterId>,
    /// Nodes per replication transfer.
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            writer: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(mut self, writer: impl Into<WriterId>) -> Self {
        self.writer = Some(writer.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StoreConfig =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(StoreError::InvalidConfig {
                reason: "batch_size must be at least 1".to_string(),
            }
            .into());
        }
        if self.writer.as_ref().is_some_and(WriterId::is_empty) {
            return Err(StoreError::InvalidConfig {
                reason: "writer id must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
