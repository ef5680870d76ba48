pub mod path;

use std::{io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_QUEUE_DEPTH;

/// Represents all possible errors loading an [InterpreterConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// How raw X/Y values are mapped using the element's logical range
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PositionMapping {
    /// `(raw - min) / (max - min) + min`. Kept for compatibility with
    /// consumers calibrated against it.
    #[default]
    Literal,
    /// `(raw - min) / (max - min)`
    Normalized,
}

impl PositionMapping {
    /// Map a raw value using the given logical range. Returns `None` when
    /// the range is empty. Inverted ranges map like any other.
    pub fn map(&self, raw: i64, min: i64, max: i64) -> Option<f64> {
        if max == min {
            return None;
        }
        let (raw, min, max) = (raw as f64, min as f64, max as f64);
        let scaled = (raw - min) / (max - min);
        match self {
            PositionMapping::Literal => Some(scaled + min),
            PositionMapping::Normalized => Some(scaled),
        }
    }
}

/// Configuration of the report interpreter
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", default)]
pub struct InterpreterConfig {
    /// Capacity requested for the per-device ingestion queue
    pub queue_depth: usize,
    /// Dump the discovered element tree when a device is identified
    pub log_descriptor_tree: bool,
    /// Log every value stored in the value cache
    pub log_values: bool,
    /// Forward width, height and azimuth to the consumer
    pub report_touch_size: bool,
    pub position_mapping: PositionMapping,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            log_descriptor_tree: true,
            log_values: false,
            report_touch_size: false,
            position_mapping: PositionMapping::default(),
        }
    }
}

impl InterpreterConfig {
    /// Load an [InterpreterConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<InterpreterConfig, LoadError> {
        let config: InterpreterConfig = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load an [InterpreterConfig] from the given YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<InterpreterConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: InterpreterConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }
}
