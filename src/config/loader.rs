//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading workshop
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{PayrollPolicy, WorkshopConfig, WorkshopMetadata};

/// Loads and provides access to workshop configuration.
///
/// # Directory Structure
///
/// ```text
/// config/workshop/
/// └── payroll.yaml   # Metadata and payroll policy
/// ```
///
/// # Example
///
/// ```no_run
/// use workshop_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/workshop")?;
/// println!("Hourly basis: {} days x {} hours",
///     loader.policy().working_days_per_period,
///     loader.policy().paid_hours_per_day);
/// # Ok::<(), workshop_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: WorkshopConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `payroll.yaml` is missing (`ConfigNotFound`)
    /// - the file contains invalid YAML (`ConfigParseError`)
    /// - the policy holds unusable values (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let payroll_path = path.as_ref().join("payroll.yaml");
        let config = Self::load_yaml::<WorkshopConfig>(&payroll_path)?;
        Self::from_config(config)
    }

    /// Wraps an in-memory configuration after validating it.
    pub fn from_config(config: WorkshopConfig) -> EngineResult<Self> {
        config.policy.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &WorkshopConfig {
        &self.config
    }

    /// Returns the workshop metadata.
    pub fn metadata(&self) -> &WorkshopMetadata {
        &self.config.metadata
    }

    /// Returns the payroll policy.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.config.policy
    }
}
