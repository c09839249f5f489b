//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{OrganisationMetadata, PayrollConfig, PayrollPolicy};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── organisation.yaml   # Organisation metadata
/// └── policy.yaml         # Leave tiers, half-day weight, overtime premium
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Paying {} in {}", loader.organisation().name, loader.organisation().currency);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, contains invalid YAML,
    /// or describes an inconsistent policy.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<OrganisationMetadata>(&path.join("organisation.yaml"))?;

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<PayrollPolicy>(&policy_path)?;
        policy
            .check()
            .map_err(|message| EngineError::ConfigParseError {
                path: policy_path.display().to_string(),
                message,
            })?;

        tracing::debug!(
            organisation = %metadata.name,
            version = %metadata.version,
            leave_tiers = policy.leave_tiers.len(),
            "Loaded payroll configuration"
        );

        Ok(Self {
            config: PayrollConfig::new(metadata, policy),
        })
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

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the organisation metadata.
    pub fn organisation(&self) -> &OrganisationMetadata {
        self.config.organisation()
    }

    /// Returns the payroll policy.
    pub fn policy(&self) -> &PayrollPolicy {
        self.config.policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "payroll-config-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.organisation().currency, "INR");
        assert_eq!(loader.policy().half_day_weight, dec("0.5"));
        assert_eq!(loader.policy().overtime_premium, dec("0.5"));
    }

    #[test]
    fn test_loaded_tiers_are_highest_first() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let tiers = &loader.policy().leave_tiers;
        assert_eq!(tiers[0].min_present_days, dec("25"));
        assert_eq!(tiers[0].leaves, 2);
        assert_eq!(tiers[1].min_present_days, dec("15"));
        assert_eq!(tiers[1].leaves, 1);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("organisation.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = scratch_dir("bad-yaml");
        fs::write(
            dir.join("organisation.yaml"),
            "name: Test\ncurrency: INR\nversion: \"1\"\n",
        )
        .unwrap();
        fs::write(dir.join("policy.yaml"), "leave_tiers: [unclosed").unwrap();

        let result = ConfigLoader::load(&dir);
        assert!(matches!(
            result,
            Err(EngineError::ConfigParseError { ref path, .. }) if path.contains("policy.yaml")
        ));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_inconsistent_policy_returns_parse_error() {
        let dir = scratch_dir("bad-policy");
        fs::write(
            dir.join("organisation.yaml"),
            "name: Test\ncurrency: INR\nversion: \"1\"\n",
        )
        .unwrap();
        fs::write(dir.join("policy.yaml"), "overtime_premium: \"-0.5\"\n").unwrap();

        let result = ConfigLoader::load(&dir);
        match result {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("overtime_premium"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other.map(|_| ())),
        }
        fs::remove_dir_all(dir).ok();
    }
}
