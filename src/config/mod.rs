//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load payroll configuration from YAML
//! files: organisation metadata and the policy driving the salary pipeline
//! (earned-leave tiers, half-day weight, overtime premium).
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded policy for: {}", config.organisation().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{LeaveTier, OrganisationMetadata, PayrollConfig, PayrollPolicy};
