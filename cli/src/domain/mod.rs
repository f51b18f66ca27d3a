//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod config;
pub mod error;
pub mod provision;

pub use artifact::{ArtifactPattern, select_latest};
pub use config::{DeployConfig, SshConfig, validate_config_key};
pub use error::{ConfigError, DeployError};
pub use provision::{ProvisionPlan, ProvisionStep, SessionTrace};
