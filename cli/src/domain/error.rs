//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::provision::ProvisionStep;

/// Exit code used when a failure has no command status to propagate.
pub const GENERIC_EXIT_CODE: i32 = 1;

// ── Deploy errors ─────────────────────────────────────────────────────────────

/// Failures of the three deploy operations, in the order they can occur.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("No artifact matching '{pattern}' found in {dir}")]
    NotFound { pattern: String, dir: String },

    #[error("Transfer of {artifact} to {destination} failed (exit {code})")]
    Transfer {
        artifact: String,
        destination: String,
        code: i32,
        stderr: String,
    },

    #[error("Remote provisioning on {host} failed {} (exit {code})", step_label(.step.as_ref()))]
    Provision {
        host: String,
        step: Option<ProvisionStep>,
        code: i32,
        stderr: String,
    },
}

impl DeployError {
    /// Process exit code for this failure.
    ///
    /// Transfer and provisioning failures carry the status of the command that
    /// failed; a missing artifact never ran a command.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => GENERIC_EXIT_CODE,
            Self::Transfer { code, .. } | Self::Provision { code, .. } => *code,
        }
    }

    /// Remote stderr captured with the failure, if any.
    #[must_use]
    pub fn remote_stderr(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => None,
            Self::Transfer { stderr, .. } | Self::Provision { stderr, .. } => {
                Some(stderr.as_str()).filter(|s| !s.trim().is_empty())
            }
        }
    }

    /// Stable machine-readable code for `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::Transfer { .. } => "TRANSFER_FAILED",
            Self::Provision { .. } => "PROVISION_FAILED",
        }
    }
}

fn step_label(step: Option<&ProvisionStep>) -> String {
    match step {
        Some(step) => format!("at step '{step}'"),
        None => "before the first step".to_string(),
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
