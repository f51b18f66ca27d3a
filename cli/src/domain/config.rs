//! Domain types and validators for deploy configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::artifact::ArtifactPattern;
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "host",
    "remote_dir",
    "env_path",
    "interpreter_glob",
    "artifact_dir",
    "artifact_pattern",
    "marker",
    "python",
    "timeout_secs",
    "trace",
    "ssh.program",
    "ssh.copy_program",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.nx-deploy/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// ssh destination: `[user@]host` or an alias from `~/.ssh/config`.
    pub host: String,
    /// Remote directory receiving the artifact.
    pub remote_dir: String,
    /// Remote isolated environment.
    pub env_path: String,
    /// Shared interpreter binary on the remote host, expanded by the remote shell.
    pub interpreter_glob: String,
    /// Local directory searched for the artifact.
    pub artifact_dir: String,
    /// File name glob selecting artifact candidates.
    pub artifact_pattern: String,
    /// Marker file, relative to `env_path`.
    pub marker: String,
    /// Remote interpreter used to create the environment.
    pub python: String,
    /// Timeout for each remote command, in seconds.
    pub timeout_secs: u64,
    /// Trace the remote session with `set -x`.
    pub trace: bool,
    /// Transport programs and options.
    pub ssh: SshConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            host: "nx".to_string(),
            remote_dir: "/tmp".to_string(),
            env_path: "/opt/nx/venv".to_string(),
            interpreter_glob: "/usr/bin/python3.*[0-9]".to_string(),
            artifact_dir: ".".to_string(),
            artifact_pattern: "nx_workers-*.whl".to_string(),
            marker: "pyvenv.cfg".to_string(),
            python: "python3".to_string(),
            timeout_secs: 600,
            trace: true,
            ssh: SshConfig::default(),
        }
    }
}

/// Programs used to reach the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Program opening the remote session.
    pub program: String,
    /// Program copying the artifact.
    pub copy_program: String,
    /// Extra options passed to both programs, e.g. `["-o", "BatchMode=yes"]`.
    pub options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            copy_program: "scp".to_string(),
            options: Vec::new(),
        }
    }
}

impl DeployConfig {
    /// Remote path the artifact named `file_name` is copied to.
    #[must_use]
    pub fn remote_artifact_path(&self, file_name: &str) -> String {
        let dir = self.remote_dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("/{file_name}")
        } else {
            format!("{dir}/{file_name}")
        }
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<()> {
        validate_host(&self.host)?;
        validate_word("remote_dir", &self.remote_dir)?;
        validate_word("env_path", &self.env_path)?;
        if !self.env_path.starts_with('/') {
            return Err(invalid("env_path", &self.env_path, "must be an absolute path").into());
        }
        validate_interpreter_glob(&self.interpreter_glob)?;
        if self.artifact_dir.is_empty() {
            return Err(invalid("artifact_dir", &self.artifact_dir, "must not be empty").into());
        }
        ArtifactPattern::new(&self.artifact_pattern).map_err(|e| {
            anyhow::Error::from(invalid("artifact_pattern", &self.artifact_pattern, &e.to_string()))
        })?;
        validate_word("marker", &self.marker)?;
        validate_word("python", &self.python)?;
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "0", "must be greater than zero").into());
        }
        validate_word("ssh.program", &self.ssh.program)?;
        validate_word("ssh.copy_program", &self.ssh.copy_program)?;
        Ok(())
    }

    /// Every settable key with its current value, in `VALID_CONFIG_KEYS` order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("host", self.host.clone()),
            ("remote_dir", self.remote_dir.clone()),
            ("env_path", self.env_path.clone()),
            ("interpreter_glob", self.interpreter_glob.clone()),
            ("artifact_dir", self.artifact_dir.clone()),
            ("artifact_pattern", self.artifact_pattern.clone()),
            ("marker", self.marker.clone()),
            ("python", self.python.clone()),
            ("timeout_secs", self.timeout_secs.to_string()),
            ("trace", self.trace.to_string()),
            ("ssh.program", self.ssh.program.clone()),
            ("ssh.copy_program", self.ssh.copy_program.clone()),
        ]
    }

    /// Set a single key from its string form, validating the new value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        let mut next = self.clone();
        match key {
            "host" => next.host = value.to_string(),
            "remote_dir" => next.remote_dir = value.to_string(),
            "env_path" => next.env_path = value.to_string(),
            "interpreter_glob" => next.interpreter_glob = value.to_string(),
            "artifact_dir" => next.artifact_dir = value.to_string(),
            "artifact_pattern" => next.artifact_pattern = value.to_string(),
            "marker" => next.marker = value.to_string(),
            "python" => next.python = value.to_string(),
            "timeout_secs" => {
                next.timeout_secs = value
                    .parse()
                    .map_err(|_| invalid(key, value, "must be a whole number of seconds"))?;
            }
            "trace" => {
                next.trace = value
                    .parse()
                    .map_err(|_| invalid(key, value, "must be true or false"))?;
            }
            "ssh.program" => next.ssh.program = value.to_string(),
            "ssh.copy_program" => next.ssh.copy_program = value.to_string(),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn is_shell_special(c: char) -> bool {
    c.is_whitespace()
        || c.is_control()
        || matches!(
            c,
            '\'' | '"' | '`' | '$' | '\\' | ';' | '&' | '|' | '<' | '>' | '(' | ')' | '*' | '?'
                | '[' | ']' | '{' | '}' | '#' | '!' | '~'
        )
}

fn validate_word(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(key, value, "must not be empty").into());
    }
    if value.chars().any(is_shell_special) {
        return Err(invalid(key, value, "must not contain whitespace, quotes or shell metacharacters").into());
    }
    Ok(())
}

fn validate_host(host: &str) -> Result<()> {
    validate_word("host", host)?;
    if host.starts_with('-') {
        return Err(invalid("host", host, "must not start with '-'").into());
    }
    Ok(())
}

fn validate_interpreter_glob(glob: &str) -> Result<()> {
    let key = "interpreter_glob";
    if !glob.starts_with('/') {
        return Err(invalid(key, glob, "must be an absolute path").into());
    }
    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | '*' | '?' | '[' | ']' | '!')
    };
    if !glob.chars().all(allowed) {
        return Err(invalid(key, glob, "may only contain path characters and * ? [ ]").into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
