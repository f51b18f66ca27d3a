//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::DeployConfig;

// ── Remote Host Port Traits ───────────────────────────────────────────────────

/// Host-to-remote file transfer.
#[allow(async_fn_in_trait)]
pub trait FileTransfer {
    /// Copy a local file to `remote` on the host, preserving attributes.
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output>;
    /// Human-readable destination for `remote`, e.g. `nx:/tmp/a.whl`.
    fn destination(&self, remote: &str) -> String;
}

/// Script execution in a single remote session.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `script` in one remote `sh` session, feeding it on stdin.
    async fn run_script(&self, script: &str) -> Result<Output>;
}

/// Composite trait — any type implementing both sub-traits is a `RemoteHost`.
pub trait RemoteHost: FileTransfer + RemoteShell {}

/// Blanket implementation: any type implementing both sub-traits is a `RemoteHost`.
impl<T> RemoteHost for T where T: FileTransfer + RemoteShell {}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Local Filesystem Ports ────────────────────────────────────────────────────

/// Lists artifact candidates in a local directory.
pub trait ArtifactSource {
    /// Names of the regular files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be read.
    fn file_names(&self, dir: &Path) -> Result<Vec<String>>;
}

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the SHA-256 hash of a file.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts loading and persisting `DeployConfig`.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<DeployConfig>;
    /// Persist the configuration.
    fn save(&self, config: &DeployConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
