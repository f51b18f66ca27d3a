//! Shared mock infrastructure for unit tests.
//!
//! Hand-written port implementations that record what the deploy service asks
//! of the remote host, plus `Output` helpers.

#![allow(clippy::expect_used)]

use std::cell::RefCell;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;
use nx_deploy::application::ports::{
    ArtifactSource, FileHasher, FileTransfer, ProgressReporter, RemoteShell,
};

// ── Output helpers ────────────────────────────────────────────────────────────

pub fn ok_output(stderr: &str) -> Output {
    exit_output(0, stderr)
}

pub fn exit_output(code: i32, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code << 8),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

// ── Local side ────────────────────────────────────────────────────────────────

/// Directory listing with a fixed set of names.
pub struct Listing(pub Vec<String>);

impl Listing {
    pub fn of(names: &[&str]) -> Self {
        Self(names.iter().map(ToString::to_string).collect())
    }
}

impl ArtifactSource for Listing {
    fn file_names(&self, _dir: &Path) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Hasher that records which files it was asked to digest.
#[derive(Default)]
pub struct RecordingHasher {
    pub hashed: RefCell<Vec<PathBuf>>,
}

impl FileHasher for RecordingHasher {
    fn sha256_file(&self, path: &Path) -> Result<String> {
        self.hashed.borrow_mut().push(path.to_path_buf());
        Ok("0".repeat(64))
    }
}

/// Reporter that keeps every event for assertions.
#[derive(Default)]
pub struct CollectingReporter {
    pub events: RefCell<Vec<String>>,
}

impl ProgressReporter for CollectingReporter {
    fn step(&self, message: &str) {
        self.events.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.borrow_mut().push(format!("warn: {message}"));
    }
}

// ── Remote side ───────────────────────────────────────────────────────────────

/// Remote host that replays canned outputs and records every call.
pub struct ScriptedHost {
    pub transfer_result: fn() -> Result<Output>,
    pub session_result: fn() -> Result<Output>,
    pub transfers: RefCell<Vec<(PathBuf, String)>>,
    pub scripts: RefCell<Vec<String>>,
}

impl ScriptedHost {
    pub fn new(transfer_result: fn() -> Result<Output>, session_result: fn() -> Result<Output>) -> Self {
        Self {
            transfer_result,
            session_result,
            transfers: RefCell::new(Vec::new()),
            scripts: RefCell::new(Vec::new()),
        }
    }

    pub fn healthy() -> Self {
        Self::new(|| Ok(ok_output("")), || Ok(ok_output("")))
    }
}

impl FileTransfer for ScriptedHost {
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output> {
        self.transfers
            .borrow_mut()
            .push((local.to_path_buf(), remote.to_string()));
        (self.transfer_result)()
    }

    fn destination(&self, remote: &str) -> String {
        format!("deploy@sensor-1:{remote}")
    }
}

impl RemoteShell for ScriptedHost {
    async fn run_script(&self, script: &str) -> Result<Output> {
        self.scripts.borrow_mut().push(script.to_string());
        (self.session_result)()
    }
}
