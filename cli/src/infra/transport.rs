//! Infrastructure implementation of the remote host port traits.
//!
//! `SshTransport<R>` routes the copy through `scp -p` and the provisioning
//! session through `ssh <host> sh -s`, both via a `CommandRunner`.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, FileTransfer, RemoteShell};
use crate::domain::config::SshConfig;
use crate::infra::command_runner::TokioCommandRunner;

/// Infrastructure adapter that talks to one remote host over ssh.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct SshTransport<R: CommandRunner> {
    runner: R,
    host: String,
    ssh: SshConfig,
}

impl<R: CommandRunner> SshTransport<R> {
    /// Create a transport for `host` with an explicit runner.
    pub fn new(runner: R, host: impl Into<String>, ssh: SshConfig) -> Self {
        Self {
            runner,
            host: host.into(),
            ssh,
        }
    }

    fn with_options<'a>(&'a self, head: &[&'a str], tail: &[&'a str]) -> Vec<&'a str> {
        let mut args: Vec<&str> = head.to_vec();
        args.extend(self.ssh.options.iter().map(String::as_str));
        args.extend_from_slice(tail);
        args
    }
}

impl SshTransport<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(
        host: impl Into<String>,
        ssh: SshConfig,
        timeout: std::time::Duration,
    ) -> Self {
        Self::new(TokioCommandRunner::new(timeout), host, ssh)
    }
}

impl<R: CommandRunner> FileTransfer for SshTransport<R> {
    async fn transfer(&self, local: &Path, remote: &str) -> Result<Output> {
        let local = local.to_string_lossy();
        let dest = self.destination(remote);
        let args = self.with_options(&["-p", "-q"], &["--", &local, &dest]);
        self.runner
            .run(&self.ssh.copy_program, &args)
            .await
            .with_context(|| format!("{} {local} {dest}", self.ssh.copy_program))
    }

    fn destination(&self, remote: &str) -> String {
        format!("{}:{remote}", self.host)
    }
}

impl<R: CommandRunner> RemoteShell for SshTransport<R> {
    async fn run_script(&self, script: &str) -> Result<Output> {
        let args = self.with_options(&[], &["--", &self.host, "sh", "-s"]);
        self.runner
            .run_with_stdin(&self.ssh.program, &args, script.as_bytes())
            .await
            .with_context(|| format!("{} {} sh -s", self.ssh.program, self.host))
    }
}
