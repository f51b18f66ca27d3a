//! Application service — deploy use-case.
//!
//! Locate the artifact, copy it to the remote host, then provision the remote
//! environment in one session. Each operation returns a `Result` and the
//! first failure stops the run; nothing is rolled back.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{
    ArtifactSource, FileHasher, FileTransfer, ProgressReporter, RemoteHost, RemoteShell,
};
use crate::domain::error::GENERIC_EXIT_CODE;
use crate::domain::{
    ArtifactPattern, DeployConfig, DeployError, ProvisionPlan, SessionTrace, select_latest,
};

/// The local file chosen for deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedArtifact {
    /// Full local path.
    pub path: PathBuf,
    /// File name, also used on the remote side.
    pub file_name: String,
}

/// Result of a dry run: what would be copied where, and the remote script.
#[derive(Debug, Clone, Serialize)]
pub struct DeployPlan {
    pub artifact: LocatedArtifact,
    pub destination: String,
    pub script: String,
}

/// Captured output of the remote provisioning session.
#[derive(Debug, Clone, Default)]
pub struct RemoteOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Result of a successful deploy.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub artifact: String,
    pub sha256: String,
    pub host: String,
    pub remote_path: String,
    pub env_path: String,
    pub environment_created: bool,
    #[serde(skip)]
    pub remote_output: RemoteOutput,
}

/// Pick the artifact to deploy from `config.artifact_dir`.
///
/// # Errors
///
/// Returns [`DeployError::NotFound`] when no file matches the pattern, or an
/// I/O error if the directory cannot be listed.
pub fn locate_artifact(source: &impl ArtifactSource, config: &DeployConfig) -> Result<LocatedArtifact> {
    let pattern = ArtifactPattern::new(&config.artifact_pattern)?;
    let dir = Path::new(&config.artifact_dir);
    let names = source
        .file_names(dir)
        .with_context(|| format!("listing artifacts in {}", dir.display()))?;

    let Some(file_name) = select_latest(names.iter().map(String::as_str), &pattern) else {
        return Err(DeployError::NotFound {
            pattern: pattern.to_string(),
            dir: dir.display().to_string(),
        }
        .into());
    };
    tracing::debug!(candidates = names.len(), selected = file_name, "artifact located");

    Ok(LocatedArtifact {
        path: dir.join(file_name),
        file_name: file_name.to_string(),
    })
}

/// Copy `artifact` to `remote_path` on the host.
///
/// Returns whatever the copy program wrote to stderr despite succeeding,
/// e.g. a host key notice.
///
/// # Errors
///
/// Returns [`DeployError::Transfer`] when the copy exits non-zero, cannot be
/// spawned, or times out.
pub async fn transfer_artifact(
    transfer: &impl FileTransfer,
    artifact: &LocatedArtifact,
    remote_path: &str,
) -> Result<String> {
    let destination = transfer.destination(remote_path);
    let failed = |code: i32, stderr: String| DeployError::Transfer {
        artifact: artifact.path.display().to_string(),
        destination: destination.clone(),
        code,
        stderr,
    };

    let output = match transfer.transfer(&artifact.path, remote_path).await {
        Ok(output) => output,
        Err(e) => return Err(failed(GENERIC_EXIT_CODE, format!("{e:#}")).into()),
    };
    if !output.status.success() {
        return Err(failed(exit_code(&output), lossy(&output.stderr)).into());
    }
    Ok(lossy(&output.stderr))
}

/// Run the provisioning plan in one remote session.
///
/// # Errors
///
/// Returns [`DeployError::Provision`] naming the step that was running when
/// the session failed.
pub async fn provision(
    shell: &impl RemoteShell,
    host: &str,
    plan: &ProvisionPlan,
) -> Result<(SessionTrace, RemoteOutput)> {
    let script = plan.render();
    tracing::debug!(host, script = %script, "starting remote session");

    let output = match shell.run_script(&script).await {
        Ok(output) => output,
        Err(e) => {
            return Err(DeployError::Provision {
                host: host.to_string(),
                step: None,
                code: GENERIC_EXIT_CODE,
                stderr: format!("{e:#}"),
            }
            .into());
        }
    };

    let remote = RemoteOutput {
        stdout: lossy(&output.stdout),
        stderr: lossy(&output.stderr),
    };
    let trace = SessionTrace::parse(&remote.stderr);

    if !output.status.success() {
        return Err(DeployError::Provision {
            host: host.to_string(),
            step: trace.last_step(),
            code: exit_code(&output),
            stderr: remote.stderr,
        }
        .into());
    }
    Ok((trace, remote))
}

/// Resolve what a deploy would do without contacting the host.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or no artifact is found.
pub fn plan(
    source: &impl ArtifactSource,
    transfer: &impl FileTransfer,
    config: &DeployConfig,
) -> Result<DeployPlan> {
    config.validate()?;
    let artifact = locate_artifact(source, config)?;
    let remote_path = config.remote_artifact_path(&artifact.file_name);
    Ok(DeployPlan {
        destination: transfer.destination(&remote_path),
        script: ProvisionPlan::new(config, &remote_path).render(),
        artifact,
    })
}

/// Deploy the latest artifact to the configured host.
///
/// # Errors
///
/// Returns the first failure among config validation, artifact lookup,
/// transfer, and remote provisioning.
pub async fn deploy(
    remote: &impl RemoteHost,
    source: &impl ArtifactSource,
    hasher: &impl FileHasher,
    reporter: &impl ProgressReporter,
    config: &DeployConfig,
) -> Result<DeployReport> {
    config.validate()?;

    let artifact = locate_artifact(source, config)?;
    reporter.success(&format!("found {}", artifact.file_name));
    let sha256 = hasher
        .sha256_file(&artifact.path)
        .context("hashing artifact")?;

    let remote_path = config.remote_artifact_path(&artifact.file_name);
    reporter.step(&format!("copying to {}...", remote.destination(&remote_path)));
    let notice = transfer_artifact(remote, &artifact, &remote_path).await?;
    reporter.success("artifact copied");
    if let Some(line) = notice.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        reporter.warn(line);
    }

    reporter.step(&format!("provisioning {} on {}...", config.env_path, config.host));
    let plan = ProvisionPlan::new(config, &remote_path);
    let (trace, remote_output) = provision(remote, &config.host, &plan).await?;
    if trace.environment_created {
        reporter.success(&format!("created environment {}", plan.env_path));
    }
    reporter.success(&format!("installed {}", artifact.file_name));

    Ok(DeployReport {
        artifact: artifact.file_name,
        sha256,
        host: config.host.clone(),
        remote_path,
        env_path: plan.env_path,
        environment_created: trace.environment_created,
        remote_output,
    })
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().unwrap_or(GENERIC_EXIT_CODE)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
