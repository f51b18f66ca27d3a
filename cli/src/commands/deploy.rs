//! `nx-deploy deploy` — copy the latest artifact and provision the host.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::deploy;
use crate::infra::fs::LocalFs;
use crate::infra::transport::SshTransport;
use crate::output::TerminalReporter;

/// Arguments for the deploy command.
#[derive(Args, Default)]
pub struct DeployArgs {
    /// Print the selected artifact and the remote script without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns the first failure among configuration loading, artifact lookup,
/// transfer, and remote provisioning.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let transport = SshTransport::default_runner(
        config.host.clone(),
        config.ssh.clone(),
        Duration::from_secs(config.timeout_secs),
    );

    if args.dry_run {
        let plan = deploy::plan(&LocalFs, &transport, &config)?;
        app.renderer().render_plan(&plan)?;
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(host = %config.host, env_path = %config.env_path, "deploy starting");
    let report = {
        let reporter = TerminalReporter::new(&app.output);
        deploy::deploy(&transport, &LocalFs, &LocalFs, &reporter, &config).await?
    };
    tracing::info!(artifact = %report.artifact, sha256 = %report.sha256, "deploy finished");

    if app.verbose > 0 {
        app.output.forward_remote(&report.remote_output.stdout);
        app.output.forward_remote(&report.remote_output.stderr);
    }
    app.renderer().render_report(&report)?;
    Ok(ExitCode::SUCCESS)
}
