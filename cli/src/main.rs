//! nx-deploy - ship the latest worker wheel to the nx host

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nx_deploy::cli::Cli;
use nx_deploy::domain::error::GENERIC_EXIT_CODE;
use nx_deploy::domain::{ConfigError, DeployError};
use nx_deploy::output::OutputContext;
use nx_deploy::output::json::format_error;

/// Environment variable holding a `tracing` filter, e.g. `nx_deploy=debug`.
const LOG_ENV: &str = "NX_DEPLOY_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    let ctx = OutputContext::new(cli.no_color, false);
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            report_error(&ctx, &e, json);
            std::process::exit(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(ctx: &OutputContext, e: &anyhow::Error, json: bool) {
    let deploy_err = e.downcast_ref::<DeployError>();
    if json {
        let code = match deploy_err {
            Some(err) => err.code(),
            None if e.downcast_ref::<ConfigError>().is_some() => "INVALID_CONFIG",
            None => "ERROR",
        };
        match format_error(&format!("{e:#}"), code) {
            Ok(doc) => println!("{doc}"),
            Err(_) => eprintln!("Error: {e:#}"),
        }
    } else {
        ctx.error(&format!("Error: {e:#}"));
    }

    if let Some(stderr) = deploy_err.and_then(DeployError::remote_stderr) {
        ctx.forward_remote(stderr);
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<DeployError>()
        .map_or(GENERIC_EXIT_CODE, DeployError::exit_code)
}
