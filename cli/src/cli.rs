//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, ConfigOverrides, OutputFlags};
use crate::commands;

/// Copy the latest worker wheel to the nx host and install it into its environment
#[derive(Parser)]
#[command(name = "nx-deploy", version, propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); also echoes remote output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: ~/.nx-deploy/config.yaml)
    #[arg(long = "config", global = true, env = "NX_DEPLOY_CONFIG", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Per-run overrides of configuration values.
#[derive(Args, Default)]
pub struct OverrideArgs {
    /// ssh destination ([user@]host or ssh config alias)
    #[arg(long, global = true, env = "NX_DEPLOY_HOST")]
    pub host: Option<String>,

    /// Remote directory receiving the artifact
    #[arg(long, global = true, env = "NX_DEPLOY_REMOTE_DIR", value_name = "DIR")]
    pub remote_dir: Option<String>,

    /// Remote environment path
    #[arg(long, global = true, env = "NX_DEPLOY_ENV_PATH", value_name = "PATH")]
    pub env_path: Option<String>,

    /// Remote shared interpreter glob, expanded on the host
    #[arg(long, global = true, env = "NX_DEPLOY_INTERPRETER_GLOB", value_name = "GLOB")]
    pub interpreter_glob: Option<String>,

    /// Local directory searched for the artifact
    #[arg(long, global = true, env = "NX_DEPLOY_ARTIFACT_DIR", value_name = "DIR")]
    pub artifact_dir: Option<String>,

    /// Artifact file name pattern
    #[arg(long, global = true, env = "NX_DEPLOY_PATTERN", value_name = "GLOB")]
    pub pattern: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the latest artifact (default when no command is given)
    Deploy(commands::deploy::DeployArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose,
            config_path,
            overrides,
            command,
        } = self;

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
                verbose,
            },
            config_path,
            overrides: ConfigOverrides::from(overrides),
        });

        match command.unwrap_or_default() {
            Command::Deploy(args) => commands::deploy::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::Deploy(commands::deploy::DeployArgs::default())
    }
}
