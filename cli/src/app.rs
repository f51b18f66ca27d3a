//! Application context — unified state passed to every command handler.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::services::config_service;
use crate::cli::OverrideArgs;
use crate::domain::DeployConfig;
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// `-v` count.
    pub verbose: u8,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Explicit configuration file from `--config`.
    pub config_path: Option<PathBuf>,
    /// Per-run configuration overrides.
    pub overrides: ConfigOverrides,
}

/// Configuration values given on the command line or in `NX_DEPLOY_*` variables.
///
/// These win over the configuration file for this run only and are never saved.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub remote_dir: Option<String>,
    pub env_path: Option<String>,
    pub interpreter_glob: Option<String>,
    pub artifact_dir: Option<String>,
    pub artifact_pattern: Option<String>,
}

impl ConfigOverrides {
    /// Overlay the set values onto `config`.
    pub fn apply(&self, config: &mut DeployConfig) {
        let fields = [
            (&self.host, &mut config.host),
            (&self.remote_dir, &mut config.remote_dir),
            (&self.env_path, &mut config.env_path),
            (&self.interpreter_glob, &mut config.interpreter_glob),
            (&self.artifact_dir, &mut config.artifact_dir),
            (&self.artifact_pattern, &mut config.artifact_pattern),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
    }
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            host: args.host,
            remote_dir: args.remote_dir,
            env_path: args.env_path,
            interpreter_glob: args.interpreter_glob,
            artifact_dir: args.artifact_dir,
            artifact_pattern: args.pattern,
        }
    }
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()` and passed as `&AppContext` to all
/// command handlers.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// `-v` count; any value above zero echoes remote output.
    pub verbose: u8,
    /// Configuration file store.
    pub config_store: YamlConfigStore,
    /// Per-run overrides layered over the stored configuration.
    pub overrides: ConfigOverrides,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let config_store = match &flags.config_path {
            Some(path) => YamlConfigStore::with_path(path.clone()),
            None => YamlConfigStore::default(),
        };

        Self {
            // Progress lines would corrupt the JSON document on stdout.
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            verbose: flags.output.verbose,
            config_store,
            overrides: flags.overrides.clone(),
        }
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Stored configuration with this run's overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn effective_config(&self) -> Result<DeployConfig> {
        let mut config = config_service::load_config(&self.config_store)?;
        self.overrides.apply(&mut config);
        Ok(config)
    }
}
