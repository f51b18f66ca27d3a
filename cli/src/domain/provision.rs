//! Remote provisioning plan and its shell rendering.
//!
//! The plan runs in a single remote `sh` session so that activating the
//! environment carries over to the install step. `set -e` makes the first
//! failing step abort the session. Each step announces itself on stderr with
//! [`STEP_MARKER`] so a failure can be attributed to a step afterwards.

use std::fmt;

use serde::Serialize;

use crate::domain::config::DeployConfig;

/// Prefix of the line written to stderr before each step.
pub const STEP_MARKER: &str = "==> nx-deploy step: ";

/// Prefix of the line written to stderr when the environment is created.
pub const CREATED_MARKER: &str = "==> nx-deploy created: ";

/// One step of the remote provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionStep {
    /// Create the environment unless its marker file exists.
    EnsureEnvironment,
    /// Force-link the shared interpreter into the environment's `bin/`.
    LinkInterpreter,
    /// Source the environment's activation script.
    Activate,
    /// Upgrade-install the transferred artifact.
    Install,
}

impl ProvisionStep {
    /// All steps in execution order.
    pub const ALL: [Self; 4] = [
        Self::EnsureEnvironment,
        Self::LinkInterpreter,
        Self::Activate,
        Self::Install,
    ];

    /// Stable name used in step markers and reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::EnsureEnvironment => "ensure-environment",
            Self::LinkInterpreter => "link-interpreter",
            Self::Activate => "activate",
            Self::Install => "install",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the remote session needs to know, resolved from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub env_path: String,
    pub marker: String,
    pub python: String,
    pub interpreter_glob: String,
    pub remote_artifact: String,
    pub trace: bool,
}

impl ProvisionPlan {
    /// Build the plan for installing `remote_artifact` with `config`.
    #[must_use]
    pub fn new(config: &DeployConfig, remote_artifact: &str) -> Self {
        Self {
            env_path: config.env_path.trim_end_matches('/').to_string(),
            marker: config.marker.clone(),
            python: config.python.clone(),
            interpreter_glob: config.interpreter_glob.clone(),
            remote_artifact: remote_artifact.to_string(),
            trace: config.trace,
        }
    }

    /// Path of the marker file whose presence means the environment exists.
    #[must_use]
    pub fn marker_path(&self) -> String {
        format!("{}/{}", self.env_path, self.marker)
    }

    /// Shell commands for a single step, without its marker line.
    #[must_use]
    pub fn step_commands(&self, step: ProvisionStep) -> Vec<String> {
        let env = &self.env_path;
        match step {
            ProvisionStep::EnsureEnvironment => vec![
                format!("if [ ! -e {} ]; then", shell_quote(&self.marker_path())),
                format!("  {} -m venv {}", shell_quote(&self.python), shell_quote(env)),
                format!("  printf '%s\\n' {} >&2", shell_quote(&format!("{CREATED_MARKER}{env}"))),
                "fi".to_string(),
            ],
            // The glob stays unquoted so the remote shell expands it.
            ProvisionStep::LinkInterpreter => vec![format!(
                "ln -sf {} {}",
                self.interpreter_glob,
                shell_quote(&format!("{env}/bin/"))
            )],
            ProvisionStep::Activate => {
                vec![format!(". {}", shell_quote(&format!("{env}/bin/activate")))]
            }
            ProvisionStep::Install => vec![format!(
                "python -m pip install --upgrade {}",
                shell_quote(&self.remote_artifact)
            )],
        }
    }

    /// Render the whole plan as a POSIX `sh` script.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec!["set -e".to_string()];
        if self.trace {
            lines.push("set -x".to_string());
        }
        for step in ProvisionStep::ALL {
            lines.push(format!(
                "printf '%s\\n' {} >&2",
                shell_quote(&format!("{STEP_MARKER}{step}"))
            ));
            lines.extend(self.step_commands(step));
        }
        let mut script = lines.join("\n");
        script.push('\n');
        script
    }
}

/// What the step markers in a session's stderr say about the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTrace {
    /// Steps that were started, in order.
    pub started: Vec<ProvisionStep>,
    /// Whether the environment was created during the session.
    pub environment_created: bool,
}

impl SessionTrace {
    /// Parse the marker lines out of a session's stderr.
    ///
    /// Lines that are not markers (including `set -x` trace lines) are ignored.
    #[must_use]
    pub fn parse(stderr: &str) -> Self {
        let mut trace = Self::default();
        for line in stderr.lines() {
            if let Some(name) = line.strip_prefix(STEP_MARKER) {
                if let Some(step) = ProvisionStep::from_name(name.trim_end()) {
                    trace.started.push(step);
                }
            } else if line.starts_with(CREATED_MARKER) {
                trace.environment_created = true;
            }
        }
        trace
    }

    /// The last step that started, i.e. the one running when a session failed.
    #[must_use]
    pub fn last_step(&self) -> Option<ProvisionStep> {
        self.started.last().copied()
    }
}

/// Quote `value` for a POSIX shell using single quotes.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | ':' | '=' | '+' | ','))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
