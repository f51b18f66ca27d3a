//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::deploy::{DeployPlan, DeployReport};
use crate::domain::DeployConfig;
use crate::output::OutputContext;

/// Renders deploy results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(&format!("nx-deploy v{version}"));
    }

    /// Render the summary of a finished deploy.
    pub fn render_report(&self, report: &DeployReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Deployed");
        self.ctx.kv("Artifact:", &report.artifact);
        self.ctx.kv("SHA-256:", &report.sha256);
        self.ctx.kv("Host:", &report.host);
        self.ctx.kv("Copied to:", &report.remote_path);
        self.ctx.kv(
            "Environment:",
            &format!(
                "{} ({})",
                report.env_path,
                environment_state(report.environment_created)
            ),
        );
    }

    /// Render a dry-run plan: the copy and the remote script.
    pub fn render_plan(&self, plan: &DeployPlan) {
        println!();
        self.ctx.header("Dry run (nothing was executed)");
        self.ctx
            .kv("Artifact:", &plan.artifact.path.display().to_string());
        self.ctx.kv("Copy to:", &plan.destination);
        println!();
        println!("  {}", "Remote script:".style(self.ctx.styles.dim));
        for line in plan.script.lines() {
            println!("    {line}");
        }
    }

    /// Confirm a saved configuration value.
    pub fn render_config_saved(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    /// Render the effective configuration.
    pub fn render_config(&self, config: &DeployConfig, path: &std::path::Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for (key, value) in config.entries() {
            println!("  {:<20} {value}", format!("{key}:"));
        }
        println!(
            "  {:<20} {}",
            "ssh.options:",
            format_options(&config.ssh.options)
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.dim));
        for var in ["NX_DEPLOY_CONFIG", "NX_DEPLOY_LOG", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

/// Describe whether the remote environment was created or reused.
#[must_use]
pub fn environment_state(created: bool) -> &'static str {
    if created { "created" } else { "reused" }
}

/// Format extra ssh options for display.
#[must_use]
pub fn format_options(options: &[String]) -> String {
    if options.is_empty() {
        "(none)".to_string()
    } else {
        options.join(" ")
    }
}
