//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries
//! (domain → application → infra/output/commands) hold.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().starts_with("#[cfg(") && line.contains("test") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

fn src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
}

/// Files compiled only under `#[cfg(test)]` via their parent's `mod` item.
fn is_test_only(file: &Path) -> bool {
    matches!(
        file.file_name().and_then(|n| n.to_str()),
        Some("tests.rs" | "test_support.rs")
    )
}

/// Lines of production code (outside `#[cfg(test)]`, not comments) that
/// contain any of `needles`.
fn production_hits(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut hits = Vec::new();
    for file in collect_rs_files(dir).into_iter().filter(|f| !is_test_only(f)) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            if in_test || line.trim().starts_with("//") {
                continue;
            }
            if needles.iter().any(|n| line.contains(n)) {
                hits.push(format!("{}:{}: {}", relative(&file), i + 1, line.trim()));
            }
        }
    }
    hits
}

#[test]
fn domain_has_no_outward_imports_or_io() {
    let hits = production_hits(
        &src_dir().join("domain"),
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(hits.is_empty(), "domain/ must stay pure:\n{}", hits.join("\n"));
}

#[test]
fn application_does_not_depend_on_adapters() {
    let hits = production_hits(
        &src_dir().join("application"),
        &["crate::infra", "crate::commands", "crate::output", "crate::app::"],
    );
    assert!(
        hits.is_empty(),
        "application/ must only use domain and ports:\n{}",
        hits.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let hits = production_hits(&src_dir().join("infra"), &["crate::commands", "crate::output"]);
    assert!(
        hits.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        hits.join("\n")
    );
}

#[test]
fn infra_and_application_have_no_print_macros() {
    let mut hits = production_hits(&src_dir().join("infra"), &["println!", "eprintln!", "print!("]);
    hits.extend(production_hits(
        &src_dir().join("application"),
        &["println!", "eprintln!", "print!("],
    ));
    assert!(
        hits.is_empty(),
        "use ProgressReporter or tracing instead of printing:\n{}",
        hits.join("\n")
    );
}

#[test]
fn no_inline_json_branching_in_commands() {
    let hits = production_hits(
        &src_dir().join("commands"),
        &["json: bool", "if json", "if !json", "is_json()"],
    );
    assert!(
        hits.is_empty(),
        "Found inline JSON branching in commands/ — use app.renderer() instead:\n{}",
        hits.join("\n")
    );
}

#[test]
fn no_tokio_command_runner_new_outside_infra() {
    let mut hits = Vec::new();
    for dir in ["application", "commands", "output", "domain"] {
        hits.extend(production_hits(&src_dir().join(dir), &["TokioCommandRunner::new"]));
    }
    assert!(
        hits.is_empty(),
        "process execution must go through infra/ adapters:\n{}",
        hits.join("\n")
    );
}

#[test]
fn no_unwrap_or_expect_in_production_code() {
    let hits = production_hits(&src_dir(), &[".unwrap()", ".expect("]);
    let hits: Vec<String> = hits
        .into_iter()
        .filter(|h| !h.contains("progress.rs"))
        .collect();
    assert!(
        hits.is_empty(),
        "propagate errors with `?` instead:\n{}",
        hits.join("\n")
    );
}
