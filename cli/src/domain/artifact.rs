//! Artifact selection — file name globs and "latest wins" selection.
//!
//! Pure functions only. The directory listing is done by an `ArtifactSource`
//! port; this module decides which of the listed names is deployed.

use anyhow::{Context, Result};
use regex::Regex;

/// A compiled file name glob.
///
/// Supports `*` (any run of characters), `?` (one character) and bracket
/// classes such as `[0-9]` or `[!a]`. Every other character matches itself.
/// Patterns apply to a single file name, never to a path.
#[derive(Debug, Clone)]
pub struct ArtifactPattern {
    source: String,
    regex: Regex,
}

impl ArtifactPattern {
    /// Compile `pattern` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty, contains a path separator, or
    /// has an unterminated bracket class.
    pub fn new(pattern: &str) -> Result<Self> {
        anyhow::ensure!(!pattern.is_empty(), "artifact pattern is empty");
        anyhow::ensure!(
            !pattern.contains('/'),
            "artifact pattern must be a file name, not a path: {pattern}"
        );
        let regex = Regex::new(&glob_to_regex(pattern)?)
            .with_context(|| format!("invalid artifact pattern: {pattern}"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns `true` if `name` matches the whole pattern.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl std::fmt::Display for ArtifactPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn glob_to_regex(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut class = String::from("[");
                if matches!(chars.peek(), Some('!' | '^')) {
                    chars.next();
                    class.push('^');
                }
                let mut closed = false;
                let mut first = true;
                while let Some(c) = chars.next() {
                    match c {
                        ']' if !first => {
                            closed = true;
                            break;
                        }
                        '\\' | '[' | ']' | '^' | '&' | '~' => {
                            class.push('\\');
                            class.push(c);
                        }
                        _ => class.push(c),
                    }
                    first = false;
                }
                anyhow::ensure!(closed, "unterminated '[' in artifact pattern: {pattern}");
                class.push(']');
                out.push_str(&class);
            }
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    out.push('$');
    Ok(out)
}

/// Pick the artifact to deploy from `names`.
///
/// Returns the lexicographically greatest name matching `pattern`, or `None`
/// when nothing matches. Ordering is plain `str` ordering, so
/// `nx_workers-1.9.0` sorts after `nx_workers-1.10.0`.
#[must_use]
pub fn select_latest<'a, I>(names: I, pattern: &ArtifactPattern) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().filter(|n| pattern.matches(n)).max()
}
