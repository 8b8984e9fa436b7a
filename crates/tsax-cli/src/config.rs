//! Project configuration (tsconfig.json include/exclude).
//!
//! Configuration problems are never fatal: a missing, malformed, or
//! unreadable tsconfig logs a warning and the run continues with the
//! built-in defaults.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_INCLUDE: &[&str] = &["**/*.ts", "**/*.tsx"];
const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**"];

/// The slice of tsconfig.json the extractor honors.
#[derive(Debug, Default, Deserialize)]
struct RawTsConfig {
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

/// Resolved source filters for one run.
#[derive(Debug)]
pub struct ProjectConfig {
    include: GlobSet,
    exclude: GlobSet,
}

impl ProjectConfig {
    /// Load tsconfig.json from the project root, degrading to defaults on
    /// any failure.
    pub fn load(root: &Path) -> Self {
        let path = root.join("tsconfig.json");
        let raw = match std::fs::read_to_string(&path) {
            Ok(text) => match parse_tsconfig(&text) {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(path = %path.display(), %error, "malformed tsconfig.json; using default settings");
                    RawTsConfig::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!("no tsconfig.json; using default settings");
                RawTsConfig::default()
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "unreadable tsconfig.json; using default settings");
                RawTsConfig::default()
            }
        };
        Self::from_raw(raw)
    }

    pub fn default_config() -> Self {
        Self::from_raw(RawTsConfig::default())
    }

    fn from_raw(raw: RawTsConfig) -> Self {
        let include_patterns: Vec<String> = match raw.include {
            Some(patterns) => patterns.iter().map(|p| normalize_pattern(p)).collect(),
            None => DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect(),
        };
        // node_modules stays excluded even with a configured exclude list
        let mut exclude_patterns: Vec<String> = raw
            .exclude
            .unwrap_or_default()
            .iter()
            .map(|p| normalize_pattern(p))
            .collect();
        for default in DEFAULT_EXCLUDE {
            exclude_patterns.push(default.to_string());
        }

        ProjectConfig {
            include: build_glob_set(&include_patterns),
            exclude: build_glob_set(&exclude_patterns),
        }
    }

    /// Whether a root-relative path (forward slashes) is in scope.
    /// Declaration files are never in scope.
    pub fn is_source(&self, relative: &str) -> bool {
        if relative.ends_with(".d.ts") {
            return false;
        }
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

/// tsconfig.json allows // comments; strip comment lines before parsing.
fn parse_tsconfig(text: &str) -> serde_json::Result<RawTsConfig> {
    let stripped: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect();
    serde_json::from_str(&stripped.join("\n"))
}

/// tsconfig patterns may name a bare directory, meaning everything under
/// it; patterns without an extension or glob get the recursive suffix.
fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim_end_matches('/');
    if trimmed.contains('*') || trimmed.rsplit('/').next().is_some_and(|last| last.contains('.')) {
        trimmed.to_string()
    } else {
        format!("{trimmed}/**/*")
    }
}

fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(error) => {
                warn!(pattern, %error, "ignoring invalid glob pattern");
            }
        }
    }
    builder.build().unwrap_or_else(|error| {
        warn!(%error, "failed to build glob set; matching nothing");
        GlobSet::empty()
    })
}
