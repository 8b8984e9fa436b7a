//! Extraction driver: source discovery and pipeline orchestration.
//!
//! One run is a single synchronous pass: discover sources, parse them into
//! the project, expand the type registry, extract actions, write the
//! document. Everything before the final write degrades instead of
//! failing; the write is the one fatal boundary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use tsax_extract::document::{ActionsDocument, OUTPUT_FILE_NAME};
use tsax_extract::serialize::{ExpansionContext, expand_definitions};
use tsax_extract::extract_actions;
use tsax_frontend::Project;

use crate::config::ProjectConfig;

/// What one extraction run produced.
#[derive(Debug)]
pub struct ExtractionSummary {
    pub files_scanned: usize,
    pub actions: usize,
    pub type_aliases: usize,
    pub output: PathBuf,
}

/// Discover in-scope source files under `root`, as root-relative paths
/// with forward slashes, sorted for determinism.
///
/// Dependency and hidden directories are pruned during the walk; the
/// config's include/exclude globs and the declaration-file rule decide
/// the rest.
pub fn discover_sources(root: &Path, config: &ProjectConfig) -> Result<Vec<String>> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            name != "node_modules" && !name.starts_with('.')
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if config.is_source(&relative) {
            sources.push(relative);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Run the whole pipeline for one project root.
///
/// Individual files that cannot be read or parsed are skipped with a
/// warning; only the final document write can fail the run.
pub fn run_extraction(root: &Path, out: Option<&Path>, pretty: bool) -> Result<ExtractionSummary> {
    let config = ProjectConfig::load(root);
    let sources = discover_sources(root, &config)?;

    let mut project = Project::new();
    let mut files_scanned = 0usize;
    for relative in &sources {
        let path = root.join(relative);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) => {
                warn!(file = %relative, %error, "skipping unreadable source file");
                continue;
            }
        };
        if project.add_source(relative, &text) {
            files_scanned += 1;
        }
    }

    let host = project.host();
    let mut ctx = ExpansionContext::new(project.definitions());
    expand_definitions(&host, &mut ctx);
    let actions = extract_actions(&host, project.functions(), &mut ctx);
    let document = ActionsDocument::new(actions, ctx.into_registry());

    let output = root.join(out.unwrap_or(Path::new(OUTPUT_FILE_NAME)));
    document.write_to(&output, pretty)?;

    let summary = ExtractionSummary {
        files_scanned,
        actions: document.actions.len(),
        type_aliases: document.type_aliases.len(),
        output,
    };
    info!(
        files = summary.files_scanned,
        actions = summary.actions,
        types = summary.type_aliases,
        "extraction complete"
    );
    Ok(summary)
}

/// Resolve the project root argument against the current directory.
pub fn resolve_root(project_root: Option<&Path>) -> Result<PathBuf> {
    let root = match project_root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    anyhow::ensure!(
        root.is_dir(),
        "project root {} is not a directory",
        root.display()
    );
    Ok(root)
}
