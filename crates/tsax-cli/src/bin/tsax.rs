#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;

use tsax_cli::args::CliArgs;
use tsax_cli::config::ProjectConfig;
use tsax_cli::{driver, tracing_init};

fn main() -> Result<()> {
    // Initialize tracing if TSAX_LOG or RUST_LOG is set (zero cost otherwise).
    tracing_init::init_tracing();

    let args = CliArgs::parse();
    let root = driver::resolve_root(args.project_root.as_deref())?;

    if args.list_files {
        let config = ProjectConfig::load(&root);
        for source in driver::discover_sources(&root, &config)? {
            println!("{source}");
        }
        return Ok(());
    }

    let summary = driver::run_extraction(&root, args.out.as_deref(), !args.compact)?;
    eprintln!(
        "Wrote {} ({} actions, {} type aliases from {} files)",
        summary.output.display(),
        summary.actions,
        summary.type_aliases,
        summary.files_scanned,
    );
    Ok(())
}
