use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use odoomig_core::attrs_states::{self, AttrsStatesReport, AutoConfirm, ReplaceConfirmer};
use odoomig_core::{chatter, daterange, python_states, settings, structure};
use similar::TextDiff;

#[derive(Debug, Parser)]
#[command(
    name = "odoomig",
    version,
    about = "Migrate Odoo module source files to the Odoo 18 view syntax"
)]
struct Cli {
    #[arg(value_name = "DIRECTORY", help = "Path of the module directory to migrate")]
    directory: PathBuf,
    #[arg(
        long,
        help = "Rewrite files changed by the attrs/states pass without asking for confirmation"
    )]
    auto_replace: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if !cli.directory.is_dir() {
        bail!("not a directory: {}", cli.directory.display());
    }

    for path in structure::run(&cli.directory)? {
        println!("[structure] {}", path.display());
    }

    let report = run_attrs_states(&cli.directory, cli.auto_replace)?;
    print_attrs_states_report(&report);

    for path in chatter::run(&cli.directory)? {
        println!("[chatter] {}", path.display());
    }
    for path in daterange::run(&cli.directory)? {
        println!("[daterange] {}", path.display());
    }
    for path in settings::run(&cli.directory)? {
        println!("[settings] {}", path.display());
    }
    for path in python_states::run(&cli.directory)? {
        println!("[py-states] {}", path.display());
    }

    Ok(())
}

fn run_attrs_states(directory: &Path, auto_replace: bool) -> Result<AttrsStatesReport> {
    if auto_replace {
        attrs_states::run(directory, &mut AutoConfirm)
    } else {
        attrs_states::run(directory, &mut StdinConfirmer)
    }
}

fn print_attrs_states_report(report: &AttrsStatesReport) {
    for error in &report.xml_errors {
        println!("[xml error] {} -> {}", error.path.display(), error.detail);
    }
    for error in &report.attrs_errors {
        println!("[attrs error] {} -> {}", error.path.display(), error.detail);
    }
    for path in &report.rewritten {
        println!("[attrs/states] {}", path.display());
    }
}

/// Shows a unified diff of the pending rewrite and asks on stdin.
struct StdinConfirmer;

impl ReplaceConfirmer for StdinConfirmer {
    fn confirm(&mut self, path: &Path, original: &str, updated: &str) -> Result<bool> {
        let diff = TextDiff::from_lines(original, updated);
        print!(
            "{}",
            diff.unified_diff()
                .context_radius(3)
                .header("current", "migrated")
        );
        print!("Replace modified file {}? (y/N): ", path.display());
        io::stdout().flush().context("failed to flush stdout")?;

        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("failed to read confirmation answer")?;
        Ok(answer.trim().to_ascii_lowercase().starts_with('y'))
    }
}
