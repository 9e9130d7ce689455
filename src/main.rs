pub mod candidates;
pub mod descriptor;
pub mod filetype;
pub mod pipeline;
pub mod reconcile;

use std::path::PathBuf;

use clap::Parser;
use pipeline::{ExtractOptions, RunReport};
use tracing::Level;

#[macro_use]
extern crate tracing;

/// Unpacks a Legend of Grimrock 2 mod (.dat) and restores its file names.
#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Mod file to extract
    archive: PathBuf,

    /// Directory the mod folder is created in
    #[arg(default_value = ".")]
    output: PathBuf,

    /// Extra resource strings, one per line [default: resourceStrings.txt beside the archive]
    #[arg(short, long)]
    resource_strings: Option<PathBuf>,

    /// Leave extracted files under their hash names
    #[arg(long)]
    keep_temp_names: bool,

    /// Threads used to parse scripts
    #[arg(short, long)]
    jobs: Option<usize>,

    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for ExtractOptions {
    fn from(args: Args) -> Self {
        Self {
            archive: args.archive,
            output: args.output,
            resource_strings: args.resource_strings,
            keep_temp_names: args.keep_temp_names,
            jobs: args.jobs,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let report = pipeline::run(&args.into())?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &RunReport) {
    for line in report.diagnostic_lines() {
        println!("{line}");
    }
    for unresolved in &report.unresolved {
        println!("{unresolved}");
    }
    for failure in &report.failed_entries {
        println!("Failed to extract entry {}: {}", failure.hash, failure.error);
    }
    println!("{}", report.summary());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["grimex", "mod.dat", "out", "--keep-temp-names", "-j", "4"])
            .unwrap();
        let options = ExtractOptions::from(args);
        assert_eq!(options.archive, PathBuf::from("mod.dat"));
        assert_eq!(options.output, PathBuf::from("out"));
        assert!(options.keep_temp_names);
        assert_eq!(options.jobs, Some(4));
        assert_eq!(options.resource_strings, None);
    }

    #[test]
    fn test_output_defaults_to_current_dir() {
        let args = Args::try_parse_from(["grimex", "mod.dat"]).unwrap();
        assert_eq!(args.output, PathBuf::from("."));
    }
}
