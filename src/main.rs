use std::process::ExitCode;

use clap::Parser;
use csv_dataset_manager::pipeline;
use csv_dataset_manager::{Config, SplitArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "csv-dataset-manager",
    version,
    about = "split and save",
    long_about = "Copy the files referenced by a CSV into <output>/target (rows where \
                  <column> equals <value>) and <output>/non_target (all other rows)."
)]
struct Cli {
    #[command(flatten)]
    args: SplitArgs,

    /// Log every copied file
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = match Config::from_args(&cli.args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&cfg) {
        Ok(outcome) => {
            if let Some(msg) = outcome.message() {
                println!("{msg}");
            } else {
                let report = outcome.report();
                println!(
                    "Copied {} files ({} target, {} non_target)",
                    report.files_copied(),
                    report.target.files_copied,
                    report.non_target.files_copied
                );
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{failure}");
            ExitCode::FAILURE
        }
    }
}
