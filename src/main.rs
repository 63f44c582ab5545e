use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use colored::Colorize;
use tome_rater::{Catalog, CatalogConfig, CatalogError, CatalogReport, TracingObserver, sample};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the catalog demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log every registration and association
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding the default catalog configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How many entries the ranked queries return
    #[arg(short = 'n', long, default_value_t = 2)]
    top: usize,
}

/// Install the fmt subscriber; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Read the configuration file, or fall back to the defaults
fn load_config(path: Option<&Path>) -> Result<CatalogConfig, CatalogError> {
    let Some(path) = path else {
        return Ok(CatalogConfig::default());
    };
    let json = fs::read_to_string(path)
        .map_err(|e| CatalogError::Config(format!("failed to read {}: {e}", path.display())))?;
    CatalogConfig::from_json(&json)
}

/// Seed a catalog and build the report
fn run(args: &Args) -> Result<CatalogReport, CatalogError> {
    let mut catalog = Catalog::with_config(load_config(args.config.as_deref())?);
    catalog.register_observer(Box::new(TracingObserver));
    sample::populate(&mut catalog)?;
    Ok(CatalogReport::build(&catalog, args.top))
}

/// Print the report section by section
fn print_report(report: &CatalogReport) {
    println!("{}", "Tome Rater".green().bold());
    println!("{}\n", report.summary);
    for (title, lines) in report.sections() {
        println!("{}", format!("{title}:").yellow().bold());
        for line in lines {
            println!("  {line}");
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let report = match run(&args) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "failed to build catalog");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize report");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(&report);
    }
    ExitCode::SUCCESS
}
