//! Itihas command line: fuse one batch described by a source manifest.
//!
//! ```bash
//! itihas --manifest demos/manifest.yaml --output fused.geojson --report report.json
//!
//! # Custom thresholds, debug logging
//! itihas -m demos/manifest.yaml -c configs/fusion.yaml -o fused.geojson -v
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use itihas::io::{Manifest, write_collection};
use itihas::{FusionConfig, FusionEngine, SourceRole};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source manifest (YAML)
    #[arg(short, long)]
    manifest: PathBuf,

    /// Fusion configuration (YAML); defaults to configs/fusion.yaml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output GeoJSON file
    #[arg(short, long)]
    output: PathBuf,

    /// Statistics report (JSON)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Survey year of the baseline
    #[arg(long)]
    baseline_year: Option<i32>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => FusionConfig::load(path)?,
        None => FusionConfig::load_default()?,
    };

    let mut manifest = Manifest::load(&args.manifest)?;
    if let Some(year) = args.baseline_year {
        config = config.with_baseline_year(year);
        for entry in &mut manifest.sources {
            if entry.role == SourceRole::Baseline {
                entry.reference_year = Some(year);
            }
        }
    }

    let engine = FusionEngine::new(config)?;
    let output = engine.run(manifest.read_input()?)?;

    write_collection(&output.features, &args.output)?;
    if let Some(path) = &args.report {
        output.report.write(path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(c) = cause {
                eprintln!("  caused by: {c}");
                cause = c.source();
            }
            ExitCode::FAILURE
        }
    }
}
