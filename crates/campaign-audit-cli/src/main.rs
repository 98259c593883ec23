mod commands;
mod logging;
mod progress;
mod render;

use std::fs::{self, File};
use std::io;
use std::process;

use anyhow::Context;
use campaign_audit_core::export;
use campaign_audit_core::ingest::SAMPLE_CSV;
use campaign_audit_core::rollup::Dimension;
use campaign_audit_core::{AnalysisEngine, AppConfig, Error};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{AnalyzeArgs, Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match campaign_audit_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Analyze(analyze_args)) => {
            if let Err(err) = run_analyze(config, &analyze_args) {
                error!("Error processing data: {:#}", err);
                if err
                    .downcast_ref::<Error>()
                    .is_some_and(Error::is_input_error)
                {
                    render::print_input_guidance();
                }
                process::exit(1);
            }
        }
        Some(Commands::Sample { output }) => match output {
            Some(path) => {
                fs::write(&path, SAMPLE_CSV)
                    .with_context(|| format!("writing sample to {}", path.display()))?;
                info!("Sample written to {}", path.display());
            }
            None => {
                println!("{}", "Expected Data Format".bold());
                print!("{}", SAMPLE_CSV);
            }
        },
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_analyze(config: AppConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let config = config.with_overrides(args.capacity, args.sla_threshold);
    config.validate()?;

    let engine = AnalysisEngine::new(config.thresholds());
    let reporter = CliReporter::new();
    let report = engine.analyze_path(&args.file, &reporter)?;

    render::print_report(&report, args.limit);

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    export::write_flagged_csv(io::BufWriter::new(file), &report.rows)?;
    info!("Flagged table written to {}", args.output.display());

    if let Some(dir) = &args.rollup_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for dimension in Dimension::ALL {
            let path = dir.join(format!(
                "{}_analysis.csv",
                dimension.column().to_lowercase()
            ));
            let file =
                File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            export::write_rollup_csv(io::BufWriter::new(file), dimension, report.rollup(dimension))?;
            info!("{} rollup written to {}", dimension, path.display());
        }
    }

    Ok(())
}
