use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "campaign-audit")]
#[command(about = "Flag overbooking, underdelivery and SLA breaches in campaign exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a campaign CSV export and write the flagged table
    Analyze(AnalyzeArgs),
    /// Show the expected input format with sample rows
    Sample {
        /// Write the sample table to this CSV file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    /// Campaign CSV file to analyze
    pub file: PathBuf,
    /// Where to write the flagged table
    #[arg(short, long, default_value = campaign_audit_core::export::DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,
    /// Impressions per slot before it counts as overbooked
    #[arg(long)]
    pub capacity: Option<u64>,
    /// Minimum delivered share of booked impressions, in percent
    #[arg(long = "sla-threshold")]
    pub sla_threshold: Option<f64>,
    /// Only print the first N rows of the flagged table
    #[arg(long)]
    pub limit: Option<usize>,
    /// Also write page and property rollups as CSV into this directory
    #[arg(long)]
    pub rollup_dir: Option<PathBuf>,
}
