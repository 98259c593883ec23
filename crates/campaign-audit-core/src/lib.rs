pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod export;
pub mod flags;
pub mod ingest;
pub mod model;
pub mod progress;
pub mod rollup;
pub mod summary;

pub use config::AppConfig;
pub use engine::{AnalysisEngine, AnalysisReport, PhaseDurations};
pub use error::Error;
pub use flags::FlagThresholds;
pub use progress::{ProgressReporter, SilentReporter};
