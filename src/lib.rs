pub mod analyzers;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod view;

pub use analyzers::classify::{DEFAULT_TOLERANCE, Verdict, classify};
pub use analyzers::pipeline::{process_bytes, run, run_with_client};
pub use analyzers::types::{Company, DashboardResult, SectorStats};
pub use config::{PipelineConfig, Settings};
pub use error::{Result, ScorecardError};
