// Library interface for f1analyst
// The binary and the integration tests both go through these modules

pub mod analysis;
pub mod config;
pub mod controls;
pub mod errors;
pub mod laps;
pub mod provider;
pub mod ui;
pub mod writer;

// Re-export commonly used types
pub use analysis::{AnalysisKind, AnalysisOutput, AnalysisRequest, Chart, run};
pub use config::AppConfig;
pub use errors::AnalystError;
pub use laps::{Compound, Lap, LapFilter, LapTable, Stint};
pub use provider::{FileCacheProvider, LapProvider, SessionKey, SessionKind};
