// Resume analysis: extracted text + job context → chat completion → stored feedback.

use std::time::Duration;

pub mod handlers;
pub mod prompts;
pub mod service;

pub use service::{AnalysisError, AnalysisService};

/// Budget for one analysis, counted from the moment the request is accepted.
pub const ANALYSIS_DEADLINE: Duration = Duration::from_secs(45);
