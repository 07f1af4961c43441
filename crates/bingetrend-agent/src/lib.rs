pub mod batch;
pub mod client;
pub mod error;
pub mod relay;

pub use batch::{AnalysisRequest, BatchRun, BatchSummary, TrendAnalyzer};
pub use client::{AgentClient, HealthStatus};
pub use error::{AgentError, RelayError};
pub use relay::{LogRelay, LogSubscription, DEFAULT_CLOSE_TIMEOUT};
