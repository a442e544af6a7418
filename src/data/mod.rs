//! Latency data model and processing.
//!
//! This module turns raw probe output into the statistics the dashboard
//! shows. Nothing in here performs I/O or reads the clock; time is always
//! passed in, which keeps every piece testable with simulated instants.
//!
//! ## Submodules
//!
//! - [`extract`]: Partial-line-safe extraction of `time=<ms>` samples
//! - [`history`]: Fixed-size ring of recent latencies for the history strip
//! - [`liveness`]: LIVE/TIMEOUT state derived from the last successful sample
//! - [`metrics`]: Counters, running sum and the quality/stability scores
//! - [`snapshot`]: Immutable per-tick view handed to renderers
//! - [`thresholds`]: Warning/critical thresholds and colour classification
//!
//! ## Data Flow
//!
//! ```text
//! probe bytes
//!      │
//!      ▼
//! SampleExtractor::feed() ──▶ ExtractResult
//!                                  │
//!                                  ▼
//!                   MetricsEngine::on_sample() / LivenessMonitor
//!                                  │
//!                                  ▼
//!                           Snapshot::capture()
//! ```

pub mod extract;
pub mod history;
pub mod liveness;
pub mod metrics;
pub mod snapshot;
pub mod thresholds;

pub use extract::{ExtractResult, SampleExtractor};
pub use history::{HistoryBuffer, HISTORY_LEN};
pub use liveness::{LivenessMonitor, LivenessState, Transition};
pub use metrics::{loss_percent, quality, stability, MetricsEngine};
pub use snapshot::Snapshot;
pub use thresholds::{classify, Level, ScoreBand, Thresholds};
