//! Read-only view of the monitoring state handed to renderers.

use serde::Serialize;

use super::metrics::MetricsEngine;
use super::thresholds::{quality_band, stability_band, Level, ScoreBand, Thresholds};
use crate::ipinfo::IpInfoView;

/// Everything a renderer needs for one frame.
///
/// Built fresh every tick; mutating it has no effect on the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub last: f64,
    pub average: f64,
    pub loss_percent: f64,
    pub quality: f64,
    pub stability: f64,
    /// History slots from oldest to newest; `0.0` marks an empty slot.
    pub history: Vec<f64>,
    pub timeout: bool,
    pub sent: u64,
    pub received: u64,
    /// False once the probe's output stream has closed.
    pub probe_alive: bool,
    /// Present while the IP info panel is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_info: Option<IpInfoView>,
}

impl Snapshot {
    pub fn capture(
        metrics: &MetricsEngine,
        timeout: bool,
        probe_alive: bool,
        ip_info: Option<IpInfoView>,
    ) -> Self {
        Self {
            last: metrics.last(),
            average: metrics.average(),
            loss_percent: metrics.loss_percent(),
            quality: metrics.quality(),
            stability: metrics.stability(),
            history: metrics.history().to_vec(),
            timeout,
            sent: metrics.sent(),
            received: metrics.received(),
            probe_alive,
            ip_info,
        }
    }

    /// Newest recorded history value.
    pub fn latest_history(&self) -> Option<f64> {
        self.history.last().copied().filter(|v| *v > 0.0)
    }

    pub fn quality_band(&self) -> ScoreBand {
        quality_band(self.quality)
    }

    pub fn stability_band(&self) -> ScoreBand {
        stability_band(self.stability)
    }

    pub fn last_level(&self, thresholds: &Thresholds) -> Level {
        thresholds.classify(self.last)
    }

    pub fn average_level(&self, thresholds: &Thresholds) -> Level {
        thresholds.classify(self.average)
    }

    /// Any loss at all is shown as a warning.
    pub fn loss_level(&self) -> Level {
        if self.loss_percent > 0.0 {
            Level::Warn
        } else {
            Level::Normal
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.timeout {
            "TIMEOUT"
        } else {
            "OK"
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::capture(&MetricsEngine::new(), false, true, None)
    }
}
