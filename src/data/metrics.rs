//! Packet counters, latency statistics and the derived 0-100 scores.

use super::history::HistoryBuffer;

/// Owns every statistic the dashboard shows.
///
/// Counters only move through [`on_sample`](Self::on_sample) and
/// [`on_timeout`](Self::on_timeout); everything else (average, loss,
/// quality, stability) is computed on demand from them.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    sent: u64,
    received: u64,
    sum: f64,
    last: f64,
    history: HistoryBuffer,
    /// A synthetic send has been counted for the current timeout episode.
    timeout_counted: bool,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one successfully extracted sample.
    pub fn on_sample(&mut self, value: f64) {
        self.sent += 1;
        self.received += 1;
        self.sum += value;
        self.last = value;
        self.history.record(value);
        self.timeout_counted = false;
    }

    /// Unmatched probe output carries no accounting.
    pub fn on_no_match(&mut self) {}

    /// Count one send that was never answered.
    ///
    /// Only the first call of a timeout episode has an effect; the episode
    /// ends with the next sample or a reset. Returns whether `sent` moved.
    pub fn on_timeout(&mut self) -> bool {
        if self.timeout_counted {
            return false;
        }
        self.sent += 1;
        self.timeout_counted = true;
        true
    }

    /// Zero every counter, the running sum, the last sample and the history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// The most recent sample, `0.0` before the first one.
    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Mean of all received samples, `0.0` when nothing was received.
    pub fn average(&self) -> f64 {
        if self.received > 0 {
            self.sum / self.received as f64
        } else {
            0.0
        }
    }

    /// Percentage of sends without a reply.
    pub fn loss_percent(&self) -> f64 {
        loss_percent(self.sent, self.received)
    }

    /// Quality score of the last sample.
    pub fn quality(&self) -> f64 {
        quality(self.last)
    }

    /// Stability score of the current loss.
    pub fn stability(&self) -> f64 {
        stability(self.loss_percent())
    }
}

/// `(sent - received) * 100 / sent`, or `0.0` before anything was sent.
pub fn loss_percent(sent: u64, received: u64) -> f64 {
    if sent > 0 {
        sent.saturating_sub(received) as f64 * 100.0 / sent as f64
    } else {
        0.0
    }
}

/// Map a latency in milliseconds to a 0-100 quality score.
///
/// Piecewise linear and non-increasing:
///
/// | latency      | score                   |
/// |--------------|-------------------------|
/// | `<= 5`       | 100                     |
/// | `(5, 20]`    | `80 + (20 - x) * 1.3333`|
/// | `(20, 30]`   | `60 + (30 - x) * 2`     |
/// | `(30, 60]`   | `30 + (60 - x)`         |
/// | `(60, 100]`  | `10 + (100 - x) * 0.5`  |
/// | `> 100`      | 0                       |
pub fn quality(last_ms: f64) -> f64 {
    if last_ms <= 5.0 {
        100.0
    } else if last_ms <= 20.0 {
        80.0 + (20.0 - last_ms) * 1.3333
    } else if last_ms <= 30.0 {
        60.0 + (30.0 - last_ms) * 2.0
    } else if last_ms <= 60.0 {
        30.0 + (60.0 - last_ms) * 1.0
    } else if last_ms <= 100.0 {
        10.0 + (100.0 - last_ms) * 0.5
    } else {
        0.0
    }
}

/// Map a loss percentage to a 0-100 stability score.
///
/// | loss %       | score                     |
/// |--------------|---------------------------|
/// | `<= 0.1`     | 100                       |
/// | `(0.1, 1]`   | `100 - loss * 10`         |
/// | `(1, 5]`     | `90 - (loss - 1) * 15`    |
/// | `(5, 10]`    | `30 - (loss - 5) * 6`     |
/// | `> 10`       | 0                         |
pub fn stability(loss_percent: f64) -> f64 {
    if loss_percent <= 0.1 {
        100.0
    } else if loss_percent <= 1.0 {
        100.0 - loss_percent * 10.0
    } else if loss_percent <= 5.0 {
        90.0 - (loss_percent - 1.0) * 15.0
    } else if loss_percent <= 10.0 {
        30.0 - (loss_percent - 5.0) * 6.0
    } else {
        0.0
    }
}
