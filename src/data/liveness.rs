//! Probe liveness tracking.
//!
//! Liveness is derived purely from wall-clock comparisons made once per
//! tick: no timers run in the background.

use std::time::{Duration, Instant};

/// Time without a sample after which the probe is considered timed out.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Whether the probe is currently producing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    Live,
    Timeout,
}

/// What a call to [`LivenessMonitor::evaluate`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State did not change.
    None,
    /// The probe just went silent; a timeout episode begins.
    EnteredTimeout,
}

/// Two-state LIVE/TIMEOUT machine driven by the last successful sample.
#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    last_success: Instant,
    timeout: Duration,
    state: LivenessState,
}

impl LivenessMonitor {
    /// Start in `Live` with `now` as the last success.
    pub fn new(now: Instant) -> Self {
        Self::with_timeout(now, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(now: Instant, timeout: Duration) -> Self {
        Self {
            last_success: now,
            timeout,
            state: LivenessState::Live,
        }
    }

    /// Record a successful sample; ends any timeout episode.
    pub fn mark_success(&mut self, now: Instant) {
        if self.state == LivenessState::Timeout {
            tracing::info!(
                silent_for = ?now.saturating_duration_since(self.last_success),
                "probe recovered"
            );
        }
        self.last_success = now;
        self.state = LivenessState::Live;
    }

    /// Restart the success clock without treating it as a recovery.
    pub fn reset(&mut self, now: Instant) {
        self.last_success = now;
        self.state = LivenessState::Live;
    }

    /// Compare `now` against the last success and update the state.
    ///
    /// Returns [`Transition::EnteredTimeout`] only on the tick that moves
    /// the monitor from `Live` to `Timeout`, so callers can act once per
    /// episode.
    pub fn evaluate(&mut self, now: Instant) -> Transition {
        let silent = now.saturating_duration_since(self.last_success) > self.timeout;
        match (self.state, silent) {
            (LivenessState::Live, true) => {
                self.state = LivenessState::Timeout;
                tracing::warn!(timeout = ?self.timeout, "no probe reply, entering timeout");
                Transition::EnteredTimeout
            }
            (LivenessState::Timeout, false) => {
                // Only reachable when the clock was restarted externally
                self.state = LivenessState::Live;
                Transition::None
            }
            _ => Transition::None,
        }
    }

    pub fn state(&self) -> LivenessState {
        self.state
    }

    pub fn is_timed_out(&self) -> bool {
        self.state == LivenessState::Timeout
    }

    pub fn last_success(&self) -> Instant {
        self.last_success
    }
}
