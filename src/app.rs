//! Application state and the monitoring event loop.
//!
//! One tick does, strictly in order:
//!
//! 1. drain every byte the probe has produced, feeding complete lines
//!    through the extractor into the metrics
//! 2. note a closed probe stream
//! 3. evaluate liveness, counting one lost send per timeout episode
//! 4. poll the keyboard once and dispatch a pending command
//! 5. hand a snapshot to the renderer
//!
//! The caller sleeps between ticks. Nothing here blocks or spawns threads.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::data::{
    ExtractResult, LivenessMonitor, MetricsEngine, SampleExtractor, Snapshot, Transition,
};
use crate::events::{Command, CommandInput};
use crate::ipinfo::IpInfoPanel;
use crate::source::ProbeSource;
use crate::ui::Renderer;

/// Size of the buffer used for each non-blocking read.
const READ_CHUNK: usize = 4096;
/// Reads per tick before yielding to input and rendering.
const MAX_READS_PER_TICK: usize = 256;

/// Main application state.
#[derive(Debug)]
pub struct App<S> {
    pub running: bool,

    source: S,
    probe_alive: bool,
    extractor: SampleExtractor,
    metrics: MetricsEngine,
    liveness: LivenessMonitor,
    ip_panel: IpInfoPanel,
    buf: Vec<u8>,
}

impl<S: ProbeSource> App<S> {
    /// Create an app reading from `source`, with `now` as the start of the
    /// first liveness window.
    pub fn new(source: S, now: Instant) -> Self {
        Self {
            running: true,
            source,
            probe_alive: true,
            extractor: SampleExtractor::new(),
            metrics: MetricsEngine::new(),
            liveness: LivenessMonitor::new(now),
            ip_panel: IpInfoPanel::disabled(),
            buf: vec![0; READ_CHUNK],
        }
    }

    /// Replace the default two second liveness window.
    pub fn with_liveness_timeout(mut self, timeout: Duration) -> Self {
        self.liveness = LivenessMonitor::with_timeout(self.liveness.last_success(), timeout);
        self
    }

    pub fn with_ip_panel(mut self, panel: IpInfoPanel) -> Self {
        self.ip_panel = panel;
        self
    }

    pub fn metrics(&self) -> &MetricsEngine {
        &self.metrics
    }

    pub fn liveness(&self) -> &LivenessMonitor {
        &self.liveness
    }

    pub fn probe_alive(&self) -> bool {
        self.probe_alive
    }

    /// Access the source, e.g. to stop a supervised process on shutdown.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Read everything the probe has produced so far and account for it.
    ///
    /// Returns the number of samples extracted.
    pub fn drain_probe(&mut self, now: Instant) -> usize {
        if !self.probe_alive {
            return 0;
        }

        let mut samples = 0;
        for _ in 0..MAX_READS_PER_TICK {
            match self.source.read_available(&mut self.buf) {
                Ok(0) => {
                    self.on_stream_closed(None);
                    break;
                }
                Ok(n) => {
                    for result in self.extractor.feed(&self.buf[..n]) {
                        match result {
                            ExtractResult::Sample(value) => {
                                self.metrics.on_sample(value);
                                self.liveness.mark_success(now);
                                samples += 1;
                            }
                            ExtractResult::NoMatch => self.metrics.on_no_match(),
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.on_stream_closed(Some(e));
                    break;
                }
            }
        }
        samples
    }

    fn on_stream_closed(&mut self, error: Option<io::Error>) {
        self.probe_alive = false;
        let status = self.source.exit_status();
        match (&error, status) {
            (Some(e), _) => warn!(source = self.source.description(), error = %e, "probe stream failed"),
            (None, Some(status)) if !status.success() => {
                warn!(source = self.source.description(), %status, "probe exited abnormally")
            }
            _ => info!(source = self.source.description(), "probe stream closed"),
        }
    }

    /// Evaluate liveness and count a lost send when a timeout begins.
    pub fn check_liveness(&mut self, now: Instant) {
        if self.liveness.evaluate(now) == Transition::EnteredTimeout && self.metrics.on_timeout() {
            debug!(sent = self.metrics.sent(), "counted unanswered send");
        }
    }

    /// Apply a keyboard command.
    pub fn handle_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::Quit => self.quit(),
            Command::Reset => {
                self.metrics.reset();
                self.liveness.reset(now);
                info!("statistics reset");
            }
            Command::ToggleIpInfo => self.ip_panel.toggle(),
        }
    }

    /// Whether the dashboard should show TIMEOUT.
    pub fn timed_out(&self) -> bool {
        self.liveness.is_timed_out() || !self.probe_alive
    }

    /// Capture the current state for rendering.
    pub fn snapshot(&mut self) -> Snapshot {
        let ip_info = self.ip_panel.view();
        Snapshot::capture(&self.metrics, self.timed_out(), self.probe_alive, ip_info)
    }

    /// Run one tick of the loop at time `now`.
    pub fn tick(
        &mut self,
        input: &mut impl CommandInput,
        renderer: &mut impl Renderer,
        now: Instant,
    ) -> Result<()> {
        self.drain_probe(now);
        self.check_liveness(now);

        if let Some(command) = input.poll_command()? {
            self.handle_command(command, now);
        }
        if !self.running {
            return Ok(());
        }

        renderer.render(&self.snapshot())
    }
}

/// Drive `app` until it quits or `stop` is raised, sleeping `tick` between
/// iterations.
///
/// `stop` is checked at the top of every tick, so an external termination
/// request takes effect within one tick and leaves through the same path as
/// a keyboard quit.
pub fn run<S, I, R>(
    app: &mut App<S>,
    input: &mut I,
    renderer: &mut R,
    tick: Duration,
    stop: &AtomicBool,
) -> Result<()>
where
    S: ProbeSource,
    I: CommandInput,
    R: Renderer,
{
    while app.running {
        if stop.load(Ordering::SeqCst) {
            info!("termination requested");
            app.quit();
            break;
        }

        app.tick(input, renderer, Instant::now())?;

        if app.running {
            thread::sleep(tick);
        }
    }
    Ok(())
}
