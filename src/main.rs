use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use pingwatch::app::{self, App};
use pingwatch::config::{Overrides, Settings};
use pingwatch::events::{NoInput, TerminalInput};
use pingwatch::ipinfo::IpInfoPanel;
use pingwatch::ui::{Dashboard, JsonLinesRenderer, TerminalRenderer, Theme};
use pingwatch::{logging, shutdown, ProcessSupervisor};

/// Raw mode and the alternate screen are active and need restoring.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "pingwatch", version)]
#[command(about = "Live ping dashboard with latency, loss, quality and stability")]
struct Args {
    /// Warning threshold in milliseconds (default 30)
    warn: Option<String>,

    /// Critical threshold in milliseconds, above WARN (default 60)
    crit: Option<String>,

    /// IP address to ping (default 8.8.8.8)
    target: Option<String>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs to this file (filtered by RUST_LOG, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Probe program to run instead of `ping`
    #[arg(long)]
    probe: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print snapshots as JSON lines instead of drawing the dashboard
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            warn: self.warn.as_deref().map(parse_lenient),
            crit: self.crit.as_deref().map(parse_lenient),
            target: self.target.clone(),
            tick_ms: self.tick_ms,
            probe_program: self.probe.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

/// Unparsable numbers become NaN and are corrected like any other invalid
/// threshold.
fn parse_lenient(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    let _log_guard = settings
        .log_file
        .as_deref()
        .map(logging::init_file_logging)
        .transpose()?;

    let thresholds = settings.thresholds();
    let target = settings.target().to_string();
    let command = settings.probe_command();
    info!(
        probe = %command.display(&target),
        warn = thresholds.warn(),
        crit = thresholds.crit(),
        tick = ?settings.tick(),
        "starting"
    );

    // Background runtime for signal handling and the IP lookup
    let rt = tokio::runtime::Runtime::new()?;
    let stop = Arc::new(AtomicBool::new(false));
    shutdown::spawn_signal_watcher(rt.handle(), stop.clone())
        .context("failed to install signal handlers")?;

    let mut supervisor = ProcessSupervisor::new(command);
    supervisor.start(&target)?;

    let mut app = App::new(supervisor, Instant::now())
        .with_liveness_timeout(settings.timeout())
        .with_ip_panel(IpInfoPanel::new(rt.handle().clone()));

    let result = if args.json {
        run_headless(&mut app, settings.tick(), &stop)
    } else {
        let dashboard = Dashboard::new(target, thresholds, Theme::auto_detect());
        run_dashboard(&mut app, dashboard, settings.tick(), &stop)
    };

    teardown(&mut app);

    // A pending IP lookup must not hold up the exit
    rt.shutdown_background();

    result
}

/// Run the interactive dashboard on the alternate screen.
fn run_dashboard(
    app: &mut App<ProcessSupervisor>,
    dashboard: Dashboard,
    tick: Duration,
    stop: &AtomicBool,
) -> Result<()> {
    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        restore_terminal();
        original_hook(panic);
    }));

    enable_raw_mode()?;
    TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut renderer = TerminalRenderer::new(terminal, dashboard);
    app::run(app, &mut TerminalInput::new(), &mut renderer, tick, stop)
}

/// Run without a terminal UI, writing JSON lines to stdout until a
/// termination signal arrives.
fn run_headless(app: &mut App<ProcessSupervisor>, tick: Duration, stop: &AtomicBool) -> Result<()> {
    let mut renderer = JsonLinesRenderer::new(io::stdout().lock());
    app::run(app, &mut NoInput, &mut renderer, tick, stop)
}

/// Stop the probe, then give the terminal back. Safe to call repeatedly.
fn teardown(app: &mut App<ProcessSupervisor>) {
    app.source_mut().stop();
    restore_terminal();
}

fn restore_terminal() {
    if !TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}
