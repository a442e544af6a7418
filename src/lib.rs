//! # pingwatch
//!
//! A live latency dashboard and library for supervising a `ping` probe.
//!
//! pingwatch launches the system `ping` against a target, reads its output
//! without blocking, extracts one round-trip time per reply line, and keeps
//! running statistics: last and average latency, packet loss, a 0-100
//! quality score, a 0-100 stability score and a 40-slot history. When the
//! probe goes silent for more than two seconds the state flips to TIMEOUT
//! and the silence counts as one lost packet.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           Event loop                           │
//! │  ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌────────────┐   │
//! │  │  source  │──▶│  extract  │──▶│ metrics │──▶│  Snapshot  │   │
//! │  │ (probe)  │   │  (lines)  │   │         │   └─────┬──────┘   │
//! │  └──────────┘   └───────────┘   └────▲────┘         │          │
//! │                                      │              ▼          │
//! │  ┌──────────┐   ┌───────────┐        │        ┌──────────┐     │
//! │  │  events  │──▶│    app    │────────┘        │    ui    │     │
//! │  │  (keys)  │   │  (tick)   │◀── liveness     │(renderer)│     │
//! │  └──────────┘   └───────────┘                 └──────────┘     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: [`App`] state and the tick-driven [`run`](app::run) loop
//! - **[`source`]**: the [`ProbeSource`] trait, with the process-backed
//!   [`ProcessSupervisor`] and the in-memory [`ChannelSource`]
//! - **[`data`]**: line extraction, metrics, liveness and the [`Snapshot`]
//!   handed to renderers
//! - **[`events`]**: keyboard commands
//! - **[`ui`]**: the ratatui dashboard and a JSON-lines renderer
//! - **[`config`]**, **[`logging`]**, **[`shutdown`]**: runtime plumbing for
//!   the binary
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Ping 8.8.8.8, warn at 30 ms, critical at 60 ms
//! pingwatch
//!
//! # Custom thresholds and target
//! pingwatch 20 50 1.1.1.1
//!
//! # Headless, one JSON object per changed snapshot
//! pingwatch --json 20 50 1.1.1.1
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::time::Instant;
//! use pingwatch::{App, ChannelSource, Renderer, Snapshot};
//! use pingwatch::events::NoInput;
//!
//! struct Print;
//!
//! impl Renderer for Print {
//!     fn render(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
//!         println!("{} ms, {}/{}", snapshot.last, snapshot.received, snapshot.sent);
//!         Ok(())
//!     }
//! }
//!
//! let (tx, source) = ChannelSource::create("replay");
//! tx.send(b"64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=9.84 ms\n".to_vec()).unwrap();
//!
//! let mut app = App::new(source, Instant::now());
//! app.tick(&mut NoInput, &mut Print, Instant::now()).unwrap();
//! assert_eq!(app.metrics().received(), 1);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod ipinfo;
pub mod logging;
pub mod shutdown;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    ExtractResult, LivenessMonitor, MetricsEngine, SampleExtractor, Snapshot, Thresholds,
};
pub use error::ProbeError;
pub use source::{ChannelSource, ProbeCommand, ProbeSource, ProcessSupervisor};
pub use ui::Renderer;
