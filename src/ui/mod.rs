//! Snapshot rendering.
//!
//! The event loop hands every tick's [`Snapshot`] to a [`Renderer`]. Two
//! are provided:
//!
//! - [`TerminalRenderer`]: the interactive ratatui dashboard
//! - [`JsonLinesRenderer`]: one JSON object per changed snapshot, for
//!   headless runs and piping into other tools
//!
//! ## Dashboard layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ ● PINGWATCH │ Target: 8.8.8.8 │ WARN 30 ms | CRIT 60 ms │  common::render_header
//! │ Keys: q=quit  r=reset  m=myIP                          │  common::render_keys
//! │ ────────────────────────────────────────────────────── │
//! │ MyIP: 203.0.113.7 | ISP: ... | Location: ...           │  common::render_ip_info
//! │                                                        │
//! │ Quality: ██████░░ | Stability: ████████ 100%           │  Dashboard::scores_line
//! │ History: ·····███████ 14ms                             │  Dashboard::history_line
//! │                                                        │
//! │ Last:  / Avg : / Loss: / Status: / Sent/Recv:          │  Dashboard::metric_lines
//! │                                                        │
//! │ usage: pingwatch [WARN_MS] [CRIT_MS] [TARGET]          │  common::render_footer
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod common;
pub mod dashboard;
pub mod renderer;
pub mod theme;

pub use dashboard::Dashboard;
pub use renderer::{JsonLinesRenderer, TerminalRenderer};
pub use theme::Theme;

use anyhow::Result;

use crate::data::Snapshot;

/// Presents snapshots to the user.
///
/// Called once per tick from the event loop thread. Implementations must
/// not block for long; an error ends the loop.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;
}
