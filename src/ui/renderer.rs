//! Renderer implementations.

use std::io::Write;

use anyhow::Result;
use ratatui::{backend::Backend, Terminal};

use super::dashboard::Dashboard;
use super::Renderer;
use crate::data::Snapshot;

/// Draws the dashboard on a ratatui terminal.
///
/// Terminal setup and restore (raw mode, alternate screen) stay with the
/// caller; this only draws.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    dashboard: Dashboard,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>, dashboard: Dashboard) -> Self {
        Self {
            terminal,
            dashboard,
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        let dashboard = &self.dashboard;
        self.terminal.draw(|frame| dashboard.draw(frame, snapshot))?;
        Ok(())
    }
}

/// Writes each distinct snapshot as one line of JSON.
///
/// Consecutive identical snapshots are written once, so an idle probe
/// produces no output between samples.
#[derive(Debug)]
pub struct JsonLinesRenderer<W: Write> {
    writer: W,
    last: Option<Snapshot>,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last: None }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self.last.as_ref() == Some(snapshot) {
            return Ok(());
        }
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.last = Some(snapshot.clone());
        Ok(())
    }
}
