//! Theme configuration for the dashboard.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{Level, ScoreBand};

/// Color and style theme for the dashboard.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for the title and the IP info values.
    pub highlight: Color,
    /// Latency at or above the warning threshold; any packet loss.
    pub warning: Color,
    /// Latency at or above the critical threshold; timeouts.
    pub critical: Color,
    /// Normal latency, good scores, `OK` status.
    pub healthy: Color,
    /// Scores in the poor band, between warning and critical.
    pub poor: Color,
    /// Plain text such as labels and counts.
    pub text: Color,
    pub border: Color,
    /// Style for labels in front of values.
    pub label: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Magenta,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            poor: Color::Rgb(255, 165, 0),
            text: Color::White,
            border: Color::Gray,
            label: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Magenta,
            warning: Color::Rgb(176, 128, 0),
            critical: Color::Red,
            healthy: Color::Green,
            poor: Color::Rgb(204, 102, 0),
            text: Color::Black,
            border: Color::DarkGray,
            label: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a latency classification
    pub fn level_style(&self, level: Level) -> Style {
        match level {
            Level::Normal => Style::default().fg(self.healthy),
            Level::Warn => Style::default().fg(self.warning),
            Level::Crit => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for a quality or stability band
    pub fn band_style(&self, band: ScoreBand) -> Style {
        let color = match band {
            ScoreBand::Good => self.healthy,
            ScoreBand::Fair => self.warning,
            ScoreBand::Poor => self.poor,
            ScoreBand::Bad => self.critical,
        };
        Style::default().fg(color)
    }

    pub fn status_style(&self, timeout: bool) -> Style {
        if timeout {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.healthy)
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }
}
