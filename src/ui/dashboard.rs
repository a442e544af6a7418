//! The single-screen ping dashboard.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::common;
use super::theme::Theme;
use crate::data::{classify, Snapshot, Thresholds};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 50;
pub const MIN_HEIGHT: u16 = 15;

/// Cells in each score bar.
const BAR_LEN: usize = 20;
/// Label column width of the metric lines.
const LABEL_WIDTH: usize = 11;
/// Right-aligned value column width of the metric lines.
const VALUE_WIDTH: usize = 10;

const EMPTY_SLOT: &str = "·";
const FILLED: &str = "█";
const UNFILLED: &str = "░";

/// Static context for drawing snapshots: what is pinged, how latencies
/// are classified, and the colours to use.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub target: String,
    pub thresholds: Thresholds,
    pub theme: Theme,
}

impl Dashboard {
    pub fn new(target: impl Into<String>, thresholds: Thresholds, theme: Theme) -> Self {
        Self {
            target: target.into(),
            thresholds,
            theme,
        }
    }

    /// Draw one frame for `snapshot`.
    pub fn draw(&self, frame: &mut Frame, snapshot: &Snapshot) {
        let area = frame.area();
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            common::render_too_small(frame, self, (MIN_WIDTH, MIN_HEIGHT));
            return;
        }

        let rows = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Keys
            Constraint::Length(1), // Rule
            Constraint::Length(1), // IP info
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Quality & stability
            Constraint::Length(1), // History
            Constraint::Length(1), // Spacer
            Constraint::Length(5), // Metrics
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Footer
            Constraint::Min(0),
        ])
        .split(area);

        common::render_header(frame, self, snapshot, rows[0]);
        common::render_keys(frame, self, rows[1]);
        common::render_rule(frame, self, rows[2]);
        common::render_ip_info(frame, self, snapshot, rows[3]);
        frame.render_widget(Paragraph::new(self.scores_line(snapshot)), rows[5]);
        frame.render_widget(
            Paragraph::new(self.history_line(snapshot, rows[6].width as usize)),
            rows[6],
        );
        frame.render_widget(Paragraph::new(self.metric_lines(snapshot)), rows[8]);
        common::render_footer(frame, self, rows[10]);
    }

    /// `Quality: ████░░ | Stability: ██████ 95%`
    pub fn scores_line(&self, snapshot: &Snapshot) -> Line<'static> {
        let theme = &self.theme;
        let mut spans = vec![Span::styled(" Quality: ", theme.label)];
        spans.extend(bar(
            snapshot.quality,
            BAR_LEN,
            theme.band_style(snapshot.quality_band()),
        ));
        spans.push(Span::styled(" | ", theme.text_style()));
        spans.push(Span::styled("Stability: ", theme.label));
        spans.extend(bar(
            snapshot.stability,
            BAR_LEN,
            theme.band_style(snapshot.stability_band()),
        ));
        spans.push(Span::styled(
            format!(" {:.0}%", snapshot.stability),
            theme.band_style(snapshot.stability_band()),
        ));
        Line::from(spans)
    }

    /// One cell per history slot, oldest to newest, then the newest value.
    ///
    /// When narrower than the history, the oldest slots are dropped.
    pub fn history_line(&self, snapshot: &Snapshot, width: usize) -> Line<'static> {
        let theme = &self.theme;
        let label = " History: ";
        let suffix_width = 8;
        let room = width.saturating_sub(label.len() + suffix_width);
        let skip = snapshot.history.len().saturating_sub(room);

        let mut spans = vec![Span::styled(label, theme.label)];
        spans.extend(snapshot.history.iter().skip(skip).map(|&value| {
            if value > 0.0 {
                Span::styled(FILLED, self.level_style(value))
            } else {
                Span::styled(EMPTY_SLOT, theme.text_style())
            }
        }));
        if let Some(latest) = snapshot.latest_history() {
            spans.push(Span::styled(
                format!(" {:.0}ms", latest),
                self.level_style(latest),
            ));
        }
        Line::from(spans)
    }

    /// Last, Avg, Loss, Status and Sent/Recv readouts.
    pub fn metric_lines(&self, snapshot: &Snapshot) -> Vec<Line<'static>> {
        let theme = &self.theme;
        vec![
            self.metric_line(
                "Last:",
                format!("{:.1} ms", snapshot.last),
                theme.level_style(snapshot.last_level(&self.thresholds)),
            ),
            self.metric_line(
                "Avg :",
                format!("{:.1} ms", snapshot.average),
                theme.level_style(snapshot.average_level(&self.thresholds)),
            ),
            self.metric_line(
                "Loss:",
                format!("{:.2} %", snapshot.loss_percent),
                theme.level_style(snapshot.loss_level()),
            ),
            self.metric_line(
                "Status:",
                snapshot.status_label().to_string(),
                theme.status_style(snapshot.timeout),
            ),
            self.metric_line(
                "Sent/Recv:",
                format!("{}/{}", snapshot.sent, snapshot.received),
                theme.text_style(),
            ),
        ]
    }

    fn metric_line(&self, label: &str, value: String, style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!(" {:<width$}", label, width = LABEL_WIDTH), self.theme.label),
            Span::styled(format!("{:>width$}", value, width = VALUE_WIDTH), style),
        ])
    }

    fn level_style(&self, value: f64) -> Style {
        self.theme.level_style(classify(
            value,
            self.thresholds.warn(),
            self.thresholds.crit(),
        ))
    }
}

/// Number of filled cells for a 0-100 score on a bar of `len` cells,
/// rounded to nearest.
pub fn bar_cells(percent: f64, len: usize) -> usize {
    let filled = (percent / 100.0 * len as f64 + 0.5).floor();
    if filled.is_nan() || filled <= 0.0 {
        0
    } else {
        (filled as usize).min(len)
    }
}

fn bar(percent: f64, len: usize, style: Style) -> [Span<'static>; 2] {
    let filled = bar_cells(percent, len);
    [
        Span::styled(FILLED.repeat(filled), style),
        Span::styled(UNFILLED.repeat(len - filled), style),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    use crate::data::{Level, MetricsEngine};
    use crate::ipinfo::{IpInfo, IpInfoView};

    fn dashboard() -> Dashboard {
        Dashboard::new("8.8.8.8", Thresholds::default(), Theme::dark())
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(snapshot: &Snapshot, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let dashboard = dashboard();
        terminal.draw(|frame| dashboard.draw(frame, snapshot)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn snapshot_with(samples: &[f64]) -> Snapshot {
        let mut metrics = MetricsEngine::new();
        for &v in samples {
            metrics.on_sample(v);
        }
        Snapshot::capture(&metrics, false, true, None)
    }

    #[test]
    fn test_bar_cells_rounding() {
        assert_eq!(bar_cells(0.0, 20), 0);
        assert_eq!(bar_cells(100.0, 20), 20);
        assert_eq!(bar_cells(72.0, 20), 14);
        // 2.5% of 20 is half a cell, rounds up
        assert_eq!(bar_cells(2.5, 20), 1);
        assert_eq!(bar_cells(2.4, 20), 0);
        assert_eq!(bar_cells(150.0, 20), 20);
        assert_eq!(bar_cells(-10.0, 20), 0);
    }

    #[test]
    fn test_history_line_empty_slots() {
        let text = line_text(&dashboard().history_line(&Snapshot::default(), 80));
        assert_eq!(text, format!(" History: {}", "·".repeat(40)));
    }

    #[test]
    fn test_history_line_colours_by_level() {
        let dashboard = dashboard();
        let line = dashboard.history_line(&snapshot_with(&[10.0, 45.0, 70.0]), 80);

        // label, 37 empty slots, 3 samples, newest value
        assert_eq!(line.spans.len(), 1 + 40 + 1);
        let samples = &line.spans[38..41];
        assert_eq!(samples[0].style, dashboard.theme.level_style(Level::Normal));
        assert_eq!(samples[1].style, dashboard.theme.level_style(Level::Warn));
        assert_eq!(samples[2].style, dashboard.theme.level_style(Level::Crit));
        assert_eq!(line.spans[41].content, " 70ms");
    }

    #[test]
    fn test_history_line_narrow_keeps_newest() {
        let samples: Vec<f64> = (1..=40).map(f64::from).collect();
        let line = dashboard().history_line(&snapshot_with(&samples), 28);
        // 28 - label(10) - suffix(8) leaves ten slots
        assert_eq!(line.spans.len(), 1 + 10 + 1);
        assert_eq!(line.spans[11].content, " 40ms");
    }

    #[test]
    fn test_metric_lines() {
        let mut metrics = MetricsEngine::new();
        metrics.on_sample(12.34);
        metrics.on_sample(40.0);
        metrics.on_timeout();
        let snapshot = Snapshot::capture(&metrics, true, true, None);

        let dashboard = dashboard();
        let lines: Vec<String> = dashboard.metric_lines(&snapshot).iter().map(line_text).collect();
        assert_eq!(lines[0], " Last:         40.0 ms");
        assert_eq!(lines[1], " Avg :         26.2 ms");
        assert_eq!(lines[2], " Loss:         33.33 %");
        assert_eq!(lines[3], " Status:       TIMEOUT");
        assert_eq!(lines[4], " Sent/Recv:        3/2");

        let styles = dashboard.metric_lines(&snapshot);
        assert_eq!(styles[2].spans[1].style, dashboard.theme.level_style(Level::Warn));
        assert_eq!(styles[3].spans[1].style, dashboard.theme.status_style(true));
    }

    #[test]
    fn test_scores_line() {
        let snapshot = snapshot_with(&[5.0]);
        let text = line_text(&dashboard().scores_line(&snapshot));
        assert_eq!(
            text,
            format!(" Quality: {} | Stability: {} 100%", "█".repeat(20), "█".repeat(20))
        );
    }

    #[test]
    fn test_full_frame() {
        let mut snapshot = snapshot_with(&[14.0, 16.0]);
        snapshot.ip_info = Some(IpInfoView::Ready(IpInfo {
            ip: "203.0.113.7".to_string(),
            isp: "Example Net".to_string(),
            location: "Germany".to_string(),
        }));

        let text = render(&snapshot, 80, 20);
        assert!(text.contains("PINGWATCH"));
        assert!(text.contains("Target: 8.8.8.8"));
        assert!(text.contains("WARN 30 ms | CRIT 60 ms"));
        assert!(text.contains("Keys: q=quit  r=reset  m=myIP"));
        assert!(text.contains("MyIP: 203.0.113.7 | ISP: Example Net | Location: Germany"));
        assert!(text.contains("Status:"));
        assert!(text.contains("OK"));
        assert!(text.contains("2/2"));
        assert!(text.contains(" 16ms"));
    }

    #[test]
    fn test_loading_ip_info() {
        let mut snapshot = Snapshot::default();
        snapshot.ip_info = Some(IpInfoView::Loading);
        let text = render(&snapshot, 80, 20);
        assert!(text.contains("MyIP: looking up..."));
    }

    #[test]
    fn test_dead_probe_flagged() {
        let snapshot = Snapshot::capture(&MetricsEngine::new(), true, false, None);
        let text = render(&snapshot, 80, 20);
        assert!(text.contains("probe exited"));
        assert!(text.contains("TIMEOUT"));
    }

    #[test]
    fn test_too_small() {
        let text = render(&Snapshot::default(), 40, 10);
        assert!(text.contains("Terminal too small: 40x10"));
        assert!(!text.contains("PINGWATCH"));
    }
}
