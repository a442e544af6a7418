//! Header, IP info line and footer shared by every frame.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::dashboard::Dashboard;
use crate::data::Snapshot;
use crate::ipinfo::IpInfoView;

/// Title, target and thresholds, with a probe-state indicator.
pub fn render_header(frame: &mut Frame, dashboard: &Dashboard, snapshot: &Snapshot, area: Rect) {
    let theme = &dashboard.theme;
    let indicator = if snapshot.probe_alive {
        Span::styled(" ● ", theme.status_style(snapshot.timeout))
    } else {
        Span::styled(" ✕ ", theme.status_style(true))
    };

    let mut spans = vec![
        indicator,
        Span::styled("PINGWATCH ", theme.label.fg(theme.highlight)),
        Span::styled("│ ", Style::default().fg(theme.border)),
        Span::styled("Target: ", theme.label),
        Span::styled(dashboard.target.clone(), theme.text_style()),
        Span::styled(" │ ", Style::default().fg(theme.border)),
        Span::styled(
            format!(
                "WARN {:.0} ms | CRIT {:.0} ms",
                dashboard.thresholds.warn(),
                dashboard.thresholds.crit()
            ),
            theme.text_style(),
        ),
    ];
    if !snapshot.probe_alive {
        spans.push(Span::styled(
            " │ probe exited",
            theme.status_style(true),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The IP info panel as a single line. Empty while hidden.
pub fn render_ip_info(frame: &mut Frame, dashboard: &Dashboard, snapshot: &Snapshot, area: Rect) {
    let Some(ref view) = snapshot.ip_info else {
        return;
    };
    let theme = &dashboard.theme;
    let value = Style::default().fg(theme.highlight);

    let line = match view {
        IpInfoView::Loading => Line::from(vec![
            Span::styled(" MyIP: ", theme.label),
            Span::styled("looking up...", value.add_modifier(Modifier::DIM)),
        ]),
        IpInfoView::Ready(info) => Line::from(vec![
            Span::styled(" MyIP: ", theme.label),
            Span::styled(info.ip.clone(), value),
            Span::styled(" | ISP: ", theme.label),
            Span::styled(info.isp.clone(), value),
            Span::styled(" | Location: ", theme.label),
            Span::styled(info.location.clone(), value),
        ]),
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Key help line.
pub fn render_keys(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let paragraph = Paragraph::new(" Keys: q=quit  r=reset  m=myIP")
        .style(dashboard.theme.text_style().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Horizontal rule across `area`.
pub fn render_rule(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let rule = "─".repeat(area.width as usize);
    frame.render_widget(
        Paragraph::new(rule).style(Style::default().fg(dashboard.theme.border)),
        area,
    );
}

/// Usage hint at the bottom.
pub fn render_footer(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let footer = " usage: pingwatch [WARN_MS] [CRIT_MS] [TARGET]";
    frame.render_widget(
        Paragraph::new(footer).style(dashboard.theme.text_style().add_modifier(Modifier::DIM)),
        area,
    );
}

/// Shown instead of the dashboard when the terminal is too small.
pub fn render_too_small(frame: &mut Frame, dashboard: &Dashboard, min: (u16, u16)) {
    let area = frame.area();
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, min.0, min.1
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(dashboard.theme.warning));
    let height = 5.min(area.height);
    let centered = Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height);
    frame.render_widget(paragraph, centered);
}
