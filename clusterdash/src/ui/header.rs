//! Top header line and the transient transport-error banner.

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::theme::BANNER;

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    endpoint: &str,
    clusters: usize,
    last_updated: Option<DateTime<Local>>,
) {
    let updated = last_updated
        .map(|t| format!("last updated {}", t.format("%H:%M:%S")))
        .unwrap_or_else(|| "waiting for first poll".into());
    let title = format!(
        "clusterdash | {endpoint} | {clusters} cluster(s) | {updated}  \
         (q quit, Up/Down cluster, 1-4/Tab tab, [ ] bucket, l log scale)"
    );
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}

pub fn draw_banner(f: &mut ratatui::Frame<'_>, area: Rect, message: &str) {
    let line = Line::from(vec![
        Span::styled(
            " connection problem ",
            Style::default()
                .fg(Color::White)
                .bg(BANNER)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(message.to_string(), Style::default().fg(BANNER)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
