//! Left-hand cluster list, in display order, with a health marker each.

use clusterdash_core::{ClusterId, WidgetData, WidgetId, WidgetKey};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::surface::TuiSurface;
use crate::ui::theme::{health_color, ACCENT, MUTED};
use crate::ui::util::truncate_middle;

pub fn draw_cluster_list(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    surface: &TuiSurface,
    focused: Option<&ClusterId>,
) {
    let width = area.width.saturating_sub(6) as usize;
    let lines: Vec<Line> = surface
        .order()
        .iter()
        .map(|id| {
            let key = WidgetKey::new(id.clone(), WidgetId::HealthBadge);
            let (title, marker) = match surface.data(&key) {
                Some(WidgetData::Health { title, health, .. }) => (
                    title.clone(),
                    Span::styled("● ", Style::default().fg(health_color(*health))),
                ),
                _ => (id.to_string(), Span::styled("○ ", Style::default().fg(MUTED))),
            };
            let style = if focused == Some(id) {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let pointer = if focused == Some(id) { "> " } else { "  " };
            Line::from(vec![
                Span::styled(pointer, style),
                marker,
                Span::styled(truncate_middle(&title, width), style),
            ])
        })
        .collect();
    let para = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Clusters"));
    f.render_widget(para, area);
}
