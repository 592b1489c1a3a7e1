//! System stats, one column per category.

use clusterdash_core::view::StatGroup;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::theme::{ACCENT, MUTED};

pub fn draw_stats(f: &mut ratatui::Frame<'_>, area: Rect, groups: Option<&[StatGroup]>) {
    let Some(groups) = groups.filter(|g| !g.is_empty()) else {
        f.render_widget(
            Paragraph::new("No system stats reported")
                .block(Block::default().borders(Borders::ALL).title("System Stats")),
            area,
        );
        return;
    };

    let n = groups.len() as u32;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..n).map(|_| Constraint::Ratio(1, n)).collect::<Vec<_>>())
        .split(area);

    for (group, slot) in groups.iter().zip(cols.iter()) {
        let lines: Vec<Line> = group
            .rows
            .iter()
            .flat_map(|(label, value)| {
                [
                    Line::from(Span::styled(label.clone(), Style::default().fg(MUTED))),
                    Line::from(Span::styled(
                        value.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                ]
            })
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                group.category.title(),
                Style::default().fg(ACCENT),
            ));
        f.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            *slot,
        );
    }
}
