//! Cluster header badges and the tab bar.

use clusterdash_core::{Health, Tab, WidgetData};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs},
};

use crate::ui::theme::{health_color, usage_color, ACCENT, MUTED};
use crate::ui::util::{human, percent};

/// Title, host and health on the first line; memory and disk gauges below.
pub fn draw_badges(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    health: Option<&WidgetData>,
    capacity: Option<&WidgetData>,
) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    if let Some(WidgetData::Health {
        title,
        host,
        health,
        error,
    }) = health
    {
        let mut spans = vec![
            Span::styled(title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {host}  "), Style::default().fg(MUTED)),
            Span::styled(
                format!("[{}]", health.label()),
                Style::default().fg(health_color(*health)),
            ),
        ];
        if let Some(err) = error.as_deref().filter(|e| !e.is_empty()) {
            spans.push(Span::styled(
                format!("  {err}"),
                Style::default().fg(health_color(Health::Unhealthy)),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), rows[0]);
    }

    if let Some(WidgetData::Capacity { memory, disk }) = capacity {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        let mem_pct = percent(memory.used, memory.total);
        let disk_pct = percent(disk.used, disk.total);
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(usage_color(mem_pct)))
                .percent(mem_pct)
                .label(format!(
                    "Memory {} / {}",
                    human(memory.used),
                    human(memory.total)
                )),
            cols[0],
        );
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(usage_color(disk_pct)))
                .percent(disk_pct)
                .label(format!("Disk {} / {}", human(disk.used), human(disk.total))),
            cols[1],
        );
    }
}

pub fn draw_tab_bar(f: &mut ratatui::Frame<'_>, area: Rect, visible: Tab) {
    let titles: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t.title()))
        .collect();
    let selected = Tab::ALL.iter().position(|t| *t == visible).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}
