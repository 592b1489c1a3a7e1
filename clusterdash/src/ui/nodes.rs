//! Nodes table.

use clusterdash_core::types::NodeInfo;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::ui::theme::{usage_color, ACCENT};
use crate::ui::util::{human, percent};

const COLS: [Constraint; 5] = [
    Constraint::Percentage(30), // hostname
    Constraint::Length(10),     // status
    Constraint::Percentage(30), // services
    Constraint::Length(8),      // cpu
    Constraint::Length(22),     // memory
];

fn status_color(status: &str) -> Color {
    match status {
        "healthy" => Color::Green,
        "warmup" => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn draw_nodes(f: &mut ratatui::Frame<'_>, area: Rect, nodes: Option<&[NodeInfo]>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Nodes ({})", nodes.map_or(0, <[NodeInfo]>::len)));
    let Some(nodes) = nodes.filter(|n| !n.is_empty()) else {
        f.render_widget(Paragraph::new("No nodes reported").block(block), area);
        return;
    };

    let rows = nodes.iter().map(|n| {
        let used = (n.memory_total - n.memory_free).max(0.0);
        let mem_pct = percent(used, n.memory_total);
        Row::new(vec![
            Cell::from(n.hostname.clone()),
            Cell::from(n.status.clone()).style(Style::default().fg(status_color(&n.status))),
            Cell::from(n.services.join(", ")),
            Cell::from(format!("{:>5.1}%", n.cpu_utilization)),
            Cell::from(format!("{} / {}", human(used), human(n.memory_total)))
                .style(Style::default().fg(usage_color(mem_pct))),
        ])
    });
    let header = Row::new(vec!["Hostname", "Status", "Services", "CPU", "Memory"])
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1)
        .block(block);
    f.render_widget(table, area);
}
