//! Buckets table.

use clusterdash_core::types::BucketInfo;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::ui::theme::{usage_color, ACCENT};
use crate::ui::util::human;

const COLS: [Constraint; 8] = [
    Constraint::Percentage(20), // name
    Constraint::Length(10),     // type
    Constraint::Length(10),     // storage
    Constraint::Length(12),     // items
    Constraint::Length(10),     // mem
    Constraint::Length(10),     // disk
    Constraint::Length(8),      // quota
    Constraint::Length(10),     // ops
];

pub fn draw_buckets(f: &mut ratatui::Frame<'_>, area: Rect, buckets: Option<&[BucketInfo]>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Buckets ({})", buckets.map_or(0, <[BucketInfo]>::len)));
    let Some(buckets) = buckets.filter(|b| !b.is_empty()) else {
        f.render_widget(Paragraph::new("No buckets").block(block), area);
        return;
    };

    let rows = buckets.iter().map(|b| {
        let quota = b.quota_percent_used.clamp(0.0, 100.0);
        Row::new(vec![
            Cell::from(b.name.clone()),
            Cell::from(b.bucket_type.clone()),
            Cell::from(b.storage_backend.clone()),
            Cell::from(b.item_count.to_string()),
            Cell::from(human(b.mem_used)),
            Cell::from(human(b.disk_used)),
            Cell::from(format!("{quota:.1}%"))
                .style(Style::default().fg(usage_color(quota.round() as u16))),
            Cell::from(format!("{:.0}", b.ops_per_sec)),
        ])
    });
    let header = Row::new(vec![
        "Name", "Type", "Storage", "Items", "Memory", "Disk", "Quota", "Ops/s",
    ])
    .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1)
        .block(block);
    f.render_widget(table, area);
}
