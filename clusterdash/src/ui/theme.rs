//! Shared UI theme constants.

use clusterdash_core::Health;
use ratatui::style::Color;

pub const ACCENT: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const BANNER: Color = Color::Red;

/// Line colours, cycled per dataset.
pub const SERIES: [Color; 5] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
];

pub fn health_color(h: Health) -> Color {
    match h {
        Health::Healthy => Color::Green,
        Health::Unhealthy => Color::Red,
        Health::NotMonitored => Color::Gray,
    }
}

/// Green below 70%, yellow below 90%, red above.
pub fn usage_color(pct: u16) -> Color {
    if pct < 70 {
        Color::Green
    } else if pct < 90 {
        Color::Yellow
    } else {
        Color::Red
    }
}
