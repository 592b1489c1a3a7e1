//! Charts tab: bucket header plus a two-column grid of line charts.
//!
//! Holes in a series split its line into separate segments. Series on the
//! right axis are rescaled into the left axis range, and their own range is
//! shown in the chart title.

use clusterdash_core::charts::Axis as Side;
use clusterdash_core::view::{BucketHeader, SeriesBundle};
use clusterdash_core::{ChartKind, ChartScale, ClusterId, WidgetData, WidgetId, WidgetKey};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::surface::TuiSurface;
use crate::ui::theme::{ACCENT, MUTED, SERIES};
use crate::ui::util::short_number;

pub const CHART_HEIGHT: u16 = 12;
pub const GRID_COLUMNS: usize = 2;

/// Rows of charts in the grid.
pub fn grid_rows() -> usize {
    ChartKind::ALL.len().div_ceil(GRID_COLUMNS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub label: &'static str,
    pub color: Color,
    pub segments: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub lines: Vec<PlotLine>,
    pub x_max: f64,
    pub y_bounds: [f64; 2],
    /// Original range of the right-axis series, when there are any.
    pub right_bounds: Option<[f64; 2]>,
}

fn scaled(v: f64, scale: ChartScale) -> Option<f64> {
    match scale {
        ChartScale::Linear => Some(v),
        ChartScale::Logarithmic if v > 0.0 => Some(v.log10()),
        ChartScale::Logarithmic => None,
    }
}

/// Contiguous runs of present values as `(x, y)` points.
pub fn segments(values: &[Option<f64>], scale: ChartScale) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut run: Vec<(f64, f64)> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v.and_then(|v| scaled(v, scale)) {
            Some(y) => run.push((i as f64, y)),
            None if !run.is_empty() => out.push(std::mem::take(&mut run)),
            None => {}
        }
    }
    if !run.is_empty() {
        out.push(run);
    }
    out
}

fn bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<[f64; 2]> {
    let (lo, hi) = points.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
        (lo.min(*y), hi.max(*y))
    });
    if !lo.is_finite() {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        return Some([lo - 1.0, hi + 1.0]);
    }
    Some([lo, hi])
}

/// Lay a bundle out for plotting under `scale`.
pub fn plot(bundle: &SeriesBundle, scale: ChartScale) -> Plot {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (i, ds) in bundle.datasets.iter().enumerate() {
        let line = PlotLine {
            label: ds.label,
            color: SERIES[i % SERIES.len()],
            segments: segments(&ds.series.values, scale),
        };
        match ds.axis {
            Side::Left => left.push(line),
            Side::Right => right.push(line),
        }
    }

    let all = |lines: &[PlotLine]| -> Option<[f64; 2]> {
        bounds(lines.iter().flat_map(|l| l.segments.iter().flatten()))
    };
    let left_bounds = all(&left);
    let right_bounds = all(&right);
    let y_bounds = left_bounds.or(right_bounds).unwrap_or([0.0, 1.0]);

    if let (Some(_), Some([rlo, rhi])) = (left_bounds, right_bounds) {
        let [llo, lhi] = y_bounds;
        for line in &mut right {
            for seg in &mut line.segments {
                for p in seg.iter_mut() {
                    p.1 = llo + (p.1 - rlo) / (rhi - rlo) * (lhi - llo);
                }
            }
        }
    }

    left.extend(right);
    Plot {
        lines: left,
        x_max: bundle.labels.len().saturating_sub(1).max(1) as f64,
        y_bounds,
        right_bounds,
    }
}

fn tick(v: f64, scale: ChartScale) -> String {
    match scale {
        ChartScale::Linear => short_number(v),
        ChartScale::Logarithmic => short_number(10f64.powf(v)),
    }
}

fn left_unit(bundle: &SeriesBundle) -> &'static str {
    bundle
        .datasets
        .iter()
        .find(|d| d.axis == Side::Left)
        .map(|d| d.series.unit.suffix())
        .unwrap_or("")
}

pub fn draw_chart(f: &mut ratatui::Frame<'_>, area: Rect, bundle: &SeriesBundle, scale: ChartScale) {
    let mut title = bundle.title.to_string();
    if scale == ChartScale::Logarithmic {
        title.push_str(" (log)");
    }
    if !bundle.has_data() {
        f.render_widget(
            Paragraph::new(Span::styled("no data", Style::default().fg(MUTED)))
                .block(Block::default().borders(Borders::ALL).title(title)),
            area,
        );
        return;
    }

    let plot = plot(bundle, scale);
    if let (Some(label), Some([lo, hi])) = (bundle.right_axis, plot.right_bounds) {
        title.push_str(&format!(
            " | {label}: {}..{}",
            tick(lo, scale),
            tick(hi, scale)
        ));
    }

    let mut datasets = Vec::new();
    for line in &plot.lines {
        for (j, seg) in line.segments.iter().enumerate() {
            let kind = if seg.len() == 1 {
                GraphType::Scatter
            } else {
                GraphType::Line
            };
            let mut ds = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(kind)
                .style(Style::default().fg(line.color))
                .data(seg);
            if j == 0 {
                ds = ds.name(line.label);
            }
            datasets.push(ds);
        }
    }

    let first = bundle.labels.first().cloned().unwrap_or_default();
    let last = bundle.labels.last().cloned().unwrap_or_default();
    let [lo, hi] = plot.y_bounds;
    let unit = left_unit(bundle);
    let y_title = if unit.is_empty() {
        bundle.left_axis.to_string()
    } else {
        format!("{} ({unit})", bundle.left_axis)
    };

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .bounds([0.0, plot.x_max])
                .labels(vec![Span::raw(first), Span::raw(last)])
                .style(Style::default().fg(MUTED)),
        )
        .y_axis(
            Axis::default()
                .title(y_title)
                .bounds([lo, hi])
                .labels(vec![
                    Span::raw(tick(lo, scale)),
                    Span::raw(tick((lo + hi) / 2.0, scale)),
                    Span::raw(tick(hi, scale)),
                ])
                .style(Style::default().fg(MUTED)),
        );
    f.render_widget(chart, area);
}

fn draw_bucket_header(f: &mut ratatui::Frame<'_>, area: Rect, header: Option<&BucketHeader>) {
    let Some(h) = header else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "No bucket statistics for this cluster",
                Style::default().fg(MUTED),
            )),
            area,
        );
        return;
    };
    let mut choices = vec![Span::styled("Bucket: ", Style::default().fg(MUTED))];
    for (i, name) in h.choices.iter().enumerate() {
        let style = if i == h.selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        choices.push(Span::styled(format!(" {name} "), style));
    }
    choices.push(Span::styled("  ([ ] to change)", Style::default().fg(MUTED)));
    let lines = vec![
        Line::from(vec![
            Span::styled(h.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", h.details), Style::default().fg(MUTED)),
        ]),
        Line::from(choices),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Draw the charts tab of `cluster`, skipping `scroll` grid rows.
pub fn draw_chart_tab(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    surface: &TuiSurface,
    cluster: &ClusterId,
    scroll: usize,
) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(CHART_HEIGHT)])
        .split(area);

    let header = match surface.data(&WidgetKey::new(cluster.clone(), WidgetId::BucketHeader)) {
        Some(WidgetData::BucketHeader(h)) => h.as_ref(),
        _ => None,
    };
    draw_bucket_header(f, parts[0], header);

    let grid = parts[1];
    let visible = ((grid.height / CHART_HEIGHT) as usize).max(1);
    let scroll = scroll.min(grid_rows().saturating_sub(visible));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CHART_HEIGHT); visible])
        .split(grid);

    let kinds: Vec<ChartKind> = ChartKind::ALL.to_vec();
    for (row_area, chunk) in rows.iter().zip(kinds.chunks(GRID_COLUMNS).skip(scroll)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Ratio(1, GRID_COLUMNS as u32);
                GRID_COLUMNS
            ])
            .split(*row_area);
        for (cell, kind) in cells.iter().zip(chunk) {
            let key = WidgetKey::new(cluster.clone(), WidgetId::Chart(*kind));
            match surface.data(&key) {
                Some(WidgetData::Chart(bundle)) => draw_chart(f, *cell, bundle, surface.scale(&key)),
                _ => f.render_widget(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(kind.def().title),
                    *cell,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterdash_core::types::BucketStatSeries;
    use clusterdash_core::view::chart_bundle;

    #[test]
    fn holes_split_lines() {
        let segs = segments(&[Some(1.0), Some(2.0), None, Some(4.0)], ChartScale::Linear);
        assert_eq!(segs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]);
    }

    #[test]
    fn log_scale_drops_non_positive_values() {
        let segs = segments(&[Some(100.0), Some(0.0), Some(10.0)], ChartScale::Logarithmic);
        assert_eq!(segs, vec![vec![(0.0, 2.0)], vec![(2.0, 1.0)]]);
    }

    #[test]
    fn right_axis_series_share_the_left_range() {
        let mut b = BucketStatSeries::default();
        b.samples.insert("timestamp".into(), vec![1.0, 2.0]);
        b.samples.insert("get_hits".into(), vec![0.0, 100.0]);
        b.samples.insert("ep_cache_miss_rate".into(), vec![1.0, 3.0]);
        let bundle = chart_bundle(ChartKind::OpsHits, Some(&b));
        let p = plot(&bundle, ChartScale::Linear);
        assert_eq!(p.y_bounds, [0.0, 100.0]);
        assert_eq!(p.right_bounds, Some([1.0, 3.0]));
        let miss = p
            .lines
            .iter()
            .find(|l| l.label.starts_with("Cache Miss"))
            .unwrap();
        assert_eq!(miss.segments, vec![vec![(0.0, 0.0), (1.0, 100.0)]]);
    }

    #[test]
    fn empty_bundle_still_plots() {
        let bundle = chart_bundle(ChartKind::DiskSize, None);
        let p = plot(&bundle, ChartScale::Linear);
        assert!(p.lines.iter().all(|l| l.segments.is_empty()));
        assert_eq!(p.y_bounds, [0.0, 1.0]);
    }

    #[test]
    fn grid_has_seven_rows() {
        assert_eq!(grid_rows(), 7);
    }
}
