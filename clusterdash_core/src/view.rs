//! Projections from a cluster snapshot to the data each widget renders.

use crate::charts::{Axis, ChartKind};
use crate::transform::{to_display_aligned, DisplaySeries};
use crate::types::{
    BucketInfo, BucketStatSeries, ClusterSnapshot, DiskTotals, Health, MemoryTotals, NodeInfo,
    StatValue,
};
use crate::widget::WidgetId;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: &'static str,
    pub axis: Axis,
    pub series: DisplaySeries,
}

/// Everything one chart needs. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBundle {
    pub title: &'static str,
    pub left_axis: &'static str,
    pub right_axis: Option<&'static str>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl SeriesBundle {
    pub fn has_data(&self) -> bool {
        !self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketHeader {
    pub name: String,
    pub details: String,
    pub choices: Vec<String>,
    pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatCategory {
    Cpu,
    Memory,
    Disk,
    Network,
    Other,
}

impl StatCategory {
    pub fn title(self) -> &'static str {
        match self {
            StatCategory::Cpu => "CPU",
            StatCategory::Memory => "Memory",
            StatCategory::Disk => "Disk",
            StatCategory::Network => "Network",
            StatCategory::Other => "Other",
        }
    }

    pub fn of(key: &str) -> Self {
        let k = key.to_ascii_lowercase();
        if k.contains("cpu") {
            StatCategory::Cpu
        } else if k.contains("mem") || k.contains("swap") || k.contains("ram") {
            StatCategory::Memory
        } else if k.contains("disk") || k.contains("storage") || k.contains("hdd") {
            StatCategory::Disk
        } else if k.contains("net") {
            StatCategory::Network
        } else {
            StatCategory::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatGroup {
    pub category: StatCategory,
    /// (label, formatted value)
    pub rows: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetData {
    Health {
        title: String,
        host: String,
        health: Health,
        error: Option<String>,
    },
    Capacity {
        memory: MemoryTotals,
        disk: DiskTotals,
    },
    Nodes(Vec<NodeInfo>),
    Buckets(Vec<BucketInfo>),
    Stats(Vec<StatGroup>),
    /// `None` when the cluster reports no bucket statistics.
    BucketHeader(Option<BucketHeader>),
    Chart(SeriesBundle),
}

/// Build the data for `widget` from `snap`. `bucket` selects the entry of
/// `bucket_stats` the chart group shows; out of range falls back to 0.
pub fn project(snap: &ClusterSnapshot, widget: WidgetId, bucket: usize) -> WidgetData {
    match widget {
        WidgetId::HealthBadge => WidgetData::Health {
            title: snap.title().to_string(),
            host: snap.host.clone(),
            health: snap.health,
            error: snap.error.clone(),
        },
        WidgetId::CapacityBadge => WidgetData::Capacity {
            memory: snap.memory,
            disk: snap.disk,
        },
        WidgetId::NodesTable => WidgetData::Nodes(snap.nodes.clone()),
        WidgetId::BucketsTable => WidgetData::Buckets(snap.buckets.clone()),
        WidgetId::SystemStats => WidgetData::Stats(stat_groups(snap)),
        WidgetId::BucketHeader => {
            WidgetData::BucketHeader(selected_bucket(snap, bucket).map(|(idx, b)| BucketHeader {
                name: format!("{} Bucket Statistics", b.name),
                details: bucket_details(b),
                choices: snap.bucket_stats.iter().map(|b| b.name.clone()).collect(),
                selected: idx,
            }))
        }
        WidgetId::Chart(kind) => WidgetData::Chart(chart_bundle(
            kind,
            selected_bucket(snap, bucket).map(|(_, b)| b),
        )),
    }
}

fn selected_bucket(snap: &ClusterSnapshot, bucket: usize) -> Option<(usize, &BucketStatSeries)> {
    snap.bucket_stats
        .get(bucket)
        .map(|b| (bucket, b))
        .or_else(|| snap.bucket_stats.first().map(|b| (0, b)))
}

fn bucket_details(b: &BucketStatSeries) -> String {
    let or_na = |v: u32| {
        if v == 0 {
            "N/A".to_string()
        } else {
            v.to_string()
        }
    };
    let kind = if b.bucket_type.is_empty() {
        "Unknown"
    } else {
        b.bucket_type.as_str()
    };
    format!(
        "Type: {kind} | vBuckets: {} | Replicas: {}",
        or_na(b.num_v_buckets),
        or_na(b.replica_number)
    )
}

pub fn chart_bundle(kind: ChartKind, bucket: Option<&BucketStatSeries>) -> SeriesBundle {
    let def = kind.def();
    let len = bucket.map(|b| b.timestamps().len()).unwrap_or(0);
    SeriesBundle {
        title: def.title,
        left_axis: def.left_axis,
        right_axis: def.right_axis,
        labels: (0..len).map(|i| format!("-{}s", len - i)).collect(),
        datasets: def
            .series
            .iter()
            .map(|s| Dataset {
                label: s.label,
                axis: s.axis,
                series: to_display_aligned(bucket.and_then(|b| b.series(s.metric)), s.unit, len),
            })
            .collect(),
    }
}

pub fn stat_groups(snap: &ClusterSnapshot) -> Vec<StatGroup> {
    let mut groups: Vec<StatGroup> = Vec::new();
    for (key, value) in &snap.system_stats {
        let category = StatCategory::of(key);
        let row = (stat_label(key), format_stat(key, value));
        match groups.iter_mut().find(|g| g.category == category) {
            Some(g) => g.rows.push(row),
            None => groups.push(StatGroup {
                category,
                rows: vec![row],
            }),
        }
    }
    groups.sort_by_key(|g| g.category);
    groups
}

fn stat_label(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

/// Format a system stat by what its key says it measures.
pub fn format_stat(key: &str, value: &StatValue) -> String {
    let v = match value {
        StatValue::Text(s) => return s.clone(),
        StatValue::Number(n) => *n,
    };
    let k = key.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| k.contains(n));

    if has(&["rate", "ratio", "percent", "utilization"]) {
        return format!("{v:.2}%");
    }
    if has(&["mem", "swap", "disk", "storage", "hdd"]) {
        const K: f64 = 1024.0;
        return if v > K * K * K * K {
            format!("{:.2} TB", v / (K * K * K * K))
        } else if v > K * K * K {
            format!("{:.2} GB", v / (K * K * K))
        } else if v > K * K {
            format!("{:.2} MB", v / (K * K))
        } else if v > K {
            format!("{:.2} KB", v / K)
        } else {
            format!("{v:.0} bytes")
        };
    }
    if k.contains("time") && v > 60.0 {
        let minutes = (v / 60.0).floor();
        return format!("{minutes:.0}m {:.1}s", v % 60.0);
    }
    if v > 1000.0 {
        return group_thousands(v);
    }
    format!("{v:.2}")
}

fn group_thousands(v: f64) -> String {
    let rounded = format!("{:.3}", v.abs());
    let (int, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    let mut out = String::with_capacity(int.len() + int.len() / 3 + 4);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    if v < 0.0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Unit;

    fn num(v: f64) -> StatValue {
        StatValue::Number(v)
    }

    #[test]
    fn formats_byte_stats() {
        assert_eq!(format_stat("mem_total", &num(1024.0 * 1024.0 * 1024.0)), "1024.00 MB");
        assert_eq!(format_stat("mem_total", &num(5.0 * 1024.0 * 1024.0 * 1024.0)), "5.00 GB");
        assert_eq!(format_stat("swap_size", &num(2048.0)), "2.00 KB");
        assert_eq!(format_stat("mem_free", &num(512.0)), "512 bytes");
        assert_eq!(format_stat("hdd_free", &num(100.0 * 1024.0 * 1024.0)), "100.00 MB");
    }

    #[test]
    fn formats_percent_time_and_counts() {
        assert_eq!(format_stat("cpu_utilization_rate", &num(75.5)), "75.50%");
        assert_eq!(format_stat("memory_ratio", &num(0.85)), "0.85%");
        assert_eq!(format_stat("uptime", &num(3661.0)), "61m 1.0s");
        assert_eq!(format_stat("boot_time", &num(30.0)), "30.00");
        assert_eq!(format_stat("request_count", &num(1_234_567.0)), "1,234,567");
        assert_eq!(format_stat("item_count", &num(5000.0)), "5,000");
        assert_eq!(
            format_stat("version", &StatValue::Text("7.0.0".into())),
            "7.0.0"
        );
    }

    #[test]
    fn stats_are_grouped_by_category() {
        let mut snap = ClusterSnapshot::new("c");
        snap.system_stats.insert("cpu_user_rate".into(), num(1.0));
        snap.system_stats.insert("mem_free".into(), num(2.0));
        snap.system_stats.insert("uptime".into(), num(3.0));
        snap.system_stats.insert("cpu_utilization_rate".into(), num(4.0));
        let groups = stat_groups(&snap);
        let cats: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            cats,
            vec![StatCategory::Cpu, StatCategory::Memory, StatCategory::Other]
        );
        assert_eq!(groups[0].rows.len(), 2);
        assert_eq!(groups[0].rows[0].0, "CPU USER RATE");
    }

    #[test]
    fn chart_bundle_aligns_to_timestamps() {
        let mut b = BucketStatSeries::default();
        b.samples.insert("timestamp".into(), vec![1.0, 2.0, 3.0]);
        b.samples.insert("mem_used".into(), vec![2.0 * 1024.0 * 1024.0]);
        let bundle = chart_bundle(ChartKind::MemoryState, Some(&b));
        assert_eq!(bundle.labels, vec!["-3s", "-2s", "-1s"]);
        let mem = &bundle.datasets[0].series;
        assert_eq!(mem.unit, Unit::MB);
        assert_eq!(mem.values, vec![Some(2.0), None, None]);
        // series missing entirely: all holes
        assert!(bundle.datasets[3].series.values.iter().all(Option::is_none));
    }

    #[test]
    fn chart_without_bucket_has_no_data() {
        let bundle = chart_bundle(ChartKind::OpsHits, None);
        assert!(!bundle.has_data());
        assert_eq!(bundle.datasets.len(), 3);
    }

    #[test]
    fn out_of_range_bucket_falls_back_to_first() {
        let mut snap = ClusterSnapshot::new("c");
        snap.bucket_stats.push(BucketStatSeries {
            name: "beer".into(),
            num_v_buckets: 1024,
            ..Default::default()
        });
        match project(&snap, WidgetId::BucketHeader, 7) {
            WidgetData::BucketHeader(Some(h)) => {
                assert_eq!(h.selected, 0);
                assert_eq!(h.name, "beer Bucket Statistics");
                assert_eq!(h.details, "Type: Unknown | vBuckets: 1024 | Replicas: N/A");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
