//! Chart catalog: which sample series each bucket chart plots and how.

use crate::transform::UnitKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChartKind {
    OpsHits,
    OpsMisses,
    BgWait,
    OpsRates,
    MemoryState,
    ItemsState,
    ResidentRatio,
    ConnectionsCpu,
    DiskSize,
    DiskCommit,
    DiskQueueActive,
    DiskQueueReplica,
    OtherMetrics,
    OtherStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSection {
    Operations,
    State,
    Disk,
    Other,
}

impl ChartSection {
    pub fn title(self) -> &'static str {
        match self {
            ChartSection::Operations => "Operations",
            ChartSection::State => "State",
            ChartSection::Disk => "Disk",
            ChartSection::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesDef {
    pub label: &'static str,
    pub metric: &'static str,
    pub unit: UnitKind,
    pub axis: Axis,
}

#[derive(Debug, Clone, Copy)]
pub struct ChartDef {
    pub kind: ChartKind,
    pub title: &'static str,
    pub section: ChartSection,
    pub left_axis: &'static str,
    pub right_axis: Option<&'static str>,
    pub series: &'static [SeriesDef],
}

// Struct literals (not a fn call) so the series tables promote to 'static.
macro_rules! s {
    ($label:expr, $metric:expr, $unit:expr, $axis:expr) => {
        SeriesDef {
            label: $label,
            metric: $metric,
            unit: $unit,
            axis: $axis,
        }
    };
}

use self::Axis::{Left as L, Right as R};
use crate::transform::UnitKind::{
    BytesAuto as BYTES, Identity as ID, MsToSeconds as MS, RatioToPercent as PCT,
};

impl ChartKind {
    pub const ALL: [ChartKind; 14] = [
        ChartKind::OpsHits,
        ChartKind::OpsMisses,
        ChartKind::BgWait,
        ChartKind::OpsRates,
        ChartKind::MemoryState,
        ChartKind::ItemsState,
        ChartKind::ResidentRatio,
        ChartKind::ConnectionsCpu,
        ChartKind::DiskSize,
        ChartKind::DiskCommit,
        ChartKind::DiskQueueActive,
        ChartKind::DiskQueueReplica,
        ChartKind::OtherMetrics,
        ChartKind::OtherStats,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ChartKind::OpsHits => "chart-ops-hits",
            ChartKind::OpsMisses => "chart-ops-misses",
            ChartKind::BgWait => "chart-bg-wait",
            ChartKind::OpsRates => "chart-ops-rates",
            ChartKind::MemoryState => "chart-memory-state",
            ChartKind::ItemsState => "chart-items-state",
            ChartKind::ResidentRatio => "chart-resident-ratio",
            ChartKind::ConnectionsCpu => "chart-connections-cpu",
            ChartKind::DiskSize => "chart-disk-size",
            ChartKind::DiskCommit => "chart-disk-commit",
            ChartKind::DiskQueueActive => "chart-disk-queue-active",
            ChartKind::DiskQueueReplica => "chart-disk-queue-replica",
            ChartKind::OtherMetrics => "chart-other-metrics",
            ChartKind::OtherStats => "chart-other-stats",
        }
    }

    pub fn def(self) -> ChartDef {
        match self {
            ChartKind::OpsHits => ChartDef {
                kind: self,
                title: "Operations - Hits",
                section: ChartSection::Operations,
                left_axis: "Operations/sec",
                right_axis: Some("Miss Rate %"),
                series: &[
                    s!("Get Hits", "get_hits", ID, L),
                    s!("Cmd Get", "cmd_get", ID, L),
                    s!("Cache Miss Rate (%)", "ep_cache_miss_rate", ID, R),
                ],
            },
            ChartKind::OpsMisses => ChartDef {
                kind: self,
                title: "Operations - Misses",
                section: ChartSection::Operations,
                left_axis: "Value",
                right_axis: None,
                series: &[
                    s!("Get Misses", "get_misses", ID, L),
                    s!("Delete Misses", "delete_misses", ID, L),
                    s!("Incr Misses", "incr_misses", ID, L),
                ],
            },
            ChartKind::BgWait => ChartDef {
                kind: self,
                title: "Background Operations",
                section: ChartSection::Operations,
                left_axis: "Value",
                right_axis: None,
                series: &[
                    s!("Avg BG Wait Time (us)", "avg_bg_wait_time", ID, L),
                    s!("BG Fetched", "bg_fetched", ID, L),
                    s!("BG Meta", "bg_meta", ID, L),
                ],
            },
            ChartKind::OpsRates => ChartDef {
                kind: self,
                title: "Operation Rates",
                section: ChartSection::Operations,
                left_axis: "Value",
                right_axis: None,
                series: &[
                    s!("Operations/sec", "ops", ID, L),
                    s!("Cmd Set", "cmd_set", ID, L),
                    s!("Delete Hits", "delete_hits", ID, L),
                ],
            },
            ChartKind::MemoryState => ChartDef {
                kind: self,
                title: "Memory State",
                section: ChartSection::State,
                left_axis: "Memory",
                right_axis: None,
                series: &[
                    s!("Memory Used", "mem_used", BYTES, L),
                    s!("EP Mem High Watermark", "ep_mem_high_wat", BYTES, L),
                    s!("EP Mem Low Watermark", "ep_mem_low_wat", BYTES, L),
                    s!("Swap Used", "swap_used", BYTES, L),
                ],
            },
            ChartKind::ItemsState => ChartDef {
                kind: self,
                title: "Items & Documents",
                section: ChartSection::State,
                left_axis: "Value",
                right_axis: None,
                series: &[
                    s!("Current Items", "curr_items", ID, L),
                    s!("EP Meta Data", "ep_meta", BYTES, L),
                    s!("vB Active Items", "vb_active_curr_items", ID, L),
                ],
            },
            ChartKind::ResidentRatio => ChartDef {
                kind: self,
                title: "Items in Memory Ratio",
                section: ChartSection::State,
                left_axis: "Resident %",
                right_axis: None,
                series: &[
                    s!("Active Resident Ratio (%)", "vb_active_resident_items_ratio", PCT, L),
                    s!("Replica Resident Ratio (%)", "vb_replica_resident_items_ratio", PCT, L),
                    s!("Pending Resident Ratio (%)", "vb_pending_resident_items_ratio", PCT, L),
                ],
            },
            ChartKind::ConnectionsCpu => ChartDef {
                kind: self,
                title: "Connections & CPU",
                section: ChartSection::State,
                left_axis: "Connections",
                right_axis: Some("CPU %"),
                series: &[
                    s!("Current Connections", "curr_connections", ID, L),
                    s!("CPU Utilization (%)", "cpu_utilization_rate", ID, R),
                    s!("CPU User (%)", "cpu_user_rate", ID, R),
                ],
            },
            ChartKind::DiskSize => ChartDef {
                kind: self,
                title: "Disk Size & Fragmentation",
                section: ChartSection::Disk,
                left_axis: "Size",
                right_axis: Some("Fragmentation %"),
                series: &[
                    s!("Total Disk Size", "couch_total_disk_size", BYTES, L),
                    s!("Data Size", "couch_docs_data_size", BYTES, L),
                    s!("Fragmentation (%)", "couch_docs_fragmentation", ID, R),
                ],
            },
            ChartKind::DiskCommit => ChartDef {
                kind: self,
                title: "Disk Commit Operations",
                section: ChartSection::Disk,
                left_axis: "Queue Items",
                right_axis: Some("Time (s)"),
                series: &[
                    s!("Disk Write Queue", "disk_write_queue", ID, L),
                    s!("Disk Updates", "ep_diskqueue_items", ID, L),
                    s!("Disk Commit Time (s)", "disk_commit_time", MS, R),
                ],
            },
            ChartKind::DiskQueueActive => ChartDef {
                kind: self,
                title: "Active Queue Operations",
                section: ChartSection::Disk,
                left_axis: "Queue Items",
                right_axis: Some("Age (s)"),
                series: &[
                    s!("Active Fill", "vb_active_queue_fill", ID, L),
                    s!("Active Drain", "vb_active_queue_drain", ID, L),
                    s!("Active Queue Age (s)", "vb_active_queue_age", MS, R),
                ],
            },
            ChartKind::DiskQueueReplica => ChartDef {
                kind: self,
                title: "Replica Queue Operations",
                section: ChartSection::Disk,
                left_axis: "Queue Items",
                right_axis: Some("Age (s)"),
                series: &[
                    s!("Replica Fill", "vb_replica_queue_fill", ID, L),
                    s!("Replica Drain", "vb_replica_queue_drain", ID, L),
                    s!("Replica Queue Age (s)", "vb_replica_queue_age", MS, R),
                ],
            },
            ChartKind::OtherMetrics => ChartDef {
                kind: self,
                title: "vBucket Distribution",
                section: ChartSection::Other,
                left_axis: "vBuckets",
                right_axis: None,
                series: &[
                    s!("vBuckets Active", "vb_active_num", ID, L),
                    s!("vBuckets Replica", "vb_replica_num", ID, L),
                    s!("vBuckets Pending", "vb_pending_num", ID, L),
                ],
            },
            ChartKind::OtherStats => ChartDef {
                kind: self,
                title: "Other Statistics",
                section: ChartSection::Other,
                left_axis: "Value",
                right_axis: None,
                series: &[
                    s!("Total Cache Size", "ep_total_cache_size", ID, L),
                    s!("Auth Errors", "auth_errors", ID, L),
                    s!("Temp OOM Errors", "ep_tmp_oom_errors", ID, L),
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn chart_ids_are_unique() {
        let ids: HashSet<_> = ChartKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids.len(), ChartKind::ALL.len());
    }

    #[test]
    fn right_axis_only_when_a_series_uses_it() {
        for kind in ChartKind::ALL {
            let def = kind.def();
            let uses_right = def.series.iter().any(|s| s.axis == Axis::Right);
            assert_eq!(uses_right, def.right_axis.is_some(), "{}", kind.id());
        }
    }
}
