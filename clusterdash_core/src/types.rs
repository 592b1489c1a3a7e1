//! Types that mirror the clusters endpoint's JSON schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::SnapshotError;

/// Stable identity of a logical cluster across polling cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Decoded from either the named form (`"healthy"`, `"unhealthy"`,
/// `"not_monitored"`) or a plain boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "HealthWire")]
pub enum Health {
    Healthy,
    Unhealthy,
    #[default]
    NotMonitored,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HealthWire {
    Flag(bool),
    Named(String),
}

impl TryFrom<HealthWire> for Health {
    type Error = String;

    fn try_from(wire: HealthWire) -> Result<Self, Self::Error> {
        match wire {
            HealthWire::Flag(true) => Ok(Health::Healthy),
            HealthWire::Flag(false) => Ok(Health::Unhealthy),
            HealthWire::Named(name) => match name.as_str() {
                "healthy" => Ok(Health::Healthy),
                "unhealthy" => Ok(Health::Unhealthy),
                "not_monitored" => Ok(Health::NotMonitored),
                other => Err(format!("unknown health '{other}'")),
            },
        }
    }
}

impl Health {
    pub fn label(self) -> &'static str {
        match self {
            Health::Healthy => "Healthy",
            Health::Unhealthy => "Unhealthy",
            Health::NotMonitored => "Not Watching",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTotals {
    pub used: f64,
    pub total: f64,
    pub quota: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskTotals {
    pub used: f64,
    pub total: f64,
    pub free: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeInfo {
    pub hostname: String,
    pub status: String,
    pub services: Vec<String>,
    pub cpu_utilization: f64,
    // bytes
    pub memory_total: f64,
    pub memory_free: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketInfo {
    pub name: String,
    pub bucket_type: String,
    pub storage_backend: String,
    pub num_v_buckets: u32,
    pub replica_number: u32,
    pub item_count: u64,
    pub disk_used: f64,
    pub data_used: f64,
    pub mem_used: f64,
    pub quota_percent_used: f64,
    pub ops_per_sec: f64,
}

/// One bucket's rolling window of samples. `samples["timestamp"]` holds
/// milliseconds since epoch; every other entry is a metric series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketStatSeries {
    pub name: String,
    pub bucket_type: String,
    pub num_v_buckets: u32,
    pub replica_number: u32,
    pub samples: BTreeMap<String, Vec<f64>>,
}

impl BucketStatSeries {
    pub fn series(&self, metric: &str) -> Option<&[f64]> {
        self.samples.get(metric).map(Vec::as_slice)
    }

    pub fn timestamps(&self) -> &[f64] {
        self.series("timestamp").unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

/// One polling cycle's view of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSnapshot {
    pub cluster_id: ClusterId,
    /// Position in the current ordered list. Only used for render order.
    pub display_index: usize,
    pub host: String,
    pub cluster_name: String,
    pub custom_name: Option<String>,
    pub health: Health,
    pub memory: MemoryTotals,
    pub disk: DiskTotals,
    pub nodes: Vec<NodeInfo>,
    pub buckets: Vec<BucketInfo>,
    pub system_stats: BTreeMap<String, StatValue>,
    pub bucket_stats: Vec<BucketStatSeries>,
    pub error: Option<String>,
}

impl ClusterSnapshot {
    /// Empty snapshot for `id`; handy for tests and for building fixtures.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            cluster_id: ClusterId::new(id),
            display_index: 0,
            host: String::new(),
            cluster_name: String::new(),
            custom_name: None,
            health: Health::default(),
            memory: MemoryTotals::default(),
            disk: DiskTotals::default(),
            nodes: Vec::new(),
            buckets: Vec::new(),
            system_stats: BTreeMap::new(),
            bucket_stats: Vec::new(),
            error: None,
        }
    }

    pub fn title(&self) -> &str {
        match self.custom_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ if !self.cluster_name.is_empty() => &self.cluster_name,
            _ => self.cluster_id.as_str(),
        }
    }
}

// Wire shape: everything optional so a single bad field does not take the
// whole array down with it.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireSnapshot {
    cluster_id: Option<String>,
    display_index: Option<usize>,
    host: String,
    cluster_name: String,
    custom_name: Option<String>,
    health: Option<Health>,
    memory: MemoryTotals,
    disk: DiskTotals,
    nodes: Vec<NodeInfo>,
    buckets: Vec<BucketInfo>,
    system_stats: BTreeMap<String, StatValue>,
    bucket_stats: Option<Vec<BucketStatSeries>>,
    error: Option<String>,
}

impl Default for WireSnapshot {
    fn default() -> Self {
        Self {
            cluster_id: None,
            display_index: None,
            host: String::new(),
            cluster_name: String::new(),
            custom_name: None,
            health: None,
            memory: MemoryTotals::default(),
            disk: DiskTotals::default(),
            nodes: Vec::new(),
            buckets: Vec::new(),
            system_stats: BTreeMap::new(),
            bucket_stats: None,
            error: None,
        }
    }
}

impl ClusterSnapshot {
    /// Decode one array element. `position` is the element's index in the
    /// response and stands in for a missing `displayIndex`.
    pub fn from_value(value: Value, position: usize) -> Result<Self, SnapshotError> {
        let wire: WireSnapshot =
            serde_json::from_value(value).map_err(|e| SnapshotError::Decode {
                position,
                reason: e.to_string(),
            })?;
        let cluster_id = match wire.cluster_id {
            Some(id) if !id.trim().is_empty() => ClusterId(id),
            _ => return Err(SnapshotError::MissingClusterId { position }),
        };
        Ok(Self {
            cluster_id,
            display_index: wire.display_index.unwrap_or(position),
            host: wire.host,
            cluster_name: wire.cluster_name,
            custom_name: wire.custom_name,
            health: wire.health.unwrap_or_default(),
            memory: wire.memory,
            disk: wire.disk,
            nodes: wire.nodes,
            buckets: wire.buckets,
            system_stats: wire.system_stats,
            // absent means "no chart data", not an error
            bucket_stats: wire.bucket_stats.unwrap_or_default(),
            error: wire.error,
        })
    }
}

/// One element of a decoded response.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Snapshot(ClusterSnapshot),
    /// The cluster is present but this cycle's entry could not be decoded.
    /// Whatever was shown for it last stays up.
    Unreadable {
        cluster_id: ClusterId,
        display_index: usize,
    },
}

impl BatchEntry {
    pub fn cluster_id(&self) -> &ClusterId {
        match self {
            BatchEntry::Snapshot(s) => &s.cluster_id,
            BatchEntry::Unreadable { cluster_id, .. } => cluster_id,
        }
    }

    pub fn display_index(&self) -> usize {
        match self {
            BatchEntry::Snapshot(s) => s.display_index,
            BatchEntry::Unreadable { display_index, .. } => *display_index,
        }
    }
}

/// A whole clusters-endpoint response, in response order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterBatch {
    pub entries: Vec<BatchEntry>,
}

impl ClusterBatch {
    /// The entries that decoded cleanly.
    pub fn iter(&self) -> impl Iterator<Item = &ClusterSnapshot> + '_ {
        self.entries.iter().filter_map(|e| match e {
            BatchEntry::Snapshot(s) => Some(s),
            BatchEntry::Unreadable { .. } => None,
        })
    }

    pub fn unreadable(&self) -> impl Iterator<Item = &ClusterId> + '_ {
        self.entries.iter().filter_map(|e| match e {
            BatchEntry::Unreadable { cluster_id, .. } => Some(cluster_id),
            BatchEntry::Snapshot(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ClusterSnapshot>> for ClusterBatch {
    fn from(snapshots: Vec<ClusterSnapshot>) -> Self {
        Self {
            entries: snapshots.into_iter().map(BatchEntry::Snapshot).collect(),
        }
    }
}

fn raw_cluster_id(value: &Value) -> Option<ClusterId> {
    value
        .get("clusterId")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .map(ClusterId::new)
}

/// Decode a clusters-endpoint response. Entries without a `clusterId` are
/// dropped with a warning. Entries whose id is readable but whose other
/// fields are not are kept as [`BatchEntry::Unreadable`].
pub fn parse_snapshots(body: &str) -> Result<ClusterBatch, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(body)?;
    Ok(batch_from_values(values))
}

pub fn batch_from_values(values: Vec<Value>) -> ClusterBatch {
    let mut batch = ClusterBatch::default();
    for (position, value) in values.into_iter().enumerate() {
        let cluster_id = raw_cluster_id(&value);
        let display_index = value
            .get("displayIndex")
            .and_then(Value::as_u64)
            .map_or(position, |i| i as usize);
        match (ClusterSnapshot::from_value(value, position), cluster_id) {
            (Ok(snap), _) => batch.entries.push(BatchEntry::Snapshot(snap)),
            (Err(e), Some(cluster_id)) => {
                warn!(cluster = %cluster_id, "keeping previous data: {e}");
                batch.entries.push(BatchEntry::Unreadable {
                    cluster_id,
                    display_index,
                });
            }
            (Err(e), None) => warn!("dropping cluster entry: {e}"),
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cluster_id_is_dropped_others_kept() {
        let body = r#"[
            {"clusterName": "no id"},
            {"clusterId": "b", "health": "healthy"},
            {"clusterId": "", "host": "blank"}
        ]"#;
        let batch = parse_snapshots(body).unwrap();
        assert_eq!(batch.len(), 1);
        let snaps: Vec<_> = batch.iter().collect();
        assert_eq!(snaps[0].cluster_id.as_str(), "b");
        assert_eq!(snaps[0].display_index, 1);
        assert_eq!(snaps[0].health, Health::Healthy);
    }

    #[test]
    fn absent_bucket_stats_means_no_chart_data() {
        let batch = parse_snapshots(r#"[{"clusterId": "a", "bucketStats": null}]"#).unwrap();
        assert!(batch.iter().all(|s| s.bucket_stats.is_empty()));
        assert_eq!(batch.iter().count(), 1);
    }

    #[test]
    fn wrong_typed_field_keeps_the_cluster_present() {
        let body = r#"[{"clusterId": "a", "nodes": 5, "displayIndex": 3}, {"clusterId": "b"}]"#;
        let batch = parse_snapshots(body).unwrap();
        assert_eq!(batch.len(), 2);
        let decoded: Vec<&str> = batch.iter().map(|s| s.cluster_id.as_str()).collect();
        assert_eq!(decoded, vec!["b"]);
        assert_eq!(
            batch.entries[0],
            BatchEntry::Unreadable {
                cluster_id: "a".into(),
                display_index: 3
            }
        );
    }

    #[test]
    fn health_accepts_booleans_and_null() {
        let body = r#"[
            {"clusterId": "up", "health": true},
            {"clusterId": "down", "health": false},
            {"clusterId": "unknown", "health": null},
            {"clusterId": "odd", "health": "sideways"}
        ]"#;
        let batch = parse_snapshots(body).unwrap();
        let health: Vec<(&str, Health)> = batch
            .iter()
            .map(|s| (s.cluster_id.as_str(), s.health))
            .collect();
        assert_eq!(
            health,
            vec![
                ("up", Health::Healthy),
                ("down", Health::Unhealthy),
                ("unknown", Health::NotMonitored),
            ]
        );
        assert_eq!(batch.unreadable().collect::<Vec<_>>(), vec![&ClusterId::from("odd")]);
    }

    #[test]
    fn decodes_full_entry() {
        let body = r#"[{
            "clusterId": "c1", "displayIndex": 4, "host": "http://db1:8091",
            "clusterName": "prod", "customName": "Prod EU", "health": "not_monitored",
            "memory": {"used": 1.0, "total": 2.0, "quota": 1.5},
            "disk": {"used": 3.0, "total": 10.0, "free": 7.0},
            "nodes": [{"hostname": "n1", "status": "healthy", "services": ["kv"], "cpuUtilization": 12.5}],
            "buckets": [{"name": "beer", "numVBuckets": 1024, "itemCount": 7}],
            "systemStats": {"cpu_utilization_rate": 3.5, "version": "7.2.0"},
            "bucketStats": [{"name": "beer", "samples": {"timestamp": [1, 2], "ops": [3]}}]
        }]"#;
        let batch = parse_snapshots(body).unwrap();
        let s = batch.iter().next().unwrap();
        assert_eq!(s.display_index, 4);
        assert_eq!(s.title(), "Prod EU");
        assert_eq!(s.nodes[0].services, vec!["kv".to_string()]);
        assert_eq!(s.buckets[0].num_v_buckets, 1024);
        assert_eq!(
            s.system_stats.get("version"),
            Some(&StatValue::Text("7.2.0".into()))
        );
        assert_eq!(s.bucket_stats[0].timestamps(), &[1.0, 2.0]);
        assert_eq!(s.bucket_stats[0].series("ops"), Some(&[3.0][..]));
    }
}
