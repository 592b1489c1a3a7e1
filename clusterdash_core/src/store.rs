//! Latest and previously rendered snapshot per cluster, plus diffing.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::types::{BatchEntry, ClusterBatch, ClusterId, ClusterSnapshot};
use crate::widget::Field;

/// Set of snapshot fields touched between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const ALL: FieldSet = FieldSet(0b1_1111);

    fn bit(field: Field) -> u8 {
        match field {
            Field::Header => 1,
            Field::Nodes => 1 << 1,
            Field::Buckets => 1 << 2,
            Field::SystemStats => 1 << 3,
            Field::BucketStats => 1 << 4,
        }
    }

    pub fn insert(&mut self, field: Field) {
        self.0 |= Self::bit(field);
    }

    pub fn contains(self, field: Field) -> bool {
        self.0 & Self::bit(field) != 0
    }

    pub fn union(self, other: FieldSet) -> FieldSet {
        FieldSet(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn of(fields: &[Field]) -> FieldSet {
        let mut set = FieldSet::default();
        for f in fields {
            set.insert(*f);
        }
        set
    }
}

/// Compare two snapshots of the same cluster on the slices widgets read.
pub fn changed_fields(old: &ClusterSnapshot, new: &ClusterSnapshot) -> FieldSet {
    let mut set = FieldSet::default();
    if old.cluster_name != new.cluster_name
        || old.custom_name != new.custom_name
        || old.host != new.host
        || old.health != new.health
        || old.memory != new.memory
        || old.disk != new.disk
        || old.error != new.error
    {
        set.insert(Field::Header);
    }
    if old.nodes != new.nodes {
        set.insert(Field::Nodes);
    }
    if old.buckets != new.buckets {
        set.insert(Field::Buckets);
    }
    if old.system_stats != new.system_stats {
        set.insert(Field::SystemStats);
    }
    if old.bucket_stats != new.bucket_stats {
        set.insert(Field::BucketStats);
    }
    set
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Added,
    Removed,
    /// Accepted, with the fields that differ from the prior snapshot. May be
    /// empty when nothing a widget reads has moved.
    Changed(FieldSet),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub seq: u64,
    /// Accepted clusters in response order, then removals.
    pub entries: Vec<(ClusterId, Change)>,
    /// Incoming cluster ids in display order.
    pub order: Vec<ClusterId>,
}

impl Diff {
    pub fn change(&self, id: &ClusterId) -> Option<&Change> {
        self.entries.iter().find(|(c, _)| c == id).map(|(_, ch)| ch)
    }
}

#[derive(Debug)]
struct Entry {
    latest: ClusterSnapshot,
    previous: Option<ClusterSnapshot>,
    version: u64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct SnapshotStore {
    entries: HashMap<ClusterId, Entry>,
    newest_seq: Option<u64>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the response carrying sequence number `seq`. Returns `None`
    /// when a newer response has already been applied; such a late arrival
    /// is dropped whole.
    ///
    /// A cluster whose entry could not be decoded still counts as present:
    /// it keeps its last snapshot and is reported with an empty change set.
    pub fn ingest(&mut self, seq: u64, batch: impl Into<ClusterBatch>) -> Option<Diff> {
        if self.newest_seq.is_some_and(|newest| seq <= newest) {
            trace!(seq, "discarding out-of-order response");
            return None;
        }
        self.newest_seq = Some(seq);

        let batch = batch.into();
        let mut present: HashSet<ClusterId> = HashSet::with_capacity(batch.len());
        let mut incoming: Vec<BatchEntry> = Vec::with_capacity(batch.len());
        for entry in batch.entries {
            if present.insert(entry.cluster_id().clone()) {
                incoming.push(entry);
            } else {
                warn!(cluster = %entry.cluster_id(), "duplicate clusterId in response; keeping the first");
            }
        }
        incoming.sort_by_key(BatchEntry::display_index);

        let mut diff = Diff {
            seq,
            ..Diff::default()
        };
        for incoming in incoming {
            let id = incoming.cluster_id().clone();
            match (incoming, self.entries.get_mut(&id)) {
                (BatchEntry::Snapshot(snap), Some(entry)) => {
                    let fields = changed_fields(&entry.latest, &snap);
                    entry.previous = Some(std::mem::replace(&mut entry.latest, snap));
                    entry.version += 1;
                    entry.seq = seq;
                    diff.order.push(id.clone());
                    diff.entries.push((id, Change::Changed(fields)));
                }
                (BatchEntry::Snapshot(snap), None) => {
                    self.entries.insert(
                        id.clone(),
                        Entry {
                            latest: snap,
                            previous: None,
                            version: 1,
                            seq,
                        },
                    );
                    diff.order.push(id.clone());
                    diff.entries.push((id, Change::Added));
                }
                (BatchEntry::Unreadable { .. }, Some(entry)) => {
                    entry.seq = seq;
                    diff.order.push(id.clone());
                    diff.entries.push((id, Change::Changed(FieldSet::default())));
                }
                (BatchEntry::Unreadable { .. }, None) => {
                    debug!(cluster = %id, "unreadable entry for an unknown cluster");
                }
            }
        }

        let mut removed: Vec<ClusterId> = self
            .entries
            .keys()
            .filter(|id| !present.contains(*id))
            .cloned()
            .collect();
        removed.sort();
        for id in removed {
            self.entries.remove(&id);
            diff.entries.push((id, Change::Removed));
        }
        Some(diff)
    }

    pub fn latest(&self, id: &ClusterId) -> Option<&ClusterSnapshot> {
        self.entries.get(id).map(|e| &e.latest)
    }

    pub fn previous(&self, id: &ClusterId) -> Option<&ClusterSnapshot> {
        self.entries.get(id).and_then(|e| e.previous.as_ref())
    }

    /// Monotonic per-cluster version, bumped on every accepted snapshot.
    pub fn version(&self, id: &ClusterId) -> u64 {
        self.entries.get(id).map(|e| e.version).unwrap_or(0)
    }

    pub fn seq(&self, id: &ClusterId) -> Option<u64> {
        self.entries.get(id).map(|e| e.seq)
    }

    pub fn newest_seq(&self) -> Option<u64> {
        self.newest_seq
    }

    pub fn contains(&self, id: &ClusterId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cluster ids ordered by their latest `display_index`.
    pub fn ordered(&self) -> Vec<ClusterId> {
        let mut ids: Vec<(&ClusterId, usize)> = self
            .entries
            .iter()
            .map(|(id, e)| (id, e.latest.display_index))
            .collect();
        ids.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        ids.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeInfo;

    fn snap(id: &str, index: usize) -> ClusterSnapshot {
        let mut s = ClusterSnapshot::new(id);
        s.display_index = index;
        s
    }

    #[test]
    fn first_ingest_reports_added() {
        let mut store = SnapshotStore::new();
        let diff = store.ingest(1, vec![snap("a", 0), snap("b", 1)]).unwrap();
        assert_eq!(diff.change(&"a".into()), Some(&Change::Added));
        assert_eq!(diff.change(&"b".into()), Some(&Change::Added));
        assert_eq!(store.version(&"a".into()), 1);
    }

    #[test]
    fn reorder_is_not_a_change() {
        let mut store = SnapshotStore::new();
        store.ingest(1, vec![snap("a", 0), snap("b", 1)]);
        let diff = store.ingest(2, vec![snap("b", 0), snap("a", 1)]).unwrap();
        for (_, change) in &diff.entries {
            assert_eq!(change, &Change::Changed(FieldSet::default()));
        }
        assert_eq!(diff.order, vec![ClusterId::from("b"), ClusterId::from("a")]);
        assert_eq!(store.ordered(), diff.order);
    }

    #[test]
    fn only_touched_fields_are_reported() {
        let mut store = SnapshotStore::new();
        store.ingest(1, vec![snap("a", 0)]);
        let mut next = snap("a", 0);
        next.nodes.push(NodeInfo {
            hostname: "n1".into(),
            ..Default::default()
        });
        let diff = store.ingest(2, vec![next]).unwrap();
        assert_eq!(
            diff.change(&"a".into()),
            Some(&Change::Changed(FieldSet::of(&[Field::Nodes])))
        );
        assert!(store.previous(&"a".into()).unwrap().nodes.is_empty());
        assert_eq!(store.version(&"a".into()), 2);
    }

    #[test]
    fn missing_cluster_is_removed() {
        let mut store = SnapshotStore::new();
        store.ingest(1, vec![snap("a", 0), snap("b", 1)]);
        let diff = store.ingest(2, vec![snap("a", 0)]).unwrap();
        assert_eq!(diff.change(&"b".into()), Some(&Change::Removed));
        assert!(!store.contains(&"b".into()));
    }

    #[test]
    fn late_response_is_discarded() {
        let mut store = SnapshotStore::new();
        store.ingest(1, vec![snap("a", 0)]);
        let mut three = snap("a", 0);
        three.cluster_name = "three".into();
        store.ingest(3, vec![three]);
        let mut two = snap("a", 0);
        two.cluster_name = "two".into();
        assert!(store.ingest(2, vec![two]).is_none());
        assert_eq!(store.latest(&"a".into()).unwrap().cluster_name, "three");
        assert_eq!(store.seq(&"a".into()), Some(3));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut store = SnapshotStore::new();
        let mut first = snap("a", 5);
        first.cluster_name = "first".into();
        let mut dup = snap("a", 0);
        dup.cluster_name = "dup".into();
        let diff = store.ingest(1, vec![first, dup]).unwrap();
        assert_eq!(diff.entries.len(), 1);
        assert_eq!(store.latest(&"a".into()).unwrap().cluster_name, "first");
        assert_eq!(store.latest(&"a".into()).unwrap().display_index, 5);
    }

    #[test]
    fn unreadable_entry_keeps_the_cluster_and_its_snapshot() {
        let mut store = SnapshotStore::new();
        let mut named = snap("a", 0);
        named.cluster_name = "kept".into();
        store.ingest(1, vec![named, snap("b", 1)]);

        let batch = ClusterBatch {
            entries: vec![
                BatchEntry::Unreadable {
                    cluster_id: "a".into(),
                    display_index: 0,
                },
                BatchEntry::Unreadable {
                    cluster_id: "new".into(),
                    display_index: 2,
                },
                BatchEntry::Snapshot(snap("b", 1)),
            ],
        };
        let diff = store.ingest(2, batch).unwrap();
        assert_eq!(
            diff.change(&"a".into()),
            Some(&Change::Changed(FieldSet::default()))
        );
        assert_eq!(diff.change(&"new".into()), None);
        assert_eq!(diff.order, vec![ClusterId::from("a"), ClusterId::from("b")]);
        assert_eq!(store.latest(&"a".into()).unwrap().cluster_name, "kept");
        assert_eq!(store.version(&"a".into()), 1);
        assert!(!store.contains(&"new".into()));
    }
}
