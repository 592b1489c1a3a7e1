//! Turns each incoming batch of cluster snapshots into the minimal set of
//! widget create/update/release calls.
//!
//! Per cluster the reconciler tracks the selected bucket, chart scale, any
//! lazy group waiting for its deferred first render, and work queued behind
//! that render. Clusters never share state, so one cluster's failures or
//! pending work do not hold up another.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::activation::LazyActivation;
use crate::registry::{ChartScale, RenderSurface, WidgetRegistry};
use crate::store::{Change, FieldSet, SnapshotStore};
use crate::throttle::Throttle;
use crate::types::{ClusterBatch, ClusterId, ClusterSnapshot};
use crate::view::project;
use crate::widget::{Phase, Tab, WidgetGroup, WidgetKey};

/// Fixed polling cadence of the clusters endpoint.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Updates to one widget group closer together than this are coalesced.
pub const THROTTLE_WINDOW: Duration = Duration::from_secs(2 * POLL_INTERVAL.as_secs());

/// Identity of the focused cluster, for collaborators that fetch their own
/// per-cluster data (the index browser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTarget {
    pub id: ClusterId,
    pub host: String,
}

/// Transient transport failure shown until the next successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub seq: u64,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub added: Vec<ClusterId>,
    pub removed: Vec<ClusterId>,
    /// Widget groups pushed to the surface.
    pub updated: usize,
    /// Changed lazy groups skipped because their tab was never shown.
    pub skipped_hidden: usize,
    /// Changed groups coalesced by the throttle.
    pub throttled: usize,
    /// Clusters whose changes wait behind a deferred render.
    pub queued: usize,
}

#[derive(Debug, Default)]
struct ClusterSlot {
    selected_bucket: usize,
    scale: ChartScale,
    /// Lazy groups activated but not yet rendered.
    activating: Vec<WidgetGroup>,
    /// Changes that arrived while `activating` was non-empty.
    queued: Option<FieldSet>,
}

impl ClusterSlot {
    fn in_flight(&self) -> bool {
        !self.activating.is_empty()
    }

    fn queue(&mut self, fields: FieldSet) {
        self.queued = Some(self.queued.unwrap_or_default().union(fields));
    }
}

pub struct Reconciler<S> {
    store: SnapshotStore,
    registry: WidgetRegistry<S>,
    activation: LazyActivation,
    throttle: Throttle,
    slots: HashMap<ClusterId, ClusterSlot>,
    focused: Option<ClusterId>,
    last_updated: Option<DateTime<Local>>,
    last_ok_seq: Option<u64>,
    banner: Option<Banner>,
}

impl<S: RenderSurface> Reconciler<S> {
    pub fn new(surface: S) -> Self {
        Self::with_throttle(surface, THROTTLE_WINDOW)
    }

    pub fn with_throttle(surface: S, window: Duration) -> Self {
        Self {
            store: SnapshotStore::new(),
            registry: WidgetRegistry::new(surface),
            activation: LazyActivation::new(),
            throttle: Throttle::new(window),
            slots: HashMap::new(),
            focused: None,
            last_updated: None,
            last_ok_seq: None,
            banner: None,
        }
    }

    /// Apply the response with sequence number `seq`. Returns `None` when a
    /// newer response was already applied and this one was discarded.
    pub fn ingest(
        &mut self,
        seq: u64,
        batch: impl Into<ClusterBatch>,
        now: Instant,
    ) -> Option<IngestReport> {
        let diff = self.store.ingest(seq, batch)?;
        let mut report = IngestReport::default();

        for (id, change) in &diff.entries {
            match change {
                Change::Added => {
                    self.on_added(id, now, &mut report);
                    report.added.push(id.clone());
                }
                Change::Removed => {
                    self.on_removed(id);
                    report.removed.push(id.clone());
                }
                Change::Changed(fields) if fields.is_empty() => {}
                Change::Changed(fields) => {
                    let in_flight = self.slots.get(id).is_some_and(ClusterSlot::in_flight);
                    if in_flight {
                        if let Some(slot) = self.slots.get_mut(id) {
                            slot.queue(*fields);
                        }
                        report.queued += 1;
                        debug!(cluster = %id, "queued behind deferred render");
                    } else {
                        self.apply_changes(id, *fields, now, &mut report);
                    }
                }
            }
        }
        self.registry.surface_mut().arrange(&diff.order);

        if self.focused.as_ref().map_or(true, |f| !self.store.contains(f)) {
            self.focused = diff.order.first().cloned();
        }
        self.last_ok_seq = Some(self.last_ok_seq.map_or(seq, |s| s.max(seq)));
        self.last_updated = Some(Local::now());
        if self.banner.take().is_some() {
            info!(seq, "clusters endpoint reachable again");
        }
        debug!(
            seq,
            added = report.added.len(),
            removed = report.removed.len(),
            updated = report.updated,
            skipped = report.skipped_hidden,
            throttled = report.throttled,
            queued = report.queued,
            "ingest applied"
        );
        Some(report)
    }

    /// Record a failed fetch. Existing widgets are left alone. Returns
    /// whether a banner was newly raised.
    pub fn report_transport_error(&mut self, seq: u64, message: impl Into<String>) -> bool {
        if self.last_ok_seq.is_some_and(|ok| seq < ok) {
            return false;
        }
        if self.banner.is_some() {
            return false;
        }
        let message = message.into();
        warn!(seq, "fetching clusters failed: {message}");
        self.banner = Some(Banner { seq, message });
        true
    }

    /// The tab-switching signal. Switching to a lazy tab for the first time
    /// schedules its first render for [`run_deferred`](Self::run_deferred).
    pub fn set_active_tab(&mut self, cluster: &ClusterId, tab: Tab) -> bool {
        let Some(group) = self.activation.set_visible(cluster, tab) else {
            return false;
        };
        let Some(slot) = self.slots.get_mut(cluster) else {
            return false;
        };
        if !slot.activating.contains(&group) {
            slot.activating.push(group);
        }
        debug!(cluster = %cluster, ?group, "activation scheduled");
        true
    }

    /// Run scheduled first renders, then whatever queued up behind them.
    pub fn run_deferred(&mut self, now: Instant) -> usize {
        let ready: Vec<ClusterId> = self
            .slots
            .iter()
            .filter(|(_, s)| s.in_flight())
            .map(|(id, _)| id.clone())
            .collect();
        let mut report = IngestReport::default();
        for id in &ready {
            let (groups, queued) = match self.slots.get_mut(id) {
                Some(slot) => (std::mem::take(&mut slot.activating), slot.queued.take()),
                None => continue,
            };
            for group in groups {
                self.materialize(id, group, now);
                self.activation.mark_activated(id, group);
            }
            if let Some(fields) = queued {
                self.apply_changes(id, fields, now, &mut report);
            }
        }
        ready.len()
    }

    /// Flush throttled updates whose window has elapsed, using the newest
    /// snapshot for each.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut flushed = 0;
        for (id, group) in self.throttle.due(now) {
            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            if slot.in_flight() {
                slot.queue(FieldSet::of(&[group.depends_on()]));
                continue;
            }
            self.push_group(&id, group);
            flushed += 1;
        }
        flushed
    }

    /// Bucket selector change for the charts of `cluster`.
    pub fn select_bucket(&mut self, cluster: &ClusterId, bucket: usize, now: Instant) -> bool {
        let count = self
            .store
            .latest(cluster)
            .map(|s| s.bucket_stats.len())
            .unwrap_or(0);
        let Some(slot) = self.slots.get_mut(cluster) else {
            return false;
        };
        let bucket = bucket.min(count.saturating_sub(1));
        if slot.selected_bucket == bucket {
            return false;
        }
        slot.selected_bucket = bucket;
        if slot.in_flight() {
            slot.queue(FieldSet::of(&[WidgetGroup::Charts.depends_on()]));
            return true;
        }
        if self.group_live(cluster, WidgetGroup::Charts) {
            self.push_group(cluster, WidgetGroup::Charts);
            self.throttle.record(cluster, WidgetGroup::Charts, now);
        }
        true
    }

    /// Switch every live chart of `cluster` to `scale`; charts created later
    /// pick it up on creation.
    pub fn set_scale(&mut self, cluster: &ClusterId, scale: ChartScale) -> usize {
        let Some(slot) = self.slots.get_mut(cluster) else {
            return 0;
        };
        slot.scale = scale;
        self.registry.set_scale(cluster, scale)
    }

    pub fn set_focus(&mut self, cluster: &ClusterId) -> bool {
        if !self.store.contains(cluster) {
            return false;
        }
        self.focused = Some(cluster.clone());
        true
    }

    /// Move focus `delta` places along the display order, wrapping.
    pub fn cycle_focus(&mut self, delta: isize) -> Option<&ClusterId> {
        let order = self.store.ordered();
        if order.is_empty() {
            return None;
        }
        let current = self
            .focused
            .as_ref()
            .and_then(|f| order.iter().position(|c| c == f))
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(order.len() as isize) as usize;
        self.focused = Some(order[next].clone());
        self.focused.as_ref()
    }

    pub fn focused(&self) -> Option<&ClusterId> {
        self.focused.as_ref()
    }

    pub fn focused_target(&self) -> Option<ClusterTarget> {
        let id = self.focused.as_ref()?;
        let snap = self.store.latest(id)?;
        Some(ClusterTarget {
            id: id.clone(),
            host: snap.host.clone(),
        })
    }

    pub fn clusters(&self) -> Vec<ClusterId> {
        self.store.ordered()
    }

    pub fn snapshot(&self, cluster: &ClusterId) -> Option<&ClusterSnapshot> {
        self.store.latest(cluster)
    }

    pub fn visible_tab(&self, cluster: &ClusterId) -> Option<Tab> {
        self.activation.visible(cluster)
    }

    pub fn selected_bucket(&self, cluster: &ClusterId) -> usize {
        self.slots.get(cluster).map_or(0, |s| s.selected_bucket)
    }

    pub fn scale(&self, cluster: &ClusterId) -> ChartScale {
        self.slots.get(cluster).map(|s| s.scale).unwrap_or_default()
    }

    pub fn is_in_flight(&self, cluster: &ClusterId) -> bool {
        self.slots.get(cluster).is_some_and(ClusterSlot::in_flight)
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn registry(&self) -> &WidgetRegistry<S> {
        &self.registry
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        self.registry.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.registry.surface_mut()
    }

    /// Release everything and hand the surface back.
    pub fn shutdown(mut self) -> S {
        for id in self.store.ordered() {
            self.registry.release_cluster(&id);
            self.registry.surface_mut().unmount(&id);
        }
        self.registry.into_surface()
    }

    fn on_added(&mut self, id: &ClusterId, now: Instant, report: &mut IngestReport) {
        self.registry.surface_mut().mount(id);
        self.activation.track(id);
        self.slots.insert(id.clone(), ClusterSlot::default());
        for group in WidgetGroup::ALL {
            for widget in group.widgets() {
                self.registry.register(WidgetKey::new(id.clone(), widget));
            }
            if self.activation.should_activate_now(id, group) {
                self.materialize(id, group, now);
                report.updated += 1;
            } else {
                for widget in group.widgets() {
                    self.registry.defer(&WidgetKey::new(id.clone(), widget));
                }
            }
        }
        debug!(cluster = %id, "cluster added");
    }

    fn on_removed(&mut self, id: &ClusterId) {
        let released = self.registry.release_cluster(id);
        self.registry.surface_mut().unmount(id);
        self.activation.forget(id);
        self.throttle.forget(id);
        self.slots.remove(id);
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        debug!(cluster = %id, released, "cluster removed");
    }

    fn apply_changes(
        &mut self,
        id: &ClusterId,
        fields: FieldSet,
        now: Instant,
        report: &mut IngestReport,
    ) {
        for group in WidgetGroup::ALL {
            if !fields.contains(group.depends_on()) {
                continue;
            }
            if !self.activation.should_activate_now(id, group) {
                // the store keeps the snapshot; activation renders it later
                report.skipped_hidden += 1;
                continue;
            }
            if !self.group_live(id, group) {
                self.materialize(id, group, now);
                report.updated += 1;
            } else if self.throttle.admit(id, group, now) {
                self.push_group(id, group);
                report.updated += 1;
            } else {
                report.throttled += 1;
            }
        }
    }

    /// First render of a group: create what is missing and push data,
    /// bypassing the throttle.
    fn materialize(&mut self, id: &ClusterId, group: WidgetGroup, now: Instant) {
        self.push_group(id, group);
        self.throttle.record(id, group, now);
        if group == WidgetGroup::Charts {
            let scale = self.scale(id);
            if scale != ChartScale::Linear {
                self.registry.set_scale(id, scale);
            }
        }
    }

    /// `ensure` + `update` every widget of `group` from the newest snapshot.
    /// A widget that cannot be rendered is skipped; its siblings still are.
    fn push_group(&mut self, id: &ClusterId, group: WidgetGroup) {
        let Some(snap) = self.store.latest(id) else {
            return;
        };
        let version = self.store.version(id);
        let bucket = self.slots.get(id).map_or(0, |s| s.selected_bucket);
        for widget in group.widgets() {
            let key = WidgetKey::new(id.clone(), widget);
            if self.registry.ensure(&key).is_none() {
                continue;
            }
            let data = project(snap, widget, bucket);
            self.registry.update(&key, data, version);
        }
    }

    fn group_live(&self, id: &ClusterId, group: WidgetGroup) -> bool {
        group.widgets().into_iter().all(|w| {
            self.registry.phase(&WidgetKey::new(id.clone(), w)) == Some(Phase::Live)
        })
    }
}
