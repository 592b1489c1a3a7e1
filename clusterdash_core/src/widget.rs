//! Widget identity, grouping and lifecycle phase.

use std::fmt;

use crate::charts::ChartKind;
use crate::types::ClusterId;

/// One renderable unit inside a cluster panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetId {
    HealthBadge,
    CapacityBadge,
    NodesTable,
    BucketsTable,
    SystemStats,
    BucketHeader,
    Chart(ChartKind),
}

impl WidgetId {
    pub fn group(self) -> WidgetGroup {
        match self {
            WidgetId::HealthBadge | WidgetId::CapacityBadge => WidgetGroup::Badges,
            WidgetId::NodesTable => WidgetGroup::Nodes,
            WidgetId::BucketsTable => WidgetGroup::Buckets,
            WidgetId::SystemStats => WidgetGroup::Stats,
            WidgetId::BucketHeader | WidgetId::Chart(_) => WidgetGroup::Charts,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WidgetId::HealthBadge => "health-badge",
            WidgetId::CapacityBadge => "capacity-badge",
            WidgetId::NodesTable => "nodes-table",
            WidgetId::BucketsTable => "buckets-table",
            WidgetId::SystemStats => "system-stats",
            WidgetId::BucketHeader => "bucket-header",
            WidgetId::Chart(kind) => kind.id(),
        }
    }

    pub fn is_chart(self) -> bool {
        matches!(self, WidgetId::Chart(_))
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a widget for as long as its cluster persists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetKey {
    pub cluster: ClusterId,
    pub widget: WidgetId,
}

impl WidgetKey {
    pub fn new(cluster: ClusterId, widget: WidgetId) -> Self {
        Self { cluster, widget }
    }
}

impl fmt::Display for WidgetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.widget)
    }
}

/// Snapshot fields a widget group can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// name, host, health, memory, disk, error
    Header,
    Nodes,
    Buckets,
    SystemStats,
    BucketStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tab {
    Nodes,
    Buckets,
    Stats,
    Charts,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Nodes, Tab::Buckets, Tab::Stats, Tab::Charts];

    /// The tab shown when a cluster first appears.
    pub const DEFAULT: Tab = Tab::Nodes;

    pub fn title(self) -> &'static str {
        match self {
            Tab::Nodes => "Nodes",
            Tab::Buckets => "Buckets",
            Tab::Stats => "Stats",
            Tab::Charts => "Data Charts",
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Nodes => Tab::Buckets,
            Tab::Buckets => Tab::Stats,
            Tab::Stats => Tab::Charts,
            Tab::Charts => Tab::Nodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetGroup {
    Badges,
    Nodes,
    Buckets,
    Stats,
    Charts,
}

impl WidgetGroup {
    pub const ALL: [WidgetGroup; 5] = [
        WidgetGroup::Badges,
        WidgetGroup::Nodes,
        WidgetGroup::Buckets,
        WidgetGroup::Stats,
        WidgetGroup::Charts,
    ];

    /// Eager groups render on cluster arrival regardless of the visible tab.
    pub fn is_eager(self) -> bool {
        matches!(
            self,
            WidgetGroup::Badges | WidgetGroup::Nodes | WidgetGroup::Buckets
        )
    }

    /// The tab hosting this group; `None` for always-visible widgets.
    pub fn tab(self) -> Option<Tab> {
        match self {
            WidgetGroup::Badges => None,
            WidgetGroup::Nodes => Some(Tab::Nodes),
            WidgetGroup::Buckets => Some(Tab::Buckets),
            WidgetGroup::Stats => Some(Tab::Stats),
            WidgetGroup::Charts => Some(Tab::Charts),
        }
    }

    pub fn for_tab(tab: Tab) -> WidgetGroup {
        match tab {
            Tab::Nodes => WidgetGroup::Nodes,
            Tab::Buckets => WidgetGroup::Buckets,
            Tab::Stats => WidgetGroup::Stats,
            Tab::Charts => WidgetGroup::Charts,
        }
    }

    pub fn depends_on(self) -> Field {
        match self {
            WidgetGroup::Badges => Field::Header,
            WidgetGroup::Nodes => Field::Nodes,
            WidgetGroup::Buckets => Field::Buckets,
            WidgetGroup::Stats => Field::SystemStats,
            WidgetGroup::Charts => Field::BucketStats,
        }
    }

    pub fn widgets(self) -> Vec<WidgetId> {
        match self {
            WidgetGroup::Badges => vec![WidgetId::HealthBadge, WidgetId::CapacityBadge],
            WidgetGroup::Nodes => vec![WidgetId::NodesTable],
            WidgetGroup::Buckets => vec![WidgetId::BucketsTable],
            WidgetGroup::Stats => vec![WidgetId::SystemStats],
            WidgetGroup::Charts => std::iter::once(WidgetId::BucketHeader)
                .chain(ChartKind::ALL.iter().map(|k| WidgetId::Chart(*k)))
                .collect(),
        }
    }
}

/// Opaque rendering resource. Minted by the render surface, owned by the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uncreated,
    Deferred,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Uncreated,
    Deferred,
    Live(WidgetHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub(crate) lifecycle: Lifecycle,
    /// Version of the cluster snapshot last pushed into this widget.
    pub last_applied_version: u64,
}

impl WidgetState {
    pub(crate) fn uncreated() -> Self {
        Self {
            lifecycle: Lifecycle::Uncreated,
            last_applied_version: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Uncreated => Phase::Uncreated,
            Lifecycle::Deferred => Phase::Deferred,
            Lifecycle::Live(_) => Phase::Live,
        }
    }

    pub fn handle(&self) -> Option<WidgetHandle> {
        match self.lifecycle {
            Lifecycle::Live(h) => Some(h),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_group_widget_maps_back_to_its_group() {
        for group in WidgetGroup::ALL {
            for id in group.widgets() {
                assert_eq!(id.group(), group, "{id}");
            }
        }
    }

    #[test]
    fn only_badges_and_tables_are_eager() {
        let eager: Vec<_> = WidgetGroup::ALL.into_iter().filter(|g| g.is_eager()).collect();
        assert_eq!(
            eager,
            vec![WidgetGroup::Badges, WidgetGroup::Nodes, WidgetGroup::Buckets]
        );
        assert_eq!(WidgetGroup::Charts.widgets().len(), 15);
    }
}
