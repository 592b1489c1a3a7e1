//! Which widget groups should be materialized now, per cluster.
//!
//! Eager groups are always active. A lazy group activates the first time
//! its tab is visible and stays active from then on; leaving the tab does
//! not tear its widgets down.

use std::collections::{HashMap, HashSet};

use crate::types::ClusterId;
use crate::widget::{Tab, WidgetGroup};

#[derive(Debug)]
struct ClusterTabs {
    visible: Tab,
    activated: HashSet<WidgetGroup>,
}

impl Default for ClusterTabs {
    fn default() -> Self {
        Self {
            visible: Tab::DEFAULT,
            activated: HashSet::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct LazyActivation {
    clusters: HashMap<ClusterId, ClusterTabs>,
}

impl LazyActivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a cluster with the default tab visible. No-op if it
    /// is already tracked.
    pub fn track(&mut self, cluster: &ClusterId) {
        self.clusters.entry(cluster.clone()).or_default();
    }

    pub fn forget(&mut self, cluster: &ClusterId) {
        self.clusters.remove(cluster);
    }

    /// Record a tab switch. Returns the lazy group that becomes active for
    /// the first time because of it, if any.
    pub fn set_visible(&mut self, cluster: &ClusterId, tab: Tab) -> Option<WidgetGroup> {
        let tabs = self.clusters.get_mut(cluster)?;
        tabs.visible = tab;
        let group = WidgetGroup::for_tab(tab);
        if group.is_eager() || tabs.activated.contains(&group) {
            return None;
        }
        Some(group)
    }

    pub fn mark_activated(&mut self, cluster: &ClusterId, group: WidgetGroup) {
        if let Some(tabs) = self.clusters.get_mut(cluster) {
            tabs.activated.insert(group);
        }
    }

    pub fn visible(&self, cluster: &ClusterId) -> Option<Tab> {
        self.clusters.get(cluster).map(|t| t.visible)
    }

    pub fn is_activated(&self, cluster: &ClusterId, group: WidgetGroup) -> bool {
        self.clusters
            .get(cluster)
            .is_some_and(|t| t.activated.contains(&group))
    }

    /// Whether `group` of `cluster` should be created/updated right now.
    pub fn should_activate_now(&self, cluster: &ClusterId, group: WidgetGroup) -> bool {
        if group.is_eager() {
            return true;
        }
        let Some(tabs) = self.clusters.get(cluster) else {
            return false;
        };
        tabs.activated.contains(&group) || group.tab() == Some(tabs.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_group_waits_for_its_tab() {
        let mut act = LazyActivation::new();
        let c = ClusterId::from("a");
        act.track(&c);
        assert!(act.should_activate_now(&c, WidgetGroup::Nodes));
        assert!(!act.should_activate_now(&c, WidgetGroup::Charts));
        assert_eq!(act.set_visible(&c, Tab::Charts), Some(WidgetGroup::Charts));
        assert!(act.should_activate_now(&c, WidgetGroup::Charts));
    }

    #[test]
    fn activation_sticks_after_switching_away() {
        let mut act = LazyActivation::new();
        let c = ClusterId::from("a");
        act.track(&c);
        act.set_visible(&c, Tab::Stats);
        act.mark_activated(&c, WidgetGroup::Stats);
        act.set_visible(&c, Tab::Nodes);
        assert!(act.should_activate_now(&c, WidgetGroup::Stats));
        // second visit is not a first activation
        assert_eq!(act.set_visible(&c, Tab::Stats), None);
    }

    #[test]
    fn eager_tabs_never_report_activation() {
        let mut act = LazyActivation::new();
        let c = ClusterId::from("a");
        act.track(&c);
        assert_eq!(act.set_visible(&c, Tab::Buckets), None);
    }

    #[test]
    fn unknown_cluster_is_inactive() {
        let mut act = LazyActivation::new();
        let c = ClusterId::from("nope");
        assert_eq!(act.set_visible(&c, Tab::Charts), None);
        assert!(!act.should_activate_now(&c, WidgetGroup::Charts));
    }
}
