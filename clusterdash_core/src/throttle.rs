//! Per widget-group update throttle with trailing flush.
//!
//! An update that lands inside the window is not dropped: the group is
//! marked pending and flushed once the window has elapsed, with whatever
//! data is newest at that point.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::types::ClusterId;
use crate::widget::WidgetGroup;

type GroupKey = (ClusterId, WidgetGroup);

#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last: HashMap<GroupKey, Instant>,
    pending: HashSet<GroupKey>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
            pending: HashSet::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Ask to update `group` at `now`. `true` means go ahead (and the window
    /// restarts); `false` means it was coalesced into a pending flush.
    pub fn admit(&mut self, cluster: &ClusterId, group: WidgetGroup, now: Instant) -> bool {
        let key = (cluster.clone(), group);
        let open = match self.last.get(&key) {
            Some(at) => now.saturating_duration_since(*at) >= self.window,
            None => true,
        };
        if open {
            self.last.insert(key.clone(), now);
            self.pending.remove(&key);
        } else {
            self.pending.insert(key);
        }
        open
    }

    /// Record an update that bypassed `admit` (first render after creation).
    pub fn record(&mut self, cluster: &ClusterId, group: WidgetGroup, now: Instant) {
        let key = (cluster.clone(), group);
        self.pending.remove(&key);
        self.last.insert(key, now);
    }

    pub fn is_pending(&self, cluster: &ClusterId, group: WidgetGroup) -> bool {
        self.pending.contains(&(cluster.clone(), group))
    }

    /// Pending groups whose window has elapsed at `now`. They are removed
    /// from the pending set and their window restarts.
    pub fn due(&mut self, now: Instant) -> Vec<GroupKey> {
        let mut due: Vec<GroupKey> = self
            .pending
            .iter()
            .filter(|key| {
                self.last
                    .get(*key)
                    .map_or(true, |at| now.saturating_duration_since(*at) >= self.window)
            })
            .cloned()
            .collect();
        due.sort();
        for key in &due {
            self.pending.remove(key);
            self.last.insert(key.clone(), now);
        }
        due
    }

    pub fn forget(&mut self, cluster: &ClusterId) {
        self.last.retain(|(c, _), _| c != cluster);
        self.pending.retain(|(c, _)| c != cluster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_update_inside_window_is_deferred_then_due() {
        let mut t = Throttle::new(Duration::from_secs(20));
        let c = ClusterId::from("a");
        let t0 = Instant::now();
        assert!(t.admit(&c, WidgetGroup::Nodes, t0));
        assert!(!t.admit(&c, WidgetGroup::Nodes, t0 + Duration::from_secs(5)));
        assert!(t.is_pending(&c, WidgetGroup::Nodes));
        assert!(t.due(t0 + Duration::from_secs(10)).is_empty());
        assert_eq!(
            t.due(t0 + Duration::from_secs(20)),
            vec![(c.clone(), WidgetGroup::Nodes)]
        );
        assert!(!t.is_pending(&c, WidgetGroup::Nodes));
    }

    #[test]
    fn groups_are_throttled_independently() {
        let mut t = Throttle::new(Duration::from_secs(20));
        let c = ClusterId::from("a");
        let t0 = Instant::now();
        assert!(t.admit(&c, WidgetGroup::Nodes, t0));
        assert!(t.admit(&c, WidgetGroup::Buckets, t0));
        assert!(t.admit(&ClusterId::from("b"), WidgetGroup::Nodes, t0));
    }

    #[test]
    fn forget_drops_pending_work() {
        let mut t = Throttle::new(Duration::from_secs(1));
        let c = ClusterId::from("a");
        let t0 = Instant::now();
        t.admit(&c, WidgetGroup::Charts, t0);
        t.admit(&c, WidgetGroup::Charts, t0);
        t.forget(&c);
        assert!(t.due(t0 + Duration::from_secs(5)).is_empty());
    }
}
