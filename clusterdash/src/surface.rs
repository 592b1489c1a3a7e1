//! Terminal-side widget store. The reconciler creates and updates widgets
//! here; the draw pass reads them back by key every frame.

use std::collections::{BTreeSet, HashMap};

use clusterdash_core::{
    ChartScale, ClusterId, RenderError, RenderSurface, WidgetData, WidgetHandle, WidgetId,
    WidgetKey,
};

#[derive(Debug)]
struct Slot {
    key: WidgetKey,
    data: Option<WidgetData>,
    scale: ChartScale,
}

#[derive(Debug, Default)]
pub struct TuiSurface {
    next: u64,
    mounted: BTreeSet<ClusterId>,
    order: Vec<ClusterId>,
    slots: HashMap<WidgetHandle, Slot>,
    by_key: HashMap<WidgetKey, WidgetHandle>,
}

/// Whether `data` is the right shape for `widget`.
fn accepts(widget: WidgetId, data: &WidgetData) -> bool {
    matches!(
        (widget, data),
        (WidgetId::HealthBadge, WidgetData::Health { .. })
            | (WidgetId::CapacityBadge, WidgetData::Capacity { .. })
            | (WidgetId::NodesTable, WidgetData::Nodes(_))
            | (WidgetId::BucketsTable, WidgetData::Buckets(_))
            | (WidgetId::SystemStats, WidgetData::Stats(_))
            | (WidgetId::BucketHeader, WidgetData::BucketHeader(_))
            | (WidgetId::Chart(_), WidgetData::Chart(_))
    )
}

impl TuiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panels in display order.
    pub fn order(&self) -> &[ClusterId] {
        &self.order
    }

    /// Data of the widget at `key`; `None` until it is created and filled.
    pub fn data(&self, key: &WidgetKey) -> Option<&WidgetData> {
        let handle = self.by_key.get(key)?;
        self.slots.get(handle)?.data.as_ref()
    }

    pub fn scale(&self, key: &WidgetKey) -> ChartScale {
        self.by_key
            .get(key)
            .and_then(|h| self.slots.get(h))
            .map(|s| s.scale)
            .unwrap_or_default()
    }

    pub fn widget_count(&self) -> usize {
        self.slots.len()
    }
}

impl RenderSurface for TuiSurface {
    fn mount(&mut self, cluster: &ClusterId) {
        self.mounted.insert(cluster.clone());
    }

    fn unmount(&mut self, cluster: &ClusterId) {
        self.mounted.remove(cluster);
        self.order.retain(|c| c != cluster);
    }

    fn arrange(&mut self, order: &[ClusterId]) {
        self.order = order
            .iter()
            .filter(|c| self.mounted.contains(*c))
            .cloned()
            .collect();
    }

    fn create(&mut self, key: &WidgetKey) -> Result<WidgetHandle, RenderError> {
        if !self.mounted.contains(&key.cluster) {
            return Err(RenderError::TargetMissing(key.clone()));
        }
        if self.by_key.contains_key(key) {
            return Err(RenderError::Rejected {
                key: key.clone(),
                reason: "widget already exists".into(),
            });
        }
        self.next += 1;
        let handle = WidgetHandle(self.next);
        self.slots.insert(
            handle,
            Slot {
                key: key.clone(),
                data: None,
                scale: ChartScale::default(),
            },
        );
        self.by_key.insert(key.clone(), handle);
        Ok(handle)
    }

    fn update(
        &mut self,
        handle: WidgetHandle,
        key: &WidgetKey,
        data: WidgetData,
    ) -> Result<(), RenderError> {
        if !self.mounted.contains(&key.cluster) {
            return Err(RenderError::TargetMissing(key.clone()));
        }
        let slot = self
            .slots
            .get_mut(&handle)
            .ok_or_else(|| RenderError::TargetMissing(key.clone()))?;
        if !accepts(slot.key.widget, &data) {
            return Err(RenderError::Rejected {
                key: key.clone(),
                reason: "data does not fit this widget".into(),
            });
        }
        slot.data = Some(data);
        Ok(())
    }

    fn set_scale(
        &mut self,
        handle: WidgetHandle,
        key: &WidgetKey,
        scale: ChartScale,
    ) -> Result<(), RenderError> {
        let slot = self
            .slots
            .get_mut(&handle)
            .ok_or_else(|| RenderError::TargetMissing(key.clone()))?;
        slot.scale = scale;
        Ok(())
    }

    fn destroy(&mut self, handle: WidgetHandle) {
        if let Some(slot) = self.slots.remove(&handle) {
            self.by_key.remove(&slot.key);
        }
    }

    fn alive(&self, handle: WidgetHandle) -> bool {
        self.slots.contains_key(&handle)
    }
}
