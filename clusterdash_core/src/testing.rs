//! In-memory render surface that records every call. Used by the test
//! suites and handy for running the reconciler headless.

use std::collections::{BTreeSet, HashMap};

use crate::error::RenderError;
use crate::registry::{ChartScale, RenderSurface};
use crate::types::ClusterId;
use crate::view::WidgetData;
use crate::widget::{WidgetHandle, WidgetKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Create(WidgetKey, WidgetHandle),
    Update(WidgetKey, WidgetHandle),
    Scale(WidgetKey, ChartScale),
    Destroy(WidgetHandle),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    next: u64,
    mounted: BTreeSet<ClusterId>,
    order: Vec<ClusterId>,
    live: HashMap<WidgetHandle, WidgetKey>,
    data: HashMap<WidgetHandle, WidgetData>,
    scales: HashMap<WidgetHandle, ChartScale>,
    pub log: Vec<Op>,
    pub destroyed: Vec<WidgetHandle>,
}

impl RecordingSurface {
    pub fn creates(&self, key: &WidgetKey) -> usize {
        self.log
            .iter()
            .filter(|op| matches!(op, Op::Create(k, _) if k == key))
            .count()
    }

    pub fn updates(&self, key: &WidgetKey) -> usize {
        self.log
            .iter()
            .filter(|op| matches!(op, Op::Update(k, _) if k == key))
            .count()
    }

    /// Keys that received an update, in call order.
    pub fn updated_keys(&self) -> Vec<WidgetKey> {
        self.log
            .iter()
            .filter_map(|op| match op {
                Op::Update(k, _) => Some(k.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// Current data of the live widget bound to `key`.
    pub fn data_for(&self, key: &WidgetKey) -> Option<&WidgetData> {
        let handle = self.live.iter().find(|(_, k)| *k == key).map(|(h, _)| *h)?;
        self.data.get(&handle)
    }

    pub fn scale_for(&self, key: &WidgetKey) -> Option<ChartScale> {
        let handle = self.live.iter().find(|(_, k)| *k == key).map(|(h, _)| *h)?;
        self.scales.get(&handle).copied()
    }

    pub fn is_mounted(&self, cluster: &ClusterId) -> bool {
        self.mounted.contains(cluster)
    }

    pub fn order(&self) -> &[ClusterId] {
        &self.order
    }

    /// Simulate the resource disappearing underneath the registry.
    pub fn drop_resource(&mut self, handle: WidgetHandle) {
        self.live.remove(&handle);
        self.data.remove(&handle);
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn mount(&mut self, cluster: &ClusterId) {
        self.mounted.insert(cluster.clone());
    }

    fn unmount(&mut self, cluster: &ClusterId) {
        self.mounted.remove(cluster);
        self.order.retain(|c| c != cluster);
    }

    fn arrange(&mut self, order: &[ClusterId]) {
        self.order = order.to_vec();
    }

    fn create(&mut self, key: &WidgetKey) -> Result<WidgetHandle, RenderError> {
        if !self.mounted.contains(&key.cluster) {
            return Err(RenderError::TargetMissing(key.clone()));
        }
        self.next += 1;
        let handle = WidgetHandle(self.next);
        self.live.insert(handle, key.clone());
        self.log.push(Op::Create(key.clone(), handle));
        Ok(handle)
    }

    fn update(
        &mut self,
        handle: WidgetHandle,
        key: &WidgetKey,
        data: WidgetData,
    ) -> Result<(), RenderError> {
        if !self.mounted.contains(&key.cluster) || !self.live.contains_key(&handle) {
            return Err(RenderError::TargetMissing(key.clone()));
        }
        self.data.insert(handle, data);
        self.log.push(Op::Update(key.clone(), handle));
        Ok(())
    }

    fn set_scale(
        &mut self,
        handle: WidgetHandle,
        key: &WidgetKey,
        scale: ChartScale,
    ) -> Result<(), RenderError> {
        if !self.live.contains_key(&handle) {
            return Err(RenderError::TargetMissing(key.clone()));
        }
        self.scales.insert(handle, scale);
        self.log.push(Op::Scale(key.clone(), scale));
        Ok(())
    }

    fn destroy(&mut self, handle: WidgetHandle) {
        self.live.remove(&handle);
        self.data.remove(&handle);
        self.scales.remove(&handle);
        self.destroyed.push(handle);
        self.log.push(Op::Destroy(handle));
    }

    fn alive(&self, handle: WidgetHandle) -> bool {
        self.live.contains_key(&handle)
    }
}
