//! Owns every widget handle and its lifecycle phase.
//!
//! The registry is the single writer of the handle map. Rendering failures
//! stop here: they are logged and reported as a skipped operation so the
//! polling loop never sees them.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::RenderError;
use crate::types::ClusterId;
use crate::view::WidgetData;
use crate::widget::{Lifecycle, Phase, WidgetHandle, WidgetKey, WidgetState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartScale {
    #[default]
    Linear,
    Logarithmic,
}

impl ChartScale {
    pub fn toggled(self) -> Self {
        match self {
            ChartScale::Linear => ChartScale::Logarithmic,
            ChartScale::Logarithmic => ChartScale::Linear,
        }
    }
}

/// The rendering collaborator: whatever actually draws widgets.
pub trait RenderSurface {
    /// Lay out an (empty) panel for a cluster.
    fn mount(&mut self, cluster: &ClusterId);
    /// Tear the panel down. Handles under it are destroyed separately.
    fn unmount(&mut self, cluster: &ClusterId);
    /// Display order of the mounted panels.
    fn arrange(&mut self, order: &[ClusterId]);
    /// Build the underlying widget. Fails with `TargetMissing` when the
    /// cluster's panel is gone.
    fn create(&mut self, key: &WidgetKey) -> Result<WidgetHandle, RenderError>;
    /// Replace the widget's data in one step.
    fn update(
        &mut self,
        handle: WidgetHandle,
        key: &WidgetKey,
        data: WidgetData,
    ) -> Result<(), RenderError>;
    fn set_scale(
        &mut self,
        handle: WidgetHandle,
        key: &WidgetKey,
        scale: ChartScale,
    ) -> Result<(), RenderError>;
    fn destroy(&mut self, handle: WidgetHandle);
    /// Whether `handle` still refers to a live rendering resource.
    fn alive(&self, handle: WidgetHandle) -> bool;
}

pub struct WidgetRegistry<S> {
    surface: S,
    states: BTreeMap<WidgetKey, WidgetState>,
}

impl<S: RenderSurface> WidgetRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            states: BTreeMap::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Track `key` as Uncreated if it is not tracked yet.
    pub fn register(&mut self, key: WidgetKey) {
        self.states.entry(key).or_insert_with(WidgetState::uncreated);
    }

    /// Park an Uncreated widget whose tab is hidden. Live widgets stay Live.
    pub fn defer(&mut self, key: &WidgetKey) {
        if let Some(state) = self.states.get_mut(key) {
            if state.lifecycle == Lifecycle::Uncreated {
                state.lifecycle = Lifecycle::Deferred;
            }
        }
    }

    /// Return the live handle for `key`, building it if needed. A handle
    /// whose resource has vanished is destroyed before its replacement is
    /// built, so a key never owns two resources.
    pub fn ensure(&mut self, key: &WidgetKey) -> Option<WidgetHandle> {
        let state = self
            .states
            .entry(key.clone())
            .or_insert_with(WidgetState::uncreated);
        if let Lifecycle::Live(handle) = state.lifecycle {
            if self.surface.alive(handle) {
                return Some(handle);
            }
            debug!(widget = %key, "rebuilding widget whose resource went away");
            self.surface.destroy(handle);
            state.lifecycle = Lifecycle::Uncreated;
        }
        match self.surface.create(key) {
            Ok(handle) => {
                state.lifecycle = Lifecycle::Live(handle);
                debug!(widget = %key, "created");
                Some(handle)
            }
            Err(e) => {
                warn!("skipping widget: {e}");
                None
            }
        }
    }

    /// Push new data into a Live widget. Returns whether it was applied;
    /// never fails outward.
    pub fn update(&mut self, key: &WidgetKey, data: WidgetData, version: u64) -> bool {
        let Some(state) = self.states.get_mut(key) else {
            debug!(widget = %key, "update for untracked widget ignored");
            return false;
        };
        let Lifecycle::Live(handle) = state.lifecycle else {
            debug!(widget = %key, phase = ?state.phase(), "update for non-live widget ignored");
            return false;
        };
        match self.surface.update(handle, key, data) {
            Ok(()) => {
                state.last_applied_version = version;
                true
            }
            Err(e) => {
                warn!("skipping update: {e}");
                false
            }
        }
    }

    /// Destroy the handle (if any) and forget the widget entirely.
    pub fn release(&mut self, key: &WidgetKey) {
        if let Some(state) = self.states.remove(key) {
            if let Lifecycle::Live(handle) = state.lifecycle {
                self.surface.destroy(handle);
            }
            debug!(widget = %key, "released");
        }
    }

    /// Release every widget under `cluster`; returns how many were tracked.
    pub fn release_cluster(&mut self, cluster: &ClusterId) -> usize {
        let keys = self.keys_for(cluster);
        for key in &keys {
            self.release(key);
        }
        keys.len()
    }

    /// Apply `scale` to every live chart under `cluster`.
    pub fn set_scale(&mut self, cluster: &ClusterId, scale: ChartScale) -> usize {
        let mut applied = 0;
        for (key, state) in self.states.iter().filter(|(k, _)| &k.cluster == cluster) {
            let (true, Lifecycle::Live(handle)) = (key.widget.is_chart(), state.lifecycle) else {
                continue;
            };
            match self.surface.set_scale(handle, key, scale) {
                Ok(()) => applied += 1,
                Err(e) => warn!("skipping scale change: {e}"),
            }
        }
        applied
    }

    pub fn state(&self, key: &WidgetKey) -> Option<&WidgetState> {
        self.states.get(key)
    }

    pub fn phase(&self, key: &WidgetKey) -> Option<Phase> {
        self.states.get(key).map(WidgetState::phase)
    }

    pub fn handle(&self, key: &WidgetKey) -> Option<WidgetHandle> {
        self.states.get(key).and_then(WidgetState::handle)
    }

    pub fn keys_for(&self, cluster: &ClusterId) -> Vec<WidgetKey> {
        self.states
            .keys()
            .filter(|k| &k.cluster == cluster)
            .cloned()
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| s.phase() == Phase::Live)
            .count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
