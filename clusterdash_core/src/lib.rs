//! Snapshot-to-widget reconciliation for the cluster dashboard.
//!
//! Everything here is rendering-agnostic: the terminal front end plugs in
//! through [`RenderSurface`].

pub mod activation;
pub mod charts;
pub mod error;
pub mod reconciler;
pub mod registry;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod throttle;
pub mod transform;
pub mod types;
pub mod view;
pub mod widget;

pub use charts::ChartKind;
pub use error::{RenderError, SnapshotError};
pub use reconciler::{Banner, ClusterTarget, IngestReport, Reconciler, POLL_INTERVAL, THROTTLE_WINDOW};
pub use registry::{ChartScale, RenderSurface, WidgetRegistry};
pub use store::{Change, Diff, FieldSet, SnapshotStore};
pub use types::{BatchEntry, ClusterBatch, ClusterId, ClusterSnapshot, Health};
pub use view::WidgetData;
pub use widget::{Field, Phase, Tab, WidgetGroup, WidgetHandle, WidgetId, WidgetKey};
