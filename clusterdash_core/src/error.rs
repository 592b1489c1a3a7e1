//! Error types for snapshot decoding and rendering.

use thiserror::Error;

use crate::widget::WidgetKey;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("entry {position} has no clusterId")]
    MissingClusterId { position: usize },
    #[error("entry {position} could not be decoded: {reason}")]
    Decode { position: usize, reason: String },
}

/// Raised by a [`RenderSurface`](crate::registry::RenderSurface). The
/// registry logs these and never lets them reach the polling loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("render target missing for {0}")]
    TargetMissing(WidgetKey),
    #[error("render surface rejected {key}: {reason}")]
    Rejected { key: WidgetKey, reason: String },
}
