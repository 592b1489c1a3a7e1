//! UI module root: drawing functions for the individual panels.

pub mod buckets;
pub mod charts;
pub mod clusters;
pub mod header;
pub mod nodes;
pub mod stats;
pub mod tabs;
pub mod theme;
pub mod util;
