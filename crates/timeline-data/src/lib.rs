//! Data layer for chat-timeline.
//!
//! Discovers and loads serialized message tables, filters them, ranks
//! conversation partners by message volume and runs the shared
//! load → filter → rank/restrict pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use timeline_core as core;
