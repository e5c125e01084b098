//! Terminal plotting layer for chat-timeline.
//!
//! Turns reduced message tables into per-partner histograms or kernel density
//! curves and draws them with [`ratatui`] until the user quits.

pub mod app;
pub mod chart_view;
pub mod density;
pub mod histogram;
pub mod themes;

pub use timeline_core as core;
