//! Shared types for chat-timeline.
//!
//! Holds the message record model and input column schema, the error
//! taxonomy, command-line settings and small formatting helpers used by the
//! data and UI crates.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
