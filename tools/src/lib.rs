//! Demo host, observer and inspection tooling for scenecast.
//!
//! - Inspect captured frames field by field, with per-kind byte shares
//! - Capture frames received by an observer to numbered files
//! - Drive a small animated demo scene from a host
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what went over the wire.

mod capture;
mod config;
mod demo;
mod inspect;

pub use capture::{
    collect_entries, sort_entries, EntrySort, FrameCapture, FrameEntry, RecordingTransport,
};
pub use config::ToolConfig;
pub use demo::{demo_assets, DemoScene};
pub use inspect::{
    format_pretty, inspect_frame, FieldReport, FrameReport, KindSummary, MessageReport,
};
