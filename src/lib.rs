//! PLAYA NOTES - frame-anchored review notes
//!
//! Notes live on host paint nodes as an append-only element log. The export
//! side merges the clip's own notes with drawings made on the sequence into one
//! deduplicated report.

// Data model
pub mod entities;
pub mod text_layout;

// Host boundary
pub mod host;
pub mod session;

// Workflows
pub mod export;
pub mod review;

// App modules
pub mod cli;
pub mod config;
pub mod utils;

pub use entities::{AnnotationStore, AttrValue, Attrs, ElementName, PropertyGraph, PropertyStore};
pub use export::{ClipNotes, ExportPipeline, render_report};
pub use host::{ClipRef, FrameMapper, MediaInfo, ReviewHost, ViewGuard};
pub use review::{ReviewError, ReviewOrchestrator};
pub use session::Session;
pub use text_layout::TextLayout;
