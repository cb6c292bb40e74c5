//! Export module - clip note collection and report rendering
//!
//! - `pipeline`: merge source + sequence stores into `ClipNotes`
//! - `report`: render `ClipNotes` as the plain-text report

pub mod pipeline;
pub mod report;

pub use pipeline::{ClipNotes, DRAWING_PLACEHOLDER, ExportPipeline, FrameNotes, normalize_note};
pub use report::{ExportArtifacts, REPORT_TIME_FORMAT, ReportContext, render_report, report_timestamp};
