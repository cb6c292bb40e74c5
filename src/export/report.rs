//! Plain-text review report
//!
//! Layout:
//!
//! ```text
//! Notes on <display name>
//! <YYYY_MM_DD HH:MM>
//!
//! ---
//!
//! Frame <n>
//! - <note>
//!
//! ---
//!
//! annotations:       (only when frame images were exported)
//! <frames folder>
//!
//! session:           (only when the session was saved)
//! <session path>
//!
//! ---                (only after at least one artifact block)
//!
//! source file:
//! <path>
//!
//! source folder:
//! <folder>
//! ```
//!
//! Names and paths are printed in canonical sequence notation. The timestamp
//! is an input, so rendering the same notes twice gives the same text.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use super::pipeline::ClipNotes;
use crate::utils::sequences::normalize_sequence_notation;

/// Report header timestamp format.
pub const REPORT_TIME_FORMAT: &str = "%Y_%m_%d %H:%M";

pub fn report_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(REPORT_TIME_FORMAT).to_string()
}

/// Clip identity printed around the notes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub display_name: String,
    pub timestamp: String,
    pub source_path: PathBuf,
}

impl ReportContext {
    pub fn new(display_name: impl Into<String>, timestamp: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            timestamp: timestamp.into(),
            source_path: source_path.into(),
        }
    }

    fn source_folder(&self) -> &Path {
        self.source_path.parent().unwrap_or(Path::new(""))
    }
}

/// Files produced next to the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportArtifacts {
    pub frames_folder: Option<PathBuf>,
    pub session_path: Option<PathBuf>,
}

impl ExportArtifacts {
    pub fn is_empty(&self) -> bool {
        self.frames_folder.is_none() && self.session_path.is_none()
    }
}

fn display_path(path: &Path) -> String {
    normalize_sequence_notation(&path.display().to_string())
}

/// Render the report text. Always ends with a newline.
pub fn render_report(notes: &ClipNotes, ctx: &ReportContext, artifacts: &ExportArtifacts) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Notes on {}", normalize_sequence_notation(&ctx.display_name));
    let _ = writeln!(out, "{}", ctx.timestamp);
    out.push_str("\n---\n\n");

    for frame in &notes.frames {
        let _ = writeln!(out, "Frame {}", frame.frame);
        for line in &frame.lines {
            let _ = writeln!(out, "{}", line);
        }
        out.push('\n');
    }

    out.push_str("---\n\n");

    if let Some(folder) = &artifacts.frames_folder {
        let _ = writeln!(out, "annotations:\n{}\n", display_path(folder));
    }
    if let Some(session) = &artifacts.session_path {
        let _ = writeln!(out, "session:\n{}\n", display_path(session));
    }
    if !artifacts.is_empty() {
        out.push_str("---\n\n");
    }

    let _ = writeln!(out, "source file:\n{}\n", display_path(&ctx.source_path));
    let _ = writeln!(out, "source folder:\n{}", display_path(ctx.source_folder()));

    out
}
