//! Export naming: `<timestamp>_<name>` folders and files.

use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::utils::sequences::{normalize_sequence_notation, strip_padding};

/// Export folder timestamp format.
pub const FOLDER_TIME_FORMAT: &str = "%Y_%m_%d_%H%M";

pub fn folder_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(FOLDER_TIME_FORMAT).to_string()
}

/// File-system safe name: reserved and control characters become `_`,
/// surrounding dots and spaces are trimmed, nothing left gives `untitled`.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Export base name of a clip: file stem of the canonical display name,
/// padding removed, sanitized.
pub fn export_name(display_name: &str) -> String {
    let canonical = normalize_sequence_notation(display_name);
    let stem = Path::new(&canonical)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(canonical.clone());
    sanitize_name(&strip_padding(&stem))
}
