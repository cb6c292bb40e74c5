//! Image sequence notation normalization
//!
//! **Why**: Hosts spell the same sequence many ways: `shot.1-100#.exr`,
//! `shot.1001-1100@@@@.exr`, `shot.%04d.exr`, `shot.0001-0100.exr`.
//! Reports must print one spelling so the same sequence always reads the same.
//!
//! **Used by**: report rendering (display name, source file, source folder),
//! export naming
//!
//! # Canonical form
//!
//! One `#` per padded digit: `shot.####.exr`.
//! - frame ranges in front of padding markers are dropped (`1-100#` → `#`)
//! - `%0Nd` → N hashes, `%d` → `#`
//! - `@` runs → the same number of `#`
//! - dotted ranges without markers (`.0001-0100.`) → hashes of the start width
//!
//! Already canonical strings pass through unchanged, so the rewrite is idempotent.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// Frame range directly followed by a padding marker
    static ref RANGE_MARKER_RE: Regex =
        Regex::new(r"\d+-\d+(?:x\d+)?([#@]+|%0?\d*d)").expect("valid regex");
    /// printf-style width specifier
    static ref PRINTF_RE: Regex = Regex::new(r"%0?(\d*)d").expect("valid regex");
    /// Runs of `@` padding markers
    static ref AT_RUN_RE: Regex = Regex::new(r"@+").expect("valid regex");
    /// Bare numeric range between dots: `.1001-1100.`
    static ref DOTTED_RANGE_RE: Regex = Regex::new(r"\.(\d+)-(\d+)\.").expect("valid regex");
}

/// Rewrite every sequence pattern in `s` to hash padding.
pub fn normalize_sequence_notation(s: &str) -> String {
    let s = RANGE_MARKER_RE.replace_all(s, |caps: &Captures<'_>| caps[1].to_string());

    let s = PRINTF_RE.replace_all(&s, |caps: &Captures<'_>| {
        let width = caps[1].parse::<usize>().unwrap_or(1).max(1);
        "#".repeat(width)
    });

    let s = AT_RUN_RE.replace_all(&s, |caps: &Captures<'_>| "#".repeat(caps[0].len()));

    let s = DOTTED_RANGE_RE.replace_all(&s, |caps: &Captures<'_>| {
        format!(".{}.", "#".repeat(caps[1].len()))
    });

    s.into_owned()
}

/// True if `s` carries any sequence notation (after normalization it holds `#`).
pub fn is_sequence_pattern(s: &str) -> bool {
    normalize_sequence_notation(s).contains('#')
}

/// Strip hash padding and the separators around it from a file stem:
/// `shot.####` → `shot`, `plate_####_v2` → `plate_v2`.
pub fn strip_padding(stem: &str) -> String {
    lazy_static! {
        static ref PADDING_RE: Regex = Regex::new(r"[._-]?#+").expect("valid regex");
    }
    PADDING_RE.replace_all(stem, "").into_owned()
}
