//! Review workflows
//!
//! - `names`: file and folder naming for exports
//! - `notes`: add a note to a frame
//! - `orchestrator`: check / copy-report / export over one clip

pub mod names;
pub mod notes;
pub mod orchestrator;

use std::path::PathBuf;

use thiserror::Error;

use crate::entities::PropertyError;

pub use names::{folder_timestamp, sanitize_name};
pub use notes::add_note;
pub use orchestrator::{ExportOutcome, ReviewOrchestrator};

/// Review workflow errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("No source at frame {frame}")]
    NoSource { frame: i32 },
    #[error("No paint node found")]
    NoStore,
    #[error("No annotations found")]
    NoAnnotations,
    #[error("Empty note - cancelled")]
    EmptyNote,
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Export produced no report and no frames in {}", .folder.display())]
    ExportFailed { folder: PathBuf },
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl ReviewError {
    /// Nothing to do: show the message and stop, no state was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ReviewError::NoSource { .. } | ReviewError::NoStore | ReviewError::NoAnnotations | ReviewError::EmptyNote
        )
    }
}

pub type ReviewResult<T> = Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_split() {
        assert!(ReviewError::NoSource { frame: 3 }.is_precondition());
        assert!(ReviewError::EmptyNote.is_precondition());
        assert_eq!(ReviewError::NoSource { frame: 3 }.to_string(), "No source at frame 3");
        assert!(!ReviewError::ExportFailed { folder: "/x".into() }.is_precondition());
        assert!(!ReviewError::Host(anyhow::anyhow!("gone")).is_precondition());
    }
}
