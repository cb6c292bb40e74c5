//! ReviewOrchestrator - report and export workflows over one clip
//!
//! Export steps, in order:
//! 1. check annotations (narrowed view, blank-frame cleanup, marks); none → abort
//! 2. create `<root>/<timestamp>_<name>/` (hard failure)
//! 3. save session snapshot `<timestamp>_<name>.<host session extension>` (best effort)
//! 4. create `frames/` (best effort)
//! 5. write `<timestamp>_<name>_notes.txt` (best effort)
//! 6. copy the report to the clipboard (best effort)
//! 7. export annotated frame images under a narrowed view (best effort)
//!
//! The export fails overall only when neither the report file nor a single
//! frame image was produced.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};

use super::names::{export_name, folder_timestamp};
use super::{ReviewError, ReviewResult};
use crate::config::NotesSettings;
use crate::entities::AnnotationStore;
use crate::export::{ClipNotes, ExportArtifacts, ExportPipeline, ReportContext, render_report, report_timestamp};
use crate::host::{ClipFrameMapper, ClipRef, ReviewHost, ViewGuard};

/// Sub-folder holding exported frame images.
pub const FRAMES_DIR: &str = "frames";

/// Everything an export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub folder: PathBuf,
    pub report: String,
    pub report_path: Option<PathBuf>,
    pub session_path: Option<PathBuf>,
    pub frames_folder: Option<PathBuf>,
    pub frames_exported: usize,
}

pub struct ReviewOrchestrator<'a> {
    settings: &'a NotesSettings,
}

impl<'a> ReviewOrchestrator<'a> {
    pub fn new(settings: &'a NotesSettings) -> Self {
        Self { settings }
    }

    /// Clip under a global frame.
    pub fn clip_at<H: ReviewHost + ?Sized>(host: &H, frame: i32) -> ReviewResult<ClipRef> {
        host.clip_at_frame(frame).ok_or(ReviewError::NoSource { frame })
    }

    /// Read-only scan of both stores of `clip`.
    pub fn scan<H: ReviewHost + ?Sized>(&self, host: &H, clip: &ClipRef) -> ClipNotes {
        let sequence = host.sequence_paint_node();
        let mapper = ClipFrameMapper::new(host, clip);
        ExportPipeline::new(host, &mapper)
            .source_node(clip.paint_node.as_deref())
            .sequence_node(sequence.as_deref())
            .collect()
    }

    /// Scan, clear blank frames and mark annotated frames in the clip view.
    ///
    /// The view is narrowed to the clip for the duration and restored on return.
    pub fn check_annotations<H: ReviewHost + ?Sized>(&self, host: &mut H, clip: &ClipRef) -> ReviewResult<ClipNotes> {
        let notes = {
            let mut view = ViewGuard::narrow(host, &clip.node)?;
            let notes = self.scan(&*view, clip);

            let mut cleared = 0;
            for (node, frame) in &notes.cleanup {
                if AnnotationStore::new(node.as_str()).clear_frame(&mut *view, *frame) {
                    cleared += 1;
                }
            }
            if cleared > 0 {
                info!("Removed {} blank frame(s) on {}", cleared, clip.node);
            }

            for frame in notes.frame_numbers() {
                view.mark_frame(frame, true);
            }
            notes
        };

        if notes.is_empty() {
            return Err(ReviewError::NoAnnotations);
        }
        debug!("{} annotated frame(s) on {}", notes.frames.len(), clip.node);
        Ok(notes)
    }

    fn context(clip: &ClipRef, now: &DateTime<Local>) -> ReportContext {
        ReportContext::new(clip.display_name.as_str(), report_timestamp(now), clip.media.path.as_path())
    }

    /// Report only: render and copy to the clipboard, nothing on disk.
    pub fn copy_report<H: ReviewHost + ?Sized>(
        &self,
        host: &mut H,
        clip: &ClipRef,
        now: &DateTime<Local>,
    ) -> ReviewResult<String> {
        let notes = self.check_annotations(host, clip)?;
        let report = render_report(&notes, &Self::context(clip, now), &ExportArtifacts::default());
        host.copy_to_clipboard(&report)?;
        info!("Report for {} copied ({} frame(s))", clip.display_name, notes.frames.len());
        Ok(report)
    }

    /// Full export into a timestamped folder.
    pub fn export<H: ReviewHost + ?Sized>(
        &self,
        host: &mut H,
        clip: &ClipRef,
        now: &DateTime<Local>,
    ) -> ReviewResult<ExportOutcome> {
        let notes = self.check_annotations(host, clip)?;

        let name = export_name(&clip.display_name);
        let base = format!("{}_{}", folder_timestamp(now), name);
        let root = self
            .settings
            .export_root
            .clone()
            .unwrap_or_else(|| clip.media.folder());
        let folder = root.join(&base);

        fs::create_dir_all(&folder).map_err(|source| ReviewError::Io {
            path: folder.clone(),
            source,
        })?;
        info!("Export folder: {}", folder.display());

        let session_path = folder.join(format!("{}.{}", base, host.session_extension()));
        let session_path = match host.save_session(&session_path) {
            Ok(()) => Some(session_path),
            Err(e) => {
                warn!("Session not saved: {:#}", e);
                None
            }
        };

        let frames_folder = folder.join(FRAMES_DIR);
        let frames_folder = match fs::create_dir_all(&frames_folder) {
            Ok(()) => Some(frames_folder),
            Err(e) => {
                warn!("Failed to create {}: {}", frames_folder.display(), e);
                None
            }
        };

        let artifacts = ExportArtifacts {
            frames_folder: frames_folder.clone(),
            session_path: session_path.clone(),
        };
        let report = render_report(&notes, &Self::context(clip, now), &artifacts);

        let report_path = folder.join(format!("{}_notes.txt", base));
        let report_path = match fs::write(&report_path, &report) {
            Ok(()) => {
                info!("Report written: {}", report_path.display());
                Some(report_path)
            }
            Err(e) => {
                error!("Failed to write {}: {}", report_path.display(), e);
                None
            }
        };

        if let Err(e) = host.copy_to_clipboard(&report) {
            warn!("Report not copied to clipboard: {:#}", e);
        }

        let frames_exported = match &frames_folder {
            Some(dir) => self.export_images(host, clip, &notes, &name, dir),
            None => 0,
        };

        if report_path.is_none() && frames_exported == 0 {
            return Err(ReviewError::ExportFailed { folder });
        }

        Ok(ExportOutcome {
            folder,
            report,
            report_path,
            session_path,
            frames_folder,
            frames_exported,
        })
    }

    fn export_images<H: ReviewHost + ?Sized>(
        &self,
        host: &mut H,
        clip: &ClipRef,
        notes: &ClipNotes,
        name: &str,
        dir: &Path,
    ) -> usize {
        let pattern = dir.join(format!("{}.####.{}", name, self.settings.frame_extension));
        let frames = notes.frame_numbers();

        let result = ViewGuard::narrow(host, &clip.node).and_then(|mut view| view.export_frames(&frames, &pattern));
        match result {
            Ok(count) => {
                info!("Exported {} frame image(s) to {}", count, dir.display());
                count
            }
            Err(e) => {
                warn!("Frame image export failed: {:#}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ElementKind, Label, PropertyStore, TextAttrs};
    use crate::review::add_note;
    use crate::session::{SEQUENCE_NODE, Session, SessionSource};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap()
    }

    /// Clip `a` covers global 1..=100 (native 1001..), clip `b` global 101..=200 (native 1..).
    fn session(root: &Path) -> Session {
        let mut s = Session::new();
        s.add_source(SessionSource::new("a", root.join("shots/a/plate.1001-1100@@@@.exr"), 1001, 100))
            .unwrap();
        s.add_source(SessionSource::new("b", root.join("shots/b/clip.mov"), 1, 100))
            .unwrap();
        s
    }

    fn settings(root: &Path) -> NotesSettings {
        NotesSettings {
            export_root: Some(root.join("exports")),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_annotations_cleans_and_marks() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let settings = settings(tmp.path());
        add_note(&mut s, &settings, "fix edge", 3).unwrap();

        // Blank note straight in the store
        let blank = TextAttrs::new("   ", [0.0, 0.0], [1.0; 4], 1007);
        AnnotationStore::new("a_paint").create_element(&mut s, 1007, Label::Note, ElementKind::Text, Some(&blank));

        let orchestrator = ReviewOrchestrator::new(&settings);
        let clip = ReviewOrchestrator::clip_at(&s, 3).unwrap();
        let notes = orchestrator.check_annotations(&mut s, &clip).unwrap();

        assert_eq!(notes.frame_numbers(), vec![1003]);
        assert!(!s.exists("a_paint", "frame:1007.order"));
        assert_eq!(s.marks("a"), vec![1003]);
        assert_eq!(s.view_node(), SEQUENCE_NODE);
    }

    #[test]
    fn test_no_annotations_aborts_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let settings = settings(tmp.path());
        let orchestrator = ReviewOrchestrator::new(&settings);
        let clip = ReviewOrchestrator::clip_at(&s, 150).unwrap();

        let err = orchestrator.export(&mut s, &clip, &now()).unwrap_err();
        assert!(matches!(err, ReviewError::NoAnnotations));
        assert!(err.is_precondition());
        assert!(!tmp.path().join("exports").exists());
        assert_eq!(s.view_node(), SEQUENCE_NODE);
        assert!(s.clipboard().is_empty());
    }

    #[test]
    fn test_copy_report_drawing_only_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let settings = settings(tmp.path());
        // Drawing tool stroke on the sequence at global 150 → clip b frame 50
        AnnotationStore::new("defaultSequence_paint").create_element(
            &mut s,
            150,
            Label::Other("user".into()),
            ElementKind::Pen,
            None,
        );

        let orchestrator = ReviewOrchestrator::new(&settings);
        let clip = ReviewOrchestrator::clip_at(&s, 150).unwrap();
        let report = orchestrator.copy_report(&mut s, &clip, &now()).unwrap();

        assert!(report.starts_with("Notes on clip.mov\n2025_06_15 10:30\n\n---\n\nFrame 50\n- *see annotated frame\n\n---\n\nsource file:\n"));
        assert_eq!(s.clipboard(), report);
        assert!(!tmp.path().join("exports").exists());
    }

    #[test]
    fn test_export_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let settings = settings(tmp.path());
        add_note(&mut s, &settings, "hello", 10).unwrap();
        add_note(&mut s, &settings, "grade is too warm", 2).unwrap();

        let orchestrator = ReviewOrchestrator::new(&settings);
        let clip = ReviewOrchestrator::clip_at(&s, 10).unwrap();
        let outcome = orchestrator.export(&mut s, &clip, &now()).unwrap();

        let folder = tmp.path().join("exports").join("2025_06_15_1030_plate");
        assert_eq!(outcome.folder, folder);
        assert_eq!(outcome.report_path, Some(folder.join("2025_06_15_1030_plate_notes.txt")));
        assert_eq!(outcome.session_path, Some(folder.join("2025_06_15_1030_plate.json")));
        assert_eq!(outcome.frames_exported, 2);

        let written = fs::read_to_string(folder.join("2025_06_15_1030_plate_notes.txt")).unwrap();
        assert_eq!(written, outcome.report);
        assert_eq!(s.clipboard(), outcome.report);
        assert!(written.starts_with("Notes on plate.####.exr\n2025_06_15 10:30\n\n---\n\nFrame 1002\n- grade is too warm\n\nFrame 1010\n- hello\n\n---\n\nannotations:\n"));
        assert!(written.contains("session:\n"));
        assert!(written.ends_with("shots/a\n"));

        let manifest = fs::read_to_string(folder.join("frames").join("frames.manifest")).unwrap();
        assert!(manifest.starts_with("plate.1002.jpg\ta\t1002\n"));
        assert!(Session::from_json(folder.join("2025_06_15_1030_plate.json")).is_ok());
        assert_eq!(s.view_node(), SEQUENCE_NODE);
    }

    #[test]
    fn test_export_defaults_to_source_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let settings = NotesSettings::default();
        add_note(&mut s, &settings, "x", 120).unwrap();

        let orchestrator = ReviewOrchestrator::new(&settings);
        let clip = ReviewOrchestrator::clip_at(&s, 120).unwrap();
        let outcome = orchestrator.export(&mut s, &clip, &now()).unwrap();
        assert_eq!(outcome.folder, tmp.path().join("shots/b/2025_06_15_1030_clip"));
    }

    #[test]
    fn test_export_folder_failure_is_hard() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();
        let settings = NotesSettings {
            export_root: Some(blocker),
            ..Default::default()
        };
        add_note(&mut s, &settings, "x", 10).unwrap();

        let orchestrator = ReviewOrchestrator::new(&settings);
        let clip = ReviewOrchestrator::clip_at(&s, 10).unwrap();
        let err = orchestrator.export(&mut s, &clip, &now()).unwrap_err();
        assert!(matches!(err, ReviewError::Io { .. }));
        assert!(!err.is_precondition());
        assert!(s.clipboard().is_empty());
    }

    /// Annotated clip `a` plus the export folder it will land in.
    fn annotated(tmp: &Path) -> (Session, NotesSettings, PathBuf) {
        let mut s = session(tmp);
        let settings = settings(tmp);
        add_note(&mut s, &settings, "hello", 10).unwrap();
        let folder = tmp.join("exports").join("2025_06_15_1030_plate");
        (s, settings, folder)
    }

    // A directory squatting on a file path makes the write fail
    fn block_report(folder: &Path) {
        fs::create_dir_all(folder.join("2025_06_15_1030_plate_notes.txt")).unwrap();
    }

    fn block_frames(folder: &Path) {
        fs::create_dir_all(folder.join(FRAMES_DIR).join("frames.manifest")).unwrap();
    }

    #[test]
    fn test_export_survives_report_write_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut s, settings, folder) = annotated(tmp.path());
        block_report(&folder);

        let clip = ReviewOrchestrator::clip_at(&s, 10).unwrap();
        let outcome = ReviewOrchestrator::new(&settings).export(&mut s, &clip, &now()).unwrap();
        assert_eq!(outcome.report_path, None);
        assert_eq!(outcome.frames_exported, 1);
        assert_eq!(s.clipboard(), outcome.report);
    }

    #[test]
    fn test_export_survives_frame_export_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut s, settings, folder) = annotated(tmp.path());
        block_frames(&folder);

        let clip = ReviewOrchestrator::clip_at(&s, 10).unwrap();
        let outcome = ReviewOrchestrator::new(&settings).export(&mut s, &clip, &now()).unwrap();
        assert_eq!(outcome.frames_exported, 0);
        let report_path = outcome.report_path.unwrap();
        assert_eq!(fs::read_to_string(report_path).unwrap(), outcome.report);
        assert_eq!(s.view_node(), SEQUENCE_NODE);
    }

    #[test]
    fn test_export_fails_without_report_and_frames() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut s, settings, folder) = annotated(tmp.path());
        block_report(&folder);
        block_frames(&folder);

        let clip = ReviewOrchestrator::clip_at(&s, 10).unwrap();
        let err = ReviewOrchestrator::new(&settings).export(&mut s, &clip, &now()).unwrap_err();
        match &err {
            ReviewError::ExportFailed { folder: failed } => assert_eq!(failed, &folder),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!err.is_precondition());
        assert_eq!(s.view_node(), SEQUENCE_NODE);
    }

    #[test]
    fn test_scan_is_read_only() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let settings = settings(tmp.path());
        let blank = TextAttrs::new("", [0.0, 0.0], [1.0; 4], 1001);
        AnnotationStore::new("a_paint").create_element(&mut s, 1001, Label::Note, ElementKind::Text, Some(&blank));

        let clip = ReviewOrchestrator::clip_at(&s, 1).unwrap();
        let notes = ReviewOrchestrator::new(&settings).scan(&s, &clip);
        assert!(notes.is_empty());
        assert_eq!(notes.cleanup, vec![("a_paint".to_string(), 1001)]);
        assert!(s.exists("a_paint", "frame:1001.order"));
    }
}
