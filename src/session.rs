//! Headless review session
//!
//! **Why**: The workflows only talk to `ReviewHost`. `Session` implements it
//! over plain data (property graph, sources on a sequence timeline, marks)
//! and persists as JSON, so notes can be added, reported and exported from the
//! command line and exercised in tests without a running review application.
//!
//! # Timeline
//!
//! Sources are laid out back to back on the sequence starting at global frame 1.
//! A source covering `length` frames from native frame `start` maps global
//! frame `g` to `start + (g - first_global)`.
//!
//! # Nodes
//!
//! - `defaultSequence`: the sequence view node
//! - `defaultSequence_paint`: sequence paint node (global frames)
//! - `<source>` / `<source>_paint`: per source view node and paint node

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::entities::{AttrValue, PropertyError, PropertyGraph, PropertyStore};
use crate::host::{ClipRef, MediaInfo, ReviewHost};

/// Sequence view node name.
pub const SEQUENCE_NODE: &str = "defaultSequence";

/// Paint node name paired with a view or source node.
pub fn paint_node_name(node: &str) -> String {
    format!("{}_paint", node)
}

/// One source placed on the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSource {
    /// Node name (unique in the session)
    pub node: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// First native frame
    #[serde(default = "default_start")]
    pub start: i32,
    /// Frame count on the timeline
    pub length: i32,
}

fn default_start() -> i32 {
    1
}

fn default_view() -> String {
    SEQUENCE_NODE.to_string()
}

impl SessionSource {
    pub fn new(node: impl Into<String>, path: impl Into<PathBuf>, start: i32, length: i32) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            node: node.into(),
            display_name,
            path,
            width: 1920,
            height: 1080,
            start,
            length,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    fn contains_native(&self, frame: i32) -> bool {
        frame >= self.start && frame < self.start + self.length
    }
}

/// Serializable headless host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    properties: PropertyGraph,
    #[serde(default)]
    sources: Vec<SessionSource>,
    #[serde(default = "default_view")]
    view_node: String,
    #[serde(default = "default_start")]
    current_frame: i32,
    /// Marked frames per view node
    #[serde(default)]
    marks: BTreeMap<String, BTreeSet<i32>>,
    #[serde(default)]
    clipboard: String,
    /// Mirror clipboard copies to this file
    #[serde(skip)]
    clipboard_file: Option<PathBuf>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Empty session with the sequence nodes registered.
    pub fn new() -> Self {
        let mut properties = PropertyGraph::new();
        properties.add_node(SEQUENCE_NODE);
        properties.add_node(paint_node_name(SEQUENCE_NODE));
        Self {
            properties,
            sources: Vec::new(),
            view_node: default_view(),
            current_frame: 1,
            marks: BTreeMap::new(),
            clipboard: String::new(),
            clipboard_file: None,
        }
    }

    /// Append a source to the end of the sequence, with its paint node.
    pub fn add_source(&mut self, source: SessionSource) -> Result<()> {
        if self.sources.iter().any(|s| s.node == source.node) || source.node == SEQUENCE_NODE {
            bail!("Duplicate source node: {}", source.node);
        }
        if source.length <= 0 {
            bail!("Source {} has no frames", source.node);
        }
        self.properties.add_node(source.node.clone());
        self.properties.add_node(paint_node_name(&source.node));
        debug!(
            "Added source {} at global {}..{}",
            source.node,
            self.sequence_length() + 1,
            self.sequence_length() + source.length
        );
        self.sources.push(source);
        Ok(())
    }

    /// Remove the paint node of a source (as if it was never created).
    pub fn drop_paint_node(&mut self, node: &str) {
        self.properties.remove_node(&paint_node_name(node));
    }

    pub fn sources(&self) -> &[SessionSource] {
        &self.sources
    }

    pub fn properties(&self) -> &PropertyGraph {
        &self.properties
    }

    pub fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    pub fn set_clipboard_file(&mut self, path: Option<PathBuf>) {
        self.clipboard_file = path;
    }

    /// Marked frames of a view node.
    pub fn marks(&self, view: &str) -> Vec<i32> {
        self.marks
            .get(view)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Total sequence length in frames.
    pub fn sequence_length(&self) -> i32 {
        self.sources.iter().map(|s| s.length).sum()
    }

    /// Source covering a global frame, with the global frame of its first frame.
    fn source_at_global(&self, frame: i32) -> Option<(&SessionSource, i32)> {
        let mut first = 1;
        for source in &self.sources {
            if frame >= first && frame < first + source.length {
                return Some((source, first));
            }
            first += source.length;
        }
        None
    }

    fn clip_ref(&self, source: &SessionSource) -> ClipRef {
        let paint = paint_node_name(&source.node);
        ClipRef {
            node: source.node.clone(),
            paint_node: self.properties.has_node(&paint).then_some(paint),
            display_name: source.display_name.clone(),
            media: MediaInfo {
                width: source.width,
                height: source.height,
                path: source.path.clone(),
            },
        }
    }

    fn is_view_node(&self, node: &str) -> bool {
        node == SEQUENCE_NODE || self.sources.iter().any(|s| s.node == node)
    }

    /// Save session to JSON file.
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Serialize session")?;
        fs::write(path, json).with_context(|| format!("Write session {}", path.display()))?;
        Ok(())
    }

    /// Load session from JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("Read session {}", path.display()))?;
        let mut session: Session =
            serde_json::from_str(&json).with_context(|| format!("Parse session {}", path.display()))?;

        // Node registry may be missing from hand-written files
        session.properties.add_node(SEQUENCE_NODE);
        session.properties.add_node(paint_node_name(SEQUENCE_NODE));
        for source in &session.sources {
            session.properties.add_node(source.node.clone());
        }
        Ok(session)
    }
}

impl PropertyStore for Session {
    fn has_node(&self, node: &str) -> bool {
        self.properties.has_node(node)
    }

    fn exists(&self, node: &str, key: &str) -> bool {
        self.properties.exists(node, key)
    }

    fn get(&self, node: &str, key: &str) -> Result<AttrValue, PropertyError> {
        self.properties.get(node, key)
    }

    fn set(&mut self, node: &str, key: &str, value: AttrValue) -> Result<(), PropertyError> {
        self.properties.set(node, key, value)
    }

    fn append_strings(&mut self, node: &str, key: &str, values: &[String]) -> Result<(), PropertyError> {
        self.properties.append_strings(node, key, values)
    }

    fn delete(&mut self, node: &str, key: &str) -> Result<(), PropertyError> {
        self.properties.delete(node, key)
    }

    fn keys(&self, node: &str) -> Result<Vec<String>, PropertyError> {
        self.properties.keys(node)
    }
}

impl ReviewHost for Session {
    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Looks the frame up on the sequence timeline.
    fn clip_at_frame(&self, frame: i32) -> Option<ClipRef> {
        self.source_at_global(frame).map(|(source, _)| self.clip_ref(source))
    }

    fn sequence_paint_node(&self) -> Option<String> {
        let paint = paint_node_name(SEQUENCE_NODE);
        self.properties.has_node(&paint).then_some(paint)
    }

    fn source_frame(&self, clip: &ClipRef, global: i32) -> Option<i32> {
        let (source, first) = self.source_at_global(global)?;
        if source.node != clip.node {
            return None;
        }
        let native = source.start + (global - first);
        source.contains_native(native).then_some(native)
    }

    fn view_node(&self) -> String {
        self.view_node.clone()
    }

    fn set_view_node(&mut self, node: &str) -> Result<()> {
        if !self.is_view_node(node) {
            bail!("Unknown view node: {}", node);
        }
        self.view_node = node.to_string();
        Ok(())
    }

    fn mark_frame(&mut self, frame: i32, marked: bool) {
        let marks = self.marks.entry(self.view_node.clone()).or_default();
        if marked {
            marks.insert(frame);
        } else {
            marks.remove(&frame);
        }
    }

    fn is_marked(&self, frame: i32) -> bool {
        self.marks
            .get(&self.view_node)
            .is_some_and(|m| m.contains(&frame))
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        self.clipboard = text.to_string();
        if let Some(path) = &self.clipboard_file {
            fs::write(path, text).with_context(|| format!("Write clipboard file {}", path.display()))?;
        }
        Ok(())
    }

    fn save_session(&mut self, path: &Path) -> Result<()> {
        self.to_json(path)?;
        info!("Session saved: {}", path.display());
        Ok(())
    }

    fn session_extension(&self) -> &'static str {
        "json"
    }

    /// No renderer here: writes `<pattern dir>/frames.manifest`, one resolved
    /// file name per frame.
    fn export_frames(&mut self, frames: &[i32], pattern: &Path) -> Result<usize> {
        if frames.is_empty() {
            return Ok(0);
        }
        let dir = pattern.parent().unwrap_or(Path::new("."));
        let file_pattern = pattern
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut manifest = String::new();
        for &frame in frames {
            manifest.push_str(&format!(
                "{}\t{}\t{}\n",
                resolve_frame_pattern(&file_pattern, frame),
                self.view_node,
                frame
            ));
        }

        let manifest_path = dir.join("frames.manifest");
        fs::write(&manifest_path, manifest)
            .with_context(|| format!("Write frame manifest {}", manifest_path.display()))?;
        Ok(frames.len())
    }
}

/// Substitute the first `#` run of `pattern` with the zero-padded frame.
pub fn resolve_frame_pattern(pattern: &str, frame: i32) -> String {
    let Some(start) = pattern.find('#') else {
        return pattern.to_string();
    };
    let width = pattern[start..].chars().take_while(|&c| c == '#').count();
    format!(
        "{}{:0width$}{}",
        &pattern[..start],
        frame,
        &pattern[start + width..],
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ViewGuard;

    fn session() -> Session {
        let mut s = Session::new();
        s.add_source(SessionSource::new("sourceA", "/shots/a/plate.####.exr", 1001, 150))
            .unwrap();
        s.add_source(SessionSource::new("sourceB", "/shots/b/clip.mov", 1, 100).with_size(3840, 2160))
            .unwrap();
        s
    }

    #[test]
    fn test_sequence_layout() {
        let s = session();
        assert_eq!(s.sequence_length(), 250);

        let a = s.clip_at_frame(1).unwrap();
        assert_eq!(a.node, "sourceA");
        assert_eq!(a.paint_node.as_deref(), Some("sourceA_paint"));
        assert_eq!(a.display_name, "plate.####.exr");
        assert_eq!(s.source_frame(&a, 1), Some(1001));
        assert_eq!(s.source_frame(&a, 150), Some(1150));
        assert_eq!(s.source_frame(&a, 151), None);

        let b = s.clip_at_frame(200).unwrap();
        assert_eq!(b.node, "sourceB");
        assert_eq!(b.media.height, 2160);
        assert_eq!(s.source_frame(&b, 200), Some(50));
        assert!(s.clip_at_frame(251).is_none());
        assert!(s.clip_at_frame(0).is_none());
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let mut s = session();
        assert!(s.add_source(SessionSource::new("sourceA", "x.mov", 1, 10)).is_err());
        assert!(s.add_source(SessionSource::new("empty", "x.mov", 1, 0)).is_err());
    }

    #[test]
    fn test_marks_are_per_view() {
        let mut s = session();
        s.mark_frame(10, true);
        s.set_view_node("sourceB").unwrap();
        assert!(!s.is_marked(10));
        s.mark_frame(50, true);
        assert_eq!(s.marks("sourceB"), vec![50]);
        assert_eq!(s.marks(SEQUENCE_NODE), vec![10]);
        assert!(s.set_view_node("nope").is_err());
    }

    #[test]
    fn test_view_guard_restores_on_early_exit() {
        fn narrowed_failure(s: &mut Session) -> Result<()> {
            let mut view = ViewGuard::narrow(s, "sourceA")?;
            view.mark_frame(1001, true);
            assert_eq!(view.view_node(), "sourceA");
            bail!("boom")
        }

        let mut s = session();
        assert!(narrowed_failure(&mut s).is_err());
        assert_eq!(s.view_node(), SEQUENCE_NODE);
        assert_eq!(s.marks("sourceA"), vec![1001]);

        // Narrowing to an unknown node leaves the view alone
        assert!(ViewGuard::narrow(&mut s, "nope").is_err());
        assert_eq!(s.view_node(), SEQUENCE_NODE);
    }

    #[test]
    fn test_json_roundtrip_keeps_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.json");

        let mut s = session();
        s.set("sourceA_paint", "paint.nextId", AttrValue::int(7)).unwrap();
        s.mark_frame(3, true);
        s.to_json(&path).unwrap();

        let loaded = Session::from_json(&path).unwrap();
        assert_eq!(loaded.get_i32("sourceA_paint", "paint.nextId").unwrap(), 7);
        assert_eq!(loaded.sources().len(), 2);
        assert_eq!(loaded.marks(SEQUENCE_NODE), vec![3]);
    }

    #[test]
    fn test_from_json_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.json");
        fs::write(&path, r#"{"sources":[{"node":"s1","path":"/a/b.mov","length":10}]}"#).unwrap();

        let s = Session::from_json(&path).unwrap();
        assert_eq!(s.view_node(), SEQUENCE_NODE);
        assert!(s.sequence_paint_node().is_some());
        let clip = s.clip_at_frame(5).unwrap();
        // No paint node in the file
        assert!(clip.paint_node.is_none());
        assert_eq!(s.source_frame(&clip, 5), Some(5));

        assert!(Session::from_json(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_export_frames_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("shot.####.jpg");
        let mut s = session();

        assert_eq!(s.export_frames(&[], &pattern).unwrap(), 0);
        assert_eq!(s.export_frames(&[10, 1001], &pattern).unwrap(), 2);

        let manifest = fs::read_to_string(dir.path().join("frames.manifest")).unwrap();
        let names: Vec<&str> = manifest.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(names, vec!["shot.0010.jpg", "shot.1001.jpg"]);

        let missing = dir.path().join("nope").join("x.####.jpg");
        assert!(s.export_frames(&[1], &missing).is_err());
    }

    #[test]
    fn test_clipboard_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        s.copy_to_clipboard("one").unwrap();
        assert_eq!(s.clipboard(), "one");

        let file = dir.path().join("clip.txt");
        s.set_clipboard_file(Some(file.clone()));
        s.copy_to_clipboard("two").unwrap();
        assert_eq!(fs::read_to_string(file).unwrap(), "two");
    }

    #[test]
    fn test_resolve_frame_pattern() {
        assert_eq!(resolve_frame_pattern("a.####.jpg", 7), "a.0007.jpg");
        assert_eq!(resolve_frame_pattern("a.#.jpg", 123), "a.123.jpg");
        assert_eq!(resolve_frame_pattern("a.jpg", 1), "a.jpg");
    }
}
