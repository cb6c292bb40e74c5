//! Merge both annotation stores of a clip into ordered, deduplicated notes.
//!
//! The source store is keyed by clip-relative frames, the sequence store by
//! global frames. Sequence frames go through the `FrameMapper`; frames that
//! map outside the clip are dropped. Per frame, text is deduplicated on the
//! raw stored value (source store first), then normalized to one `- ` bullet
//! per note. Distinct raw texts keep their own line even when they normalize
//! to the same string.

use std::collections::{BTreeMap, HashSet};

use log::{debug, trace, warn};

use crate::entities::{AnnotationStore, PropertyStore};
use crate::host::FrameMapper;

/// Line printed for a frame that only carries drawings.
pub const DRAWING_PLACEHOLDER: &str = "- *see annotated frame";

/// Report lines of one clip frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameNotes {
    /// Clip-relative frame
    pub frame: i32,
    pub lines: Vec<String>,
    /// No text, only drawing elements (lines hold the placeholder)
    pub drawing_only: bool,
}

/// Result of one scan over a clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipNotes {
    /// Annotated frames, ascending
    pub frames: Vec<FrameNotes>,
    /// `(paint node, native frame)` left with neither text nor drawing
    pub cleanup: Vec<(String, i32)>,
}

impl ClipNotes {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame_numbers(&self) -> Vec<i32> {
        self.frames.iter().map(|f| f.frame).collect()
    }
}

/// Canonical form of one note: a single `- ` prefix, whitespace collapsed.
///
/// One leading `- ` is stripped from the raw text before collapsing, so only a
/// bullet at the very start counts (`"  - x"` → `- - x`, `"-"` → `- -`).
/// Returns `None` when nothing remains after the bullet.
pub fn normalize_note(raw: &str) -> Option<String> {
    let body = raw.strip_prefix("- ").unwrap_or(raw);
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(format!("- {}", collapsed))
    }
}

/// Where a candidate frame is stored.
#[derive(Debug, Clone, Copy)]
enum Origin {
    Source,
    Sequence,
}

/// Reads the stores of one clip.
pub struct ExportPipeline<'a, P: PropertyStore + ?Sized, M: FrameMapper + ?Sized> {
    props: &'a P,
    mapper: &'a M,
    source: Option<AnnotationStore>,
    sequence: Option<AnnotationStore>,
}

impl<'a, P: PropertyStore + ?Sized, M: FrameMapper + ?Sized> ExportPipeline<'a, P, M> {
    pub fn new(props: &'a P, mapper: &'a M) -> Self {
        Self {
            props,
            mapper,
            source: None,
            sequence: None,
        }
    }

    /// Paint node keyed by clip-relative frames.
    pub fn source_node(mut self, node: Option<&str>) -> Self {
        self.source = node.map(AnnotationStore::new);
        self
    }

    /// Paint node keyed by global frames.
    pub fn sequence_node(mut self, node: Option<&str>) -> Self {
        self.sequence = node.map(AnnotationStore::new);
        self
    }

    fn store(&self, origin: Origin) -> Option<&AnnotationStore> {
        match origin {
            Origin::Source => self.source.as_ref(),
            Origin::Sequence => self.sequence.as_ref(),
        }
    }

    /// Candidate clip frames with their native locations, source entries first.
    fn candidates(&self) -> BTreeMap<i32, Vec<(Origin, i32)>> {
        let mut candidates: BTreeMap<i32, Vec<(Origin, i32)>> = BTreeMap::new();

        if let Some(store) = &self.source {
            for frame in store.list_frames(self.props) {
                candidates.entry(frame).or_default().push((Origin::Source, frame));
            }
        }

        if let Some(store) = &self.sequence {
            for global in store.list_frames(self.props) {
                match self.mapper.map_frame(global) {
                    Some(frame) => candidates
                        .entry(frame)
                        .or_default()
                        .push((Origin::Sequence, global)),
                    None => trace!("Sequence frame {} is outside the clip", global),
                }
            }
        }

        candidates
    }

    /// Scan both stores.
    pub fn collect(&self) -> ClipNotes {
        let mut out = ClipNotes::default();

        for (frame, locations) in self.candidates() {
            let mut seen_raw: HashSet<String> = HashSet::new();
            let mut lines = Vec::new();
            let mut has_drawing = false;
            let mut readable = Vec::new();

            for (origin, native) in locations {
                let Some(store) = self.store(origin) else { continue };
                let elements = match store.read_elements(self.props, native) {
                    Ok(elements) => elements,
                    Err(e) => {
                        warn!("Skipping {} frame {}: {}", store.node(), native, e);
                        continue;
                    }
                };
                readable.push((store.node().to_string(), native));

                for element in &elements {
                    if element.is_drawing() {
                        has_drawing = true;
                        continue;
                    }
                    let Some(raw) = element.visible_text() else { continue };
                    if !seen_raw.insert(raw.to_string()) {
                        continue;
                    }
                    if let Some(line) = normalize_note(raw) {
                        lines.push(line);
                    }
                }
            }

            if !lines.is_empty() {
                out.frames.push(FrameNotes {
                    frame,
                    lines,
                    drawing_only: false,
                });
            } else if has_drawing {
                out.frames.push(FrameNotes {
                    frame,
                    lines: vec![DRAWING_PLACEHOLDER.to_string()],
                    drawing_only: true,
                });
            } else {
                debug!("Frame {} has no content", frame);
                out.cleanup.extend(readable);
            }
        }

        out
    }
}
