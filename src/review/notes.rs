//! Add a note to a frame
//!
//! A note is written on the paint node of the source under the frame, in
//! clip-relative numbering, as eight black outline copies followed by the white
//! text. Notes on the same frame stack downward by their line count.

use log::{debug, info};

use super::{ReviewError, ReviewResult};
use crate::config::NotesSettings;
use crate::entities::{AnnotationStore, ElementKind, ElementName, Label, TextAttrs};
use crate::host::ReviewHost;

/// What `add_note` wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedNote {
    /// Clip-relative frame the note landed on
    pub frame: i32,
    pub paint_node: String,
    /// Wrapped note text as stored
    pub text: String,
    /// `None` if the host refused the note element (already logged)
    pub element: Option<ElementName>,
}

fn text_attrs(settings: &NotesSettings, text: &str, position: [f32; 2], color: [f32; 4], frame: i32, scale: f32) -> TextAttrs {
    TextAttrs {
        size: settings.text_size,
        scale,
        spacing: settings.spacing,
        ..TextAttrs::new(text, position, color, frame)
    }
}

/// Add `text` as a note at `global_frame`.
pub fn add_note<H: ReviewHost + ?Sized>(
    host: &mut H,
    settings: &NotesSettings,
    text: &str,
    global_frame: i32,
) -> ReviewResult<AddedNote> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ReviewError::EmptyNote);
    }

    let clip = host
        .clip_at_frame(global_frame)
        .ok_or(ReviewError::NoSource { frame: global_frame })?;
    let paint_node = clip.paint_node.clone().ok_or(ReviewError::NoStore)?;

    let frame = host.source_frame(&clip, global_frame).unwrap_or_else(|| {
        debug!("No source frame for {}, using global frame", global_frame);
        global_frame
    });

    let layout = settings.layout();
    let wrapped = layout.wrap(&format!("- {}", text));

    let store = AnnotationStore::new(paint_node.as_str());
    let existing_lines = store.count_note_lines(&*host, frame);
    let position = layout.stack_position(existing_lines, clip.media.aspect());
    let scale = layout.resolution_scale(clip.media.height as f32);

    // Outline first so the note renders on top
    for (i, offset) in layout.outline_offsets(position).into_iter().enumerate() {
        let attrs = text_attrs(settings, &wrapped, offset, settings.shadow_color, frame, scale);
        store.create_element(&mut *host, frame, Label::Shadow(i as u8), ElementKind::Text, Some(&attrs));
    }
    let attrs = text_attrs(settings, &wrapped, position, settings.note_color, frame, scale);
    let element = store.create_element(&mut *host, frame, Label::Note, ElementKind::Text, Some(&attrs));

    host.mark_frame(global_frame, true);
    info!(
        "Note added on {} frame {} (global {}, {} line(s) above)",
        paint_node, frame, global_frame, existing_lines
    );

    Ok(AddedNote {
        frame,
        paint_node,
        text: wrapped,
        element,
    })
}
