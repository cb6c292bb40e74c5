//! Review host contract
//!
//! **Why**: The annotation workflows run inside a review application that owns
//! the timeline, the view graph and the paint nodes. Everything the workflows
//! need from it is collected in `ReviewHost` so the same code drives a live
//! host binding or the headless `Session`.
//!
//! **Used by**: export pipeline, review workflows, CLI

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};

use crate::entities::PropertyStore;

/// Global timeline frame → clip-relative frame.
///
/// `None` means the frame does not fall inside the clip.
pub trait FrameMapper {
    fn map_frame(&self, global: i32) -> Option<i32>;
}

impl<F> FrameMapper for F
where
    F: Fn(i32) -> Option<i32>,
{
    fn map_frame(&self, global: i32) -> Option<i32> {
        self(global)
    }
}

/// Media metadata of a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    /// Media path as the host reports it (may hold sequence notation)
    pub path: PathBuf,
}

impl MediaInfo {
    pub fn aspect(&self) -> f32 {
        crate::text_layout::aspect_ratio(self.width, self.height)
    }

    /// Folder holding the media, empty if the path has none.
    pub fn folder(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

/// The clip active at a timeline frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRef {
    /// Source node, also the view target when narrowing to this clip
    pub node: String,
    /// Paint node holding clip-relative annotations, if the source has one
    pub paint_node: Option<String>,
    pub display_name: String,
    pub media: MediaInfo,
}

/// Everything the review workflows consume from the host application.
pub trait ReviewHost: PropertyStore {
    /// Frame under the playhead (global).
    fn current_frame(&self) -> i32;

    /// Clip at a global frame, `None` on an empty timeline slot.
    fn clip_at_frame(&self, frame: i32) -> Option<ClipRef>;

    /// Paint node of the sequence (global frames, drawing tool output).
    fn sequence_paint_node(&self) -> Option<String>;

    /// Map a global frame into `clip` native frames.
    fn source_frame(&self, clip: &ClipRef, global: i32) -> Option<i32>;

    fn view_node(&self) -> String;

    fn set_view_node(&mut self, node: &str) -> Result<()>;

    /// Set the timeline mark of a frame in the current view.
    fn mark_frame(&mut self, frame: i32, marked: bool);

    fn is_marked(&self, frame: i32) -> bool;

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;

    fn save_session(&mut self, path: &Path) -> Result<()>;

    /// File extension of what `save_session` writes.
    fn session_extension(&self) -> &'static str {
        "rv"
    }

    /// Render `frames` (current view numbering) to `pattern`, returns how many were written.
    fn export_frames(&mut self, frames: &[i32], pattern: &Path) -> Result<usize>;
}

/// Frame mapper bound to one clip of a host.
pub struct ClipFrameMapper<'a, H: ReviewHost + ?Sized> {
    host: &'a H,
    clip: &'a ClipRef,
}

impl<'a, H: ReviewHost + ?Sized> ClipFrameMapper<'a, H> {
    pub fn new(host: &'a H, clip: &'a ClipRef) -> Self {
        Self { host, clip }
    }
}

impl<H: ReviewHost + ?Sized> FrameMapper for ClipFrameMapper<'_, H> {
    fn map_frame(&self, global: i32) -> Option<i32> {
        self.host.source_frame(self.clip, global)
    }
}

/// Temporarily narrows the host view to one node.
///
/// The previous view node is restored when the guard drops, on every exit
/// path including early `?` returns.
pub struct ViewGuard<'a, H: ReviewHost + ?Sized> {
    host: &'a mut H,
    previous: String,
}

impl<'a, H: ReviewHost + ?Sized> ViewGuard<'a, H> {
    pub fn narrow(host: &'a mut H, node: &str) -> Result<Self> {
        let previous = host.view_node();
        host.set_view_node(node)?;
        debug!("View narrowed {} -> {}", previous, node);
        Ok(Self { host, previous })
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }
}

impl<H: ReviewHost + ?Sized> Deref for ViewGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: ReviewHost + ?Sized> DerefMut for ViewGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: ReviewHost + ?Sized> Drop for ViewGuard<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.host.set_view_node(&self.previous) {
            warn!("Failed to restore view {}: {}", self.previous, e);
        } else {
            debug!("View restored to {}", self.previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_mapper() {
        let offset = |g: i32| if (151..=250).contains(&g) { Some(g - 150) } else { None };
        assert_eq!(offset.map_frame(200), Some(50));
        assert_eq!(offset.map_frame(10), None);
    }

    #[test]
    fn test_media_info() {
        let media = MediaInfo {
            width: 2048,
            height: 1024,
            path: PathBuf::from("/shots/a/plate.####.exr"),
        };
        assert_eq!(media.aspect(), 2.0);
        assert_eq!(media.folder(), PathBuf::from("/shots/a"));
        assert_eq!(MediaInfo::default().folder(), PathBuf::new());
    }
}
