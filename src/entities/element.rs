//! Annotation element addressing and text attributes.
//!
//! Every drawable element on a paint node is addressed by its composite name
//! `"{kind}:{id}:{frame}:{label}"`; its components live under that name
//! (`text:12:1001:note.position`, `text:12:1001:note.text`, ...).

use std::fmt;
use std::str::FromStr;

use super::attrs::AttrValue;
use super::keys::*;
use super::properties::PropertyError;

/// Number of outline copies that accompany every note.
pub const SHADOW_COUNT: u8 = 8;

/// Drawable element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Stroke,
    Line,
    Rect,
    Circle,
    Pen,
    Arrow,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Stroke => "stroke",
            ElementKind::Line => "line",
            ElementKind::Rect => "rect",
            ElementKind::Circle => "circle",
            ElementKind::Pen => "pen",
            ElementKind::Arrow => "arrow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ElementKind::Text),
            "stroke" => Some(ElementKind::Stroke),
            "line" => Some(ElementKind::Line),
            "rect" => Some(ElementKind::Rect),
            "circle" => Some(ElementKind::Circle),
            "pen" => Some(ElementKind::Pen),
            "arrow" => Some(ElementKind::Arrow),
            _ => None,
        }
    }

    /// Freehand/shape content produced by the drawing tool.
    pub fn is_drawing(&self) -> bool {
        !matches!(self, ElementKind::Text)
    }
}

/// Role tag of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// Primary visible note text
    Note,
    /// Outline decoration `shadow0..shadow7`
    Shadow(u8),
    /// Opaque tag written by another tool
    Other(String),
}

impl Label {
    pub fn parse(s: &str) -> Self {
        if s == "note" {
            return Label::Note;
        }
        if let Some(idx) = s.strip_prefix("shadow").and_then(|n| n.parse::<u8>().ok()) {
            if idx < SHADOW_COUNT {
                return Label::Shadow(idx);
            }
        }
        Label::Other(s.to_string())
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, Label::Shadow(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Note => write!(f, "note"),
            Label::Shadow(i) => write!(f, "shadow{}", i),
            Label::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Composite element handle: `{kind}:{id}:{frame}:{label}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementName {
    pub kind: ElementKind,
    pub id: i32,
    pub frame: i32,
    pub label: Label,
}

impl ElementName {
    pub fn new(kind: ElementKind, id: i32, frame: i32, label: Label) -> Self {
        Self { kind, id, frame, label }
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.kind.as_str(), self.id, self.frame, self.label)
    }
}

impl FromStr for ElementName {
    type Err = PropertyError;

    /// Label is the remainder after the third colon, so foreign tags may contain `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PropertyError::MalformedName(s.to_string());
        let mut parts = s.splitn(4, ':');

        let kind = parts.next().and_then(ElementKind::parse).ok_or_else(malformed)?;
        let id = parts
            .next()
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        let frame = parts
            .next()
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        let label = parts.next().filter(|l| !l.is_empty()).ok_or_else(malformed)?;

        Ok(Self::new(kind, id, frame, Label::parse(label)))
    }
}

/// Full attribute set of a text element, matching what the host's own
/// annotation mode writes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAttrs {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub text: String,
    pub size: f32,
    pub scale: f32,
    pub spacing: f32,
    pub rotation: f32,
    pub start_frame: i32,
    pub duration: i32,
    pub mode: i32,
    pub font: String,
    pub origin: String,
    pub debug: i32,
}

impl TextAttrs {
    /// Text at `position` on `frame` with host defaults for everything else.
    pub fn new(text: impl Into<String>, position: [f32; 2], color: [f32; 4], frame: i32) -> Self {
        Self {
            position,
            color,
            text: text.into(),
            size: 0.005,
            scale: 1.0,
            spacing: 0.8,
            rotation: 0.0,
            start_frame: frame,
            duration: 1,
            mode: 0,
            font: String::new(),
            origin: String::new(),
            debug: 0,
        }
    }

    /// Component list in host creation order.
    pub fn components(&self) -> Vec<(&'static str, AttrValue)> {
        vec![
            (A_POSITION, AttrValue::Float(self.position.to_vec())),
            (A_COLOR, AttrValue::Float(self.color.to_vec())),
            (A_SPACING, AttrValue::float(self.spacing)),
            (A_SIZE, AttrValue::float(self.size)),
            (A_SCALE, AttrValue::float(self.scale)),
            (A_ROTATION, AttrValue::float(self.rotation)),
            (A_FONT, AttrValue::string(self.font.clone())),
            (A_TEXT, AttrValue::string(self.text.clone())),
            (A_ORIGIN, AttrValue::string(self.origin.clone())),
            (A_DEBUG, AttrValue::int(self.debug)),
            (A_START_FRAME, AttrValue::int(self.start_frame)),
            (A_DURATION, AttrValue::int(self.duration)),
            (A_MODE, AttrValue::int(self.mode)),
        ]
    }
}

/// What a frame scan reports per element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSummary {
    pub name: ElementName,
    /// Stored text for text elements
    pub text: Option<String>,
}

impl ElementSummary {
    pub fn kind(&self) -> ElementKind {
        self.name.kind
    }

    pub fn label(&self) -> &Label {
        &self.name.label
    }

    pub fn is_drawing(&self) -> bool {
        self.name.kind.is_drawing()
    }

    /// Text that carries meaning: non-shadow, not blank.
    pub fn visible_text(&self) -> Option<&str> {
        if self.name.label.is_shadow() {
            return None;
        }
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}
