//! AnnotationStore - append-only element log on one paint node.
//!
//! Layout on the node (all properties, no side tables):
//! - `paint.nextId`: monotonic id counter
//! - `frame:<n>.order`: element names of frame `n`, in creation order
//! - `<element name>.<component>`: per-element attribute bag
//!
//! Elements are never edited in place. A later note on the same frame is a new
//! element; the only removal path is `clear_frame` for frames left with blank text.

use std::collections::BTreeSet;

use log::{debug, trace, warn};

use super::attrs::AttrValue;
use super::element::{ElementKind, ElementName, ElementSummary, Label, TextAttrs};
use super::keys::{self, A_TEXT, K_NEXT_ID, K_SHOW};
use super::properties::{PropertyError, PropertyStore};

/// Annotation log on one paint node.
///
/// Frame numbers are whatever the node natively uses: clip-relative for a
/// source paint node, global for the sequence paint node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationStore {
    node: String,
}

impl AnnotationStore {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    /// Read and advance the id counter. Missing counter starts at 0.
    pub fn allocate_id<P: PropertyStore + ?Sized>(&self, props: &mut P) -> Result<i32, PropertyError> {
        let id = match props.get_i32(&self.node, K_NEXT_ID) {
            Ok(id) => id,
            Err(PropertyError::Missing { .. }) | Err(PropertyError::Empty { .. }) => 0,
            Err(e) => return Err(e),
        };
        let next = id.checked_add(1).ok_or_else(|| PropertyError::Overflow {
            node: self.node.clone(),
            key: K_NEXT_ID.to_string(),
        })?;
        props.set(&self.node, K_NEXT_ID, AttrValue::int(next))?;
        Ok(id)
    }

    /// Register an element and append it to its frame order.
    ///
    /// Storage failures are logged and reported as `None`: the element is
    /// simply not visible, nothing upstream aborts.
    pub fn create_element<P: PropertyStore + ?Sized>(
        &self,
        props: &mut P,
        frame: i32,
        label: Label,
        kind: ElementKind,
        attrs: Option<&TextAttrs>,
    ) -> Option<ElementName> {
        match self.try_create(props, frame, label, kind, attrs) {
            Ok(name) => {
                trace!("Created {} on {}", name, self.node);
                Some(name)
            }
            Err(e) => {
                warn!("Error creating element on {} frame {}: {}", self.node, frame, e);
                None
            }
        }
    }

    fn try_create<P: PropertyStore + ?Sized>(
        &self,
        props: &mut P,
        frame: i32,
        label: Label,
        kind: ElementKind,
        attrs: Option<&TextAttrs>,
    ) -> Result<ElementName, PropertyError> {
        let id = self.allocate_id(props)?;
        let name = ElementName::new(kind, id, frame, label);
        let handle = name.to_string();

        // Keep paint layer visible
        props.set(&self.node, K_SHOW, AttrValue::int(1))?;

        if let Some(attrs) = attrs {
            for (component, value) in attrs.components() {
                props.set(&self.node, &keys::element_key(&handle, component), value)?;
            }
        }

        props.append_strings(&self.node, &keys::order_key(frame), &[handle])?;
        Ok(name)
    }

    /// Frames holding at least one non-shadow element.
    pub fn list_frames<P: PropertyStore + ?Sized>(&self, props: &P) -> BTreeSet<i32> {
        let all_keys = match props.keys(&self.node) {
            Ok(all_keys) => all_keys,
            Err(e) => {
                debug!("No frames on {}: {}", self.node, e);
                return BTreeSet::new();
            }
        };

        all_keys
            .iter()
            .filter_map(|key| keys::parse_order_key(key))
            .filter(|&frame| {
                self.order(props, frame)
                    .map(|names| {
                        names
                            .iter()
                            .filter_map(|n| n.parse::<ElementName>().ok())
                            .any(|n| !n.label.is_shadow())
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Ordered element list of a frame.
    ///
    /// Err only when the frame order itself is unreadable; a single malformed
    /// element is skipped.
    pub fn read_elements<P: PropertyStore + ?Sized>(
        &self,
        props: &P,
        frame: i32,
    ) -> Result<Vec<ElementSummary>, PropertyError> {
        let mut out = Vec::new();

        for handle in self.order(props, frame)? {
            let name = match handle.parse::<ElementName>() {
                Ok(name) => name,
                Err(e) => {
                    debug!("Skipping element on {} frame {}: {}", self.node, frame, e);
                    continue;
                }
            };

            let text = if name.kind == ElementKind::Text {
                match props.get_string(&self.node, &keys::element_key(&handle, A_TEXT)) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        debug!("Skipping element {} on {}: {}", handle, self.node, e);
                        continue;
                    }
                }
            } else {
                None
            };

            out.push(ElementSummary { name, text });
        }

        Ok(out)
    }

    /// Raw text of every note on a frame, in creation order.
    pub fn note_texts<P: PropertyStore + ?Sized>(&self, props: &P, frame: i32) -> Vec<String> {
        match self.read_elements(props, frame) {
            Ok(elements) => elements
                .into_iter()
                .filter(|e| e.name.label == Label::Note)
                .filter_map(|e| e.text)
                .collect(),
            Err(e) => {
                warn!("Failed to read notes on {} frame {}: {}", self.node, frame, e);
                Vec::new()
            }
        }
    }

    /// Total text lines of all notes on a frame (stacking offset for the next note).
    pub fn count_note_lines<P: PropertyStore + ?Sized>(&self, props: &P, frame: i32) -> usize {
        self.note_texts(props, frame)
            .iter()
            .map(|t| t.matches('\n').count() + 1)
            .sum()
    }

    /// Delete every element of `frame` if it holds no real content.
    ///
    /// Real content is any non-blank text or any drawing element. Returns true
    /// when the frame was cleared.
    pub fn clear_frame<P: PropertyStore + ?Sized>(&self, props: &mut P, frame: i32) -> bool {
        let elements = match self.read_elements(&*props, frame) {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Not clearing {} frame {}: {}", self.node, frame, e);
                return false;
            }
        };

        let has_content = elements.iter().any(|e| {
            e.is_drawing() || e.text.as_deref().is_some_and(|t| !t.trim().is_empty())
        });
        if has_content {
            return false;
        }

        let handles = match self.order(&*props, frame) {
            Ok(handles) => handles,
            Err(_) => return false,
        };
        let all_keys = props.keys(&self.node).unwrap_or_default();

        for handle in &handles {
            let prefix = format!("{}.", handle);
            for key in all_keys.iter().filter(|k| k.starts_with(&prefix)) {
                if let Err(e) = props.delete(&self.node, key) {
                    warn!("Failed to delete {}.{}: {}", self.node, key, e);
                }
            }
        }
        if let Err(e) = props.delete(&self.node, &keys::order_key(frame)) {
            warn!("Failed to delete order of {} frame {}: {}", self.node, frame, e);
        }

        debug!("Cleared {} blank element(s) on {} frame {}", handles.len(), self.node, frame);
        true
    }

    /// Element names of a frame. Missing order list reads as empty.
    fn order<P: PropertyStore + ?Sized>(&self, props: &P, frame: i32) -> Result<Vec<String>, PropertyError> {
        match props.get_strings(&self.node, &keys::order_key(frame)) {
            Ok(names) => Ok(names),
            Err(PropertyError::Missing { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}
