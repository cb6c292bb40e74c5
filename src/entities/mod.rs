//! Entities module - annotation data model over host node properties
//!
//! - `attrs`: typed property bag of one node
//! - `properties`: host property storage contract + in-memory graph
//! - `element`: element addressing (`kind:id:frame:label`) and text attributes
//! - `store`: append-only annotation log per paint node

pub mod attrs;
pub mod element;
pub mod keys;
pub mod properties;
pub mod store;

pub use attrs::{AttrType, AttrValue, Attrs};
pub use element::{ElementKind, ElementName, ElementSummary, Label, TextAttrs, SHADOW_COUNT};
pub use properties::{PropertyError, PropertyGraph, PropertyStore};
pub use store::AnnotationStore;
