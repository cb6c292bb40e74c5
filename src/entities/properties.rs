//! Host property storage contract.
//!
//! The review host exposes per-node keyed properties (`node.component.prop`).
//! `PropertyStore` is the narrow slice of that API the annotation code needs;
//! `PropertyGraph` is the in-memory implementation used by the headless session.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attrs::{AttrType, AttrValue, Attrs};

/// Property access errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    #[error("node not found: {0}")]
    NoNode(String),
    #[error("property not found: {node}.{key}")]
    Missing { node: String, key: String },
    #[error("property {node}.{key} is {found}, expected {expected}")]
    TypeMismatch {
        node: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("property {node}.{key} is empty")]
    Empty { node: String, key: String },
    #[error("property {node}.{key} overflowed")]
    Overflow { node: String, key: String },
    #[error("malformed element name: {0}")]
    MalformedName(String),
}

/// Keyed property storage per node.
///
/// Values are owned copies so implementations may live behind locks or FFI.
pub trait PropertyStore {
    fn has_node(&self, node: &str) -> bool;

    fn exists(&self, node: &str, key: &str) -> bool;

    fn get(&self, node: &str, key: &str) -> Result<AttrValue, PropertyError>;

    /// Create or overwrite a property.
    fn set(&mut self, node: &str, key: &str, value: AttrValue) -> Result<(), PropertyError>;

    /// Append strings to a string array property, creating it if absent.
    fn append_strings(&mut self, node: &str, key: &str, values: &[String]) -> Result<(), PropertyError>;

    fn delete(&mut self, node: &str, key: &str) -> Result<(), PropertyError>;

    /// All property keys of a node in creation order.
    fn keys(&self, node: &str) -> Result<Vec<String>, PropertyError>;

    // Typed helpers

    fn get_i32(&self, node: &str, key: &str) -> Result<i32, PropertyError> {
        match self.get(node, key)? {
            AttrValue::Int(v) => v.first().copied().ok_or_else(|| PropertyError::Empty {
                node: node.to_string(),
                key: key.to_string(),
            }),
            other => Err(mismatch(node, key, AttrType::Int, &other)),
        }
    }

    fn get_string(&self, node: &str, key: &str) -> Result<String, PropertyError> {
        match self.get(node, key)? {
            AttrValue::Str(mut v) if !v.is_empty() => Ok(v.swap_remove(0)),
            AttrValue::Str(_) => Err(PropertyError::Empty {
                node: node.to_string(),
                key: key.to_string(),
            }),
            other => Err(mismatch(node, key, AttrType::Str, &other)),
        }
    }

    fn get_strings(&self, node: &str, key: &str) -> Result<Vec<String>, PropertyError> {
        match self.get(node, key)? {
            AttrValue::Str(v) => Ok(v),
            other => Err(mismatch(node, key, AttrType::Str, &other)),
        }
    }

    fn get_floats(&self, node: &str, key: &str) -> Result<Vec<f32>, PropertyError> {
        match self.get(node, key)? {
            AttrValue::Float(v) => Ok(v),
            other => Err(mismatch(node, key, AttrType::Float, &other)),
        }
    }
}

fn mismatch(node: &str, key: &str, expected: AttrType, found: &AttrValue) -> PropertyError {
    PropertyError::TypeMismatch {
        node: node.to_string(),
        key: key.to_string(),
        expected: expected.as_str(),
        found: found.attr_type().as_str(),
    }
}

/// In-memory property storage: node name → property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyGraph {
    #[serde(default)]
    nodes: IndexMap<String, Attrs>,
}

impl PropertyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node (no-op if present).
    pub fn add_node(&mut self, node: impl Into<String>) {
        self.nodes.entry(node.into()).or_default();
    }

    /// Drop a node with all its properties.
    pub fn remove_node(&mut self, node: &str) -> Option<Attrs> {
        self.nodes.shift_remove(node)
    }

    fn attrs(&self, node: &str) -> Result<&Attrs, PropertyError> {
        self.nodes
            .get(node)
            .ok_or_else(|| PropertyError::NoNode(node.to_string()))
    }

    fn attrs_mut(&mut self, node: &str) -> Result<&mut Attrs, PropertyError> {
        self.nodes
            .get_mut(node)
            .ok_or_else(|| PropertyError::NoNode(node.to_string()))
    }
}

impl PropertyStore for PropertyGraph {
    fn has_node(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    fn exists(&self, node: &str, key: &str) -> bool {
        self.nodes.get(node).is_some_and(|a| a.contains(key))
    }

    fn get(&self, node: &str, key: &str) -> Result<AttrValue, PropertyError> {
        self.attrs(node)?
            .get(key)
            .cloned()
            .ok_or_else(|| PropertyError::Missing {
                node: node.to_string(),
                key: key.to_string(),
            })
    }

    fn set(&mut self, node: &str, key: &str, value: AttrValue) -> Result<(), PropertyError> {
        self.attrs_mut(node)?.set(key, value);
        Ok(())
    }

    fn append_strings(&mut self, node: &str, key: &str, values: &[String]) -> Result<(), PropertyError> {
        let attrs = self.attrs_mut(node)?;
        match attrs.get_mut(key) {
            Some(AttrValue::Str(list)) => list.extend(values.iter().cloned()),
            Some(other) => {
                let found = other.clone();
                return Err(mismatch(node, key, AttrType::Str, &found));
            }
            None => attrs.set(key, AttrValue::Str(values.to_vec())),
        }
        Ok(())
    }

    fn delete(&mut self, node: &str, key: &str) -> Result<(), PropertyError> {
        self.attrs_mut(node)?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| PropertyError::Missing {
                node: node.to_string(),
                key: key.to_string(),
            })
    }

    fn keys(&self, node: &str) -> Result<Vec<String>, PropertyError> {
        Ok(self.attrs(node)?.keys().cloned().collect())
    }
}
