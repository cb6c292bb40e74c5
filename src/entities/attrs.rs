//! Typed property bag for one host node.
//!
//! Mirrors the host's keyed property model: every property is a typed array
//! (int, float or string), scalars are arrays of length 1.
//! Keys keep insertion order so enumeration is deterministic across runs
//! and across session save/load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrType {
    Int,
    Float,
    Str,
}

impl AttrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrType::Int => "int",
            AttrType::Float => "float",
            AttrType::Str => "string",
        }
    }
}

/// Generic property value (always an array, scalars have one element).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(Vec<i32>),
    Float(Vec<f32>),
    Str(Vec<String>),
}

impl AttrValue {
    pub fn int(v: i32) -> Self {
        AttrValue::Int(vec![v])
    }

    pub fn float(v: f32) -> Self {
        AttrValue::Float(vec![v])
    }

    pub fn string(v: impl Into<String>) -> Self {
        AttrValue::Str(vec![v.into()])
    }

    /// Empty array of the given type.
    pub fn empty(ty: AttrType) -> Self {
        match ty {
            AttrType::Int => AttrValue::Int(Vec::new()),
            AttrType::Float => AttrValue::Float(Vec::new()),
            AttrType::Str => AttrValue::Str(Vec::new()),
        }
    }

    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::Int(_) => AttrType::Int,
            AttrValue::Float(_) => AttrType::Float,
            AttrValue::Str(_) => AttrType::Str,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttrValue::Int(v) => v.len(),
            AttrValue::Float(v) => v.len(),
            AttrValue::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Attribute container: property key → typed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attrs {
    #[serde(default)]
    map: IndexMap<String, AttrValue>,
}

impl Attrs {
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        self.map.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.map.get(key)
    }

    /// First string of a string property
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.map.get(key) {
            Some(AttrValue::Str(v)) => v.first().map(String::as_str),
            _ => None,
        }
    }

    /// First element of an int property
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.map.get(key) {
            Some(AttrValue::Int(v)) => v.first().copied(),
            _ => None,
        }
    }

    /// First element of a float property
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.map.get(key) {
            Some(AttrValue::Float(v)) => v.first().copied(),
            _ => None,
        }
    }

    /// Get mutable reference to attribute value
    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttrValue> {
        self.map.get_mut(key)
    }

    /// Remove attribute by key, keeping the order of the remaining keys
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.map.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.map.keys()
    }

    /// Check if attribute exists
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Get number of attributes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut attrs = Attrs::new();
        attrs.set("paint.nextId", AttrValue::int(7));
        attrs.set("text:1:5:note.text", AttrValue::string("- hi"));
        attrs.set("text:1:5:note.size", AttrValue::float(0.005));

        assert_eq!(attrs.get_i32("paint.nextId"), Some(7));
        assert_eq!(attrs.get_str("text:1:5:note.text"), Some("- hi"));
        assert_eq!(attrs.get_float("text:1:5:note.size"), Some(0.005));
        // Wrong type reads as missing
        assert_eq!(attrs.get_i32("text:1:5:note.text"), None);
        assert_eq!(attrs.get_float("missing"), None);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut attrs = Attrs::new();
        attrs.set("a", AttrValue::int(1));
        attrs.set("b", AttrValue::int(2));
        attrs.set("c", AttrValue::int(3));
        attrs.remove("b");

        let keys: Vec<&String> = attrs.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_value_type() {
        let v = AttrValue::empty(AttrType::Str);
        assert!(v.is_empty());
        assert_eq!(v.attr_type(), AttrType::Str);
        assert_eq!(AttrType::Float.as_str(), "float");
    }
}
