//! Dynamic property bags for format-specific entity attributes.

use serde::{Deserialize, Serialize};

/// A single property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> bool {
        match self {
            PropertyValue::Bool(b) => *b,
            PropertyValue::Int(i) => *i != 0,
            PropertyValue::Float(f) => *f != 0.0,
            PropertyValue::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1"),
        }
    }

    pub fn as_int(&self) -> i32 {
        match self {
            PropertyValue::Bool(b) => i32::from(*b),
            PropertyValue::Int(i) => *i,
            PropertyValue::Float(f) => *f as i32,
            PropertyValue::String(s) => s.trim().parse().unwrap_or(0),
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            PropertyValue::Bool(b) => f64::from(u8::from(*b)),
            PropertyValue::Int(i) => f64::from(*i),
            PropertyValue::Float(f) => *f,
            PropertyValue::String(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    pub fn as_string(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Float(f) => f.to_string(),
            PropertyValue::String(s) => s.clone(),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

/// Insertion-ordered mapping from property name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyList {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key` to `value`, keeping the original position of an existing key
    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, PropertyValue::as_bool)
    }

    pub fn int_or(&self, key: &str, default: i32) -> i32 {
        self.get(key).map_or(default, PropertyValue::as_int)
    }

    pub fn float_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).map_or(default, PropertyValue::as_float)
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .map_or_else(|| default.to_string(), PropertyValue::as_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_insertion_order() {
        let mut props = PropertyList::new();
        props.set("arg0", 5);
        props.set("comment", "door");
        props.set("arg0", 7);

        let keys: Vec<&str> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["arg0", "comment"]);
        assert_eq!(props.int_or("arg0", 0), 7);
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(PropertyValue::Float(3.9).as_int(), 3);
        assert!(PropertyValue::Int(2).as_bool());
        assert!(PropertyValue::String("TRUE".into()).as_bool());
        assert_eq!(PropertyValue::String(" 12 ".into()).as_int(), 12);
        assert_eq!(PropertyValue::Bool(true).as_string(), "true");
    }

    #[test]
    fn test_defaults_for_missing_keys() {
        let props = PropertyList::new();
        assert!(!props.bool_or("blocking", false));
        assert_eq!(props.int_or("arg1", 0), 0);
        assert_eq!(props.string_or("texturemiddle", "-"), "-");
    }

    #[test]
    fn test_remove() {
        let mut props = PropertyList::new();
        props.set("jumpover", true);
        assert_eq!(props.remove("jumpover"), Some(PropertyValue::Bool(true)));
        assert!(props.is_empty());
        assert!(props.remove("jumpover").is_none());
    }
}
