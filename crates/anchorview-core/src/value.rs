//! Dynamically typed slot properties.

use std::fmt;
use std::rc::Rc;

use crate::collections::map::HashMap;

/// One property value stored on a slot.
///
/// Values are immutable once built; lists and nested maps are reference
/// counted so cloning a prop map never deep-copies its contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PropValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<[PropValue]>),
    Map(PropMap),
}

impl PropValue {
    /// Mirrors document truthiness: null, `false`, zero, NaN and the empty
    /// string are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(value) => *value,
            PropValue::Int(value) => *value != 0,
            PropValue::Float(value) => *value != 0.0 && !value.is_nan(),
            PropValue::Str(value) => !value.is_empty(),
            PropValue::List(_) | PropValue::Map(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Float(value) => Some(*value),
            PropValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropMap> {
        match self {
            PropValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("null"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Str(value) => f.write_str(value),
            PropValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            PropValue::Map(map) => write!(f, "{map:?}"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(items: Vec<PropValue>) -> Self {
        PropValue::List(items.into())
    }
}

impl From<PropMap> for PropValue {
    fn from(map: PropMap) -> Self {
        PropValue::Map(map)
    }
}

/// String-keyed property map with copy-on-write storage.
///
/// Clones share the underlying table until one of them is mutated.
#[derive(Clone, Default)]
pub struct PropMap {
    entries: Rc<HashMap<Rc<str>, PropValue>>,
}

impl PropMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(key, value)| (&**key, value))
    }

    /// Keys in lexical order, for stable output.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(|key| &**key).collect();
        keys.sort_unstable();
        keys
    }

    pub fn insert(&mut self, key: impl Into<Rc<str>>, value: impl Into<PropValue>) {
        Rc::make_mut(&mut self.entries).insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        if !self.entries.contains_key(key) {
            return None;
        }
        Rc::make_mut(&mut self.entries).remove(key)
    }

    /// Builder form of [`PropMap::insert`].
    pub fn with(mut self, key: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Copies every entry of `other` into `self`, key by key. Keys present in
    /// both take the value from `other`; keys only in `self` are kept.
    pub fn merge_from(&mut self, other: &PropMap) {
        if other.is_empty() || self.ptr_eq(other) {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        let entries = Rc::make_mut(&mut self.entries);
        for (key, value) in other.entries.iter() {
            entries.insert(key.clone(), value.clone());
        }
    }

    /// Returns `self` overlaid with `overlay`; the overlay wins on conflicts.
    pub fn shallow_merge(&self, overlay: &PropMap) -> PropMap {
        let mut merged = self.clone();
        merged.merge_from(overlay);
        merged
    }

    /// Whether both maps share the same storage.
    pub fn ptr_eq(&self, other: &PropMap) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for PropMap {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.entries == *other.entries
    }
}

impl fmt::Debug for PropMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.sorted_keys() {
            map.entry(&key, &self.entries[key]);
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for PropMap
where
    K: Into<Rc<str>>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Builds a [`PropMap`] from `key => value` pairs.
///
/// ```
/// use anchorview_core::props;
///
/// let props = props! { "value" => "hi", "size" => 12 };
/// assert_eq!(props.get("size").and_then(|v| v.as_i64()), Some(12));
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::PropMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::PropMap::new();
        $(map.insert($key, $value);)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wins_on_conflicting_keys() {
        let persisted = props! { "value" => "hi", "bold" => true };
        let overlay = props! { "bold" => false, "selected" => true };

        let merged = persisted.shallow_merge(&overlay);

        assert_eq!(merged.get("value"), Some(&PropValue::from("hi")));
        assert_eq!(merged.get("bold"), Some(&PropValue::Bool(false)));
        assert_eq!(merged.get("selected"), Some(&PropValue::Bool(true)));
        // the source map is untouched
        assert_eq!(persisted.get("bold"), Some(&PropValue::Bool(true)));
        assert!(!persisted.contains_key("selected"));
    }

    #[test]
    fn merging_an_empty_overlay_shares_storage() {
        let persisted = props! { "a" => 1 };
        let merged = persisted.shallow_merge(&PropMap::new());
        assert!(merged.ptr_eq(&persisted));
    }

    #[test]
    fn insert_after_clone_does_not_leak_into_original() {
        let original = props! { "a" => 1 };
        let mut copy = original.clone();
        copy.insert("b", 2);

        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn truthiness_follows_document_rules() {
        assert!(!PropValue::Null.is_truthy());
        assert!(!PropValue::from(false).is_truthy());
        assert!(!PropValue::from(0).is_truthy());
        assert!(!PropValue::from("").is_truthy());
        assert!(!PropValue::Float(f64::NAN).is_truthy());
        assert!(PropValue::from("text").is_truthy());
        assert!(PropValue::from(vec![]).is_truthy());
    }

    #[test]
    fn debug_output_is_sorted() {
        let map = props! { "b" => 2, "a" => 1 };
        assert_eq!(format!("{map:?}"), r#"{"a": Int(1), "b": Int(2)}"#);
    }
}
