//! Ordered nested mapping produced from a parse tree.
//!
//! Keys keep insertion order so the JSON output lists segments, fields and components in the
//! order the grammar produced them.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Value stored under a mapping key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MappingValue {
    Text(String),
    Object(Mapping),
    List(Vec<Mapping>),
}

impl MappingValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MappingValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Mapping> {
        match self {
            MappingValue::Object(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Mapping]> {
        match self {
            MappingValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// The mapping itself for an object, every element for a list, nothing for text.
    pub fn objects(&self) -> &[Mapping] {
        match self {
            MappingValue::Text(_) => &[],
            MappingValue::Object(mapping) => std::slice::from_ref(mapping),
            MappingValue::List(list) => list,
        }
    }
}

/// Insertion-ordered `String -> MappingValue` map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, MappingValue)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MappingValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Follow a path of keys through nested objects, e.g. `["MSH", "MSH_7", "TS_1"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&MappingValue> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for key in parents {
            current = current.get(key)?.as_object()?;
        }
        current.get(last)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Store `value` under `key`. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: MappingValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Append `item` to the list under `key`, creating the list on first use.
    pub fn push_to_list(&mut self, key: impl Into<String>, item: Mapping) {
        let key = key.into();
        let position = self.entries.iter().position(|(k, _)| *k == key);

        match position {
            Some(i) => match &mut self.entries[i].1 {
                MappingValue::List(list) => list.push(item),
                other => *other = MappingValue::List(vec![item]),
            },
            None => self.entries.push((key, MappingValue::List(vec![item]))),
        }
    }

    /// Compact single-line JSON, as written to the staging area.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for MappingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MappingValue::Text(text) => serializer.serialize_str(text),
            MappingValue::Object(mapping) => mapping.serialize(serializer),
            MappingValue::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for item in list {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
