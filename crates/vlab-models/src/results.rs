//! Index-keyed result documents.
//!
//! Results are stored as a JSON object whose keys are the stringified
//! position of each detection in the service response:
//!
//! ```json
//! {"0": {"name": "Cat", "score": 0.91, "vertices": [[0.1, 0.2], ...]}, "1": {...}}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered detections, serialized as an index-keyed map.
///
/// Ids are response positions for fresh results. Documents read back keep
/// their keys, so a sparse document stays sparse.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResults<T> {
    entries: Vec<(usize, T)>,
}

impl<T> DetectionResults<T> {
    /// Number the items by position.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            entries: items.into_iter().enumerate().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate as `(id, record)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries.iter().map(|(id, item)| (*id, item))
    }

    /// Record stored under `id`.
    pub fn get(&self, id: usize) -> Option<&T> {
        self.entries
            .binary_search_by_key(&id, |(key, _)| *key)
            .ok()
            .map(|index| &self.entries[index].1)
    }

    pub fn into_inner(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, item)| item).collect()
    }
}

impl<T> Default for DetectionResults<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> From<Vec<T>> for DetectionResults<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for DetectionResults<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Serialize> Serialize for DetectionResults<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, item) in self.iter() {
            map.serialize_entry(&id.to_string(), item)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DetectionResults<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ResultsVisitor(PhantomData))
    }
}

struct ResultsVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ResultsVisitor<T> {
    type Value = DetectionResults<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by detection index")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut by_id = BTreeMap::new();

        while let Some((key, value)) = access.next_entry::<String, T>()? {
            let id: usize = key
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid detection index '{}'", key)))?;
            if by_id.insert(id, value).is_some() {
                return Err(de::Error::custom(format!("duplicate detection index {}", id)));
            }
        }

        // Keys are sorted numerically, not lexically ("10" after "9").
        Ok(DetectionResults {
            entries: by_id.into_iter().collect(),
        })
    }
}
