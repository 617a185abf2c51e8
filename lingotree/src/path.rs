//! Segment-based addressing of leaves inside a document tree
//!
//! Paths are kept as a sequence of segments so that keys which themselves
//! contain a `.` stay unambiguous. The dotted form (`menu.file.open`) is only
//! produced for display and for matching against user-supplied patterns.

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One step from a container node to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Named child of a mapping
    Key(String),
    /// Positional child of a sequence
    Index(usize),
}

impl Segment {
    /// The textual form used in dotted paths
    pub fn as_key(&self) -> String {
        match self {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }

    /// Position this segment addresses inside a sequence, if any.
    ///
    /// Key segments that arrived from a dotted string (`items.0`) are accepted
    /// as indexes when they are plain decimal numbers.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            Segment::Key(key) => key.parse().ok(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Full path from the document root to a leaf
///
/// On the wire a path is an array of segments (`["menu", "items", 0]`), so
/// keys containing `.` or empty keys survive a round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    /// The empty path, addressing the document root
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        KeyPath(segments)
    }

    /// Split a dotted string into key segments.
    ///
    /// This is lossy for keys containing `.`; it exists for hand-written
    /// input such as command line arguments and tests.
    pub fn parse_dotted(dotted: &str) -> Self {
        if dotted.is_empty() {
            return KeyPath::root();
        }
        KeyPath(
            dotted
                .split('.')
                .map(|part| Segment::Key(part.to_string()))
                .collect(),
        )
    }

    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.to_string()));
        KeyPath(segments)
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent segments and the final segment, or `None` for the root
    pub fn split_last(&self) -> Option<(&[Segment], &Segment)> {
        self.0.split_last().map(|(last, parents)| (parents, last))
    }

    /// Dotted rendering of the path (`""` for the root)
    pub fn to_dotted(&self) -> String {
        self.0
            .iter()
            .map(Segment::as_key)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl From<&str> for KeyPath {
    fn from(dotted: &str) -> Self {
        KeyPath::parse_dotted(dotted)
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Segment::Key(key) => serializer.serialize_str(key),
            Segment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

struct SegmentVisitor;

impl Visitor<'_> for SegmentVisitor {
    type Value = Segment;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping key string or a non-negative sequence index")
    }

    fn visit_str<E: de::Error>(self, key: &str) -> Result<Segment, E> {
        Ok(Segment::Key(key.to_string()))
    }

    fn visit_string<E: de::Error>(self, key: String) -> Result<Segment, E> {
        Ok(Segment::Key(key))
    }

    fn visit_u64<E: de::Error>(self, index: u64) -> Result<Segment, E> {
        usize::try_from(index)
            .map(Segment::Index)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(index), &self))
    }

    fn visit_i64<E: de::Error>(self, index: i64) -> Result<Segment, E> {
        usize::try_from(index)
            .map(Segment::Index)
            .map_err(|_| E::invalid_value(Unexpected::Signed(index), &self))
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SegmentVisitor)
    }
}
