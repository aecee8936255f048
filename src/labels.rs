//! Label model for series identity
//!
//! A series is identified by an unordered set of (name, value) label pairs,
//! one of which carries the metric name under the reserved [`METRIC_NAME`]
//! key. This module defines:
//!
//! - **`Label`**: one (name, value) pair
//! - **`LabelSet`**: the full set, stored sorted by name so that identity
//!   is insensitive to insertion order
//! - **`SeriesRef`**: the dense integer reference the external store
//!   assigns at ingest
//! - the canonical 64-bit **series identity hash** the approximate index
//!   feeds into its sketches
//!
//! # Example
//!
//! ```rust
//! use cardinality_index::labels::LabelSet;
//!
//! let a = LabelSet::from_pairs(&[("__name__", "http_requests"), ("method", "GET")]);
//! let b = LabelSet::from_pairs(&[("method", "GET"), ("__name__", "http_requests")]);
//!
//! // Identity is order-insensitive.
//! assert_eq!(a, b);
//! assert_eq!(a.identity_hash(), b.identity_hash());
//! ```

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::Xxh64;

/// Reserved label name carrying the metric name
pub const METRIC_NAME: &str = "__name__";

/// Series reference assigned by the external store at ingest
///
/// References are unique per ingest session and are the sole identity the
/// exact index records. The approximate index ignores them entirely.
pub type SeriesRef = u64;

/// Separator byte between label components in the canonical serialization.
/// 0xFF cannot occur inside valid UTF-8, so the encoding is prefix-free.
const SEP: [u8; 1] = [0xFF];

/// A single (name, value) label pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    /// Label name, e.g. `method`
    pub name: String,
    /// Label value, e.g. `GET`
    pub value: String,
}

impl Label {
    /// Create a label from borrowed parts
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// An unordered set of labels identifying one series
///
/// Stored sorted by name; setting a name that is already present replaces
/// its value, so names are unique within a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label set from (name, value) pairs
    ///
    /// Later pairs override earlier ones with the same name.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut set = Self::default();
        for (name, value) in pairs {
            set.set(name, value);
        }
        set
    }

    /// Set a label, replacing any existing value for the same name
    pub fn set(&mut self, name: &str, value: &str) {
        match self
            .labels
            .binary_search_by(|l| l.name.as_str().cmp(name))
        {
            Ok(i) => self.labels[i].value = value.to_string(),
            Err(i) => self.labels.insert(i, Label::new(name, value)),
        }
    }

    /// Value of the label `name`, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels
            .binary_search_by(|l| l.name.as_str().cmp(name))
            .ok()
            .map(|i| self.labels[i].value.as_str())
    }

    /// Number of labels in the set
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set contains no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over (name, value) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.labels
            .iter()
            .map(|l| (l.name.as_str(), l.value.as_str()))
    }

    /// Canonical 64-bit identity hash of the label set
    ///
    /// xxHash64 over `name 0xFF value 0xFF` for every pair in name order.
    /// Two ingests of the same label set always produce the same hash, and
    /// the approximate index treats hash collisions as genuine equality.
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = Xxh64::new(0);
        for label in &self.labels {
            hasher.update(label.name.as_bytes());
            hasher.update(&SEP);
            hasher.update(label.value.as_bytes());
            hasher.update(&SEP);
        }
        hasher.digest()
    }
}
