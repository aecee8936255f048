//! Cardinality indexes
//!
//! Two index variants answer the same question, *how many distinct
//! series match this conjunction of matchers?*, behind one trait:
//!
//! - [`BitmapIndex`]: exact counts from roaring bitmaps of series
//!   references, memory proportional to series × labels.
//! - [`SketchIndex`]: estimates from per-label-value HyperMinHash
//!   sketches at fixed memory per label pair, with a pluggable
//!   multi-matcher [`Estimator`].
//!
//! Both are built from the same parts: a [`LabelMap`](label_map::LabelMap)
//! (name → value → aggregate) and the selector-bag evaluation that reduces
//! one matcher to one aggregate. The variants differ only in the aggregate
//! type and in how per-matcher aggregates are combined.

pub mod bitmap;
pub mod label_map;
pub mod sketch;

pub use bitmap::BitmapIndex;
pub use sketch::{Estimator, SketchIndex};

use std::fmt;

use crate::labels::{LabelSet, SeriesRef};
use crate::matcher::Matcher;

/// The cardinality index contract
///
/// An index is populated by a sequence of [`add_series`] calls, then
/// queried. Series removal is not supported, and callers must not
/// interleave ingest and queries from different threads: ingest is
/// single-writer and queries read a frozen ingest sequence.
///
/// [`add_series`]: CardinalityIndex::add_series
pub trait CardinalityIndex {
    /// Record one series under every label pair it carries
    ///
    /// Re-adding the same series (same labels, same reference) leaves
    /// query results unchanged.
    fn add_series(&mut self, labels: &LabelSet, series_ref: SeriesRef);

    /// Count the distinct series matching the conjunction of `matchers`
    ///
    /// An empty matcher list returns 0: a match-all query is not a
    /// matcher and must be modelled explicitly by the caller. The bitmap
    /// index returns exact counts; the sketch index returns estimates,
    /// which the inclusion-exclusion estimator may drive negative; the
    /// raw value is returned so callers can observe such pathologies.
    fn get_cardinality(&self, matchers: &[Matcher]) -> i64;
}

/// Per-label-value aggregate: the set-like structure stored at each
/// (name, value) slot of the inverted map
///
/// The bitmap index uses exact sets of series references, the sketch
/// index uses HyperMinHash sketches of series identity hashes. Both only
/// need an empty element and an in-place union for selector-bag
/// evaluation.
pub trait Aggregate {
    /// Aggregate containing no series
    fn empty() -> Self;

    /// Fold `other` into `self` (set union); `other` is left untouched
    fn merge_from(&mut self, other: &Self);
}

/// Point-in-time counters describing an index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of `add_series` calls accepted
    pub series_added: u64,
    /// Distinct label names observed
    pub label_names: usize,
    /// Distinct (label name, label value) pairs observed
    pub label_pairs: usize,
    /// Estimated memory held by aggregates and the string pool, in bytes
    pub memory_bytes: usize,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "series_added={} label_names={} label_pairs={} memory_bytes={}",
            self.series_added, self.label_names, self.label_pairs, self.memory_bytes
        )
    }
}
