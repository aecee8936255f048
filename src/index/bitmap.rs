//! Exact cardinality index over roaring bitmaps
//!
//! One compressed bitmap of series references per (label name, label
//! value) pair. A query ANDs the selector bags of its matchers left to
//! right; the running bitmap at step k holds exactly the references
//! satisfying the first k matchers, so the count is exact by construction.
//!
//! Memory grows linearly in the sum over labels of the number of series
//! carrying that label. Series references are expected to be dense small
//! integers from the external store; roaring degrades gracefully for
//! sparse references but total memory is not guarded.
//!
//! # Example
//!
//! ```rust
//! use cardinality_index::{BitmapIndex, CardinalityIndex, LabelSet, Matcher};
//!
//! let mut index = BitmapIndex::new();
//! index.add_series(
//!     &LabelSet::from_pairs(&[("__name__", "http_requests"), ("method", "GET")]),
//!     1,
//! );
//! index.add_series(
//!     &LabelSet::from_pairs(&[("__name__", "http_requests"), ("method", "POST")]),
//!     2,
//! );
//!
//! assert_eq!(index.get_cardinality(&[Matcher::equal("method", "GET")]), 1);
//! ```

use roaring::RoaringTreemap;
use tracing::{debug, trace};

use crate::intern::StringInterner;
use crate::labels::{LabelSet, SeriesRef};
use crate::matcher::Matcher;

use super::label_map::LabelMap;
use super::{Aggregate, CardinalityIndex, IndexStats};

impl Aggregate for RoaringTreemap {
    fn empty() -> Self {
        RoaringTreemap::new()
    }

    fn merge_from(&mut self, other: &Self) {
        *self |= other;
    }
}

/// Exact index: one roaring bitmap of series references per label pair
#[derive(Debug, Default)]
pub struct BitmapIndex {
    interner: StringInterner,
    map: LabelMap<RoaringTreemap>,
    series_added: u64,
}

impl BitmapIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time counters for this index
    pub fn stats(&self) -> IndexStats {
        // Rough per-reference estimate; roaring usually does much better.
        let aggregate_bytes: usize = self
            .map
            .aggregates()
            .map(|bitmap| bitmap.len() as usize * std::mem::size_of::<u64>())
            .sum();
        IndexStats {
            series_added: self.series_added,
            label_names: self.map.label_name_count(),
            label_pairs: self.map.label_pair_count(),
            memory_bytes: aggregate_bytes + self.interner.memory_bytes(),
        }
    }
}

impl CardinalityIndex for BitmapIndex {
    fn add_series(&mut self, labels: &LabelSet, series_ref: SeriesRef) {
        for (name, value) in labels.iter() {
            let name = self.interner.intern(name);
            let value = self.interner.intern(value);
            self.map.aggregate_mut(name, value).insert(series_ref);
        }
        self.series_added += 1;
    }

    fn get_cardinality(&self, matchers: &[Matcher]) -> i64 {
        if matchers.is_empty() {
            return 0;
        }

        let mut running = self.map.selector_bag(&matchers[0]);
        trace!(matcher = %matchers[0], len = running.len(), "selector bag");
        for matcher in &matchers[1..] {
            if running.is_empty() {
                return 0;
            }
            let bag = self.map.selector_bag(matcher);
            trace!(matcher = %matcher, len = bag.len(), "selector bag");
            running &= &bag;
        }

        let cardinality = running.len() as i64;
        debug!(
            matchers = matchers.len(),
            cardinality, "bitmap cardinality query"
        );
        cardinality
    }
}
