//! Approximate cardinality index over HyperMinHash sketches
//!
//! One fixed-size sketch per (label name, label value) pair, fed with the
//! 64-bit series identity hash (big-endian encoded) rather than the
//! store's series reference, so memory is bounded by distinct label pairs,
//! not by series count.
//!
//! The sketch primitive offers union and *pairwise* intersection only, so
//! multi-matcher conjunctions need an estimation strategy on top. Two are
//! provided, selected at construction via [`Estimator`]; neither is a
//! rigorous bound and both are expected to be tuned per workload.
//!
//! # Example
//!
//! ```rust
//! use cardinality_index::{CardinalityIndex, Estimator, LabelSet, Matcher, SketchIndex};
//!
//! let mut index = SketchIndex::with_estimator(Estimator::PairwiseJaccard);
//! for host in ["web-1", "web-2", "db-1"] {
//!     index.add_series(
//!         &LabelSet::from_pairs(&[("__name__", "up"), ("host", host)]),
//!         0, // the sketch index ignores series references
//!     );
//! }
//!
//! let estimate = index.get_cardinality(&[Matcher::regex("host", "web-.*").unwrap()]);
//! assert!((1..=3).contains(&estimate));
//! ```

use tracing::{debug, trace};

use crate::intern::StringInterner;
use crate::labels::{LabelSet, SeriesRef};
use crate::matcher::Matcher;
use crate::sketch::Sketch;

use super::label_map::LabelMap;
use super::{Aggregate, CardinalityIndex, IndexStats};

impl Aggregate for Sketch {
    fn empty() -> Self {
        Sketch::new()
    }

    fn merge_from(&mut self, other: &Self) {
        Sketch::merge_from(self, other);
    }
}

/// Strategy for combining per-matcher sketches into one estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Estimator {
    /// Minimum over all pairwise intersection estimates
    ///
    /// Starts from the first selector bag's cardinality and takes the
    /// minimum over the intersection estimate of every unordered matcher
    /// pair. The pairwise estimate is an upper-bound-quality proxy for
    /// the full conjunction when label dimensions are roughly
    /// independent; the minimum is a heuristic lower envelope that damps
    /// any single noisy pair.
    #[default]
    PairwiseJaccard,

    /// Signed inclusion-exclusion over all non-empty matcher subsets
    ///
    /// Sums the union-cardinality estimate of every subset with sign
    /// `(-1)^(|subset|+1)`. Algebraically exact, but every term is itself
    /// an estimate and the subset count is `2^n - 1`, so it is intended
    /// for small conjunctions (up to 3-4 matchers). Results are not
    /// clamped and can be negative for pathological inputs.
    InclusionExclusion,
}

/// Approximate index: one HyperMinHash sketch per label pair
#[derive(Debug)]
pub struct SketchIndex {
    interner: StringInterner,
    map: LabelMap<Sketch>,
    estimator: Estimator,
    series_added: u64,
}

impl Default for SketchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchIndex {
    /// Create an index with the default (pairwise-Jaccard) estimator
    pub fn new() -> Self {
        Self::with_estimator(Estimator::default())
    }

    /// Create an index committed to the given estimator
    pub fn with_estimator(estimator: Estimator) -> Self {
        Self {
            interner: StringInterner::new(),
            map: LabelMap::new(),
            estimator,
            series_added: 0,
        }
    }

    /// The estimator this index was constructed with
    pub fn estimator(&self) -> Estimator {
        self.estimator
    }

    /// Point-in-time counters for this index
    pub fn stats(&self) -> IndexStats {
        let aggregate_bytes: usize = self.map.aggregates().map(Sketch::memory_bytes).sum();
        IndexStats {
            series_added: self.series_added,
            label_names: self.map.label_name_count(),
            label_pairs: self.map.label_pair_count(),
            memory_bytes: aggregate_bytes + self.interner.memory_bytes(),
        }
    }

    fn selector_bags(&self, matchers: &[Matcher]) -> Vec<Sketch> {
        matchers
            .iter()
            .map(|matcher| {
                let bag = self.map.selector_bag(matcher);
                trace!(matcher = %matcher, estimate = bag.cardinality(), "selector bag");
                bag
            })
            .collect()
    }

    fn estimate_pairwise_min(&self, matchers: &[Matcher]) -> i64 {
        let bags = self.selector_bags(matchers);
        let mut estimate = bags[0].cardinality() as i64;
        for i in 0..bags.len() {
            for j in (i + 1)..bags.len() {
                let pair = bags[i].intersection(&bags[j]) as i64;
                if pair < estimate {
                    estimate = pair;
                }
            }
        }
        estimate
    }

    fn estimate_inclusion_exclusion(&self, matchers: &[Matcher]) -> i64 {
        let bags = self.selector_bags(matchers);
        let subsets = 1usize << bags.len();
        let mut result = 0i64;
        for subset in 1..subsets {
            let mut merged = Sketch::new();
            let mut members = 0u32;
            for (i, bag) in bags.iter().enumerate() {
                if subset & (1 << i) != 0 {
                    merged.merge_from(bag);
                    members += 1;
                }
            }
            let union_estimate = merged.cardinality() as i64;
            if members % 2 == 1 {
                result += union_estimate;
            } else {
                result -= union_estimate;
            }
        }
        result
    }
}

impl CardinalityIndex for SketchIndex {
    fn add_series(&mut self, labels: &LabelSet, _series_ref: SeriesRef) {
        let identity = labels.identity_hash().to_be_bytes();
        for (name, value) in labels.iter() {
            let name = self.interner.intern(name);
            let value = self.interner.intern(value);
            self.map.aggregate_mut(name, value).add(&identity);
        }
        self.series_added += 1;
    }

    fn get_cardinality(&self, matchers: &[Matcher]) -> i64 {
        if matchers.is_empty() {
            return 0;
        }
        let estimate = match self.estimator {
            Estimator::PairwiseJaccard => self.estimate_pairwise_min(matchers),
            Estimator::InclusionExclusion => self.estimate_inclusion_exclusion(matchers),
        };
        debug!(
            estimator = ?self.estimator,
            matchers = matchers.len(),
            estimate,
            "sketch cardinality query"
        );
        estimate
    }
}
