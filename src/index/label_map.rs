//! Inverted label map and selector-bag evaluation
//!
//! The two-level map at the heart of both index variants: label name →
//! label value → aggregate. Entries are created on first touch and never
//! removed; iteration order of either level carries no meaning.
//!
//! Queries reduce each matcher to its **selector bag**: the union of the
//! aggregates over every observed value the matcher admits.
//!
//! | kind     | values unioned                              |
//! |----------|---------------------------------------------|
//! | Equal    | exactly the pattern, if observed            |
//! | NotEqual | every observed value except the pattern     |
//! | Regex    | every observed value the pattern matches    |
//! | NotRegex | every observed value the pattern rejects    |
//!
//! A matcher over an unobserved label name (or a pattern admitting no
//! observed value) yields the empty aggregate, which the index layers
//! turn into a zero-cardinality conjunction.

use std::collections::HashMap;
use std::sync::Arc;

use crate::matcher::{MatchKind, Matcher};

use super::Aggregate;

/// Two-level inverted map: label name → label value → aggregate
#[derive(Debug)]
pub struct LabelMap<A> {
    names: HashMap<Arc<str>, HashMap<Arc<str>, A>>,
    pairs: usize,
}

impl<A> Default for LabelMap<A> {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
            pairs: 0,
        }
    }
}

impl<A: Aggregate> LabelMap<A> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate slot for (name, value), created empty on first touch
    pub fn aggregate_mut(&mut self, name: Arc<str>, value: Arc<str>) -> &mut A {
        let values = self.names.entry(name).or_default();
        if !values.contains_key(value.as_ref()) {
            self.pairs += 1;
        }
        values.entry(value).or_insert_with(A::empty)
    }

    /// Union of the aggregates over every observed value `matcher` admits
    ///
    /// Never mutates stored aggregates; the returned bag is owned by the
    /// caller. Regex kinds iterate every observed value of the label, so
    /// cost is linear in the label's value count.
    pub fn selector_bag(&self, matcher: &Matcher) -> A {
        let mut bag = A::empty();
        let Some(values) = self.names.get(matcher.name()) else {
            return bag;
        };
        match matcher.kind() {
            MatchKind::Equal => {
                if let Some(aggregate) = values.get(matcher.pattern()) {
                    bag.merge_from(aggregate);
                }
            }
            MatchKind::NotEqual => {
                for (value, aggregate) in values {
                    if value.as_ref() != matcher.pattern() {
                        bag.merge_from(aggregate);
                    }
                }
            }
            MatchKind::Regex => {
                for (value, aggregate) in values {
                    if matcher.pattern_matches(value) {
                        bag.merge_from(aggregate);
                    }
                }
            }
            MatchKind::NotRegex => {
                for (value, aggregate) in values {
                    if !matcher.pattern_matches(value) {
                        bag.merge_from(aggregate);
                    }
                }
            }
        }
        bag
    }

    /// Distinct label names observed
    pub fn label_name_count(&self) -> usize {
        self.names.len()
    }

    /// Distinct (name, value) pairs observed
    pub fn label_pair_count(&self) -> usize {
        self.pairs
    }

    /// Iterate every stored aggregate, for memory accounting
    pub(crate) fn aggregates(&self) -> impl Iterator<Item = &A> {
        self.names.values().flat_map(|values| values.values())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::matcher::Matcher;

    /// Minimal exact aggregate for exercising selector-bag evaluation.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct RefSet(BTreeSet<u64>);

    impl Aggregate for RefSet {
        fn empty() -> Self {
            Self::default()
        }

        fn merge_from(&mut self, other: &Self) {
            self.0.extend(other.0.iter().copied());
        }
    }

    fn sample_map() -> LabelMap<RefSet> {
        let mut map: LabelMap<RefSet> = LabelMap::new();
        let mut add = |name: &str, value: &str, refs: &[u64]| {
            map.aggregate_mut(Arc::from(name), Arc::from(value))
                .0
                .extend(refs.iter().copied());
        };
        add("method", "GET", &[1, 2]);
        add("method", "POST", &[3]);
        add("method", "DELETE", &[4]);
        add("host", "web-1", &[1, 3]);
        add("host", "db-1", &[2, 4]);
        map
    }

    fn refs(bag: RefSet) -> Vec<u64> {
        bag.0.into_iter().collect()
    }

    #[test]
    fn test_equal_selects_single_value() {
        let map = sample_map();
        let bag = map.selector_bag(&Matcher::equal("method", "GET"));
        assert_eq!(refs(bag), vec![1, 2]);
    }

    #[test]
    fn test_equal_unknown_value_is_empty() {
        let map = sample_map();
        let bag = map.selector_bag(&Matcher::equal("method", "PATCH"));
        assert_eq!(refs(bag), Vec::<u64>::new());
    }

    #[test]
    fn test_unknown_label_name_is_empty() {
        let map = sample_map();
        let bag = map.selector_bag(&Matcher::equal("zone", "us-east"));
        assert_eq!(refs(bag), Vec::<u64>::new());
    }

    #[test]
    fn test_not_equal_unions_everything_else() {
        let map = sample_map();
        let bag = map.selector_bag(&Matcher::not_equal("method", "GET"));
        assert_eq!(refs(bag), vec![3, 4]);
    }

    #[test]
    fn test_regex_unions_matching_values() {
        let map = sample_map();
        let bag = map.selector_bag(&Matcher::regex("method", "GET|POST").unwrap());
        assert_eq!(refs(bag), vec![1, 2, 3]);
    }

    #[test]
    fn test_not_regex_unions_rejected_values() {
        let map = sample_map();
        // Pattern matches GET and POST; the selector bag is everything else.
        let bag = map.selector_bag(&Matcher::not_regex("method", "GET|POST").unwrap());
        assert_eq!(refs(bag), vec![4]);
    }

    #[test]
    fn test_pair_counting() {
        let map = sample_map();
        assert_eq!(map.label_name_count(), 2);
        assert_eq!(map.label_pair_count(), 5);
    }

    #[test]
    fn test_aggregate_mut_is_stable_across_touches() {
        let mut map: LabelMap<RefSet> = LabelMap::new();
        map.aggregate_mut(Arc::from("a"), Arc::from("x")).0.insert(1);
        map.aggregate_mut(Arc::from("a"), Arc::from("x")).0.insert(2);
        assert_eq!(map.label_pair_count(), 1);

        let bag = map.selector_bag(&Matcher::equal("a", "x"));
        assert_eq!(refs(bag), vec![1, 2]);
    }
}
