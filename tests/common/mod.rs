//! Shared test support: the three-family scenario corpus and a scan-based
//! reference counter used as ground truth for the invariant tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use cardinality_index::{CardinalityIndex, LabelSet, Matcher, SeriesRef};

/// Reference counter that answers queries by scanning every recorded
/// label set, standing in for the store's native posting reader. Used
/// only to produce expected values; exact and obviously correct, but
/// linear per query.
#[derive(Debug, Default)]
pub struct ScanIndex {
    series: BTreeMap<SeriesRef, LabelSet>,
}

impl ScanIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CardinalityIndex for ScanIndex {
    fn add_series(&mut self, labels: &LabelSet, series_ref: SeriesRef) {
        self.series.insert(series_ref, labels.clone());
    }

    fn get_cardinality(&self, matchers: &[Matcher]) -> i64 {
        if matchers.is_empty() {
            return 0;
        }
        self.series
            .values()
            .filter(|labels| matchers.iter().all(|m| series_matches(labels, m)))
            .count() as i64
    }
}

/// Whether a series satisfies one matcher under index semantics: the
/// series must carry the label and its value must be accepted.
fn series_matches(labels: &LabelSet, matcher: &Matcher) -> bool {
    labels
        .get(matcher.name())
        .map(|value| matcher.matches(value))
        .unwrap_or(false)
}

/// `prefix-0` .. `prefix-{count-1}`
pub fn generated_values(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}-{i}")).collect()
}

/// One metric family: a name and three label dimensions.
pub struct MetricFamily {
    pub name: &'static str,
    pub dimensions: [(&'static str, Vec<String>); 3],
}

/// The canonical scenario corpus:
///
/// - `http_request_total`    x method(5) x pod(1000)      x user(100) = 500k
/// - `ingester_active_series` x api(5)   x ingester(1000) x user(100) = 500k
/// - `blocks_loaded`         x block(1000) x instance(100) x user(10) = 1M
pub fn scenario_families() -> Vec<MetricFamily> {
    let fixed = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
    vec![
        MetricFamily {
            name: "http_request_total",
            dimensions: [
                ("method", fixed(&["GET", "POST", "PUT", "PATCH", "DELETE"])),
                ("pod", generated_values("pod", 1000)),
                ("user", generated_values("user", 100)),
            ],
        },
        MetricFamily {
            name: "ingester_active_series",
            dimensions: [
                (
                    "api",
                    fixed(&[
                        "QueryStream",
                        "Push",
                        "MetricsForLabelMatchers",
                        "LabelValues",
                        "LabelNames",
                    ]),
                ),
                ("ingester", generated_values("ingester", 1000)),
                ("user", generated_values("user", 100)),
            ],
        },
        MetricFamily {
            name: "blocks_loaded",
            dimensions: [
                ("block", generated_values("ID", 1000)),
                ("instance", generated_values("store-gateway", 100)),
                ("user", generated_values("user", 10)),
            ],
        },
    ]
}

/// Ingest the full cartesian product of every scenario family into every
/// index, assigning dense series references. Returns the series count.
pub fn ingest_scenario_corpus(indexes: &mut [&mut dyn CardinalityIndex]) -> u64 {
    let mut next_ref: SeriesRef = 0;
    for family in scenario_families() {
        let [(name0, values0), (name1, values1), (name2, values2)] = &family.dimensions;
        let (name0, name1, name2) = (*name0, *name1, *name2);
        for v0 in values0 {
            for v1 in values1 {
                for v2 in values2 {
                    let labels = LabelSet::from_pairs(&[
                        ("__name__", family.name),
                        (name0, v0.as_str()),
                        (name1, v1.as_str()),
                        (name2, v2.as_str()),
                    ]);
                    next_ref += 1;
                    for index in indexes.iter_mut() {
                        index.add_series(&labels, next_ref);
                    }
                }
            }
        }
    }
    next_ref
}
