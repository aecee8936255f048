//! Ingest and query benchmarks for both index variants
//!
//! A scaled-down version of the scenario corpus (one family, 20k series)
//! keeps the benchmark fast while exercising the same selector shapes as
//! the end-to-end tests: a heavy conjunction with match-all regexes.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cardinality_index::{
    BitmapIndex, CardinalityIndex, Estimator, LabelSet, Matcher, SketchIndex,
};

fn corpus() -> Vec<LabelSet> {
    let mut series = Vec::new();
    for method in ["GET", "POST", "PUT", "DELETE"] {
        for pod in 0..50 {
            for user in 0..100 {
                series.push(LabelSet::from_pairs(&[
                    ("__name__", "http_request_total"),
                    ("method", method),
                    ("pod", &format!("pod-{pod}")),
                    ("user", &format!("user-{user}")),
                ]));
            }
        }
    }
    series
}

fn heavy_matchers() -> Vec<Matcher> {
    vec![
        Matcher::regex("user", ".*").unwrap(),
        Matcher::regex("pod", "pod-[0-9]").unwrap(),
        Matcher::equal("__name__", "http_request_total"),
    ]
}

fn bench_add_series(c: &mut Criterion) {
    let series = corpus();

    let mut group = c.benchmark_group("add_series");
    group.bench_function("bitmap_20k", |b| {
        b.iter(|| {
            let mut index = BitmapIndex::new();
            for (series_ref, labels) in series.iter().enumerate() {
                index.add_series(labels, series_ref as u64);
            }
            black_box(index.stats().series_added)
        })
    });
    group.bench_function("sketch_20k", |b| {
        b.iter(|| {
            let mut index = SketchIndex::new();
            for (series_ref, labels) in series.iter().enumerate() {
                index.add_series(labels, series_ref as u64);
            }
            black_box(index.stats().series_added)
        })
    });
    group.finish();
}

fn bench_get_cardinality(c: &mut Criterion) {
    let series = corpus();
    let matchers = heavy_matchers();

    let mut bitmap = BitmapIndex::new();
    let mut jaccard = SketchIndex::with_estimator(Estimator::PairwiseJaccard);
    let mut inclusion = SketchIndex::with_estimator(Estimator::InclusionExclusion);
    for (series_ref, labels) in series.iter().enumerate() {
        bitmap.add_series(labels, series_ref as u64);
        jaccard.add_series(labels, series_ref as u64);
        inclusion.add_series(labels, series_ref as u64);
    }

    let mut group = c.benchmark_group("get_cardinality");
    group.bench_function("bitmap_heavy_conjunction", |b| {
        b.iter(|| black_box(bitmap.get_cardinality(&matchers)))
    });
    group.bench_function("sketch_pairwise_heavy_conjunction", |b| {
        b.iter(|| black_box(jaccard.get_cardinality(&matchers)))
    });
    group.bench_function("sketch_inclusion_exclusion_heavy_conjunction", |b| {
        b.iter(|| black_box(inclusion.get_cardinality(&matchers)))
    });
    group.finish();
}

criterion_group!(benches, bench_add_series, bench_get_cardinality);
criterion_main!(benches);
