//! Cardinality index for time-series label sets
//!
//! Answers "how many distinct series match this conjunction of label
//! matchers?" without scanning the posting lists the storage engine uses
//! for query evaluation. Two index strategies share one contract:
//!
//! - **Exact** ([`BitmapIndex`]): a roaring bitmap of series references
//!   per label value; exact counts at memory proportional to
//!   series x labels.
//! - **Approximate** ([`SketchIndex`]): a HyperMinHash sketch per label
//!   value; estimates at fixed memory per label pair, with two pluggable
//!   multi-matcher estimators.
//!
//! Ingest is single-writer and queries read a frozen ingest sequence;
//! there is no removal, persistence, or eviction.
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
//! let matchers = vec![Matcher::equal("method", "GET")];
//! assert_eq!(index.get_cardinality(&matchers), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod index;
pub mod intern;
pub mod labels;
pub mod matcher;
pub mod sketch;

pub use error::{Error, Result};
pub use index::{BitmapIndex, CardinalityIndex, Estimator, IndexStats, SketchIndex};
pub use labels::{Label, LabelSet, SeriesRef, METRIC_NAME};
pub use matcher::{MatchKind, Matcher};
