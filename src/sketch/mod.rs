//! Probabilistic sketches for cardinality estimation
//!
//! The approximate index stores one [`Sketch`] per label pair instead of
//! an exact set of series references. A sketch supports union (register
//! merge), standalone cardinality estimation, and pairwise intersection
//! estimation via min-hash Jaccard similarity: the three primitives the
//! estimators in [`crate::index::sketch`] are built from.

pub mod hyperminhash;

pub use hyperminhash::Sketch;
