//! HyperMinHash sketch
//!
//! A fixed-size sketch combining a LogLog-Beta cardinality estimator with
//! a b-bit min-hash per register. Each of the `2^14` registers packs a
//! 6-bit leading-zero rank and a 10-bit min-hash signature into a `u16`,
//! 32 KiB per sketch regardless of how many elements it has seen.
//!
//! - **Union** is a register-wise maximum, exactly as in HyperLogLog.
//! - **Cardinality** uses the LogLog-Beta estimator (bias-corrected by a
//!   polynomial in the number of empty registers).
//! - **Pairwise intersection** estimates Jaccard similarity from the
//!   fraction of registers that agree, corrected for the collisions two
//!   independent sets would produce by chance, then scales by the union
//!   cardinality.
//!
//! There is no k-way intersection primitive; multi-matcher estimation
//! strategies live in the index layer.
//!
//! Hashing is xxh3-128 under a fixed seed, so sketch contents are a pure
//! function of the inserted values: re-ingesting the same elements in any
//! order reproduces identical registers and identical estimates.

use std::fmt;

use xxhash_rust::xxh3::xxh3_128_with_seed;

/// Index bits: the sketch has `2^P` registers.
const P: u32 = 14;
/// Register count.
const M: usize = 1 << P;
/// Bits of leading-zero rank kept per register.
const Q: u32 = 6;
/// Bits of min-hash signature kept per register.
const R: u32 = 10;
/// Hash bits remaining after the register index is consumed.
const HASH_BITS: u32 = 64 - P;
/// Mask of the low `P` bits, used to cap the leading-zero count.
const INDEX_MASK: u64 = (1 << P) - 1;
/// LogLog bias constant for `M` registers.
const ALPHA: f64 = 0.7213 / (1.0 + 1.079 / M as f64);
/// Fixed hashing seed; estimates must be deterministic across runs.
const SEED: u64 = 0x1337;

/// HyperMinHash sketch with `2^14` 16-bit registers
///
/// # Example
///
/// ```rust
/// use cardinality_index::sketch::Sketch;
///
/// let mut sketch = Sketch::new();
/// for i in 0u64..10_000 {
///     sketch.add(&i.to_be_bytes());
/// }
///
/// let estimate = sketch.cardinality();
/// assert!(estimate > 9_500 && estimate < 10_500);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sketch {
    registers: Vec<u16>,
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch {
    /// Create an empty sketch
    pub fn new() -> Self {
        Self {
            registers: vec![0; M],
        }
    }

    /// Add one element, supplied as raw bytes
    pub fn add(&mut self, value: &[u8]) {
        let hash = xxh3_128_with_seed(value, SEED);
        self.add_hash((hash >> 64) as u64, hash as u64);
    }

    /// Add a pre-hashed element
    ///
    /// `hi` supplies the register index and leading-zero rank, `lo` the
    /// min-hash signature. Callers bringing their own hash must use one
    /// with 128 well-mixed bits.
    pub fn add_hash(&mut self, hi: u64, lo: u64) {
        let index = (hi >> HASH_BITS) as usize;
        // The xor floors the zero-run at the bits actually available, so
        // the rank always fits in Q bits.
        let rank = ((hi << P) ^ INDEX_MASK).leading_zeros() as u16 + 1;
        let signature = (lo & ((1u64 << R) - 1)) as u16;
        let register = (rank << R) | signature;
        if self.registers[index] < register {
            self.registers[index] = register;
        }
    }

    /// Whether the sketch has seen no elements
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    /// LogLog-Beta cardinality estimate
    pub fn cardinality(&self) -> u64 {
        let m = M as f64;
        let mut sum = 0.0;
        let mut zeros = 0.0;
        for &register in &self.registers {
            let rank = (register >> R) as i32;
            if rank == 0 {
                zeros += 1.0;
            }
            sum += 2f64.powi(-rank);
        }
        (ALPHA * m * (m - zeros) / (beta(zeros) + sum)) as u64
    }

    /// Union: fold `other` into `self` by register-wise maximum
    pub fn merge_from(&mut self, other: &Sketch) {
        for (mine, theirs) in self.registers.iter_mut().zip(other.registers.iter()) {
            if *mine < *theirs {
                *mine = *theirs;
            }
        }
    }

    /// Jaccard similarity estimate against `other`
    ///
    /// Counts registers that agree in both rank and signature, subtracts
    /// the collisions two independent sets of these cardinalities would
    /// produce by chance, and normalizes by the occupied register count.
    /// Returns 0 when agreement does not exceed chance.
    pub fn similarity(&self, other: &Sketch) -> f64 {
        let mut matching = 0.0;
        let mut occupied = 0.0;
        for (&a, &b) in self.registers.iter().zip(other.registers.iter()) {
            if a != 0 && a == b {
                matching += 1.0;
            }
            if a != 0 || b != 0 {
                occupied += 1.0;
            }
        }
        if matching == 0.0 {
            return 0.0;
        }

        let n = self.cardinality() as f64;
        let m = other.cardinality() as f64;
        let expected = expected_collisions(n, m);
        if matching < expected {
            return 0.0;
        }
        (matching - expected) / occupied
    }

    /// Pairwise intersection estimate: similarity times union cardinality
    pub fn intersection(&self, other: &Sketch) -> u64 {
        let similarity = self.similarity(other);
        let mut union = self.clone();
        union.merge_from(other);
        (similarity * union.cardinality() as f64 + 0.5) as u64
    }

    /// Fixed register storage in bytes
    pub fn memory_bytes(&self) -> usize {
        self.registers.len() * std::mem::size_of::<u16>()
    }

    fn occupied_registers(&self) -> usize {
        self.registers.iter().filter(|&&r| r != 0).count()
    }
}

impl fmt::Debug for Sketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sketch")
            .field("occupied", &self.occupied_registers())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

/// LogLog-Beta bias polynomial for `2^14` registers, in the number of
/// empty registers.
fn beta(zeros: f64) -> f64 {
    let zl = (zeros + 1.0).ln();
    -0.370393911 * zeros
        + 0.070471823 * zl
        + 0.17393686 * zl.powi(2)
        + 0.16339839 * zl.powi(3)
        - 0.09237745 * zl.powi(4)
        + 0.03738027 * zl.powi(5)
        - 0.005384159 * zl.powi(6)
        + 0.00042419 * zl.powi(7)
}

/// Expected count of register agreements between sketches of two
/// independent (disjoint) sets with cardinalities `n` and `m`.
fn expected_collisions(n: f64, m: f64) -> f64 {
    let (n, m) = if n < m { (m, n) } else { (n, m) };
    if n > 2f64.powf(2f64.powi(Q as i32) + R as f64) {
        // Beyond the resolvable range every agreement is chance.
        return f64::INFINITY;
    }
    if n > 2f64.powi((P + 5) as i32) {
        // Closed-form approximation for large n.
        const C: f64 = 0.169_919_487_159_739_1;
        let d = (4.0 * n / m) / ((1.0 + n) / m).powi(2);
        return C * 2f64.powi(P as i32 - R as i32) * d + 0.5;
    }
    collision_sum(n, m) / f64::from(P)
}

/// Exact expected-collision double sum over the (rank, signature) grid.
fn collision_sum(n: f64, m: f64) -> f64 {
    let two_q = f64::from(1u32 << Q);
    let two_r = f64::from(1u32 << R);
    let mut x = 0.0;
    let mut i = 1.0;
    while i <= two_q {
        let mut j = 1.0;
        while j <= two_r {
            let (b1, b2) = if i != two_q {
                let den = 2f64.powf(f64::from(P + R) + i);
                ((two_r + j) / den, (two_r + j + 1.0) / den)
            } else {
                let den = 2f64.powf(f64::from(P + R) + i - 1.0);
                (j / den, (j + 1.0) / den)
            };
            let prx = (1.0 - b2).powf(n) - (1.0 - b1).powf(n);
            let pry = (1.0 - b2).powf(m) - (1.0 - b1).powf(m);
            x += prx * pry;
            j += 1.0;
        }
        i += 1.0;
    }
    x * f64::from(P) + 0.5
}
