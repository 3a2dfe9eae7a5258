//! Shared data generators for the benchmarks.
//!
//! Random workloads use `thread_rng`; reproducible ones are seeded
//! (`StdRng` for single sets, `ChaCha8Rng` for independent streams).
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// k-mer length used throughout.
pub const KMER_LEN: usize = 31;

/// Token counts for size sweeps.
pub const SIZES: &[usize] = &[1_000, 10_000, 100_000];

/// Target rates for rate sweeps.
pub const FP_RATES: &[f64] = &[0.1, 0.01, 0.001, 0.0001];

const BASES: &[u8; 4] = b"ACGT";

/// One k-mer from `rng`.
pub fn kmer_from<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASES[rng.gen_range(0..4)] as char)
        .collect()
}

/// One random k-mer.
#[inline]
pub fn random_kmer(len: usize) -> String {
    kmer_from(&mut thread_rng(), len)
}

/// `count` random k-mers (duplicates possible).
pub fn generate_kmers(count: usize, len: usize) -> Vec<String> {
    let mut rng = thread_rng();
    (0..count).map(|_| kmer_from(&mut rng, len)).collect()
}

/// `count` distinct k-mers, reproducible for a given `seed`.
pub fn seeded_distinct_kmers(count: usize, len: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let kmer = kmer_from(&mut rng, len);
        if seen.insert(kmer.clone()) {
            out.push(kmer);
        }
    }
    out
}

/// Two disjoint reproducible sets: `(inserted, probes)`.
pub fn inserted_and_probes(inserted: usize, probes: usize, seed: u64) -> (Vec<String>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(inserted + probes);
    let mut all = Vec::with_capacity(inserted + probes);
    while all.len() < inserted + probes {
        let kmer = kmer_from(&mut rng, KMER_LEN);
        if seen.insert(kmer.clone()) {
            all.push(kmer);
        }
    }
    let probes = all.split_off(inserted);
    (all, probes)
}

/// Reproducible shuffle of `items`.
pub fn shuffled<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    out
}
