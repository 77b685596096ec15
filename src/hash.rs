//! Order-sensitive 128-bit subtree fingerprinting.
//!
//! A [`SubtreeHash`] identifies a subtree by its topology and leaf labels,
//! never by its contents otherwise; two subtrees fingerprint identically
//! iff they are isomorphic as labeled, *ordered* trees. Order-sensitivity
//! (permuting children changes the hash) is what lets "same fingerprint"
//! stand in for "same topology" without ever comparing subtrees directly —
//! the central cost-saver of the whole compressor.

use crate::ids::SampleId;
use std::hash::{Hash, Hasher};
use twox_hash::xxh3::{Hash128, HasherExt};

/// A 128-bit subtree fingerprint.
///
/// `Eq` compares both halves; [`Hash`] (used by `std::collections::HashMap`)
/// only folds in the low 64 bits, mirroring the open-addressing scheme this
/// is grounded on (key by the low word, disambiguate collisions with a full
/// 128-bit comparison).
#[derive(Copy, Clone, Debug, Eq)]
pub struct SubtreeHash {
    pub lo: u64,
    pub hi: u64,
}

impl PartialEq for SubtreeHash {
    fn eq(&self, other: &Self) -> bool {
        self.lo == other.lo && self.hi == other.hi
    }
}

impl Hash for SubtreeHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lo.hash(state);
    }
}

/// Stateful builder for one subtree's fingerprint: `reset`, `append_child`
/// (repeated, in child order), `finish`. A fresh instance (or one that has
/// just been `reset`) must be used per subtree.
pub struct SubtreeHasher {
    seed: u64,
    inner: Hash128,
}

impl SubtreeHasher {
    pub fn new(seed: u64) -> Self {
        SubtreeHasher { seed, inner: Hash128::with_seed(seed) }
    }

    pub fn reset(&mut self) {
        self.inner = Hash128::with_seed(self.seed);
    }

    /// Fold in one child's fingerprint, in order.
    pub fn append_child(&mut self, child: SubtreeHash) {
        self.inner.write_u64(child.lo);
        self.inner.write_u64(child.hi);
    }

    pub fn finish(&self) -> SubtreeHash {
        let v = self.inner.finish_ext();
        SubtreeHash { lo: v as u64, hi: (v >> 64) as u64 }
    }

    /// One-shot fingerprint for a sample leaf, keyed only by its `SampleId`.
    pub fn hash_sample(seed: u64, sample: SampleId) -> SubtreeHash {
        let mut h = Hash128::with_seed(seed);
        h.write_u32(sample);
        let v = h.finish_ext();
        SubtreeHash { lo: v as u64, hi: (v >> 64) as u64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_hash_is_deterministic() {
        let a = SubtreeHasher::hash_sample(42, 3);
        let b = SubtreeHasher::hash_sample(42, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_samples_hash_differently() {
        let a = SubtreeHasher::hash_sample(42, 3);
        let b = SubtreeHasher::hash_sample(42, 4);
        assert_ne!(a, b);
    }

    #[test]
    fn order_sensitive() {
        let leaf0 = SubtreeHasher::hash_sample(1, 0);
        let leaf1 = SubtreeHasher::hash_sample(1, 1);

        let mut h = SubtreeHasher::new(1);
        h.append_child(leaf0);
        h.append_child(leaf1);
        let forward = h.finish();

        h.reset();
        h.append_child(leaf1);
        h.append_child(leaf0);
        let backward = h.finish();

        assert_ne!(forward, backward, "permuting children must change the fingerprint");
    }

    #[test]
    fn same_children_same_order_same_hash() {
        let leaf0 = SubtreeHasher::hash_sample(7, 0);
        let leaf1 = SubtreeHasher::hash_sample(7, 1);

        let mut h1 = SubtreeHasher::new(7);
        h1.append_child(leaf0);
        h1.append_child(leaf1);

        let mut h2 = SubtreeHasher::new(7);
        h2.append_child(leaf0);
        h2.append_child(leaf1);

        assert_eq!(h1.finish(), h2.finish());
    }
}
