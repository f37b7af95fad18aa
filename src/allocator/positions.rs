//! Deterministic, collision-free carrier position generation.
//!
//! Keyed positions are drawn with a partial Fisher-Yates shuffle driven by a
//! ChaCha20 generator seeded with `SHA-256(seed_key)`. The range passed to
//! `gen_range` is `u32` so the draw sequence is identical on 32- and 64-bit
//! targets.

use crate::error::{Error, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

/// Order in which carrier units are assigned to payload bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPolicy {
    /// Units `0, 1, 2, ...` in carrier order.
    Sequential,
    /// Pseudorandom units in sampling order.
    Keyed,
    /// Pseudorandom units sorted ascending after sampling.
    KeyedSorted,
}

/// Generates ordered, unique carrier indices for one policy.
#[derive(Debug, Clone, Copy)]
pub struct PositionAllocator {
    policy: PositionPolicy,
}

impl PositionAllocator {
    /// Create an allocator for the given policy.
    pub fn new(policy: PositionPolicy) -> Self {
        Self { policy }
    }

    /// The policy this allocator applies.
    pub fn policy(&self) -> PositionPolicy {
        self.policy
    }

    /// Generate `count` unique indices in `[0, capacity)` that avoid `exclude`.
    ///
    /// Identical `(seed_key, capacity, count, exclude)` always yields the
    /// identical sequence. The seed key is ignored by the sequential policy.
    pub fn generate(
        &self,
        seed_key: &[u8],
        capacity: usize,
        count: usize,
        exclude: &[usize],
    ) -> Result<Vec<usize>> {
        let excluded = exclusion_mask(capacity, exclude);
        let excluded_count = excluded.iter().filter(|&&x| x).count();
        let available = capacity - excluded_count;

        if count > available {
            return Err(Error::Capacity {
                needed: count as u64,
                available: available as u64,
            });
        }

        match self.policy {
            PositionPolicy::Sequential => Ok((0..capacity)
                .filter(|&i| !excluded[i])
                .take(count)
                .collect()),
            PositionPolicy::Keyed => sample(seed_key, capacity, count, &excluded),
            PositionPolicy::KeyedSorted => {
                let mut positions = sample(seed_key, capacity, count, &excluded)?;
                positions.sort_unstable();
                Ok(positions)
            }
        }
    }
}

/// Build a generator seed from arbitrary key material.
pub fn seed_from_key(seed_key: &[u8]) -> [u8; 32] {
    Sha256::digest(seed_key).into()
}

/// Concatenate a seed key with a stream label.
pub fn labeled_key(seed_key: &[u8], label: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(seed_key.len() + label.len());
    key.extend_from_slice(seed_key);
    key.extend_from_slice(label.as_bytes());
    key
}

fn exclusion_mask(capacity: usize, exclude: &[usize]) -> Vec<bool> {
    let mut mask = vec![false; capacity];
    for &index in exclude {
        if index < capacity {
            mask[index] = true;
        }
    }
    mask
}

fn sample(seed_key: &[u8], capacity: usize, count: usize, excluded: &[bool]) -> Result<Vec<usize>> {
    if u32::try_from(capacity).is_err() {
        return Err(Error::UnsupportedFormat(format!(
            "carrier of {capacity} units exceeds the 32-bit position space"
        )));
    }

    let mut candidates: Vec<u32> = (0..capacity as u32)
        .filter(|&i| !excluded[i as usize])
        .collect();
    let len = candidates.len() as u32;

    let mut rng = ChaCha20Rng::from_seed(seed_from_key(seed_key));
    for i in 0..count as u32 {
        let j = rng.gen_range(i..len);
        candidates.swap(i as usize, j as usize);
    }

    candidates.truncate(count);
    Ok(candidates.into_iter().map(|i| i as usize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_positions() {
        let alloc = PositionAllocator::new(PositionPolicy::Sequential);
        let positions = alloc.generate(b"ignored", 10, 4, &[]).unwrap();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sequential_skips_excluded() {
        let alloc = PositionAllocator::new(PositionPolicy::Sequential);
        let positions = alloc.generate(b"", 10, 4, &[0, 2]).unwrap();
        assert_eq!(positions, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_keyed_deterministic() {
        let alloc = PositionAllocator::new(PositionPolicy::Keyed);
        let a = alloc.generate(b"secret", 10_000, 500, &[]).unwrap();
        let b = alloc.generate(b"secret", 10_000, 500, &[]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keyed_unique_and_in_range() {
        let alloc = PositionAllocator::new(PositionPolicy::Keyed);
        let positions = alloc.generate(b"key", 1000, 1000, &[]).unwrap();
        let unique: HashSet<_> = positions.iter().collect();
        assert_eq!(unique.len(), 1000);
        assert!(positions.iter().all(|&p| p < 1000));
    }

    #[test]
    fn test_different_keys_different_positions() {
        let alloc = PositionAllocator::new(PositionPolicy::Keyed);
        let a = alloc.generate(b"key-one", 10_000, 64, &[]).unwrap();
        let b = alloc.generate(b"key-two", 10_000, 64, &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_keyed_prefix_stable() {
        // Drawing more positions extends the sequence instead of reshuffling it.
        let alloc = PositionAllocator::new(PositionPolicy::Keyed);
        let short = alloc.generate(b"key", 5000, 40, &[]).unwrap();
        let long = alloc.generate(b"key", 5000, 400, &[]).unwrap();
        assert_eq!(&long[..40], &short[..]);
    }

    #[test]
    fn test_sorted_policy_is_ascending() {
        let alloc = PositionAllocator::new(PositionPolicy::KeyedSorted);
        let positions = alloc.generate(b"key", 5000, 300, &[]).unwrap();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let unsorted = PositionAllocator::new(PositionPolicy::Keyed)
            .generate(b"key", 5000, 300, &[])
            .unwrap();
        let mut expected = unsorted.clone();
        expected.sort_unstable();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_exclusion_is_disjoint() {
        for policy in [
            PositionPolicy::Sequential,
            PositionPolicy::Keyed,
            PositionPolicy::KeyedSorted,
        ] {
            let alloc = PositionAllocator::new(policy);
            for (capacity, count) in [(64, 32), (100, 68), (3000, 1000), (30_000, 29_968)] {
                let header = alloc.generate(b"key_length", capacity, 32, &[]).unwrap();
                let body = alloc.generate(b"key", capacity, count, &header).unwrap();
                let header: HashSet<_> = header.into_iter().collect();
                assert!(body.iter().all(|p| !header.contains(p)));
                assert_eq!(body.iter().collect::<HashSet<_>>().len(), count);
            }
        }
    }

    #[test]
    fn test_capacity_error() {
        let alloc = PositionAllocator::new(PositionPolicy::Keyed);
        let result = alloc.generate(b"key", 100, 101, &[]);
        assert!(matches!(
            result,
            Err(Error::Capacity {
                needed: 101,
                available: 100
            })
        ));

        let result = alloc.generate(b"key", 100, 70, &(0..32).collect::<Vec<_>>());
        assert!(matches!(
            result,
            Err(Error::Capacity {
                needed: 70,
                available: 68
            })
        ));
    }

    #[test]
    fn test_exclusion_outside_range_ignored() {
        let alloc = PositionAllocator::new(PositionPolicy::Keyed);
        let positions = alloc.generate(b"key", 10, 10, &[50, 99]).unwrap();
        assert_eq!(positions.len(), 10);
    }

    #[test]
    fn test_labeled_key() {
        assert_eq!(labeled_key(b"pass", "_length"), b"pass_length");
        assert_ne!(seed_from_key(b"pass"), seed_from_key(b"pass_length"));
    }
}
