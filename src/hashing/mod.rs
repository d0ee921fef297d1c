//! Sticky routing hashes.
//!
//! Routing needs a hash that is stable across processes, platforms and releases,
//! so `std`'s randomly seeded `DefaultHasher` is not an option.

use crate::constants::ROUTING_BUCKETS;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Only used for bucketing; a collision moves two inputs into the same bucket
/// and has no other effect.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Maps a routing key to a bucket in `0..ROUTING_BUCKETS`.
///
/// A key is routed to the new engine iff `bucket < rollout_percentage`, so
/// raising the percentage only ever adds buckets.
#[inline]
pub fn routing_bucket(key: &str) -> u8 {
    (hash_to_u64(key.as_bytes()) % ROUTING_BUCKETS) as u8
}
