//! Stable content hashing for row deduplication.
//!
//! Used exclusively by the table engine's query path to collapse duplicate
//! candidate rows surfaced by walking multiple posting lists in the inverted
//! index. Not security-sensitive: a collision only means a row might appear
//! twice in a result set, not a correctness violation of any invariant this
//! system claims to uphold.

use xxhash_rust::xxh64::xxh64;

use crate::types::Row;

/// Hashes `row` by serializing its fields in sorted key order (which
/// `BTreeMap` iteration already gives us) and running xxHash-64 over the
/// resulting bytes.
#[must_use]
pub fn stable_row_hash(row: &Row) -> u64 {
    let bytes = serde_json::to_vec(row).expect("Row serializes to JSON infallibly");
    xxh64(&bytes, 0)
}
