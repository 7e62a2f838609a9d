//! Dialect identifier guard.
//!
//! Identifiers longer than the dialect limit are truncated and suffixed with
//! `-` plus the first six lowercase hex digits of the SHA-256 of the
//! untruncated name. The truncated part keeps the longest possible prefix of
//! the segment chain, so leading segments survive intact.

use sha2::{Digest, Sha256};
use tracing::debug;

/// Length of the `-xxxxxx` suffix appended to truncated names.
pub const HASH_SUFFIX_LEN: usize = 7;

const HASH_HEX_LEN: usize = 6;

/// Six lowercase hex digits identifying `name`.
pub fn short_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(HASH_HEX_LEN);
    hex
}

/// Concatenate `segments` and fit the result within `limit` bytes.
///
/// Pure: the same segments and limit always produce the same name.
pub fn enforce<S: AsRef<str>>(segments: &[S], limit: usize) -> String {
    let full: String = segments.iter().map(|s| s.as_ref()).collect();
    if full.len() <= limit {
        return full;
    }

    let hash = short_hash(&full);
    if limit < HASH_SUFFIX_LEN {
        return hash[..limit.min(HASH_HEX_LEN)].to_string();
    }

    let mut keep = limit - HASH_SUFFIX_LEN;
    while !full.is_char_boundary(keep) {
        keep -= 1;
    }

    let guarded = format!("{}-{}", &full[..keep], hash);
    debug!(original = %full, truncated = %guarded, limit, "identifier truncated");
    guarded
}

/// Guard a single identifier.
pub fn enforce_name(name: &str, limit: usize) -> String {
    enforce(&[name], limit)
}
