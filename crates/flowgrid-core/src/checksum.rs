//! Content digests for deployable resources.

use sha2::{Digest, Sha256};

/// SHA-256 digest of `bytes`.
pub fn checksum(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

/// Hex-encoded SHA-256 digest of `bytes`, for logs and display.
pub fn checksum_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
