//! One-time codes for password resets.
//!
//! Codes are 6 random digits, stored only as a SHA-256 hex digest next to
//! an expiry timestamp. Verification hashes the candidate and compares
//! digests in constant time.

use rand::Rng;
use sha2::{Digest, Sha256};

pub fn generate() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

pub fn hash(otp: &str) -> String {
    hex::encode(Sha256::digest(otp.as_bytes()))
}

/// Compare a candidate code against a stored digest without early exit.
pub fn matches(candidate: &str, stored_hash: &str) -> bool {
    let candidate_hash = hash(candidate);
    if candidate_hash.len() != stored_hash.len() {
        return false;
    }
    candidate_hash
        .bytes()
        .zip(stored_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
