//! Content addressing for recipe documents

use sha2::{Digest, Sha256};

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable document id: same recipe text and source id always map to the same row
pub fn recipe_id(content: &str, original_id: i64) -> String {
    hash_content(&format!("{}\u{1f}{}", original_id, content))
}

/// Generate short docid (first 6 chars of hash)
pub fn docid_from_hash(hash: &str) -> String {
    hash.chars().take(6).collect()
}
