//! Store key hashing.

use sha2::{Digest, Sha256};

/// Compute the fixed-width key under which a request URL is stored.
pub fn compute_entry_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_entry_key("https://example.com/index.html");
        let hash2 = compute_entry_key("https://example.com/index.html");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_query_sensitive() {
        let a = compute_entry_key("https://example.com/?s=margarita");
        let b = compute_entry_key("https://example.com/?s=mojito");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_entry_key("https://example.com");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
