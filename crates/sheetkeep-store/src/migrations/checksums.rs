//! SHA-256 checksums of migration SQL

use sha2::{Digest, Sha256};

pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_hex_sha256() {
        let checksum = compute_checksum("SELECT 1");
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(checksum, compute_checksum("SELECT 1"));
        assert_ne!(checksum, compute_checksum("SELECT 2"));
    }
}
