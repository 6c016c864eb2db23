//! Checksum of scraped markup, used to recognise unchanged pages.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of raw page content as lowercase hex.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = b"<tr id=\"boss-ferumbras\"></tr>";
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
    }

    #[test]
    fn test_different_content_different_checksum() {
        assert_ne!(calculate_checksum(b"(45%)"), calculate_checksum(b"(46%)"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            calculate_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
