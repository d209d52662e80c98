//! Checksum calculation for exported files
//!
//! Checksums are hex-encoded SHA-256 digests of the exact bytes on disk.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Calculate SHA-256 checksum of raw bytes
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use folio::core::verification::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"Hello, World!");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Calculate SHA-256 checksum of a file's contents
pub async fn calculate_file_checksum(path: impl AsRef<Path>) -> std::io::Result<String> {
    let data = tokio::fs::read(path).await?;
    Ok(calculate_checksum_bytes(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum_bytes_known_value() {
        assert_eq!(
            calculate_checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_calculate_checksum_bytes_differs_by_content() {
        assert_ne!(
            calculate_checksum_bytes(b"Test data"),
            calculate_checksum_bytes(b"Test data.")
        );
    }

    #[tokio::test]
    async fn test_file_checksum_matches_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("guide.md");
        tokio::fs::write(&path, b"# Walden\n").await.unwrap();

        let checksum = calculate_file_checksum(&path).await.unwrap();
        assert_eq!(checksum, calculate_checksum_bytes(b"# Walden\n"));
    }

    #[tokio::test]
    async fn test_file_checksum_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(calculate_file_checksum(dir.path().join("nope")).await.is_err());
    }
}
