//! Cache key utilities.

use sha2::{Digest, Sha256};
use swr_core::{Error, Result};

/// Stable file-safe key for a request URL.
pub fn entry_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..16])
}

/// Validate a partition name for use as a directory name.
pub fn sanitize_partition_name(name: &str) -> Result<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'));

    if invalid {
        return Err(Error::InvalidPartition(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key_is_stable() {
        let a = entry_key("https://example.com/assets/app.js");
        let b = entry_key("https://example.com/assets/app.js");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_ne!(a, entry_key("https://example.com/assets/app.css"));
    }

    #[test]
    fn test_sanitize_partition_name() {
        assert_eq!(sanitize_partition_name("swr-static-v1").unwrap(), "swr-static-v1");
        assert!(sanitize_partition_name("").is_err());
        assert!(sanitize_partition_name("..").is_err());
        assert!(sanitize_partition_name("a/b").is_err());
        assert!(sanitize_partition_name("c:d").is_err());
    }
}
