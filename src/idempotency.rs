use sha2::{Digest, Sha256};

/// Stable identifier for a job posting, derived from its canonical link.
///
/// The same link always yields the same id across runs and machines, so the
/// site can use it in permalinks. It is a content key, not a secret.
pub fn compute_job_id(link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(link.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_is_deterministic() {
        assert_eq!(compute_job_id("https://x/1"), compute_job_id("https://x/1"));
        assert_ne!(compute_job_id("https://x/1"), compute_job_id("https://x/2"));
    }

    #[test]
    fn test_job_id_is_hex_sha256() {
        let id = compute_job_id("https://x/1");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        // sha256("") is a well known constant
        assert_eq!(
            compute_job_id(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
