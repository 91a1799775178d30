use sha2::{Digest, Sha256};

/// SHA-256 digest of `bytes`.
pub fn hash(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash(b"sorcha"), hash(b"sorcha"));
        assert_ne!(hash(b"sorcha"), hash(b"sorcha2"));
    }
}
