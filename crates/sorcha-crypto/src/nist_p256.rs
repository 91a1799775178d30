use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use sorcha_core::{Result, SorchaError};

use sorcha_core::constants::P256_PUBLIC_KEY_LEN_RANGE;

/// Verify a DER-encoded ECDSA signature over `digest` (the SHA-256 of the
/// original message, computed by the caller per §4.1).
pub fn verify(public_key: &[u8], digest: &[u8; 32], der_signature: &[u8]) -> Result<()> {
    let (lo, hi) = P256_PUBLIC_KEY_LEN_RANGE;
    if !(lo..=hi).contains(&public_key.len()) {
        return Err(SorchaError::InvalidKeyFormat(format!(
            "NIST P-256 public key must be {lo}-{hi} bytes, got {}",
            public_key.len()
        )));
    }

    let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
        .map_err(|e| SorchaError::InvalidKeyFormat(e.to_string()))?;
    let signature = Signature::from_der(der_signature)
        .map_err(|e| SorchaError::InvalidSignatureFormat(e.to_string()))?;

    verifying_key
        .verify_prehash(digest, &signature)
        .map_err(|_| SorchaError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::hazmat::PrehashSigner;
    use p256::ecdsa::SigningKey;
    use rand::rngs::OsRng;

    #[test]
    fn sign_verify_round_trip() {
        let signing_key = SigningKey::random(&mut OsRng);
        let digest = sorcha_crypto_test_digest(b"register genesis attestation");
        let signature: Signature = signing_key.sign_prehash(&digest).unwrap();
        let verifying_key = VerifyingKey::from(&signing_key);
        let pk_bytes = verifying_key.to_encoded_point(false);

        assert!(verify(pk_bytes.as_bytes(), &digest, signature.to_der().as_bytes()).is_ok());
    }

    #[test]
    fn tampered_digest_fails() {
        let signing_key = SigningKey::random(&mut OsRng);
        let digest = sorcha_crypto_test_digest(b"original");
        let signature: Signature = signing_key.sign_prehash(&digest).unwrap();
        let verifying_key = VerifyingKey::from(&signing_key);
        let pk_bytes = verifying_key.to_encoded_point(false);

        let other_digest = sorcha_crypto_test_digest(b"tampered");
        let err = verify(pk_bytes.as_bytes(), &other_digest, signature.to_der().as_bytes())
            .unwrap_err();
        assert!(matches!(err, SorchaError::VerificationFailed));
    }

    fn sorcha_crypto_test_digest(msg: &[u8]) -> [u8; 32] {
        crate::hash::hash(msg)
    }
}
