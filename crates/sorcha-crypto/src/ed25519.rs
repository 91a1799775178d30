use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sorcha_core::{Result, SorchaError};

use sorcha_core::constants::{ED25519_PUBLIC_KEY_LEN, ED25519_SIGNATURE_LEN};

/// Verify a 64-byte ED25519 signature over `message` (no pre-hash layer —
/// when the caller is in `preHashed` mode, `message` is already the digest).
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    if public_key.len() != ED25519_PUBLIC_KEY_LEN {
        return Err(SorchaError::InvalidKeyFormat(format!(
            "ED25519 public key must be {ED25519_PUBLIC_KEY_LEN} bytes, got {}",
            public_key.len()
        )));
    }
    if signature.len() != ED25519_SIGNATURE_LEN {
        return Err(SorchaError::InvalidSignatureFormat(format!(
            "ED25519 signature must be {ED25519_SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }

    let key_bytes: [u8; 32] = public_key
        .try_into()
        .expect("length checked above");
    let sig_bytes: [u8; 64] = signature.try_into().expect("length checked above");

    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| SorchaError::InvalidKeyFormat(e.to_string()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    verifying_key
        .verify(message, &sig)
        .map_err(|_| SorchaError::VerificationFailed)
}
