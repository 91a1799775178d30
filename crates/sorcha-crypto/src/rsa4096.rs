use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::Sha256;
use sorcha_core::{Result, SorchaError};

use sorcha_core::constants::{RSA4096_MIN_MODULUS_DER_LEN, RSA4096_MIN_SIGNATURE_LEN};

/// Verify a PKCS#1 v1.5 signature over `digest` (SHA-256 of the original
/// message) using an RSA-4096 public key, DER-encoded as either PKCS#1 or
/// SubjectPublicKeyInfo.
pub fn verify(public_key_der: &[u8], digest: &[u8; 32], signature: &[u8]) -> Result<()> {
    if public_key_der.len() < RSA4096_MIN_MODULUS_DER_LEN {
        return Err(SorchaError::InvalidKeyFormat(format!(
            "RSA-4096 public key DER must be at least {RSA4096_MIN_MODULUS_DER_LEN} bytes, got {}",
            public_key_der.len()
        )));
    }
    if signature.len() < RSA4096_MIN_SIGNATURE_LEN {
        return Err(SorchaError::InvalidSignatureFormat(format!(
            "RSA-4096 signature must be at least {RSA4096_MIN_SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }

    let public_key = RsaPublicKey::from_pkcs1_der(public_key_der)
        .or_else(|_| RsaPublicKey::from_public_key_der(public_key_der))
        .map_err(|e| SorchaError::InvalidKeyFormat(e.to_string()))?;

    let scheme = Pkcs1v15Sign::new::<Sha256>();
    public_key
        .verify(scheme, digest, signature)
        .map_err(|_| SorchaError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::{RsaPrivateKey, RsaPublicKey};

    fn test_keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 4096).expect("rsa keygen");
        let public_key = RsaPublicKey::from(&private_key);
        (private_key, public_key)
    }

    #[test]
    fn sign_verify_round_trip() {
        let (private_key, public_key) = test_keypair();
        let digest = crate::hash::hash(b"register genesis attestation");
        let scheme = Pkcs1v15Sign::new::<Sha256>();
        let signature = private_key.sign(scheme, &digest).expect("sign");

        let pk_der = public_key.to_pkcs1_der().unwrap();
        assert!(verify(pk_der.as_bytes(), &digest, &signature).is_ok());
    }
}
