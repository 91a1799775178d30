use sorcha_core::types::Algorithm;
use sorcha_core::{Result, SorchaError};

use crate::hash::hash;
use crate::{ed25519, nist_p256, rsa4096};

/// Verify `signature` over `input` with `public_key`, dispatching on
/// `algorithm` (§4.1).
///
/// When `pre_hashed` is true, `input` is already the 32-byte SHA-256
/// digest the caller signed over; otherwise `input` is the raw message and
/// this function hashes it as each algorithm's rules require.
pub fn verify(
    algorithm: Algorithm,
    public_key: &[u8],
    input: &[u8],
    signature: &[u8],
    pre_hashed: bool,
) -> Result<bool> {
    match verify_checked(algorithm, public_key, input, signature, pre_hashed) {
        Ok(()) => Ok(true),
        Err(SorchaError::VerificationFailed) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Same as [`verify`] but surfaces `InvalidKeyFormat` / `InvalidSignatureFormat`
/// / `VerificationFailed` as distinct error variants instead of collapsing
/// them to `false`.
pub fn verify_checked(
    algorithm: Algorithm,
    public_key: &[u8],
    input: &[u8],
    signature: &[u8],
    pre_hashed: bool,
) -> Result<()> {
    match algorithm {
        Algorithm::Ed25519 => ed25519::verify(public_key, input, signature),
        Algorithm::NistP256 => {
            let digest = digest_of(input, pre_hashed)?;
            nist_p256::verify(public_key, &digest, signature)
        }
        Algorithm::Rsa4096 => {
            let digest = digest_of(input, pre_hashed)?;
            rsa4096::verify(public_key, &digest, signature)
        }
    }
}

fn digest_of(input: &[u8], pre_hashed: bool) -> Result<[u8; 32]> {
    if pre_hashed {
        input.try_into().map_err(|_| {
            SorchaError::InvalidRequest("preHashed input must be exactly 32 bytes".into())
        })
    } else {
        Ok(hash(input))
    }
}
