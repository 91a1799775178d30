use serde::Serialize;
use sorcha_core::canonical::{sha256, to_canonical_bytes};
use sorcha_core::types::{RegisterId, Role};
use sorcha_core::Result;

/// The not-yet-signed attestation template built for one proposed owner
/// (§4.3 step 2). Canonical-encoded and hashed; the encoded bytes are kept
/// verbatim so the client signs, and later re-verifies against, the exact
/// bytes produced here.
#[derive(Serialize)]
struct AttestationTemplate<'a> {
    register_id: String,
    register_name: &'a str,
    subject: String,
    role: Role,
    role_binding_nonce: String,
}

/// Canonical bytes plus their SHA-256 digest for one proposed owner.
pub struct BuiltTemplate {
    pub raw_bytes: Vec<u8>,
    pub digest: [u8; 32],
}

/// Build and canonically encode the attestation template for one proposed
/// owner, binding it to `register_id`/`register_name` and a fresh
/// per-attestation nonce so no two templates ever collide.
pub fn build_template(
    register_id: &RegisterId,
    register_name: &str,
    wallet_id: &str,
    role: Role,
) -> Result<BuiltTemplate> {
    let template = AttestationTemplate {
        register_id: register_id.to_hex(),
        register_name,
        subject: format!("w:{wallet_id}"),
        role,
        role_binding_nonce: uuid::Uuid::new_v4().to_string(),
    };
    let raw_bytes = to_canonical_bytes(&template)?;
    let digest = sha256(&raw_bytes);
    Ok(BuiltTemplate { raw_bytes, digest })
}
