use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use sorcha_core::constants::PENDING_REGISTRATION_TTL_SECS;
use sorcha_core::types::{Did, RegisterId, Role, TransactionType};
use sorcha_core::{
    AttestationToSign, ControlPayload, PendingRegistration, Register, RegisterAttestation,
    RegisterControlRecord, RegisterStatus, Result, SorchaError, Transaction, TransactionAdmitter,
    TransactionMetadata,
};
use sorcha_core::transaction::Payload;
use sorcha_repository::{RegisterLocks, RegisterRepository};
use tracing::{info, warn};

use crate::dto::{
    FinalizeRequest, FinalizeResponse, InitiateRequest, InitiateResponse, StagedAttestation,
};
use crate::tenant::TenantPolicy;
use crate::template::build_template;

/// Coordinates the `initiate` / `finalize` protocol described in §4.3.
pub struct RegistrationOrchestrator {
    repository: Arc<dyn RegisterRepository>,
    locks: Arc<RegisterLocks>,
    admitter: Arc<dyn TransactionAdmitter>,
    tenant_policy: Arc<dyn TenantPolicy>,
    system_wallet: String,
}

impl RegistrationOrchestrator {
    pub fn new(
        repository: Arc<dyn RegisterRepository>,
        locks: Arc<RegisterLocks>,
        admitter: Arc<dyn TransactionAdmitter>,
        tenant_policy: Arc<dyn TenantPolicy>,
        system_wallet: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            locks,
            admitter,
            tenant_policy,
            system_wallet: system_wallet.into(),
        }
    }

    /// §4.3 `Initiate`.
    pub fn initiate(&self, req: InitiateRequest, now: i64) -> Result<InitiateResponse> {
        self.tenant_policy.check(&req.tenant_id)?;
        validate_owners(&req.owners)?;

        let register_id = RegisterId::generate();
        let nonce = uuid::Uuid::new_v4().to_string();

        let mut attestations_to_sign = Vec::with_capacity(req.owners.len());
        let mut staged = Vec::with_capacity(req.owners.len());
        for owner in &req.owners {
            let built = build_template(&register_id, &req.name, &owner.wallet_id, owner.role)?;
            let hash_to_sign = hex::encode(built.digest);
            attestations_to_sign.push(AttestationToSign {
                user_id: owner.user_id.clone(),
                wallet_id: owner.wallet_id.clone(),
                role: owner.role,
                raw_attestation_bytes: built.raw_bytes.clone(),
                hash_to_sign: hash_to_sign.clone(),
            });
            staged.push(StagedAttestation {
                user_id: owner.user_id.clone(),
                wallet_id: owner.wallet_id.clone(),
                role: owner.role,
                attestation_data: built.raw_bytes,
                data_to_sign: hash_to_sign,
            });
        }

        let expires_at = now + PENDING_REGISTRATION_TTL_SECS;
        let pending = PendingRegistration {
            register_id,
            nonce: nonce.clone(),
            name: req.name,
            description: req.description,
            tenant_id: req.tenant_id,
            attestations_to_sign,
            created_at: now,
            expires_at,
        };
        self.repository.put_pending(&pending)?;

        info!(register_id = %register_id, owners = staged.len(), "registration initiated");

        Ok(InitiateResponse {
            register_id,
            nonce,
            attestations_to_sign: staged,
            expires_at,
        })
    }

    /// §4.3 `Finalize`.
    pub fn finalize(&self, req: FinalizeRequest, now: i64) -> Result<FinalizeResponse> {
        let register_id = req.register_id;
        self.locks.with_lock(register_id, || self.finalize_locked(req, now))
    }

    fn finalize_locked(&self, req: FinalizeRequest, now: i64) -> Result<FinalizeResponse> {
        let pending = self
            .repository
            .take_pending(&req.register_id, &req.nonce)?
            .ok_or(SorchaError::PendingNotFound {
                register_id: req.register_id.to_hex(),
            })?;

        if pending.is_expired(now) {
            return Err(SorchaError::PendingExpired {
                register_id: req.register_id.to_hex(),
                expired_at: pending.expires_at,
            });
        }

        if req.signed_attestations.len() != pending.attestations_to_sign.len() {
            return Err(SorchaError::InvalidRequest(format!(
                "expected {} signed attestations, got {}",
                pending.attestations_to_sign.len(),
                req.signed_attestations.len()
            )));
        }

        let mut attestations = Vec::with_capacity(pending.attestations_to_sign.len());
        for template in &pending.attestations_to_sign {
            let signed = req
                .signed_attestations
                .iter()
                .find(|s| s.attestation_data == template.raw_attestation_bytes)
                .ok_or_else(|| SorchaError::SignatureInvalid {
                    subject: template.wallet_id.clone(),
                })?;

            verify_attestation_signature(template, signed)?;

            attestations.push(RegisterAttestation {
                role: template.role,
                subject: Did::wallet(&template.wallet_id),
                public_key: signed.public_key.clone(),
                algorithm: signed.algorithm,
                signature: signed.signature.clone(),
                granted_at: now,
            });
        }

        let control_record = RegisterControlRecord {
            register_id: pending.register_id,
            name: pending.name.clone(),
            tenant_id: pending.tenant_id.clone(),
            created_at: now,
            attestations,
            metadata: Default::default(),
        };
        control_record.validate_invariants()?;

        let payload_json = ControlPayload::genesis(control_record.clone()).to_canonical_bytes()?;
        let payload_b64 = base64::engine::general_purpose::STANDARD.encode(payload_json);

        let metadata = TransactionMetadata {
            blueprint_id: "genesis".into(),
            action_id: "register-creation".into(),
            transaction_type: TransactionType::Genesis,
        };
        let payloads = vec![Payload::new(payload_b64.into_bytes())];
        let tx_id = Transaction::derive_tx_id(
            &pending.register_id,
            &self.system_wallet,
            &[],
            &None,
            &payloads,
            &metadata,
            now,
        );
        let genesis_tx = Transaction {
            tx_id,
            register_id: pending.register_id,
            sender_wallet: self.system_wallet.clone(),
            recipients: vec![],
            prev_tx_id: None,
            payloads,
            metadata,
            signature: Vec::new(),
            created_at: now,
        };

        self.admitter.admit(genesis_tx.clone()).map_err(|e| {
            warn!(register_id = %pending.register_id, error = %e, "genesis transaction rejected by validator");
            e
        })?;

        let register = Register {
            id: pending.register_id,
            name: pending.name,
            tenant_id: pending.tenant_id,
            height: 0,
            status: RegisterStatus::Online,
            created_at: now,
            advertise: false,
        };
        self.repository.create_register(&register)?;

        info!(register_id = %pending.register_id, tx_id = %tx_id, "register created");

        Ok(FinalizeResponse {
            register_id: pending.register_id,
            status: "Created".into(),
            genesis_transaction_id: tx_id,
        })
    }
}

fn verify_attestation_signature(
    template: &AttestationToSign,
    signed: &crate::dto::SignedAttestation,
) -> Result<()> {
    // §4.3 step 2 / §8 scenario 6: the client signs `Hash(raw_attestation_bytes)`
    // (the `data_to_sign` advertised at initiate), so verification here must
    // hash the stored template bytes and call Verify with `preHashed=true`,
    // not re-verify against the raw bytes.
    let digest = sorcha_core::canonical::sha256(&template.raw_attestation_bytes);
    let ok = sorcha_crypto::verify(
        signed.algorithm,
        &signed.public_key,
        &digest,
        &signed.signature,
        true,
    )?;
    if ok {
        Ok(())
    } else {
        Err(SorchaError::SignatureInvalid {
            subject: template.wallet_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{OwnerProposal, SignedAttestation};
    use crate::tenant::AllowAllTenants;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;
    use sorcha_repository::SledRepository;
    use sorcha_validator::{InMemoryKeyResolver, Validator};

    const SYSTEM_WALLET: &str = "system-wallet";

    fn harness() -> (RegistrationOrchestrator, Arc<dyn RegisterRepository>) {
        let dir = tempfile::tempdir().unwrap();
        let repository: Arc<dyn RegisterRepository> = Arc::new(SledRepository::open(dir.path()).unwrap());
        let locks = Arc::new(RegisterLocks::new());
        let validator = Arc::new(Validator::new(
            Arc::clone(&repository),
            Arc::clone(&locks),
            Arc::new(InMemoryKeyResolver::new()),
            SYSTEM_WALLET,
        ));
        let orchestrator = RegistrationOrchestrator::new(
            Arc::clone(&repository),
            locks,
            validator,
            Arc::new(AllowAllTenants),
            SYSTEM_WALLET,
        );
        (orchestrator, repository)
    }

    /// Signs the `data_to_sign` digest advertised at `initiate` time (§4.3
    /// step 2 / §8 scenario 6), not the raw attestation bytes themselves —
    /// mirroring what a spec-conformant client actually signs.
    fn sign_attestation(
        key: &SigningKey,
        staged: &StagedAttestation,
    ) -> SignedAttestation {
        let digest = sorcha_core::canonical::sha256(&staged.attestation_data);
        let sig = key.sign(&digest);
        SignedAttestation {
            attestation_data: staged.attestation_data.clone(),
            public_key: key.verifying_key().as_bytes().to_vec(),
            signature: sig.to_bytes().to_vec(),
            algorithm: sorcha_core::types::Algorithm::Ed25519,
        }
    }

    fn one_owner_request() -> InitiateRequest {
        InitiateRequest {
            name: "Acme Register".into(),
            description: "a test register".into(),
            tenant_id: "tenant-1".into(),
            owners: vec![OwnerProposal {
                user_id: "user-1".into(),
                wallet_id: "wallet-1".into(),
                role: Role::Owner,
            }],
        }
    }

    /// Scenario 6 (§8): a client that signs exactly the `data_to_sign`
    /// digest advertised at `initiate` time (not the raw attestation bytes)
    /// finalizes successfully.
    #[test]
    fn signing_advertised_data_to_sign_digest_succeeds() {
        let (orchestrator, _repo) = harness();
        let key = SigningKey::generate(&mut OsRng);

        let initiated = orchestrator.initiate(one_owner_request(), 1_000).unwrap();
        let staged = &initiated.attestations_to_sign[0];
        let digest = sorcha_core::canonical::sha256(&staged.attestation_data);
        assert_eq!(staged.data_to_sign, hex::encode(digest));

        let sig = key.sign(&digest);
        let signed = SignedAttestation {
            attestation_data: staged.attestation_data.clone(),
            public_key: key.verifying_key().as_bytes().to_vec(),
            signature: sig.to_bytes().to_vec(),
            algorithm: sorcha_core::types::Algorithm::Ed25519,
        };

        let finalized = orchestrator
            .finalize(
                FinalizeRequest {
                    register_id: initiated.register_id,
                    nonce: initiated.nonce,
                    signed_attestations: vec![signed],
                },
                1_001,
            )
            .unwrap();
        assert_eq!(finalized.status, "Created");
    }

    /// Scenario 5 (§8): `Initiate` → `Finalize` succeeds once; a second
    /// `Finalize` with the same `(registerId, nonce)` returns `PendingNotFound`.
    #[test]
    fn finalize_is_single_use_replay_protected() {
        let (orchestrator, _repo) = harness();
        let key = SigningKey::generate(&mut OsRng);

        let initiated = orchestrator.initiate(one_owner_request(), 1_000).unwrap();
        assert_eq!(initiated.attestations_to_sign.len(), 1);

        let signed = vec![sign_attestation(&key, &initiated.attestations_to_sign[0])];
        let finalize_req = FinalizeRequest {
            register_id: initiated.register_id,
            nonce: initiated.nonce.clone(),
            signed_attestations: signed.clone(),
        };
        let finalized = orchestrator.finalize(finalize_req, 1_001).unwrap();
        assert_eq!(finalized.status, "Created");
        assert_eq!(finalized.register_id, initiated.register_id);

        let replay = orchestrator.finalize(
            FinalizeRequest {
                register_id: initiated.register_id,
                nonce: initiated.nonce,
                signed_attestations: signed,
            },
            1_002,
        );
        assert!(matches!(replay, Err(SorchaError::PendingNotFound { .. })));
    }

    /// After a successful finalize, the register exists, is `Online`, at
    /// height 0, and its genesis control record roster matches the
    /// proposed owner.
    #[test]
    fn finalize_creates_online_register_with_genesis_roster() {
        let (orchestrator, repo) = harness();
        let key = SigningKey::generate(&mut OsRng);

        let initiated = orchestrator.initiate(one_owner_request(), 1_000).unwrap();
        let signed = vec![sign_attestation(&key, &initiated.attestations_to_sign[0])];
        let finalized = orchestrator
            .finalize(
                FinalizeRequest {
                    register_id: initiated.register_id,
                    nonce: initiated.nonce,
                    signed_attestations: signed,
                },
                1_001,
            )
            .unwrap();

        let register = repo.get_register(&initiated.register_id).unwrap().unwrap();
        assert_eq!(register.status, RegisterStatus::Online);
        assert_eq!(register.height, 0);

        let tx = repo
            .get_transaction(&finalized.genesis_transaction_id)
            .unwrap();
        // The genesis transaction is durably admitted to the mempool, not
        // yet sealed into a docket — `get_transaction` only resolves
        // sealed transactions, so it is absent until the docket builder runs.
        assert!(tx.is_none());
    }

    /// Scenario 6 (§8): modifying a single byte of the attestation template
    /// between initiate and finalize invalidates the signature.
    #[test]
    fn tampered_attestation_bytes_fail_signature_verification() {
        let (orchestrator, _repo) = harness();
        let key = SigningKey::generate(&mut OsRng);

        let initiated = orchestrator.initiate(one_owner_request(), 1_000).unwrap();
        let mut signed = sign_attestation(&key, &initiated.attestations_to_sign[0]);
        signed.attestation_data.push(0xFF);

        let result = orchestrator.finalize(
            FinalizeRequest {
                register_id: initiated.register_id,
                nonce: initiated.nonce,
                signed_attestations: vec![signed],
            },
            1_001,
        );
        assert!(matches!(result, Err(SorchaError::SignatureInvalid { .. })));
    }

    /// A signature that verifies against the wrong key is rejected.
    #[test]
    fn wrong_key_fails_signature_verification() {
        let (orchestrator, _repo) = harness();
        let signing_key = SigningKey::generate(&mut OsRng);
        let other_key = SigningKey::generate(&mut OsRng);

        let initiated = orchestrator.initiate(one_owner_request(), 1_000).unwrap();
        let staged = &initiated.attestations_to_sign[0];
        let digest = sorcha_core::canonical::sha256(&staged.attestation_data);
        let sig = signing_key.sign(&digest);
        let signed = SignedAttestation {
            attestation_data: staged.attestation_data.clone(),
            public_key: other_key.verifying_key().as_bytes().to_vec(),
            signature: sig.to_bytes().to_vec(),
            algorithm: sorcha_core::types::Algorithm::Ed25519,
        };

        let result = orchestrator.finalize(
            FinalizeRequest {
                register_id: initiated.register_id,
                nonce: initiated.nonce,
                signed_attestations: vec![signed],
            },
            1_001,
        );
        assert!(matches!(result, Err(SorchaError::SignatureInvalid { .. })));
    }

    /// A finalize attempted after the 5-minute TTL has elapsed is rejected
    /// even with valid signatures, and the pending record is consumed.
    #[test]
    fn expired_pending_is_rejected() {
        let (orchestrator, _repo) = harness();
        let key = SigningKey::generate(&mut OsRng);

        let initiated = orchestrator.initiate(one_owner_request(), 1_000).unwrap();
        let signed = vec![sign_attestation(&key, &initiated.attestations_to_sign[0])];

        let past_expiry = initiated.expires_at + 1;
        let result = orchestrator.finalize(
            FinalizeRequest {
                register_id: initiated.register_id,
                nonce: initiated.nonce.clone(),
                signed_attestations: signed,
            },
            past_expiry,
        );
        assert!(matches!(result, Err(SorchaError::PendingExpired { .. })));
    }

    /// `Initiate` rejects an empty owner list, duplicate wallets, more
    /// than one proposed Owner, and an Auditor role.
    #[test]
    fn initiate_rejects_invalid_owner_sets() {
        let (orchestrator, _repo) = harness();

        let empty = InitiateRequest {
            owners: vec![],
            ..one_owner_request()
        };
        assert!(matches!(
            orchestrator.initiate(empty, 1_000),
            Err(SorchaError::InvalidRequest(_))
        ));

        let duplicate = InitiateRequest {
            owners: vec![
                OwnerProposal {
                    user_id: "u1".into(),
                    wallet_id: "dup".into(),
                    role: Role::Owner,
                },
                OwnerProposal {
                    user_id: "u2".into(),
                    wallet_id: "dup".into(),
                    role: Role::Admin,
                },
            ],
            ..one_owner_request()
        };
        assert!(matches!(
            orchestrator.initiate(duplicate, 1_000),
            Err(SorchaError::InvalidRequest(_))
        ));

        let two_owners = InitiateRequest {
            owners: vec![
                OwnerProposal {
                    user_id: "u1".into(),
                    wallet_id: "w1".into(),
                    role: Role::Owner,
                },
                OwnerProposal {
                    user_id: "u2".into(),
                    wallet_id: "w2".into(),
                    role: Role::Owner,
                },
            ],
            ..one_owner_request()
        };
        assert!(matches!(
            orchestrator.initiate(two_owners, 1_000),
            Err(SorchaError::InvalidRequest(_))
        ));

        let auditor = InitiateRequest {
            owners: vec![OwnerProposal {
                user_id: "u1".into(),
                wallet_id: "w1".into(),
                role: Role::Auditor,
            }],
            ..one_owner_request()
        };
        assert!(matches!(
            orchestrator.initiate(auditor, 1_000),
            Err(SorchaError::InvalidRequest(_))
        ));
    }

    /// Multiple proposed owners (one Owner, several Admins) all get
    /// distinct attestation templates and all must sign for finalize to
    /// succeed.
    #[test]
    fn finalize_requires_every_proposed_owner_to_sign() {
        let (orchestrator, _repo) = harness();
        let owner_key = SigningKey::generate(&mut OsRng);
        let admin_key = SigningKey::generate(&mut OsRng);

        let request = InitiateRequest {
            name: "Multi".into(),
            description: "".into(),
            tenant_id: "tenant-1".into(),
            owners: vec![
                OwnerProposal {
                    user_id: "u1".into(),
                    wallet_id: "owner-wallet".into(),
                    role: Role::Owner,
                },
                OwnerProposal {
                    user_id: "u2".into(),
                    wallet_id: "admin-wallet".into(),
                    role: Role::Admin,
                },
            ],
        };
        let initiated = orchestrator.initiate(request, 1_000).unwrap();

        // Only the owner signs — missing the admin's signature.
        let partial = vec![sign_attestation(&owner_key, &initiated.attestations_to_sign[0])];
        let result = orchestrator.finalize(
            FinalizeRequest {
                register_id: initiated.register_id,
                nonce: initiated.nonce.clone(),
                signed_attestations: partial,
            },
            1_001,
        );
        assert!(matches!(result, Err(SorchaError::InvalidRequest(_))));

        // Re-initiate since the first finalize consumed the pending record.
        let request2 = InitiateRequest {
            name: "Multi".into(),
            description: "".into(),
            tenant_id: "tenant-1".into(),
            owners: vec![
                OwnerProposal {
                    user_id: "u1".into(),
                    wallet_id: "owner-wallet-2".into(),
                    role: Role::Owner,
                },
                OwnerProposal {
                    user_id: "u2".into(),
                    wallet_id: "admin-wallet-2".into(),
                    role: Role::Admin,
                },
            ],
        };
        let initiated2 = orchestrator.initiate(request2, 1_000).unwrap();
        let full: Vec<_> = initiated2
            .attestations_to_sign
            .iter()
            .map(|staged| {
                let key = if staged.role == Role::Owner {
                    &owner_key
                } else {
                    &admin_key
                };
                sign_attestation(key, staged)
            })
            .collect();
        let finalized = orchestrator
            .finalize(
                FinalizeRequest {
                    register_id: initiated2.register_id,
                    nonce: initiated2.nonce,
                    signed_attestations: full,
                },
                1_001,
            )
            .unwrap();
        assert_eq!(finalized.status, "Created");
    }

    /// Each proposed owner's attestation template embeds a fresh nonce, so
    /// two owners with the same role never produce identical bytes.
    #[test]
    fn attestation_templates_are_distinct_per_owner() {
        let (orchestrator, _repo) = harness();
        let request = InitiateRequest {
            name: "Distinct".into(),
            description: "".into(),
            tenant_id: "tenant-1".into(),
            owners: vec![
                OwnerProposal {
                    user_id: "u1".into(),
                    wallet_id: "w1".into(),
                    role: Role::Owner,
                },
                OwnerProposal {
                    user_id: "u2".into(),
                    wallet_id: "w2".into(),
                    role: Role::Admin,
                },
            ],
        };
        let initiated = orchestrator.initiate(request, 1_000).unwrap();
        assert_ne!(
            initiated.attestations_to_sign[0].attestation_data,
            initiated.attestations_to_sign[1].attestation_data
        );
    }
}

fn validate_owners(owners: &[crate::dto::OwnerProposal]) -> Result<()> {
    if owners.is_empty() {
        return Err(SorchaError::InvalidRequest(
            "at least one proposed owner is required".into(),
        ));
    }
    let mut seen_wallets = HashSet::new();
    let mut owner_count = 0;
    for owner in owners {
        if !seen_wallets.insert(owner.wallet_id.as_str()) {
            return Err(SorchaError::InvalidRequest(format!(
                "duplicate wallet id in proposed owners: {}",
                owner.wallet_id
            )));
        }
        match owner.role {
            Role::Owner => owner_count += 1,
            Role::Admin => {}
            Role::Auditor => {
                return Err(SorchaError::InvalidRequest(
                    "proposed owner role must be Owner or Admin".into(),
                ));
            }
        }
    }
    if owner_count > 1 {
        return Err(SorchaError::InvalidRequest(
            "at most one proposed Owner is permitted".into(),
        ));
    }
    Ok(())
}
