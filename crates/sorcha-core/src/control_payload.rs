//! The canonical control-transaction payload format (§6): the only bit-exact
//! wire format this specification itself defines. A control or genesis
//! transaction's first payload slot is `base64(canonical JSON of this
//! struct)` — sorted keys, no whitespace, produced by [`crate::canonical`].

use serde::{Deserialize, Serialize};

use crate::attestation::RegisterControlRecord;
use crate::canonical::to_canonical_bytes;
use crate::error::{Result, SorchaError};
use crate::governance::GovernanceOperation;

/// Version of the control payload wire format. Bump if the shape ever
/// changes; readers reject anything else.
pub const CONTROL_PAYLOAD_VERSION: u32 = 1;

/// `{version: 1, roster: <control-record>, operation?: <governance-op>}`.
///
/// The roster field carries a full snapshot, not a diff — reconstruction
/// (§4.4 `GetCurrentRoster`) always derives state from the latest
/// snapshot alone. `operation` is attached only for audit trails; it is
/// never itself replayed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControlPayload {
    pub version: u32,
    pub roster: RegisterControlRecord,
    pub operation: Option<GovernanceOperation>,
}

impl ControlPayload {
    pub fn genesis(roster: RegisterControlRecord) -> Self {
        Self {
            version: CONTROL_PAYLOAD_VERSION,
            roster,
            operation: None,
        }
    }

    pub fn with_operation(roster: RegisterControlRecord, operation: GovernanceOperation) -> Self {
        Self {
            version: CONTROL_PAYLOAD_VERSION,
            roster,
            operation: Some(operation),
        }
    }

    /// Canonical-encode this payload — the exact bytes a control
    /// transaction's first payload slot carries, base64-encoded by the
    /// caller per §6.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        to_canonical_bytes(self)
    }

    /// Decode a control transaction's first payload slot. Rejects any
    /// version other than [`CONTROL_PAYLOAD_VERSION`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let payload: ControlPayload = serde_json::from_slice(bytes)
            .map_err(|e| SorchaError::InvalidRequest(format!("malformed control payload: {e}")))?;
        if payload.version != CONTROL_PAYLOAD_VERSION {
            return Err(SorchaError::InvalidRequest(format!(
                "unsupported control payload version: {}",
                payload.version
            )));
        }
        Ok(payload)
    }
}
