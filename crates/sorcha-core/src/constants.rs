//! ─── Sorcha Protocol Constants ──────────────────────────────────────────────

// ── Roster ───────────────────────────────────────────────────────────────────

/// Maximum number of attestations (members) a register's roster may hold.
pub const MAX_ROSTER_SIZE: usize = 25;

// ── Pending registration ──────────────────────────────────────────────────────

/// Lifetime of a pending registration before it must be re-initiated.
pub const PENDING_REGISTRATION_TTL_SECS: i64 = 5 * 60;

// ── Governance ────────────────────────────────────────────────────────────────

/// Maximum lifetime of a governance proposal from `proposedAt`.
pub const MAX_PROPOSAL_WINDOW_SECS: i64 = 7 * 24 * 3600;

// ── Attestations / signatures ─────────────────────────────────────────────────

/// Exact length of a raw ED25519 public key, in bytes.
pub const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Exact length of a raw ED25519 signature, in bytes.
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// Valid length range (inclusive) of an uncompressed NIST P-256 public key.
pub const P256_PUBLIC_KEY_LEN_RANGE: (usize, usize) = (64, 65);

/// Minimum DER-encoded RSA-4096 modulus size accepted as a public key.
pub const RSA4096_MIN_MODULUS_DER_LEN: usize = 512;

/// Minimum RSA-4096 signature length accepted (PKCS#1 v1.5 over SHA-256).
pub const RSA4096_MIN_SIGNATURE_LEN: usize = 512;

// ── Docket building ────────────────────────────────────────────────────────────

/// Default docket-builder timer interval.
pub const DEFAULT_DOCKET_BUILD_INTERVAL_SECS: u64 = 10;

/// First valid docket id for a register.
pub const GENESIS_DOCKET_ID: u64 = 1;
