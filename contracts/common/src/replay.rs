//! # Single-use Request Digests
//!
//! Signed pool-creation requests carry no nonce of their own; a factory
//! instead remembers every request digest it has accepted. Each contract keeps
//! its own set in persistent storage, so the same digest is only ever
//! rejected by the factory that consumed it (digests are bound to a factory
//! anyway, see [`crate::signing`]).
//!
//! ## Usage pattern
//!
//! ```ignore
//! let digest = signing::typed_digest(&env, &factory, b"Req", &request);
//! // ... verify signature ...
//! replay::consume(&env, &digest)?;
//! // ... side effects ...
//! ```

use soroban_sdk::{contracttype, BytesN, Env};

use crate::{CommonError, TTL_EXTEND_TO, TTL_THRESHOLD};

// ── Storage key ──────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum ReplayKey {
    Consumed(BytesN<32>),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Returns `true` if `digest` has already been consumed by this contract.
pub fn is_consumed(env: &Env, digest: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&ReplayKey::Consumed(digest.clone()))
}

/// Marks `digest` as consumed.
///
/// # Errors
/// - [`CommonError::RequestAlreadyUsed`]: the digest was consumed before.
pub fn consume(env: &Env, digest: &BytesN<32>) -> Result<(), CommonError> {
    let key = ReplayKey::Consumed(digest.clone());
    if env.storage().persistent().has(&key) {
        return Err(CommonError::RequestAlreadyUsed);
    }
    env.storage()
        .persistent()
        .set(&key, &env.ledger().timestamp());
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
