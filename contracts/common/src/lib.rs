//! Shared building blocks for the staking-pool contract suite.
//!
//! This crate provides:
//! - [`CommonError`]: error codes shared by the registry and both factories.
//! - [`interface`]: cross-contract clients for the registry and for pools,
//!   plus the shared [`PlanConfig`] creation parameter.
//! - [`signing`]: domain-separated digests for signed pool-creation requests.
//! - [`replay`]: single-use bookkeeping for consumed request digests.
//! - [`math`]: checked fixed-point helpers used by the pool accounting.
//!
//! Pool-specific errors extend the range starting at code **100** and above,
//! ensuring no collisions with the common set.

#![no_std]

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod interface;
pub mod math;
pub mod replay;
pub mod signing;

pub use interface::*;
pub use signing::*;

// ── Storage TTL ──────────────────────────────────────────────────────────────

/// Persistent entries are bumped once their remaining TTL drops below this.
pub const TTL_THRESHOLD: u32 = 5_184_000;
/// Ledger count persistent entries are extended to on every write.
pub const TTL_EXTEND_TO: u32 = 10_368_000;

// ── Shared error enum ────────────────────────────────────────────────────────

/// Error codes shared by the registry and the pool factories.
///
/// # Code ranges
/// | Range   | Purpose                          |
/// |---------|----------------------------------|
/// | 1 – 9   | Lifecycle / initialisation       |
/// | 10 – 19 | Authorisation & admission        |
/// | 20 – 29 | Resource not found               |
/// | 30 – 39 | Validation / arithmetic          |
/// | 100+    | Reserved for pool-specific enums |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    // ── Lifecycle (1–9) ──────────────────────────────────────
    /// The contract has not been initialised yet.
    NotInitialized = 1,

    /// The contract has already been initialised.
    AlreadyInitialized = 2,

    // ── Auth & admission (10–19) ─────────────────────────────
    /// The caller is not the principal allowed to perform the operation.
    Unauthorized = 10,

    /// The factory is not marked as trusted in the registry.
    UntrustedFactory = 11,

    /// The signed request does not verify against the registry signer.
    InvalidSignature = 12,

    /// The signed request's deadline has already passed.
    ExpiredRequest = 13,

    /// The signed request has already been used to create a pool.
    RequestAlreadyUsed = 14,

    // ── Not-found (20–29) ────────────────────────────────────
    /// The pool is not known to the registry.
    PoolNotFound = 20,

    // ── Validation (30–39) ───────────────────────────────────
    /// One or more input parameters are invalid (e.g. empty plan list,
    /// inverted date window, non-positive amount).
    InvalidInput = 30,

    /// An intermediate amount does not fit in `i128`.
    MathOverflow = 31,
}
