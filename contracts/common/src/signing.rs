//! Domain-separated digests for off-line signed pool-creation requests.
//!
//! Digest format:
//!
//! ```text
//! domain      = sha256("StakingPools" || "1" || network_id(32) || xdr(verifying_contract))
//! struct_hash = sha256(type_name || xdr(payload))
//! digest      = sha256(0x19 0x01 || domain || struct_hash)
//! ```
//!
//! Binding the verifying factory and the network id keeps a signature issued
//! for one deployment from being accepted by another.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, IntoVal, Val};

pub const DOMAIN_NAME: &[u8] = b"StakingPools";
pub const DOMAIN_VERSION: &[u8] = b"1";

const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// Builds the domain separator for `verifying_contract` on the current network.
pub fn domain_separator(env: &Env, verifying_contract: &Address) -> BytesN<32> {
    let mut buf = Bytes::new(env);
    buf.append(&Bytes::from_slice(env, DOMAIN_NAME));
    buf.append(&Bytes::from_slice(env, DOMAIN_VERSION));
    buf.append(&Bytes::from_array(env, &env.ledger().network_id().to_array()));
    buf.append(&verifying_contract.clone().to_xdr(env));
    env.crypto().sha256(&buf).to_bytes()
}

/// Hashes a typed payload under the domain of `verifying_contract`.
///
/// `type_name` tags the payload type so two request kinds with the same XDR
/// shape can never collide.
pub fn typed_digest<T>(
    env: &Env,
    verifying_contract: &Address,
    type_name: &[u8],
    payload: &T,
) -> BytesN<32>
where
    T: IntoVal<Env, Val> + Clone,
{
    let mut body = Bytes::from_slice(env, type_name);
    body.append(&payload.clone().to_xdr(env));
    let struct_hash = env.crypto().sha256(&body).to_bytes();

    let mut msg = Bytes::from_slice(env, &DIGEST_PREFIX);
    msg.append(&Bytes::from_array(
        env,
        &domain_separator(env, verifying_contract).to_array(),
    ));
    msg.append(&Bytes::from_array(env, &struct_hash.to_array()));
    env.crypto().sha256(&msg).to_bytes()
}

/// Verifies an ed25519 signature over a 32-byte digest.
///
/// Panics if the signature is invalid (Soroban host behavior).
pub fn verify_digest_signature(
    env: &Env,
    public_key: &BytesN<32>,
    digest: &BytesN<32>,
    signature: &BytesN<64>,
) {
    let message = Bytes::from_array(env, &digest.to_array());
    env.crypto().ed25519_verify(public_key, &message, signature);
}
