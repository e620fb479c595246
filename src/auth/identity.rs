// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Identity collaborator (§6): TLS chain parsing, proof-of-work difficulty,
//! and certificate signing are opaque operations consumed through this
//! trait (§1). Production deployments supply their own TLS-aware
//! implementation; [`Sha256DifficultyIdentity`] exists only so this crate
//! is runnable and testable standalone.

use ring::digest;

/// An opaque claimant identity, produced and consumed by an
/// [`IdentityProvider`]. Stored verbatim in [`crate::auth::group::Claim::identity`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerIdentity(pub Vec<u8>);

/// Errors from the identity collaborator.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The TLS chain could not be parsed into a peer identity.
    #[error("invalid tls chain")]
    InvalidChain,
    /// The encoded identity bytes could not be decoded.
    #[error("invalid encoded identity")]
    InvalidEncoding,
}

/// TLS identity parsing, encoding, and proof-of-work difficulty, consumed
/// as opaque operations by the claim state machine (§4.4 step 2).
pub trait IdentityProvider: Send + Sync {
    /// Derive the claimant's peer identity from its TLS certificate chain.
    fn peer_identity_from_tls_chain(&self, chain: &[Vec<u8>]) -> Result<PeerIdentity, IdentityError>;

    /// Encode a peer identity to its stored byte form.
    fn encode(&self, identity: &PeerIdentity) -> Vec<u8>;

    /// Decode a peer identity from its stored byte form.
    fn decode(&self, bytes: &[u8]) -> Result<PeerIdentity, IdentityError>;

    /// Compute the identity's proof-of-work difficulty, gated against a
    /// minimum threshold by the claim policy (§4.4 step 2).
    fn difficulty(&self, identity: &PeerIdentity) -> u32;
}

/// Reference [`IdentityProvider`]: treats the first chain entry as the
/// identity's raw bytes, and defines difficulty as the number of leading
/// zero bits of `SHA256(identity bytes)` — a standard, easily-verified
/// proof-of-work style metric.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256DifficultyIdentity;

impl IdentityProvider for Sha256DifficultyIdentity {
    fn peer_identity_from_tls_chain(&self, chain: &[Vec<u8>]) -> Result<PeerIdentity, IdentityError> {
        let leaf = chain.first().ok_or(IdentityError::InvalidChain)?;
        if leaf.is_empty() {
            return Err(IdentityError::InvalidChain);
        }
        Ok(PeerIdentity(leaf.clone()))
    }

    fn encode(&self, identity: &PeerIdentity) -> Vec<u8> {
        identity.0.clone()
    }

    fn decode(&self, bytes: &[u8]) -> Result<PeerIdentity, IdentityError> {
        if bytes.is_empty() {
            return Err(IdentityError::InvalidEncoding);
        }
        Ok(PeerIdentity(bytes.to_vec()))
    }

    fn difficulty(&self, identity: &PeerIdentity) -> u32 {
        let digest = digest::digest(&digest::SHA256, &identity.0);
        leading_zero_bits(digest.as_ref())
    }
}

fn leading_zero_bits(bytes: &[u8]) -> u32 {
    let mut count = 0u32;
    for b in bytes {
        if *b == 0 {
            count += 8;
            continue;
        }
        count += b.leading_zeros();
        break;
    }
    count
}
