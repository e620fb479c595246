// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! The claim state machine (§4.4): validates a claimant's request against
//! the configured policy, locates the matching open authorization, and
//! commits the claim.
//!
//! Kept as free functions over [`KvStore`] rather than methods on
//! [`crate::auth::registry::Registry`] so the validation steps (skew,
//! difficulty, parse) can be unit-tested without a concrete KV backend.

use tracing::{debug, warn};

use crate::auth::group::{decode_group, encode_group, Claim};
use crate::auth::identity::IdentityProvider;
use crate::auth::kv::{KvError, KvStore};
use crate::auth::token::Token;
use crate::config::ClaimPolicyConfig;
use crate::error::AuthError;

/// Everything a claim attempt needs beyond the stored [`Group`](crate::auth::group::Group).
pub struct ClaimRequest<'a> {
    /// The token string presented by the claimant.
    pub token: &'a str,
    /// Claimant network address, recorded verbatim in the committed [`Claim`].
    pub addr: &'a str,
    /// Claimant-supplied timestamp, checked against the server clock (§4.4 step 1).
    pub client_timestamp: i64,
    /// Claimant's TLS certificate chain, handed to the identity collaborator.
    pub tls_chain: &'a [Vec<u8>],
    /// Already-signed certificate chain bytes to record against the claim.
    /// Signing itself happens outside this crate (§1).
    pub signed_chain_bytes: Vec<Vec<u8>>,
}

/// Validate and commit a claim against the group stored under the token's
/// user-id, following the seven-step sequence:
///
/// 1. reject if `|now - client_timestamp| > policy.max_skew_secs`
/// 2. derive the claimant identity and reject if its difficulty is below
///    `policy.min_difficulty`
/// 3. parse the token string
/// 4. fetch the user's group (`NotFound` if absent)
/// 5. locate the matching authorization by token-data equality (`NotFound`
///    if no match)
/// 6. reject if already claimed (`AlreadyClaimed`)
/// 7. write the new claim and persist the group
///
/// Every rejection past step 3 carries only [`Token::display_redacted`],
/// never the full token string or payload bytes.
pub fn execute(
    kv: &dyn KvStore,
    identity_provider: &dyn IdentityProvider,
    policy: &ClaimPolicyConfig,
    now: i64,
    req: ClaimRequest<'_>,
) -> Result<Claim, AuthError> {
    // Step 1: clock skew.
    let skew = (now - req.client_timestamp).abs();
    if skew > policy.max_skew_secs {
        return Err(AuthError::InvalidClaim(format!(
            "clock skew {skew}s exceeds policy of {}s",
            policy.max_skew_secs
        )));
    }

    // Step 2: identity and proof-of-work difficulty.
    let identity = identity_provider
        .peer_identity_from_tls_chain(req.tls_chain)
        .map_err(|e| AuthError::InvalidClaim(format!("identity: {e}")))?;
    let difficulty = identity_provider.difficulty(&identity);
    if difficulty < policy.min_difficulty {
        return Err(AuthError::InvalidClaim(format!(
            "identity difficulty {difficulty} below policy minimum {}",
            policy.min_difficulty
        )));
    }

    // Step 3: parse the token.
    let token = Token::parse(req.token)
        .map_err(|_| AuthError::InvalidClaim("malformed token".to_string()))?;

    // Step 4: fetch the group.
    let raw = match kv.get(token.user_id().as_bytes()) {
        Ok(bytes) => bytes,
        Err(KvError::NotFound) => return Err(AuthError::NotFound(token.user_id().to_string())),
        Err(e) => return Err(AuthError::Internal(format!("kv get: {e}"))),
    };
    let mut group = decode_group(&raw)
        .map_err(|e| AuthError::Internal(format!("decode group for {}: {e}", token.user_id())))?;

    // Step 5: locate the matching record.
    let idx = group
        .find_by_token_data(token.data())
        .ok_or_else(|| {
            warn!(token = %token.display_redacted(), "claim against unknown token");
            AuthError::NotFound(token.display_redacted())
        })?;

    // Step 6: already claimed?
    if !group.items[idx].is_open() {
        return Err(AuthError::AlreadyClaimed(token.display_redacted()));
    }

    // Step 7: commit.
    let claim = Claim {
        addr: req.addr.to_string(),
        timestamp: now,
        identity: identity_provider.encode(&identity),
        signed_chain_bytes: req.signed_chain_bytes,
    };
    group.items[idx].claim = Some(claim.clone());

    let encoded = encode_group(&group)
        .map_err(|e| AuthError::Internal(format!("encode group for {}: {e}", token.user_id())))?;
    kv.put(token.user_id().as_bytes(), &encoded)
        .map_err(|e| AuthError::Internal(format!("kv put: {e}")))?;

    debug!(user_id = token.user_id(), difficulty, "authorization claimed");
    Ok(claim)
}
