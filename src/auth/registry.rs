// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Registry: transactional operations over the KV store keyed by user-id,
//! with value = encoded [`Group`] (§4.3).
//!
//! The `(Get, modify, Put)` sequence used by `create`, `claim`, and
//! `unclaim` is linearizable *with itself* but makes no atomicity guarantee
//! between concurrent calls on the same user-id (§5): last writer wins.
//! This is a deliberate trade-off, not an oversight — see DESIGN.md.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::cancel::CancellationToken;
use crate::auth::claim::{self, ClaimRequest};
use crate::auth::group::{decode_group, decode_group_any, encode_group, Authorization, Claim, Group};
use crate::auth::identity::IdentityProvider;
use crate::auth::kv::{IterControl, KvError, KvStore};
use crate::auth::token::{random_token_data, Token};
use crate::config::ClaimPolicyConfig;
use crate::error::AuthError;
use crate::monitoring::metrics::Metrics;

/// Transactional operations over a pluggable key-value store.
pub struct Registry<K: KvStore> {
    kv: K,
    metrics: Option<Arc<Metrics>>,
}

impl<K: KvStore> Registry<K> {
    /// Wrap a KV store with no metrics collection.
    pub fn new(kv: K) -> Self {
        Self { kv, metrics: None }
    }

    /// Wrap a KV store, emitting metrics through `metrics`.
    pub fn with_metrics(kv: K, metrics: Arc<Metrics>) -> Self {
        Self {
            kv,
            metrics: Some(metrics),
        }
    }

    fn fetch_group(&self, user_id: &str) -> Result<Option<Group>, AuthError> {
        match self.kv.get(user_id.as_bytes()) {
            Ok(bytes) => Ok(Some(decode_group(&bytes).map_err(|e| {
                AuthError::Internal(format!("decode group for {user_id}: {e}"))
            })?)),
            Err(KvError::NotFound) => Ok(None),
            Err(e) => Err(AuthError::Internal(format!("kv get: {e}"))),
        }
    }

    fn write_group(&self, user_id: &str, group: &Group) -> Result<(), AuthError> {
        let encoded = encode_group(group)
            .map_err(|e| AuthError::Internal(format!("encode group for {user_id}: {e}")))?;
        self.kv
            .put(user_id.as_bytes(), &encoded)
            .map_err(|e| AuthError::Internal(format!("kv put: {e}")))
    }

    /// Create `n` fresh unclaimed authorizations for `user_id`, appending
    /// them to the user's existing group (empty if absent), and return
    /// just the newly minted tokens.
    ///
    /// # Errors
    /// [`AuthError::EmptyUserID`] if `user_id` is empty.
    /// [`AuthError::InvalidCount`] if `n < 1`.
    /// [`AuthError::Internal`] on any codec or KV failure.
    ///
    /// Not atomic across concurrent `create` calls for the same user-id
    /// (§4.3): a racing append may be lost. Acceptable because token
    /// issuance is typically single-writer per user.
    pub fn create(&self, user_id: &str, n: u32) -> Result<Vec<Token>, AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::EmptyUserID);
        }
        if n < 1 {
            return Err(AuthError::InvalidCount);
        }

        // Absent key is treated as an empty group, unconditionally.
        let mut group = self.fetch_group(user_id)?.unwrap_or_default();

        let mut minted = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let data = random_token_data()?;
            let token = Token::new(user_id.to_string(), data);
            group.items.push(Authorization {
                token: token.clone(),
                claim: None,
            });
            minted.push(token);
        }

        self.write_group(user_id, &group)?;
        if let Some(m) = &self.metrics {
            m.authorizations_created_total.inc_by(n as u64);
        }
        debug!(user_id, count = n, "authorizations created");
        Ok(minted)
    }

    /// Fetch the current group for `user_id`.
    ///
    /// # Errors
    /// [`AuthError::NotFound`] if `user_id` is absent from the registry.
    pub fn get(&self, user_id: &str) -> Result<Group, AuthError> {
        self.fetch_group(user_id)?
            .ok_or_else(|| AuthError::NotFound(user_id.to_string()))
    }

    /// Stream every user-id present in the registry, honoring `cancel`
    /// between keys.
    pub fn list_user_ids(&self, cancel: &CancellationToken) -> Result<Vec<String>, AuthError> {
        let mut ids = Vec::new();
        self.kv
            .iterate(&mut |k, _v| {
                if cancel.is_cancelled() {
                    return IterControl::Stop;
                }
                if let Ok(s) = std::str::from_utf8(k) {
                    ids.push(s.to_string());
                }
                IterControl::Continue
            })
            .map_err(|e| AuthError::Internal(format!("kv iterate: {e}")))?;
        Ok(ids)
    }

    /// Concatenate every group in the registry (operator-only;
    /// memory-proportional to registry size).
    pub fn list(&self, cancel: &CancellationToken) -> Result<Group, AuthError> {
        let mut all = Group::new();
        let mut decode_err = None;
        self.kv
            .iterate(&mut |_k, v| {
                if cancel.is_cancelled() {
                    return IterControl::Stop;
                }
                match decode_group(v) {
                    Ok(mut g) => all.items.append(&mut g.items),
                    Err(e) => {
                        decode_err = Some(e);
                        return IterControl::Stop;
                    }
                }
                IterControl::Continue
            })
            .map_err(|e| AuthError::Internal(format!("kv iterate: {e}")))?;
        if let Some(e) = decode_err {
            return Err(AuthError::Internal(format!("decode group during list: {e}")));
        }
        Ok(all)
    }

    /// Validate and commit a claim against the authorization matching
    /// `request.token`, following the seven-step sequence in
    /// [`crate::auth::claim::execute`].
    ///
    /// `now` is the server clock reading used for the skew check and the
    /// committed claim's timestamp; callers outside tests should pass
    /// seconds since the Unix epoch.
    pub fn claim(
        &self,
        identity_provider: &dyn IdentityProvider,
        policy: &ClaimPolicyConfig,
        now: i64,
        request: ClaimRequest<'_>,
    ) -> Result<Claim, AuthError> {
        let result = claim::execute(&self.kv, identity_provider, policy, now, request);
        if let Some(m) = &self.metrics {
            match &result {
                Ok(_) => m.authorization_claim_total.inc(),
                Err(_) => m.authorization_claim_rejected_total.inc(),
            }
        }
        result
    }

    /// Parse `token_str`, locate the matching authorization, clear its
    /// claim, and write the group back.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] if `token_str` does not parse.
    /// [`AuthError::NotFound`] if no record matches.
    pub fn unclaim(&self, token_str: &str) -> Result<(), AuthError> {
        let token = Token::parse(token_str)?;
        let mut group = self
            .fetch_group(token.user_id())?
            .ok_or_else(|| AuthError::NotFound(token.user_id().to_string()))?;

        let idx = group
            .find_by_token_data(token.data())
            .ok_or_else(|| AuthError::NotFound(token.display_redacted()))?;
        group.items[idx].claim = None;

        self.write_group(token.user_id(), &group)?;
        if let Some(m) = &self.metrics {
            // See DESIGN.md: tracked distinctly from `authorization_claim_total`.
            m.authorization_unclaim_total.inc();
        }
        info!(user_id = token.user_id(), "authorization unclaimed");
        Ok(())
    }

    /// Iterate the store, migrating every legacy-encoded value to the
    /// current wire format via compare-and-swap, honoring `cancel` between
    /// keys. Returns the number of values migrated.
    ///
    /// A CAS failure is surfaced as [`AuthError::Internal`] and aborts the
    /// migration; it does not resume past the failed key.
    pub fn migrate_legacy(
        &self,
        cancel: &CancellationToken,
        mut progress: impl FnMut(u64),
    ) -> Result<u64, AuthError> {
        let mut snapshot: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
        self.kv
            .iterate(&mut |k, v| {
                if cancel.is_cancelled() {
                    return IterControl::Stop;
                }
                snapshot.push((k.to_vec(), v.to_vec()));
                IterControl::Continue
            })
            .map_err(|e| AuthError::Internal(format!("kv iterate: {e}")))?;

        let mut migrated: u64 = 0;
        for (key, value) in snapshot {
            if cancel.is_cancelled() {
                break;
            }
            if !crate::auth::group::legacy::sniff(&value) {
                continue;
            }
            let group = decode_group_any(&value)?;
            let encoded = encode_group(&group)
                .map_err(|e| AuthError::Internal(format!("re-encode migrated group: {e}")))?;
            self.kv
                .compare_and_swap(&key, &value, &encoded)
                .map_err(|e| {
                    warn!(key = %String::from_utf8_lossy(&key), "legacy migration CAS failed");
                    AuthError::Internal(format!("migrate cas: {e}"))
                })?;
            migrated += 1;
            progress(migrated);
            if let Some(m) = &self.metrics {
                m.authorization_migrated_total.inc();
            }
        }
        info!(migrated, "legacy migration complete");
        Ok(migrated)
    }
}
