// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! The convenience operation layered on top of [`Registry`] (§4.5):
//! "give this user a token to redeem, minting one if none are open."

use tracing::debug;

use crate::auth::kv::KvStore;
use crate::auth::registry::Registry;
use crate::auth::token::Token;
use crate::error::AuthError;

/// Return the first open token for `user_id`, minting a fresh one if the
/// user has no group yet or every existing token is already claimed.
///
/// # Errors
/// [`AuthError::EmptyUserID`] if `user_id` is empty.
/// [`AuthError::Internal`] if the registry is in an inconsistent state:
/// fetching returns an error other than `NotFound`, or a freshly-created
/// group does not contain exactly one token.
pub fn get_or_create<K: KvStore>(registry: &Registry<K>, user_id: &str) -> Result<Token, AuthError> {
    if user_id.is_empty() {
        return Err(AuthError::EmptyUserID);
    }

    match registry.get(user_id) {
        Ok(group) => {
            if let Some(auth) = group.items.iter().find(|a| a.is_open()) {
                debug!(user_id, "returning existing open token");
                return Ok(auth.token.clone());
            }
        }
        Err(AuthError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let minted = registry.create(user_id, 1)?;
    if minted.len() != 1 {
        return Err(AuthError::Internal(format!(
            "create returned {} tokens for user {user_id}, expected 1",
            minted.len()
        )));
    }
    debug!(user_id, "minted fresh token");
    Ok(minted.into_iter().next().expect("checked len == 1"))
}
