// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Token textual form: `<user-id>:<base58check(version=0, data=64 random bytes)>`.
//!
//! The base58-check encoding prepends a version byte (always 0) and appends
//! a 4-byte checksum (the first four bytes of double-SHA256 over
//! `version || data`), then encodes the whole payload with base58. These are
//! wire-format design constants (§9): changing any of them requires a
//! format version bump.

use ring::digest;
use zeroize::Zeroize;

use crate::error::AuthError;

/// Length of a token's random payload, in bytes.
pub const TOKEN_DATA_LEN: usize = 64;
/// Token wire-format version byte. Bumping this is a breaking wire change.
pub const TOKEN_VERSION: u8 = 0;
/// Number of redacted base58 characters shown in [`Token::display`].
const DISPLAY_PREFIX_LEN: usize = 8;

/// A user-bound secret: 64 uniformly random bytes paired with the user-id
/// that minted it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    user_id: String,
    data: [u8; TOKEN_DATA_LEN],
}

impl Token {
    /// Construct a token from raw parts. Does not validate `user_id`
    /// non-emptiness; callers that accept untrusted user-ids should route
    /// through [`crate::auth::registry::Registry`], which enforces
    /// `EmptyUserID`.
    pub fn new(user_id: String, data: [u8; TOKEN_DATA_LEN]) -> Self {
        Self { user_id, data }
    }

    /// User-id this token is bound to.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Raw 64-byte payload.
    pub fn data(&self) -> &[u8; TOKEN_DATA_LEN] {
        &self.data
    }

    /// Byte-wise equality of the token payload only (ignores user-id).
    ///
    /// Used by [`crate::auth::registry::Registry::claim`] to locate the
    /// matching authorization by linear scan (§4.4 step 5).
    pub fn data_eq(&self, other: &[u8; TOKEN_DATA_LEN]) -> bool {
        self.data == *other
    }

    /// Canonical wire form: `<user-id>:<base58check(data)>`.
    ///
    /// Round-trips through [`Token::parse`] for every valid token.
    pub fn serialize(&self) -> String {
        format!("{}:{}", self.user_id, encode_base58check(&self.data))
    }

    /// Parse a token from its wire form.
    ///
    /// The user-id may itself contain `:`, so this locates the *last* `:` in
    /// the string rather than the first.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidToken`] when: no `:` is found; the
    /// user-id half is empty; the base58check half fails to decode or its
    /// checksum does not match; or the decoded payload is not exactly
    /// [`TOKEN_DATA_LEN`] bytes.
    pub fn parse(s: &str) -> Result<Self, AuthError> {
        let idx = s.rfind(':').ok_or(AuthError::InvalidToken)?;
        let (user_id, rest) = s.split_at(idx);
        let encoded = &rest[1..];
        if user_id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let payload = decode_base58check(encoded)?;
        if payload.len() != TOKEN_DATA_LEN {
            return Err(AuthError::InvalidToken);
        }
        let mut data = [0u8; TOKEN_DATA_LEN];
        data.copy_from_slice(&payload);
        Ok(Self {
            user_id: user_id.to_string(),
            data,
        })
    }

    /// Redacted display form: user-id plus a short prefix of the encoded
    /// token, never the full payload. Safe to embed in log lines and error
    /// messages (§4.1, §7).
    pub fn display_redacted(&self) -> String {
        let encoded = encode_base58check(&self.data);
        let prefix: String = encoded.chars().take(DISPLAY_PREFIX_LEN).collect();
        format!("{}:{}…", self.user_id, prefix)
    }
}

impl Drop for Token {
    /// Wipes the secret payload on drop, mirroring the keystore's own
    /// `key.zeroize()` after last use.
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = digest::digest(&digest::SHA256, data);
    let second = digest::digest(&digest::SHA256, first.as_ref());
    let mut out = [0u8; 32];
    out.copy_from_slice(second.as_ref());
    out
}

fn encode_base58check(data: &[u8; TOKEN_DATA_LEN]) -> String {
    let mut payload = Vec::with_capacity(1 + TOKEN_DATA_LEN + 4);
    payload.push(TOKEN_VERSION);
    payload.extend_from_slice(data);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(payload).into_string()
}

fn decode_base58check(encoded: &str) -> Result<Vec<u8>, AuthError> {
    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|_| AuthError::InvalidToken)?;
    if raw.len() < 1 + 4 {
        return Err(AuthError::InvalidToken);
    }
    let (body, checksum) = raw.split_at(raw.len() - 4);
    let want = double_sha256(body);
    if &want[..4] != checksum {
        return Err(AuthError::InvalidToken);
    }
    if body[0] != TOKEN_VERSION {
        return Err(AuthError::InvalidToken);
    }
    Ok(body[1..].to_vec())
}

/// Generate 64 bytes of cryptographically random token data.
///
/// Backed by the OS entropy source via `ring`, shared across mint calls
/// (§5: "Random-data source for token minting: shared cryptographic RNG").
pub fn random_token_data() -> Result<[u8; TOKEN_DATA_LEN], AuthError> {
    use ring::rand::{SecureRandom, SystemRandom};
    let rng = SystemRandom::new();
    let mut out = [0u8; TOKEN_DATA_LEN];
    rng.fill(&mut out)
        .map_err(|_| AuthError::Internal("rng".to_string()))?;
    Ok(out)
}
