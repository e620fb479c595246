// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared error taxonomy for the authorization core.
//!
//! `select` does not use this enum: a short sample is not an exceptional
//! outcome, so `select` functions return the partial result alongside an
//! optional shortfall marker instead of a `Result` (see
//! [`crate::select::request::NotEnoughNodes`]).

use thiserror::Error;

/// Errors surfaced by the authorization core.
///
/// `InvalidToken`, `EmptyUserID`, `InvalidCount`, `NotFound`,
/// `AlreadyClaimed`, `InvalidClaim`, and `Internal`. `AlreadyClaimed` and
/// `InvalidClaim` carry only a redacted token display, never the full token
/// string or data bytes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token string malformed, wrong length, or checksum mismatch.
    #[error("invalid token")]
    InvalidToken,
    /// User-id was empty on `Create`/`GetOrCreate`.
    #[error("empty user id")]
    EmptyUserID,
    /// `Create` was called with a non-positive count.
    #[error("invalid count")]
    InvalidCount,
    /// User-id absent from the registry, or token not present in its group.
    #[error("not found: {0}")]
    NotFound(String),
    /// Claim attempted against an already-claimed authorization.
    ///
    /// The field is a redacted token display (user-id + short prefix), never
    /// the full token string.
    #[error("already claimed: {0}")]
    AlreadyClaimed(String),
    /// Claim rejected by clock-skew, difficulty, or parse policy.
    ///
    /// The field is a redacted token display, never the full token string.
    #[error("invalid claim: {0}")]
    InvalidClaim(String),
    /// Underlying KV store or codec failure.
    #[error("internal: {0}")]
    Internal(String),
}

impl AuthError {
    /// True if this error kind is safe for the caller to retry.
    ///
    /// Only [`AuthError::Internal`] is nondeterministic; every other kind is
    /// a deterministic rejection that will fail identically on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Internal(_))
    }
}
