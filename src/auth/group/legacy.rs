// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Legacy group format detection and one-way migration decoding (§4.2).
//!
//! The legacy encoder (a predecessor graph-based serializer) framed every
//! value as: a `u32` big-endian frame length, a negative `i32` big-endian
//! type-id (the graph encoder's convention for a type it has not seen
//! before in the stream), three marker bytes `{2, 1, 1}`, and a
//! length-prefixed type name that must read `"Group"` or `"Authorizations"`.
//! [`sniff`] performs exactly those checks and nothing else: it never
//! panics, and any short read or mismatch simply falls through to "not
//! legacy" so the caller treats the value as current-format.
//!
//! [`decode`] is only ever reached after [`sniff`] returns true, from
//! `Registry::migrate_legacy`. It is never used on the hot read path
//! (§6: "transparently upgraded on read by the migration tool, never
//! silently at runtime").

use crate::auth::token::TOKEN_DATA_LEN;
use crate::error::AuthError;
use crate::auth::group::{Authorization, Claim, Group};
use crate::auth::token::Token;

const MARKER: [u8; 3] = [2, 1, 1];
const TYPE_NAMES: [&str; 2] = ["Group", "Authorizations"];

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.pos.checked_add(n)? > self.buf.len() {
            return None;
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(s)
    }

    fn u32_be(&mut self) -> Option<u32> {
        let b = self.take(4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32_be(&mut self) -> Option<i32> {
        let b = self.take(4)?;
        Some(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i64_be(&mut self) -> Option<i64> {
        let b = self.take(8)?;
        let mut a = [0u8; 8];
        a.copy_from_slice(b);
        Some(i64::from_be_bytes(a))
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    /// Read a `u32`-length-prefixed byte string.
    fn len_prefixed(&mut self) -> Option<&'a [u8]> {
        let n = self.u32_be()? as usize;
        self.take(n)
    }
}

/// Returns true if `bytes` looks like a value produced by the legacy
/// graph-encoder. Never panics; any parse failure returns `false`.
pub fn sniff(bytes: &[u8]) -> bool {
    let mut c = Cursor::new(bytes);

    let Some(frame_len) = c.u32_be() else { return false };
    if (frame_len as usize) > bytes.len().saturating_sub(4) {
        return false;
    }

    let Some(type_id) = c.i32_be() else { return false };
    if type_id >= 0 {
        return false;
    }

    let Some(marker) = c.take(3) else { return false };
    if marker != MARKER {
        return false;
    }

    let Some(name_bytes) = c.len_prefixed() else { return false };
    let Ok(name) = std::str::from_utf8(name_bytes) else { return false };
    TYPE_NAMES.contains(&name)
}

/// Decode a legacy-encoded value into a current [`Group`].
///
/// Only call this after [`sniff`] has returned true for the same bytes.
pub fn decode(bytes: &[u8]) -> Result<Group, AuthError> {
    let bad = || AuthError::Internal("corrupt legacy group".to_string());

    let mut c = Cursor::new(bytes);
    c.u32_be().ok_or_else(bad)?; // frame length, already validated by sniff
    c.i32_be().ok_or_else(bad)?; // type id
    let marker = c.take(3).ok_or_else(bad)?;
    if marker != MARKER {
        return Err(bad());
    }
    c.len_prefixed().ok_or_else(bad)?; // type name

    let count = c.u32_be().ok_or_else(bad)? as usize;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let user_id_bytes = c.len_prefixed().ok_or_else(bad)?;
        let user_id = std::str::from_utf8(user_id_bytes)
            .map_err(|_| bad())?
            .to_string();

        let data_bytes = c.len_prefixed().ok_or_else(bad)?;
        if data_bytes.len() != TOKEN_DATA_LEN {
            return Err(bad());
        }
        let mut data = [0u8; TOKEN_DATA_LEN];
        data.copy_from_slice(data_bytes);

        let has_claim = c.u8().ok_or_else(bad)?;
        let claim = if has_claim != 0 {
            let addr_bytes = c.len_prefixed().ok_or_else(bad)?;
            let addr = std::str::from_utf8(addr_bytes).map_err(|_| bad())?.to_string();
            let timestamp = c.i64_be().ok_or_else(bad)?;
            let identity = c.len_prefixed().ok_or_else(bad)?.to_vec();
            let chain_count = c.u32_be().ok_or_else(bad)? as usize;
            let mut signed_chain_bytes = Vec::with_capacity(chain_count);
            for _ in 0..chain_count {
                signed_chain_bytes.push(c.len_prefixed().ok_or_else(bad)?.to_vec());
            }
            Some(Claim {
                addr,
                timestamp,
                identity,
                signed_chain_bytes,
            })
        } else {
            None
        };

        items.push(Authorization {
            token: Token::new(user_id, data),
            claim,
        });
    }

    Ok(Group { items })
}

/// Encode a [`Group`] in the legacy wire format. Test-only: production code
/// never writes this format, only reads and migrates it. Gated behind the
/// `test-util` feature so integration tests and fuzz targets outside this
/// crate can construct legacy fixtures without shipping the writer path in
/// ordinary builds.
#[cfg(any(test, feature = "test-util"))]
pub fn encode_for_test(g: &Group, type_name: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&(g.items.len() as u32).to_be_bytes());
    for a in &g.items {
        let uid = a.token.user_id().as_bytes();
        body.extend_from_slice(&(uid.len() as u32).to_be_bytes());
        body.extend_from_slice(uid);
        body.extend_from_slice(&(TOKEN_DATA_LEN as u32).to_be_bytes());
        body.extend_from_slice(a.token.data());
        match &a.claim {
            None => body.push(0),
            Some(claim) => {
                body.push(1);
                let addr = claim.addr.as_bytes();
                body.extend_from_slice(&(addr.len() as u32).to_be_bytes());
                body.extend_from_slice(addr);
                body.extend_from_slice(&claim.timestamp.to_be_bytes());
                body.extend_from_slice(&(claim.identity.len() as u32).to_be_bytes());
                body.extend_from_slice(&claim.identity);
                body.extend_from_slice(&(claim.signed_chain_bytes.len() as u32).to_be_bytes());
                for c in &claim.signed_chain_bytes {
                    body.extend_from_slice(&(c.len() as u32).to_be_bytes());
                    body.extend_from_slice(c);
                }
            }
        }
    }

    let mut header = Vec::new();
    header.extend_from_slice(&(-1i32).to_be_bytes());
    header.extend_from_slice(&MARKER);
    header.extend_from_slice(&(type_name.len() as u32).to_be_bytes());
    header.extend_from_slice(type_name.as_bytes());

    let mut out = Vec::new();
    let frame_len = (header.len() + body.len()) as u32;
    out.extend_from_slice(&frame_len.to_be_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(&body);
    out
}
