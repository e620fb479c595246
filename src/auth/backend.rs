// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Backend URL scheme parsing and dispatch (§6): `<scheme>://<source>`.
//!
//! The registry never branches on backend type except here, at
//! construction time; every operation past this point goes through
//! [`crate::auth::kv::KvStore`].

use crate::auth::kv::memory::MemoryKv;
use crate::auth::kv::sled_backend::SledKv;
use crate::auth::kv::KvStore;
use crate::error::AuthError;

/// Embedded single-file store scheme (`sled`-backed).
pub const SCHEME_EMBEDDED_FILE: &str = "embedded-file";
/// Remote key-value service scheme. The real client is an external
/// collaborator; this crate only ships a [`MemoryKv`] stand-in behind it
/// for tests and local development.
pub const SCHEME_REMOTE_KV: &str = "remote-kv";

/// Open a KV backend from a `<scheme>://<source>` URL.
///
/// `overwrite`, when true, truncates/drops the store before opening
/// (only meaningful for `embedded-file`).
pub fn open(url: &str, overwrite: bool) -> Result<Box<dyn KvStore>, AuthError> {
    let (scheme, source) = url
        .split_once("://")
        .ok_or_else(|| AuthError::Internal(format!("malformed backend url: {url}")))?;

    match scheme {
        SCHEME_EMBEDDED_FILE => {
            let kv = if overwrite {
                SledKv::open_overwrite(source)
            } else {
                SledKv::open(source)
            }
            .map_err(|e| AuthError::Internal(format!("open embedded-file backend: {e}")))?;
            Ok(Box::new(kv))
        }
        SCHEME_REMOTE_KV => {
            let _ = source; // the real remote address is consumed by the external client
            Ok(Box::new(MemoryKv::new()))
        }
        other => Err(AuthError::Internal(format!("unknown backend scheme: {other}"))),
    }
}
