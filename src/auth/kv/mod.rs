// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Key-value store interface consumed by the registry (§6).
//!
//! Keys and values are opaque byte strings. The registry never branches on
//! which concrete backend is behind this trait except at URL-parse time
//! (`crate::auth::backend`).

pub mod memory;
pub mod sled_backend;

use thiserror::Error;

/// KV store errors.
#[derive(Debug, Error)]
pub enum KvError {
    /// Key not present. Distinguishable from every other failure so
    /// callers can tell "absent" from "broken".
    #[error("key not found")]
    NotFound,
    /// Backend I/O failure.
    #[error("kv io: {0}")]
    Io(String),
    /// `compare_and_swap` lost the race: the stored value no longer matched
    /// `old`.
    #[error("compare-and-swap conflict")]
    CasConflict,
}

/// Outcome of a visitor callback during [`KvStore::iterate`], allowing the
/// caller to stop iteration early (used to honor cancellation between
/// records per §5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterControl {
    /// Keep iterating.
    Continue,
    /// Stop iterating now.
    Stop,
}

/// A narrow key-value store contract. Implementations are thread-safe per
/// their own contract; the registry shares one instance process-wide.
pub trait KvStore: Send + Sync {
    /// Fetch a value by key.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, KvError>;

    /// Write a value, unconditionally overwriting any existing value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError>;

    /// Atomically replace `key`'s value with `new` iff its current value
    /// equals `old` exactly (byte-wise). Used only by migration (§4.3).
    fn compare_and_swap(&self, key: &[u8], old: &[u8], new: &[u8]) -> Result<(), KvError>;

    /// Visit every key/value pair, one at a time, in implementation-defined
    /// order. `visit` returns [`IterControl::Stop`] to end iteration early.
    fn iterate(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> IterControl) -> Result<(), KvError>;

    /// Release backend resources. Safe to call more than once.
    fn close(&self) -> Result<(), KvError>;
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, KvError> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        (**self).put(key, value)
    }

    fn compare_and_swap(&self, key: &[u8], old: &[u8], new: &[u8]) -> Result<(), KvError> {
        (**self).compare_and_swap(key, old, new)
    }

    fn iterate(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> IterControl) -> Result<(), KvError> {
        (**self).iterate(visit)
    }

    fn close(&self) -> Result<(), KvError> {
        (**self).close()
    }
}
