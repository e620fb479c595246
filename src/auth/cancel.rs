// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Cooperative cancellation for long-running iteration (`ListUserIDs`,
//! `MigrateLegacy`), honored between records rather than mid-record (§5).
//!
//! This is a plain flag, not a runtime-integrated cancellation context: the
//! KV contract is blocking I/O by spec, and nothing else in this crate
//! needs an async runtime, so a shared atomic bool is the idiomatic,
//! minimal-dependency fit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation handle.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that is not yet cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`CancellationToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
