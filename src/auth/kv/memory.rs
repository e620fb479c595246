// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! In-process `BTreeMap`-backed [`KvStore`], guarded by a plain `Mutex`.
//!
//! Stands in for the "remote-kv" URL scheme (§6) in tests and local
//! development. The real remote key-value service remains an external
//! collaborator; this is a test double, not a production client.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{IterControl, KvError, KvStore};

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryKv {
    map: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKv {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, KvError> {
        let guard = self.map.lock().map_err(|_| KvError::Io("poisoned".to_string()))?;
        guard.get(key).cloned().ok_or(KvError::NotFound)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        let mut guard = self.map.lock().map_err(|_| KvError::Io("poisoned".to_string()))?;
        guard.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn compare_and_swap(&self, key: &[u8], old: &[u8], new: &[u8]) -> Result<(), KvError> {
        let mut guard = self.map.lock().map_err(|_| KvError::Io("poisoned".to_string()))?;
        let current = guard.get(key).map(|v| v.as_slice());
        if current != Some(old) {
            return Err(KvError::CasConflict);
        }
        guard.insert(key.to_vec(), new.to_vec());
        Ok(())
    }

    fn iterate(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> IterControl) -> Result<(), KvError> {
        let guard = self.map.lock().map_err(|_| KvError::Io("poisoned".to_string()))?;
        for (k, v) in guard.iter() {
            if visit(k, v) == IterControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn close(&self) -> Result<(), KvError> {
        Ok(())
    }
}
