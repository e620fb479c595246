// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! `sled`-backed [`KvStore`]: the "embedded-file" URL scheme (§6).
//!
//! Reuses the `sled` dependency and open/flush idiom used elsewhere in this
//! crate's ancestry for persistent state.

use super::{IterControl, KvError, KvStore};

/// Single-file embedded key-value store backed by `sled`.
pub struct SledKv {
    db: sled::Db,
}

impl SledKv {
    /// Open (or create) a `sled` database at `path`.
    pub fn open(path: &str) -> Result<Self, KvError> {
        let db = sled::open(path).map_err(|e| KvError::Io(e.to_string()))?;
        Ok(Self { db })
    }

    /// Open a database, dropping any existing contents first. Used when the
    /// backend URL's `Overwrite` flag is set (§6).
    pub fn open_overwrite(path: &str) -> Result<Self, KvError> {
        let _ = std::fs::remove_dir_all(path);
        Self::open(path)
    }
}

impl KvStore for SledKv {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, KvError> {
        let v = self
            .db
            .get(key)
            .map_err(|e| KvError::Io(e.to_string()))?
            .ok_or(KvError::NotFound)?;
        Ok(v.to_vec())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
        self.db
            .insert(key, value)
            .map_err(|e| KvError::Io(e.to_string()))?;
        self.db.flush().map_err(|e| KvError::Io(e.to_string()))?;
        Ok(())
    }

    fn compare_and_swap(&self, key: &[u8], old: &[u8], new: &[u8]) -> Result<(), KvError> {
        let outcome = self
            .db
            .compare_and_swap(key, Some(old), Some(new))
            .map_err(|e| KvError::Io(e.to_string()))?;
        match outcome {
            Ok(()) => {
                self.db.flush().map_err(|e| KvError::Io(e.to_string()))?;
                Ok(())
            }
            Err(_) => Err(KvError::CasConflict),
        }
    }

    fn iterate(&self, visit: &mut dyn FnMut(&[u8], &[u8]) -> IterControl) -> Result<(), KvError> {
        for item in self.db.iter() {
            let (k, v) = item.map_err(|e| KvError::Io(e.to_string()))?;
            if visit(&k, &v) == IterControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn close(&self) -> Result<(), KvError> {
        self.db.flush().map_err(|e| KvError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_cas_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = SledKv::open(dir.path().to_str().unwrap()).unwrap();

        assert!(matches!(kv.get(b"k"), Err(KvError::NotFound)));

        kv.put(b"k", b"v1").unwrap();
        assert_eq!(kv.get(b"k").unwrap(), b"v1");

        kv.compare_and_swap(b"k", b"v1", b"v2").unwrap();
        assert_eq!(kv.get(b"k").unwrap(), b"v2");

        assert!(matches!(
            kv.compare_and_swap(b"k", b"stale", b"v3"),
            Err(KvError::CasConflict)
        ));
    }

    #[test]
    fn overwrite_drops_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        {
            let kv = SledKv::open(path).unwrap();
            kv.put(b"k", b"v").unwrap();
            kv.close().unwrap();
        }
        let kv = SledKv::open_overwrite(path).unwrap();
        assert!(matches!(kv.get(b"k"), Err(KvError::NotFound)));
    }
}
