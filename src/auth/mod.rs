#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Certificate-signing authorization core.
//!
//! Data flow: operator → [`service::get_or_create`] →
//! [`registry::Registry::get`]/[`registry::Registry::create`] →
//! [`group`] codec → [`kv::KvStore`]. Node → [`registry::Registry::claim`] →
//! [`group`] codec → [`kv::KvStore`].

pub mod backend;
pub mod cancel;
pub mod claim;
pub mod group;
pub mod identity;
pub mod kv;
pub mod registry;
pub mod service;
pub mod token;
