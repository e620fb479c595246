// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Configuration for the authorization core, deserialized from TOML the way
//! `NodeConfig` is laid out in the base crate this workspace is descended
//! from: one root struct, nested sub-structs per concern, `serde(default)`
//! on every field added after the first release.

use serde::{Deserialize, Serialize};

/// Authorization registry configuration root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Key-value backend settings.
    pub backend: BackendConfig,
    /// Claim acceptance policy.
    pub claim_policy: ClaimPolicyConfig,
}

/// Backend connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// `<scheme>://<source>` backend URL (§6). Schemes: `embedded-file`,
    /// `remote-kv`.
    pub url: String,
    /// When true, the backend is truncated/dropped before opening.
    #[serde(default)]
    pub overwrite: bool,
}

/// Claim acceptance policy. These are wire-format design constants (§9): a
/// network-wide change requires a token format version bump, not just a
/// config edit, but making them configurable here keeps deployments from
/// forking the code to test different values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClaimPolicyConfig {
    /// Maximum accepted |now - client_timestamp| in seconds. Default: 300 (5 min).
    #[serde(default = "default_max_skew_secs")]
    pub max_skew_secs: i64,
    /// Minimum accepted claimant identity difficulty.
    #[serde(default)]
    pub min_difficulty: u32,
}

fn default_max_skew_secs() -> i64 {
    300
}

impl Default for ClaimPolicyConfig {
    fn default() -> Self {
        Self {
            max_skew_secs: default_max_skew_secs(),
            min_difficulty: 0,
        }
    }
}

impl RegistryConfig {
    /// Parse a `RegistryConfig` from a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
