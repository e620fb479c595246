// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use prometheus::{IntCounter, IntGauge, Registry};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Prometheus registration failed.
    #[error("prometheus")]
    Prom,
}

/// Metrics container for both the authorization and selection cores.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Authorizations created (tokens minted) via `Create`.
    pub authorizations_created_total: IntCounter,
    /// Successful claims.
    pub authorization_claim_total: IntCounter,
    /// Claim attempts rejected (skew, difficulty, parse, already-claimed).
    pub authorization_claim_rejected_total: IntCounter,
    /// Successful unclaims. Tracked separately from claims: see DESIGN.md
    /// for the divergence from the source this was distilled from.
    pub authorization_unclaim_total: IntCounter,
    /// Authorizations migrated from the legacy wire format.
    pub authorization_migrated_total: IntCounter,

    /// Node selection requests handled.
    pub selection_requests_total: IntCounter,
    /// Requests that returned fewer nodes than requested.
    pub selection_shortfall_total: IntCounter,
    /// Current number of nodes known to the active selection snapshot.
    pub selection_pool_size: IntGauge,
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let authorizations_created_total = IntCounter::new(
            "authsel_authorizations_created_total",
            "Authorizations (tokens) created",
        )
        .map_err(|_| MetricsError::Prom)?;
        let authorization_claim_total =
            IntCounter::new("authsel_authorization_claim_total", "Successful claims")
                .map_err(|_| MetricsError::Prom)?;
        let authorization_claim_rejected_total = IntCounter::new(
            "authsel_authorization_claim_rejected_total",
            "Rejected claim attempts",
        )
        .map_err(|_| MetricsError::Prom)?;
        let authorization_unclaim_total =
            IntCounter::new("authsel_authorization_unclaim_total", "Successful unclaims")
                .map_err(|_| MetricsError::Prom)?;
        let authorization_migrated_total = IntCounter::new(
            "authsel_authorization_migrated_total",
            "Authorizations migrated from the legacy format",
        )
        .map_err(|_| MetricsError::Prom)?;

        let selection_requests_total = IntCounter::new(
            "authsel_selection_requests_total",
            "Node selection requests handled",
        )
        .map_err(|_| MetricsError::Prom)?;
        let selection_shortfall_total = IntCounter::new(
            "authsel_selection_shortfall_total",
            "Selection requests that returned fewer nodes than requested",
        )
        .map_err(|_| MetricsError::Prom)?;
        let selection_pool_size = IntGauge::new(
            "authsel_selection_pool_size",
            "Nodes known to the active selection snapshot",
        )
        .map_err(|_| MetricsError::Prom)?;

        for c in [
            &authorizations_created_total,
            &authorization_claim_total,
            &authorization_claim_rejected_total,
            &authorization_unclaim_total,
            &authorization_migrated_total,
            &selection_requests_total,
            &selection_shortfall_total,
        ] {
            registry
                .register(Box::new(c.clone()))
                .map_err(|_| MetricsError::Prom)?;
        }
        registry
            .register(Box::new(selection_pool_size.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            authorizations_created_total,
            authorization_claim_total,
            authorization_claim_rejected_total,
            authorization_unclaim_total,
            authorization_migrated_total,
            selection_requests_total,
            selection_shortfall_total,
            selection_pool_size,
        })
    }
}
