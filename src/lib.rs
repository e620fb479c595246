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

//! Authsel - certificate-signing token authorization and upload node selection.
//!
//! This crate provides:
//! - A single-use token registry (`auth`) gating the issuance of node
//!   certificates: mint, claim, unclaim, and legacy-format migration over a
//!   pluggable key-value store.
//! - An in-memory, concurrency-safe upload node selector (`select`) that
//!   samples candidate storage nodes under filter and network-diversity
//!   constraints.
//! - Shared observability (`monitoring`) and configuration (`config`) layers
//!   used by both.

/// Certificate-signing authorization core: tokens, claims, registry, service.
pub mod auth;
/// Configuration structures shared by the authorization core.
pub mod config;
/// Shared error taxonomy for the authorization core.
pub mod error;
/// Observability (Prometheus metrics).
pub mod monitoring;
/// Upload node selection core: nodes, filters, selectors, request handling.
pub mod select;
