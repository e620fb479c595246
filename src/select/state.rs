// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! The read-mostly selection snapshot and its replacement lock (§4.8, §5).
//!
//! `select` takes the read lock for the duration of one request; replacing
//! state takes the write lock. A read-write lock rather than a plain mutex,
//! since reads vastly outnumber replacements.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::monitoring::metrics::Metrics;
use crate::select::node::{build_subnet_index, group_into_subnets, Node};
use crate::select::request::{handle, NotEnoughNodes, SelectionRequest};
use crate::select::selector::{SelectByID, SelectBySubnet};

/// An immutable selection snapshot: four precomputed selectors (reputable
/// and new, each by-id and by-subnet) plus an id → subnet index used to
/// seed auto-exclude-subnets filters.
pub struct Snapshot {
    pub(crate) reputable_by_id: SelectByID,
    pub(crate) reputable_by_subnet: SelectBySubnet,
    pub(crate) new_by_id: SelectByID,
    pub(crate) new_by_subnet: SelectBySubnet,
    pub(crate) subnet_index: HashMap<[u8; 32], String>,
}

impl Snapshot {
    /// Build a snapshot from classified reputable and new node lists.
    /// Construction is O(n).
    pub fn new(reputable: Vec<Node>, new: Vec<Node>) -> Self {
        let mut index = build_subnet_index(&reputable);
        index.extend(build_subnet_index(&new));

        let reputable_subnets = group_into_subnets(&reputable);
        let new_subnets = group_into_subnets(&new);

        Self {
            reputable_by_subnet: SelectBySubnet::new(reputable_subnets),
            reputable_by_id: SelectByID::new(reputable),
            new_by_subnet: SelectBySubnet::new(new_subnets),
            new_by_id: SelectByID::new(new),
            subnet_index: index,
        }
    }
}

/// A read-write-locked selection snapshot, safe for concurrent `Select`
/// calls and atomic full replacement.
pub struct State {
    inner: RwLock<Snapshot>,
    metrics: Option<Arc<Metrics>>,
}

impl State {
    /// Build a state from classified reputable and new node lists, with no
    /// metrics collection.
    pub fn new(reputable: Vec<Node>, new: Vec<Node>) -> Self {
        Self {
            inner: RwLock::new(Snapshot::new(reputable, new)),
            metrics: None,
        }
    }

    /// Build a state from classified reputable and new node lists, emitting
    /// metrics through `metrics`.
    pub fn with_metrics(reputable: Vec<Node>, new: Vec<Node>, metrics: Arc<Metrics>) -> Self {
        metrics
            .selection_pool_size
            .set((reputable.len() + new.len()) as i64);
        Self {
            inner: RwLock::new(Snapshot::new(reputable, new)),
            metrics: Some(metrics),
        }
    }

    /// Atomically replace the entire snapshot, e.g. after an upstream
    /// refresh. Blocks until any in-flight `select` calls release the read
    /// lock.
    pub fn replace(&self, reputable: Vec<Node>, new: Vec<Node>) {
        let mut guard = self.inner.write().expect("selection state lock poisoned");
        tracing::debug!(
            reputable = reputable.len(),
            new = new.len(),
            sample = ?reputable.first().or(new.first()).map(Node::id_hex),
            "replacing selection snapshot"
        );
        if let Some(m) = &self.metrics {
            m.selection_pool_size
                .set((reputable.len() + new.len()) as i64);
        }
        *guard = Snapshot::new(reputable, new);
    }

    /// Number of nodes known to the current snapshot (reputable + new),
    /// exposed for the `selection_pool_size` metric.
    pub fn len(&self) -> usize {
        let guard = self.inner.read().expect("selection state lock poisoned");
        guard.reputable_by_id.count() + guard.new_by_id.count()
    }

    /// True when the current snapshot has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handle a placement request against the current snapshot, holding
    /// only the read lock for the call's duration. Each call constructs
    /// its own filter state and PRNG; no cross-request aliasing (§5).
    pub fn select(&self, request: SelectionRequest) -> (Vec<Node>, Option<NotEnoughNodes>) {
        let guard = self.inner.read().expect("selection state lock poisoned");
        let (nodes, shortfall) = handle(&guard, request);
        if let Some(m) = &self.metrics {
            m.selection_requests_total.inc();
            if shortfall.is_some() {
                m.selection_shortfall_total.inc();
            }
        }
        (nodes, shortfall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn node(id: u8, net: &str) -> Node {
        Node {
            id: [id; 32],
            address: format!("10.0.0.{id}:28967"),
            last_net: net.to_string(),
            last_ip_port: format!("10.0.0.{id}:28967"),
            country_code: "US".to_string(),
        }
    }

    #[test]
    fn len_reflects_combined_tiers() {
        let reputable = vec![node(1, "a"), node(2, "a")];
        let new = vec![node(3, "b")];
        let state = State::new(reputable, new);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let state = State::new(vec![node(1, "a")], vec![]);
        assert_eq!(state.len(), 1);
        state.replace(vec![node(2, "a"), node(3, "b")], vec![node(4, "c")]);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn metrics_track_requests_and_shortfalls() {
        let metrics = Arc::new(Metrics::new().expect("metrics"));
        let state = State::with_metrics(vec![node(1, "a")], vec![], metrics.clone());
        assert_eq!(metrics.selection_pool_size.get(), 1);

        let request = SelectionRequest {
            count: 1,
            new_fraction: 0.0,
            distinct: false,
            exclude_ids: HashSet::new(),
            exclude_countries: HashSet::new(),
            placement: None,
        };
        let (nodes, shortfall) = state.select(request);
        assert_eq!(nodes.len(), 1);
        assert!(shortfall.is_none());
        assert_eq!(metrics.selection_requests_total.get(), 1);
        assert_eq!(metrics.selection_shortfall_total.get(), 0);

        let short_request = SelectionRequest {
            count: 5,
            new_fraction: 0.0,
            distinct: false,
            exclude_ids: HashSet::new(),
            exclude_countries: HashSet::new(),
            placement: None,
        };
        let (_, shortfall) = state.select(short_request);
        assert!(shortfall.is_some());
        assert_eq!(metrics.selection_requests_total.get(), 2);
        assert_eq!(metrics.selection_shortfall_total.get(), 1);

        state.replace(vec![node(2, "a"), node(3, "b")], vec![]);
        assert_eq!(metrics.selection_pool_size.get(), 2);
    }

    #[test]
    fn select_draws_from_the_current_snapshot() {
        let state = State::new(vec![node(1, "a"), node(2, "b")], vec![node(3, "c")]);
        let request = SelectionRequest {
            count: 2,
            new_fraction: 0.5,
            distinct: false,
            exclude_ids: HashSet::new(),
            exclude_countries: HashSet::new(),
            placement: None,
        };
        let (nodes, shortfall) = state.select(request);
        assert_eq!(nodes.len(), 2);
        assert!(shortfall.is_none());
    }
}
