// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Filter algebra (§4.7): composable node predicates, AND-combined.
//!
//! Explicit variants plus a `Vec`-backed composition operator, preferred
//! here over an open-ended interface hierarchy (§9).

use std::cell::RefCell;
use std::collections::HashSet;

use crate::select::node::Node;

/// A placement constraint: an opaque predicate over a node's country code
/// (e.g. "is this country in the EU region"), supplied by the caller.
pub type PlacementConstraint = Box<dyn Fn(&str) -> bool>;

/// A single filter clause.
pub enum Filter {
    /// Reject nodes whose id is in the set.
    ExcludeIds(HashSet<[u8; 32]>),
    /// Reject nodes whose `last_net` is in the set.
    ExcludeNetworks(HashSet<String>),
    /// Reject nodes whose country code is in the set.
    ExcludeCountries(HashSet<String>),
    /// Reject nodes whose country code fails the placement constraint.
    Placement(PlacementConstraint),
    /// Stateful: reject if `last_net` is already in the accumulated set;
    /// otherwise accept and add `last_net` to the set. Must be per-request,
    /// never shared across concurrent `Select` calls (§4.7).
    AutoExcludeSubnets(RefCell<HashSet<String>>),
}

impl Filter {
    /// Construct an [`Filter::AutoExcludeSubnets`] filter, seeded with the
    /// subnets of `seed_ids` resolved through `index` (§4.7: "its initial
    /// set is seeded by the request with the subnets of already-excluded
    /// node-ids").
    pub fn auto_exclude_subnets_seeded(
        seed_ids: impl IntoIterator<Item = [u8; 32]>,
        index: &std::collections::HashMap<[u8; 32], String>,
    ) -> Self {
        let seeded = seed_ids
            .into_iter()
            .filter_map(|id| index.get(&id).cloned())
            .collect();
        Filter::AutoExcludeSubnets(RefCell::new(seeded))
    }

    fn accepts(&self, node: &Node) -> bool {
        match self {
            Filter::ExcludeIds(set) => !set.contains(&node.id),
            Filter::ExcludeNetworks(set) => !set.contains(&node.last_net),
            Filter::ExcludeCountries(set) => !set.contains(&node.country_code),
            Filter::Placement(constraint) => constraint(&node.country_code),
            Filter::AutoExcludeSubnets(seen) => {
                let mut seen = seen.borrow_mut();
                if seen.contains(&node.last_net) {
                    false
                } else {
                    seen.insert(node.last_net.clone());
                    true
                }
            }
        }
    }
}

/// An ordered AND-composition of [`Filter`] clauses.
///
/// Evaluation short-circuits at the first rejecting clause, so
/// [`Filter::AutoExcludeSubnets`] only records a subnet when every earlier
/// clause in the list already accepted the node.
#[derive(Default)]
pub struct FilterSet(Vec<Filter>);

impl FilterSet {
    /// An empty filter set: accepts every node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause.
    pub fn push(mut self, filter: Filter) -> Self {
        self.0.push(filter);
        self
    }

    /// True iff every clause accepts `node`, in order.
    pub fn accepts(&self, node: &Node) -> bool {
        self.0.iter().all(|f| f.accepts(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8, net: &str, country: &str) -> Node {
        Node {
            id: [id; 32],
            address: format!("10.0.0.{id}:28967"),
            last_net: net.to_string(),
            last_ip_port: format!("10.0.0.{id}:28967"),
            country_code: country.to_string(),
        }
    }

    #[test]
    fn exclude_ids_rejects_listed_nodes() {
        let mut set = HashSet::new();
        set.insert([1u8; 32]);
        let filters = FilterSet::new().push(Filter::ExcludeIds(set));
        assert!(!filters.accepts(&node(1, "a", "US")));
        assert!(filters.accepts(&node(2, "a", "US")));
    }

    #[test]
    fn exclude_networks_rejects_listed_subnets() {
        let mut set = HashSet::new();
        set.insert("net-a".to_string());
        let filters = FilterSet::new().push(Filter::ExcludeNetworks(set));
        assert!(!filters.accepts(&node(1, "net-a", "US")));
        assert!(filters.accepts(&node(2, "net-b", "US")));
    }

    #[test]
    fn placement_constraint_applies() {
        let filters = FilterSet::new().push(Filter::Placement(Box::new(|c| c == "DE")));
        assert!(filters.accepts(&node(1, "a", "DE")));
        assert!(!filters.accepts(&node(1, "a", "US")));
    }

    #[test]
    fn auto_exclude_subnets_accepts_first_then_rejects_same_subnet() {
        let filters = FilterSet::new().push(Filter::AutoExcludeSubnets(RefCell::new(HashSet::new())));
        assert!(filters.accepts(&node(1, "net-a", "US")));
        assert!(!filters.accepts(&node(2, "net-a", "US")));
        assert!(filters.accepts(&node(3, "net-b", "US")));
    }

    #[test]
    fn auto_exclude_subnets_can_be_seeded() {
        let mut index = std::collections::HashMap::new();
        index.insert([9u8; 32], "net-a".to_string());
        let filter = Filter::auto_exclude_subnets_seeded([[9u8; 32]], &index);
        let filters = FilterSet::new().push(filter);
        assert!(!filters.accepts(&node(1, "net-a", "US")));
    }

    #[test]
    fn short_circuit_prevents_auto_exclude_from_recording_rejected_node() {
        let mut excluded = HashSet::new();
        excluded.insert([1u8; 32]);
        let filters = FilterSet::new()
            .push(Filter::ExcludeIds(excluded))
            .push(Filter::AutoExcludeSubnets(RefCell::new(HashSet::new())));
        // id 1 is rejected by the first clause, so the auto-exclude clause
        // never runs and net-a is not recorded.
        assert!(!filters.accepts(&node(1, "net-a", "US")));
        assert!(filters.accepts(&node(2, "net-a", "US")));
    }
}
