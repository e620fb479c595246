// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! The two node-sampling strategies (§4.6).
//!
//! Both stop as soon as `n` nodes are accepted and both return freshly
//! cloned [`Node`]s, so callers can never mutate sampler-internal state
//! through a returned result.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::select::filter::FilterSet;
use crate::select::node::{Node, Subnet};

/// Common contract for both sampling strategies.
pub trait Selector {
    /// Upper bound on the number of nodes this selector could ever return.
    fn count(&self) -> usize;

    /// Draw up to `n` nodes passing `filter`. May return fewer than `n` if
    /// the filter exhausts the candidate population.
    fn select(&self, n: usize, filter: &FilterSet) -> Vec<Node>;
}

/// Treats each node as an independent draw: shuffles a flat node list and
/// takes the first `n` that pass the filter.
pub struct SelectByID {
    nodes: Vec<Node>,
}

impl SelectByID {
    /// Own a flat node list.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

impl Selector for SelectByID {
    fn count(&self) -> usize {
        self.nodes.len()
    }

    fn select(&self, n: usize, filter: &FilterSet) -> Vec<Node> {
        if n == 0 || self.nodes.is_empty() {
            return Vec::new();
        }
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.shuffle(&mut rand::thread_rng());

        let mut out = Vec::with_capacity(n.min(self.nodes.len()));
        for idx in order {
            if out.len() == n {
                break;
            }
            let candidate = &self.nodes[idx];
            if filter.accepts(candidate) {
                out.push(candidate.clone());
            }
        }
        out
    }
}

/// Treats each subnet as a draw: shuffles the subnet list and, for each
/// subnet visited, picks one member uniformly at random and tests the
/// filter on it alone. A rejected pick skips the whole subnet even if
/// other members would have passed — this keeps the resulting distribution
/// uniform over subnets rather than over nodes (§4.6).
pub struct SelectBySubnet {
    subnets: Vec<Subnet>,
}

impl SelectBySubnet {
    /// Own a list of pre-grouped subnets.
    pub fn new(subnets: Vec<Subnet>) -> Self {
        Self { subnets }
    }
}

impl Selector for SelectBySubnet {
    fn count(&self) -> usize {
        self.subnets.len()
    }

    fn select(&self, n: usize, filter: &FilterSet) -> Vec<Node> {
        if n == 0 || self.subnets.is_empty() {
            return Vec::new();
        }
        let mut order: Vec<usize> = (0..self.subnets.len()).collect();
        let mut rng = rand::thread_rng();
        order.shuffle(&mut rng);

        let mut out = Vec::with_capacity(n.min(self.subnets.len()));
        for idx in order {
            if out.len() == n {
                break;
            }
            let subnet = &self.subnets[idx];
            let pick = &subnet.members[rng.gen_range(0..subnet.members.len())];
            if filter.accepts(pick) {
                out.push(pick.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn select_by_id_never_returns_more_than_requested() {
        let nodes: Vec<Node> = (0..20).map(|i| node(i, "net")).collect();
        let sel = SelectByID::new(nodes);
        let out = sel.select(5, &FilterSet::new());
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn select_by_id_returns_fewer_when_filter_exhausts_population() {
        let nodes: Vec<Node> = (0..3).map(|i| node(i, "net")).collect();
        let sel = SelectByID::new(nodes);
        let out = sel.select(10, &FilterSet::new());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn select_by_id_returns_cloned_nodes() {
        let nodes = vec![node(1, "net")];
        let sel = SelectByID::new(nodes.clone());
        let out = sel.select(1, &FilterSet::new());
        assert_eq!(out, nodes);
    }

    #[test]
    fn select_by_subnet_returns_at_most_one_node_per_subnet() {
        let subnets = vec![
            Subnet {
                last_net: "a".to_string(),
                members: vec![node(1, "a"), node(2, "a")],
            },
            Subnet {
                last_net: "b".to_string(),
                members: vec![node(3, "b")],
            },
        ];
        let sel = SelectBySubnet::new(subnets);
        let out = sel.select(10, &FilterSet::new());
        assert_eq!(out.len(), 2);
        let nets: std::collections::HashSet<_> = out.iter().map(|n| n.last_net.clone()).collect();
        assert_eq!(nets.len(), 2);
    }

    #[test]
    fn select_by_subnet_stops_at_n() {
        let subnets: Vec<Subnet> = (0..10)
            .map(|i| Subnet {
                last_net: format!("net-{i}"),
                members: vec![node(i, &format!("net-{i}"))],
            })
            .collect();
        let sel = SelectBySubnet::new(subnets);
        let out = sel.select(3, &FilterSet::new());
        assert_eq!(out.len(), 3);
    }
}
