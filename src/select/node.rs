// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Node and subnet records (§3, §4.6).

use std::collections::HashMap;

/// Immutable descriptor for a candidate storage node.
///
/// State never mutates a `Node` once constructed; callers always receive
/// deep clones so returned results can't alias internal state (§3
/// ownership rule).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Globally unique node identifier.
    pub id: [u8; 32],
    /// Dialable network address (`host:port`).
    pub address: String,
    /// Routable subnet tag derived from `address`, typically a `/24`.
    pub last_net: String,
    /// The node's last observed `ip:port`, distinct from [`Node::address`]
    /// (a possibly-stale dialable hostname): this is the literal socket
    /// address `last_net` was derived from.
    pub last_ip_port: String,
    /// Country code associated with the node's last known address.
    pub country_code: String,
}

impl Node {
    /// Hex display form of [`Node::id`], for logging (never base58 or raw
    /// bytes — matches this crate's other hex-encoded identifier displays).
    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }
}

/// A group of nodes sharing the same [`Node::last_net`].
#[derive(Clone, Debug)]
pub struct Subnet {
    /// The shared subnet tag.
    pub last_net: String,
    /// Member nodes. Never empty: subnets are constructed once from a node
    /// list and a subnet with no members simply isn't created.
    pub members: Vec<Node>,
}

/// Group a flat node list into subnets keyed by [`Node::last_net`],
/// preserving each node's first-seen order within its subnet.
pub fn group_into_subnets(nodes: &[Node]) -> Vec<Subnet> {
    let mut order: Vec<String> = Vec::new();
    let mut by_net: HashMap<String, Vec<Node>> = HashMap::new();
    for node in nodes {
        by_net
            .entry(node.last_net.clone())
            .or_insert_with(|| {
                order.push(node.last_net.clone());
                Vec::new()
            })
            .push(node.clone());
    }
    order
        .into_iter()
        .map(|last_net| Subnet {
            members: by_net.remove(&last_net).unwrap_or_default(),
            last_net,
        })
        .collect()
}

/// Build an id → subnet-tag index, used to seed auto-exclude-subnets from a
/// request's `exclude-ids` (§4.7).
pub fn build_subnet_index(nodes: &[Node]) -> HashMap<[u8; 32], String> {
    nodes
        .iter()
        .map(|n| (n.id, n.last_net.clone()))
        .collect()
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
    fn groups_nodes_by_subnet_preserving_order() {
        let nodes = vec![node(1, "10.0.0.0/24"), node(2, "10.0.1.0/24"), node(3, "10.0.0.0/24")];
        let subnets = group_into_subnets(&nodes);
        assert_eq!(subnets.len(), 2);
        assert_eq!(subnets[0].last_net, "10.0.0.0/24");
        assert_eq!(subnets[0].members.len(), 2);
        assert_eq!(subnets[1].last_net, "10.0.1.0/24");
        assert_eq!(subnets[1].members.len(), 1);
    }

    #[test]
    fn builds_id_to_subnet_index() {
        let nodes = vec![node(1, "10.0.0.0/24"), node(2, "10.0.1.0/24")];
        let index = build_subnet_index(&nodes);
        assert_eq!(index.get(&[1u8; 32]).unwrap(), "10.0.0.0/24");
        assert_eq!(index.get(&[2u8; 32]).unwrap(), "10.0.1.0/24");
    }

    #[test]
    fn id_hex_is_lowercase_hex_of_the_raw_id() {
        let n = node(0xab, "10.0.0.0/24");
        assert_eq!(n.id_hex(), "ab".repeat(32));
    }
}
