// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

//! End-to-end scenarios S1-S6.

use std::collections::HashSet;

use authsel::auth::claim::ClaimRequest;
use authsel::auth::group::{Authorization, Group};
use authsel::auth::identity::Sha256DifficultyIdentity;
use authsel::auth::kv::sled_backend::SledKv;
use authsel::auth::kv::KvStore;
use authsel::auth::registry::Registry;
use authsel::auth::token::Token;
use authsel::config::ClaimPolicyConfig;
use authsel::error::AuthError;
use authsel::select::node::Node;
use authsel::select::request::{NotEnoughNodes, SelectionRequest};
use authsel::select::state::State;

fn policy() -> ClaimPolicyConfig {
    ClaimPolicyConfig {
        max_skew_secs: 300,
        min_difficulty: 0,
    }
}

fn open_sled_registry() -> (Registry<SledKv>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let kv = SledKv::open(dir.path().to_str().unwrap()).expect("open sled");
    (Registry::new(kv), dir)
}

#[test]
fn s1_token_mint_and_claim() {
    let (registry, _dir) = open_sled_registry();
    let identity = Sha256DifficultyIdentity;

    let minted = registry.create("a@x", 1).expect("create");
    assert_eq!(minted.len(), 1);
    let token = &minted[0];

    let claim = registry
        .claim(
            &identity,
            &policy(),
            1_000,
            ClaimRequest {
                token: &token.serialize(),
                addr: "198.51.100.7:28967",
                client_timestamp: 1_000,
                tls_chain: &[vec![0xAA, 0xBB]],
                signed_chain_bytes: vec![vec![1, 2, 3]],
            },
        )
        .expect("claim succeeds");
    assert_eq!(claim.addr, "198.51.100.7:28967");

    let group = registry.get("a@x").expect("get");
    assert_eq!(group.items.len(), 1);
    assert!(!group.items[0].is_open());
    assert_eq!(group.items[0].claim.as_ref().unwrap().addr, "198.51.100.7:28967");

    let err = registry
        .claim(
            &identity,
            &policy(),
            1_001,
            ClaimRequest {
                token: &token.serialize(),
                addr: "203.0.113.9:28967",
                client_timestamp: 1_001,
                tls_chain: &[vec![0xCC]],
                signed_chain_bytes: vec![vec![9]],
            },
        )
        .unwrap_err();
    assert!(matches!(err, AuthError::AlreadyClaimed(_)));

    let unchanged = registry.get("a@x").expect("get again");
    assert_eq!(
        unchanged.items[0].claim.as_ref().unwrap().addr,
        "198.51.100.7:28967"
    );
}

#[test]
fn s2_skew_rejection() {
    let (registry, _dir) = open_sled_registry();
    let identity = Sha256DifficultyIdentity;
    let minted = registry.create("b@x", 1).expect("create");
    let token = &minted[0];

    let now = 1_000_000i64;
    let err = registry
        .claim(
            &identity,
            &policy(),
            now,
            ClaimRequest {
                token: &token.serialize(),
                addr: "198.51.100.7:28967",
                client_timestamp: now - 86_400,
                tls_chain: &[vec![0xAA]],
                signed_chain_bytes: vec![],
            },
        )
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidClaim(_)));
}

fn node(id: u8, net: &str, country: &str) -> Node {
    Node {
        id: [id; 32],
        address: format!("10.0.{id}.1:28967"),
        last_net: net.to_string(),
        last_ip_port: format!("10.0.{id}.1:28967"),
        country_code: country.to_string(),
    }
}

fn two_tier_pool() -> (Vec<Node>, Vec<Node>) {
    let reputable = vec![
        node(1, "rep-a", "US"),
        node(2, "rep-a", "US"),
        node(3, "rep-b", "US"),
        node(4, "rep-b", "US"),
        node(5, "rep-b", "US"),
    ];
    let new = vec![
        node(11, "new-a", "US"),
        node(12, "new-a", "US"),
        node(13, "new-b", "US"),
        node(14, "new-b", "US"),
        node(15, "new-b", "US"),
    ];
    (reputable, new)
}

#[test]
fn s3_distinct_selection_with_fallback() {
    let (reputable, new) = two_tier_pool();
    let state = State::new(reputable, new);

    let request = SelectionRequest {
        count: 10,
        new_fraction: 1.0,
        distinct: true,
        exclude_ids: HashSet::new(),
        exclude_countries: HashSet::new(),
        placement: None,
    };
    let (nodes, shortfall) = state.select(request);
    assert_eq!(nodes.len(), 4);
    assert_eq!(
        shortfall,
        Some(NotEnoughNodes {
            requested: 10,
            returned: 4
        })
    );
    let nets: HashSet<_> = nodes.iter().map(|n| n.last_net.clone()).collect();
    assert_eq!(nets.len(), 4);
}

#[test]
fn s4_non_distinct_full_fill() {
    let (reputable, new) = two_tier_pool();
    let state = State::new(reputable, new);

    let request = SelectionRequest {
        count: 6,
        new_fraction: 0.5,
        distinct: false,
        exclude_ids: HashSet::new(),
        exclude_countries: HashSet::new(),
        placement: None,
    };
    let (nodes, shortfall) = state.select(request);
    assert!(shortfall.is_none());
    assert_eq!(nodes.len(), 6);
    let new_count = nodes.iter().filter(|n| n.id[0] >= 11).count();
    let rep_count = nodes.len() - new_count;
    assert_eq!(new_count, 3);
    assert_eq!(rep_count, 3);
}

#[test]
fn s5_exclusion_seed() {
    let (reputable, new) = two_tier_pool();
    let state = State::new(reputable, new);

    let mut exclude = HashSet::new();
    exclude.insert([1u8; 32]); // in subnet "rep-a"

    let request = SelectionRequest {
        count: 3,
        new_fraction: 0.0,
        distinct: true,
        exclude_ids: exclude,
        exclude_countries: HashSet::new(),
        placement: None,
    };
    let (nodes, _) = state.select(request);
    assert!(nodes.iter().all(|n| n.last_net != "rep-a"));
}

#[test]
fn s6_legacy_decode_via_migration() {
    let (registry, dir) = open_sled_registry();

    let group = Group {
        items: vec![
            Authorization {
                token: Token::new("legacy-user".to_string(), [7u8; 64]),
                claim: None,
            },
            Authorization {
                token: Token::new("legacy-user".to_string(), [8u8; 64]),
                claim: None,
            },
        ],
    };
    let legacy_bytes = authsel::auth::group::legacy::encode_for_test(&group, "Group");

    let kv = SledKv::open(dir.path().to_str().unwrap()).unwrap();
    kv.put(b"legacy-user", &legacy_bytes).unwrap();
    kv.close().unwrap();
    drop(kv);

    let cancel = authsel::auth::cancel::CancellationToken::new();
    let migrated = registry
        .migrate_legacy(&cancel, |_| {})
        .expect("migration succeeds");
    assert_eq!(migrated, 1);

    let after = registry.get("legacy-user").expect("get after migration");
    assert_eq!(after, group);
}

#[test]
fn redaction_never_leaks_full_token_in_error_strings() {
    let (registry, _dir) = open_sled_registry();
    let identity = Sha256DifficultyIdentity;
    let minted = registry.create("c@x", 1).expect("create");
    let token = &minted[0];
    let full = token.serialize();

    let err = registry
        .claim(
            &identity,
            &policy(),
            1_000,
            ClaimRequest {
                token: &full,
                addr: "198.51.100.7:28967",
                client_timestamp: 1_000 - 86_400,
                tls_chain: &[vec![0xAA]],
                signed_chain_bytes: vec![],
            },
        )
        .unwrap_err();
    assert!(!err.to_string().contains(&full));
}
