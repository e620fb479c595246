// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Group codec: a user's ordered list of [`Authorization`]s, each a
//! [`Token`] plus an optional [`Claim`].
//!
//! ## Wire format
//! ```text
//! AuthorizationGroup { repeated Authorization items }
//! Authorization     { Token token; optional Claim claim }
//! Token             { bytes user_id; bytes data (length 64) }
//! Claim             { bytes addr; int64 timestamp;
//!                     bytes identity; repeated bytes signed_chain_bytes }
//! ```
//! Encoded with the crate's canonical `bincode` options (fixint, reject
//! trailing bytes) — the same deterministic codec idiom used elsewhere in
//! this crate's ancestry for length-delimited binary state. An absent
//! `Claim` serializes as `Option::None`, which bincode represents as a
//! single zero tag byte: the field is simply not emitted.

pub mod legacy;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::auth::token::{Token, TOKEN_DATA_LEN};
use crate::error::AuthError;

/// Hard cap on a decoded group's encoded size, defending against memory/CPU
/// bombs from a corrupted or malicious stored value.
pub const MAX_GROUP_BYTES: usize = 16 * 1024 * 1024;

fn bincode_opts() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// On-the-wire `Token` message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
struct WireToken {
    user_id: Vec<u8>,
    data: Vec<u8>,
}

/// On-the-wire `Claim` message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claim {
    /// Claimant network address.
    pub addr: String,
    /// Claim time, seconds since epoch.
    pub timestamp: i64,
    /// Opaque DER-encoded claimant identity chain, produced and consumed by
    /// the identity collaborator.
    pub identity: Vec<u8>,
    /// Ordered signed-certificate-chain bytes returned to the claimant.
    pub signed_chain_bytes: Vec<Vec<u8>>,
}

/// On-the-wire `Authorization` message: a token plus an optional claim.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
struct WireAuthorization {
    token: WireToken,
    claim: Option<Claim>,
}

/// On-the-wire `AuthorizationGroup` message: an ordered list of authorizations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
struct WireGroup {
    items: Vec<WireAuthorization>,
}

/// A [`Token`] plus an optional [`Claim`]. Absent claim means "open";
/// present means "claimed". There is no intermediate state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authorization {
    /// The token this authorization was minted for.
    pub token: Token,
    /// Claim metadata, if the token has been redeemed.
    pub claim: Option<Claim>,
}

impl Authorization {
    /// True when no claim has been recorded yet.
    pub fn is_open(&self) -> bool {
        self.claim.is_none()
    }

    /// Redacted display form: delegates to [`Token::display_redacted`].
    /// Never includes the full token string.
    pub fn display_redacted(&self) -> String {
        self.token.display_redacted()
    }

    fn to_wire(&self) -> WireAuthorization {
        WireAuthorization {
            token: WireToken {
                user_id: self.token.user_id().as_bytes().to_vec(),
                data: self.token.data().to_vec(),
            },
            claim: self.claim.clone(),
        }
    }

    fn from_wire(w: WireAuthorization) -> Result<Self, AuthError> {
        if w.token.data.len() != TOKEN_DATA_LEN {
            return Err(AuthError::Internal("corrupt token in group".to_string()));
        }
        let user_id = String::from_utf8(w.token.user_id)
            .map_err(|_| AuthError::Internal("corrupt user id in group".to_string()))?;
        let mut data = [0u8; TOKEN_DATA_LEN];
        data.copy_from_slice(&w.token.data);
        Ok(Self {
            token: Token::new(user_id, data),
            claim: w.claim,
        })
    }
}

/// A user's ordered sequence of authorizations. Append-only under `Create`;
/// per-index replacement under `Claim`/`Unclaim`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    /// Authorizations, in the order they were created.
    pub items: Vec<Authorization>,
}

impl Group {
    /// Empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the index of the authorization whose token payload matches
    /// `data`, by byte-wise equality (§4.4 step 5).
    pub fn find_by_token_data(&self, data: &[u8; TOKEN_DATA_LEN]) -> Option<usize> {
        self.items.iter().position(|a| a.token.data_eq(data))
    }
}

/// Encode a [`Group`] to its current binary wire form.
pub fn encode_group(g: &Group) -> Result<Vec<u8>, AuthError> {
    let wire = WireGroup {
        items: g.items.iter().map(Authorization::to_wire).collect(),
    };
    bincode_opts()
        .serialize(&wire)
        .map_err(|e| AuthError::Internal(format!("group encode: {e}")))
}

/// Decode a [`Group`] from its current binary wire form.
///
/// Rejects payloads larger than [`MAX_GROUP_BYTES`] before attempting to
/// deserialize, and rejects trailing bytes after a well-formed message.
pub fn decode_group(bytes: &[u8]) -> Result<Group, AuthError> {
    if bytes.len() > MAX_GROUP_BYTES {
        return Err(AuthError::Internal("group too large".to_string()));
    }
    let wire: WireGroup = bincode_opts()
        .with_limit(MAX_GROUP_BYTES as u64)
        .deserialize(bytes)
        .map_err(|e| AuthError::Internal(format!("group decode: {e}")))?;
    let items = wire
        .items
        .into_iter()
        .map(Authorization::from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Group { items })
}

/// Decode a stored value, transparently reading either the current format
/// or a legacy-encoded value (§4.2). Used only by migration tooling
/// (`Registry::migrate_legacy`); ordinary reads always assume the current
/// format per §6 ("never silently at runtime").
pub fn decode_group_any(bytes: &[u8]) -> Result<Group, AuthError> {
    if legacy::sniff(bytes) {
        legacy::decode(bytes)
    } else {
        decode_group(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_token(user: &str, b: u8) -> Token {
        Token::new(user.to_string(), [b; TOKEN_DATA_LEN])
    }

    #[test]
    fn round_trip_empty() {
        let g = Group::new();
        let enc = encode_group(&g).unwrap();
        let dec = decode_group(&enc).unwrap();
        assert_eq!(g, dec);
    }

    #[test]
    fn round_trip_mixed_claims_preserves_order() {
        let g = Group {
            items: vec![
                Authorization {
                    token: mk_token("u", 1),
                    claim: None,
                },
                Authorization {
                    token: mk_token("u", 2),
                    claim: Some(Claim {
                        addr: "10.0.0.1:28967".to_string(),
                        timestamp: 1_700_000_000,
                        identity: vec![1, 2, 3],
                        signed_chain_bytes: vec![vec![9, 9], vec![8]],
                    }),
                },
                Authorization {
                    token: mk_token("u", 3),
                    claim: None,
                },
            ],
        };
        let enc = encode_group(&g).unwrap();
        let dec = decode_group(&enc).unwrap();
        assert_eq!(g, dec);
        assert!(dec.items[0].is_open());
        assert!(!dec.items[1].is_open());
        assert!(dec.items[2].is_open());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let g = Group {
            items: vec![Authorization {
                token: mk_token("u", 1),
                claim: None,
            }],
        };
        let mut enc = encode_group(&g).unwrap();
        enc.push(0xFF);
        assert!(decode_group(&enc).is_err());
    }

    #[test]
    fn find_by_token_data_locates_matching_record() {
        let g = Group {
            items: vec![
                Authorization {
                    token: mk_token("u", 1),
                    claim: None,
                },
                Authorization {
                    token: mk_token("u", 2),
                    claim: None,
                },
            ],
        };
        assert_eq!(g.find_by_token_data(&[2u8; TOKEN_DATA_LEN]), Some(1));
        assert_eq!(g.find_by_token_data(&[9u8; TOKEN_DATA_LEN]), None);
    }
}
