// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! The placement request handler (§4.8): splits a request into "new" and
//! "reputable" quotas, draws from each with one shared, in-progress filter
//! so subnet exclusions carry across the two draws.

use std::collections::HashSet;

use crate::select::filter::{Filter, FilterSet, PlacementConstraint};
use crate::select::node::Node;
use crate::select::selector::Selector;
use crate::select::state::Snapshot;

/// A single upload-node placement request.
pub struct SelectionRequest {
    /// Total number of nodes requested.
    pub count: usize,
    /// Fraction (`0.0..=1.0`) of `count` to draw from the "new" tier before
    /// falling back to "reputable".
    pub new_fraction: f64,
    /// When true, draw by subnet (at most one node per subnet, disjoint
    /// from the subnets of `exclude_ids`); otherwise draw by node.
    pub distinct: bool,
    /// Node ids to reject outright, and (when `distinct`) to seed the
    /// auto-exclude-subnets filter from.
    pub exclude_ids: HashSet<[u8; 32]>,
    /// Country codes to reject outright.
    pub exclude_countries: HashSet<String>,
    /// Optional placement constraint over country code (e.g. region
    /// membership).
    pub placement: Option<PlacementConstraint>,
}

/// Returned alongside a partial result when fewer than `requested` nodes
/// could be found (§7: data, not an error — `select` never returns a
/// `Result`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotEnoughNodes {
    /// Nodes originally requested.
    pub requested: usize,
    /// Nodes actually returned.
    pub returned: usize,
}

/// Execute the five-step placement algorithm against `snapshot` (§4.8).
pub fn handle(snapshot: &Snapshot, request: SelectionRequest) -> (Vec<Node>, Option<NotEnoughNodes>) {
    let new_target = ((request.count as f64) * request.new_fraction).floor() as usize;

    let mut filter = FilterSet::new().push(Filter::ExcludeIds(request.exclude_ids.clone()));
    if !request.exclude_countries.is_empty() {
        filter = filter.push(Filter::ExcludeCountries(request.exclude_countries));
    }
    if let Some(constraint) = request.placement {
        filter = filter.push(Filter::Placement(constraint));
    }
    if request.distinct {
        filter = filter.push(Filter::auto_exclude_subnets_seeded(
            request.exclude_ids,
            &snapshot.subnet_index,
        ));
    }

    let new_selector: &dyn Selector = if request.distinct {
        &snapshot.new_by_subnet
    } else {
        &snapshot.new_by_id
    };
    let reputable_selector: &dyn Selector = if request.distinct {
        &snapshot.reputable_by_subnet
    } else {
        &snapshot.reputable_by_id
    };

    let mut selected = new_selector.select(new_target, &filter);
    let reputable_target = request.count.saturating_sub(selected.len());
    // Same `filter`: subnets accepted while drawing "new" remain excluded
    // here when `distinct` is set (§4.8 step 5).
    let mut reputable = reputable_selector.select(reputable_target, &filter);
    selected.append(&mut reputable);

    if selected.len() < request.count {
        let shortfall = NotEnoughNodes {
            requested: request.count,
            returned: selected.len(),
        };
        (selected, Some(shortfall))
    } else {
        (selected, None)
    }
}
