// Copyright (c) 2026 Authsel
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Upload node selection core.
//!
//! Data flow: placement controller → [`state::State::select`] →
//! [`request::handle`] → [`selector::Selector`] (per tier, per mode) →
//! [`filter::FilterSet`].

pub mod filter;
pub mod node;
pub mod request;
pub mod selector;
pub mod state;
