// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nebulas integration.
//!
//! This module provides functionality for:
//! - Converting between wei and decimal NAS amounts
//! - Querying account and chain state over the node HTTP API
//! - Broadcasting signed transactions
//! - Picking the next nonce from chain and local state

pub mod amount;
pub mod client;
pub mod ledger;
pub mod nonce;
pub mod types;

pub use amount::*;
pub use client::NebClient;
pub use ledger::{next_nonce, LedgerRpc};
pub use nonce::{reconcile_nonce, NonceState};
pub use types::*;
