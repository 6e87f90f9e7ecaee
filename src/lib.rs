// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nebulas Client - Ledger RPC adapter for Nebulas nodes
//!
//! This crate talks to a Nebulas node's `/v1/user` HTTP API, converts
//! amounts between wei and NAS without losing precision, and reconciles
//! local and on-chain nonces before a transaction is signed.
//!
//! ## Modules
//!
//! - `blockchain` - Amounts, nonces, wire types and the node client
//! - `config` - Environment-driven client configuration
//! - `error` - Client error type

pub mod blockchain;
pub mod config;
pub mod error;

pub use blockchain::NebClient;
pub use error::NebClientError;
