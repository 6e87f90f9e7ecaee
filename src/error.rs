// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors returned by the Nebulas client.

use crate::blockchain::AmountError;

/// Errors that can occur while talking to a Nebulas node.
#[derive(Debug, thiserror::Error)]
pub enum NebClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Node returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The node answered with an `error` field; the message is passed through.
    #[error("{0}")]
    Remote(String),

    #[error("Failed to decode node response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid node response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("No unused nonce left for {0}")]
    NonceExhausted(String),
}

impl NebClientError {
    /// Whether the node itself rejected the request.
    pub fn is_remote(&self) -> bool {
        matches!(self, NebClientError::Remote(_))
    }

    /// Message supplied by the node, if this is a remote error.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            NebClientError::Remote(message) => Some(message),
            _ => None,
        }
    }
}
