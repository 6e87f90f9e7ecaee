// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nonce reconciliation for outgoing transactions.
//!
//! The node's account nonce lags behind transactions that have been broadcast
//! but not yet indexed. The client therefore keeps its own record of the last
//! nonce it used and takes whichever counter is further along.

/// Last nonce seen on chain and last nonce consumed locally for one address.
///
/// Both values are owned by the caller; nothing here is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonceState {
    /// Account nonce reported by the node.
    pub chain_nonce: u64,
    /// Last nonce already used by a transaction this client issued.
    pub local_nonce: u64,
}

impl NonceState {
    pub fn new(chain_nonce: u64, local_nonce: u64) -> Self {
        Self {
            chain_nonce,
            local_nonce,
        }
    }

    /// Nonce to attach to the next transaction.
    pub fn next_nonce(&self) -> u64 {
        reconcile_nonce(self.chain_nonce, self.local_nonce)
    }

    /// Like [`Self::next_nonce`], but `None` once the larger counter has
    /// reached `u64::MAX` and no unused nonce remains.
    pub fn checked_next_nonce(&self) -> Option<u64> {
        self.chain_nonce.max(self.local_nonce).checked_add(1)
    }

    /// How far the local counter is ahead of the chain (0 if it is not).
    pub fn local_lead(&self) -> u64 {
        self.local_nonce.saturating_sub(self.chain_nonce)
    }
}

/// Pick the nonce for the next transaction.
///
/// A local nonce ahead of the chain means the node has not observed our last
/// broadcast yet, so it wins; on a tie or when the chain is ahead, the chain
/// wins.
///
/// The result saturates: when the larger input is `u64::MAX` the returned
/// nonce is `u64::MAX` itself, which is already consumed. Use
/// [`NonceState::checked_next_nonce`] to detect that case.
pub fn reconcile_nonce(chain_nonce: u64, local_nonce: u64) -> u64 {
    if local_nonce > chain_nonce {
        local_nonce.saturating_add(1)
    } else {
        chain_nonce.saturating_add(1)
    }
}
