// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger RPC capability and chain-backed nonce selection.

use std::future::Future;

use super::nonce::NonceState;
use super::types::{AccountState, NebState};
use crate::error::NebClientError;

/// Minimal node surface needed to pick a nonce and broadcast a transaction.
///
/// [`super::NebClient`] implements this over HTTP; tests and callers with
/// their own transport can provide another implementation.
pub trait LedgerRpc {
    /// Current state of an account.
    fn account_state(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<AccountState, NebClientError>> + Send;

    /// Current chain state.
    fn chain_state(&self) -> impl Future<Output = Result<NebState, NebClientError>> + Send;

    /// Broadcast a signed, base64-encoded transaction and return its hash.
    fn send_raw_transaction(
        &self,
        data: &str,
    ) -> impl Future<Output = Result<String, NebClientError>> + Send;
}

/// Nonce to use for the next transaction from `address`.
///
/// `local_nonce` is the last nonce this caller already consumed; persisting
/// the returned value is up to the caller.
pub async fn next_nonce<L: LedgerRpc>(
    ledger: &L,
    address: &str,
    local_nonce: u64,
    drift_warn: u64,
) -> Result<u64, NebClientError> {
    let chain_nonce = ledger.account_state(address).await?.nonce;
    let state = NonceState::new(chain_nonce, local_nonce);
    let next = state
        .checked_next_nonce()
        .ok_or_else(|| NebClientError::NonceExhausted(address.to_string()))?;

    let lead = state.local_lead();
    if lead > drift_warn {
        tracing::warn!(
            address,
            chain_nonce,
            local_nonce,
            lead,
            "Local nonce is far ahead of the chain; using it anyway"
        );
    }

    tracing::debug!(
        address,
        chain_nonce,
        local_nonce,
        next,
        source = if local_nonce > chain_nonce { "local" } else { "chain" },
        "Reconciled nonce"
    );

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Amount;

    struct FakeLedger {
        nonce: u64,
    }

    impl LedgerRpc for FakeLedger {
        async fn account_state(&self, address: &str) -> Result<AccountState, NebClientError> {
            if address.is_empty() {
                return Err(NebClientError::Remote("address: invalid address format".to_string()));
            }
            Ok(AccountState {
                balance: Amount::zero(),
                nonce: self.nonce,
                account_type: 87,
                height: None,
                pending: None,
            })
        }

        async fn chain_state(&self) -> Result<NebState, NebClientError> {
            Ok(NebState {
                chain_id: 1001,
                tail: "tail".to_string(),
                lib: "lib".to_string(),
                height: 10,
                protocol_version: "/neb/1.0.0".to_string(),
                synchronized: true,
                version: "1.1.0".to_string(),
            })
        }

        async fn send_raw_transaction(&self, _data: &str) -> Result<String, NebClientError> {
            Ok("hash".to_string())
        }
    }

    const ADDRESS: &str = "n1Z6SbjLuAEXfhX1UJvXT6BB5osWYxVg3F3";

    #[tokio::test]
    async fn chain_ahead_of_local() {
        let ledger = FakeLedger { nonce: 5 };
        assert_eq!(next_nonce(&ledger, ADDRESS, 3, 16).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn local_ahead_of_chain() {
        let ledger = FakeLedger { nonce: 3 };
        assert_eq!(next_nonce(&ledger, ADDRESS, 5, 16).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn large_drift_is_still_trusted() {
        let ledger = FakeLedger { nonce: 1 };
        assert_eq!(next_nonce(&ledger, ADDRESS, 500, 16).await.unwrap(), 501);
    }

    #[tokio::test]
    async fn exhausted_nonce_is_an_error() {
        let ledger = FakeLedger { nonce: u64::MAX };
        let err = next_nonce(&ledger, ADDRESS, 0, 16).await.unwrap_err();
        assert!(matches!(err, NebClientError::NonceExhausted(ref a) if a == ADDRESS));

        let ledger = FakeLedger { nonce: 0 };
        assert!(next_nonce(&ledger, ADDRESS, u64::MAX, u64::MAX).await.is_err());
    }

    #[tokio::test]
    async fn chain_state_through_trait() {
        let ledger = FakeLedger { nonce: 0 };
        let state = LedgerRpc::chain_state(&ledger).await.unwrap();
        assert_eq!(state.chain_id, 1001);
        assert_eq!(state.height, 10);
    }

    #[tokio::test]
    async fn ledger_errors_propagate() {
        let ledger = FakeLedger { nonce: 1 };
        let err = next_nonce(&ledger, "", 0, 16).await.unwrap_err();
        assert_eq!(err.remote_message(), Some("address: invalid address format"));
    }
}
