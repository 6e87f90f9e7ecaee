// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nebulas network presets and the wire schema of the `/v1/user` API.
//!
//! Every response is an envelope holding either `result` or `error`. Results
//! are decoded into the explicit types below; the node encodes most integers
//! as strings, which are turned into numbers at decode time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, NoneAsEmptyString, PickFirst};

use super::amount::Amount;
use crate::error::NebClientError;

/// Nebulas network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u32,
    /// Node API base URL
    pub api_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Nebulas mainnet configuration.
pub const NEBULAS_MAINNET: NetworkConfig = NetworkConfig {
    name: "Nebulas Mainnet",
    chain_id: 1,
    api_url: "https://mainnet.nebulas.io",
    explorer_url: "https://explorer.nebulas.io",
};

/// Nebulas testnet configuration.
pub const NEBULAS_TESTNET: NetworkConfig = NetworkConfig {
    name: "Nebulas Testnet",
    chain_id: 1001,
    api_url: "https://testnet.nebulas.io",
    explorer_url: "https://explorer.nebulas.io/#/testnet",
};

/// Resolve a network preset by name (`mainnet` or `testnet`, default `testnet`).
pub fn network_by_name(raw: Option<&str>) -> Result<NetworkConfig, String> {
    let value = raw.unwrap_or("testnet").trim().to_ascii_lowercase();
    match value.as_str() {
        "mainnet" => Ok(NEBULAS_MAINNET),
        "testnet" => Ok(NEBULAS_TESTNET),
        other => Err(format!(
            "Unknown network `{other}`; expected `mainnet` or `testnet`."
        )),
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope: `{"result": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcEnvelope {
    pub result: Option<Value>,
    pub error: Option<Value>,
}

impl RpcEnvelope {
    /// Map `error` to [`NebClientError::Remote`], otherwise decode `result` as `T`.
    ///
    /// An `error` field takes precedence over any `result` in the same body.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, NebClientError> {
        if let Some(error) = self.error {
            let message = match error {
                Value::String(message) => message,
                other => other.to_string(),
            };
            return Err(NebClientError::Remote(message));
        }
        let result = self
            .result
            .ok_or_else(|| NebClientError::InvalidResponse("missing `result` field".to_string()))?;
        Ok(serde_json::from_value(result)?)
    }
}

// =============================================================================
// Account State
// =============================================================================

/// Account type code for a contract account.
pub const CONTRACT_ACCOUNT_TYPE: u32 = 88;

/// Result of `/v1/user/accountstate`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Balance in wei
    pub balance: Amount,
    /// Last nonce used by the account on chain
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub nonce: u64,
    /// 87 for normal accounts, 88 for contracts
    #[serde(rename = "type", default)]
    pub account_type: u32,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<u64>,
}

impl AccountState {
    pub fn is_contract(&self) -> bool {
        self.account_type == CONTRACT_ACCOUNT_TYPE
    }
}

/// Single field of the account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Balance,
    Nonce,
    Type,
    Height,
    Pending,
}

impl AccountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountField::Balance => "balance",
            AccountField::Nonce => "nonce",
            AccountField::Type => "type",
            AccountField::Height => "height",
            AccountField::Pending => "pending",
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balance" => Ok(AccountField::Balance),
            "nonce" => Ok(AccountField::Nonce),
            "type" => Ok(AccountField::Type),
            "height" => Ok(AccountField::Height),
            "pending" => Ok(AccountField::Pending),
            other => Err(format!("unknown account field `{other}`")),
        }
    }
}

// =============================================================================
// Chain State
// =============================================================================

/// Result of `/v1/user/nebstate`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NebState {
    pub chain_id: u32,
    /// Hash of the current tail block
    pub tail: String,
    /// Hash of the last irreversible block
    #[serde(default)]
    pub lib: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub height: u64,
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub synchronized: bool,
    #[serde(default)]
    pub version: String,
}

/// Single field of the chain state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStateField {
    ChainId,
    Tail,
    Lib,
    Height,
    ProtocolVersion,
    Synchronized,
    Version,
}

impl ChainStateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainStateField::ChainId => "chain_id",
            ChainStateField::Tail => "tail",
            ChainStateField::Lib => "lib",
            ChainStateField::Height => "height",
            ChainStateField::ProtocolVersion => "protocol_version",
            ChainStateField::Synchronized => "synchronized",
            ChainStateField::Version => "version",
        }
    }
}

impl fmt::Display for ChainStateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainStateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "chain_id" => Ok(ChainStateField::ChainId),
            "tail" => Ok(ChainStateField::Tail),
            "lib" => Ok(ChainStateField::Lib),
            "height" => Ok(ChainStateField::Height),
            "protocol_version" => Ok(ChainStateField::ProtocolVersion),
            "synchronized" => Ok(ChainStateField::Synchronized),
            "version" => Ok(ChainStateField::Version),
            other => Err(format!("unknown chain state field `{other}`")),
        }
    }
}

// =============================================================================
// Gas
// =============================================================================

/// Result of `/v1/user/getGasPrice`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GasPriceResult {
    pub gas_price: Amount,
}

/// Body of `/v1/user/estimateGas`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateGasRequest {
    pub from: String,
    pub to: String,
    /// Transfer value in wei
    pub value: Amount,
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: Amount,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_limit: u64,
}

/// Result of `/v1/user/estimateGas`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub gas: u64,
    /// Execution error reported by the node; empty when execution succeeded.
    #[serde(default)]
    pub err: String,
}

impl GasEstimate {
    pub fn execution_error(&self) -> Option<&str> {
        if self.err.is_empty() {
            None
        } else {
            Some(&self.err)
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Result of `/v1/user/rawtransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRawTransactionResult {
    pub txhash: String,
    /// Set when the transaction deploys a contract.
    #[serde(default)]
    pub contract_address: String,
}

/// Execution status of a transaction, carried on the wire as `0`/`1`/`2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum TxStatus {
    Failed,
    Success,
    Pending,
}

impl TryFrom<i64> for TxStatus {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TxStatus::Failed),
            1 => Ok(TxStatus::Success),
            2 => Ok(TxStatus::Pending),
            other => Err(format!("unknown transaction status {other}")),
        }
    }
}

impl From<TxStatus> for i64 {
    fn from(status: TxStatus) -> Self {
        match status {
            TxStatus::Failed => 0,
            TxStatus::Success => 1,
            TxStatus::Pending => 2,
        }
    }
}

/// A transaction as returned inside blocks and by `/v1/user/getTransactionReceipt`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub hash: String,
    #[serde(rename = "chainId")]
    pub chain_id: u32,
    pub from: String,
    pub to: String,
    /// Transfer value in wei
    pub value: Amount,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub nonce: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub timestamp: i64,
    /// `binary`, `deploy`, `call`, ...
    #[serde(rename = "type")]
    pub tx_type: String,
    /// Base64 payload
    #[serde(default)]
    pub data: Option<String>,
    pub gas_price: Amount,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub gas_limit: u64,
    #[serde(default)]
    pub contract_address: String,
    pub status: TxStatus,
    /// Empty while the transaction is pending.
    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    #[serde(default)]
    pub gas_used: Option<u64>,
    #[serde(default)]
    pub execute_error: String,
    #[serde(default)]
    pub execute_result: String,
    #[serde_as(as = "PickFirst<(Option<_>, NoneAsEmptyString)>")]
    #[serde(default)]
    pub block_height: Option<u64>,
}

/// Receipts share the transaction layout.
pub type TransactionReceipt = TransactionView;

impl TransactionView {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// Fee actually charged (`gas_used * gas_price`), once known.
    pub fn fee(&self) -> Option<Amount> {
        self.gas_used
            .map(|gas| Amount::from(self.gas_price.as_biguint() * gas))
    }
}

// =============================================================================
// Blocks
// =============================================================================

/// Block selector for `/v1/user/getBlockByHeight` and `/v1/user/getBlockByHash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Height(u64),
    Hash(String),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Height(height) => write!(f, "{height}"),
            BlockId::Hash(hash) => f.write_str(hash),
        }
    }
}

impl FromStr for BlockId {
    type Err = String;

    /// All digits selects a height, anything else is taken as a hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("block height or hash must not be empty".to_string());
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse()
                .map(BlockId::Height)
                .map_err(|e| format!("invalid block height `{s}`: {e}"))
        } else {
            Ok(BlockId::Hash(s.to_string()))
        }
    }
}

impl From<u64> for BlockId {
    fn from(height: u64) -> Self {
        BlockId::Height(height)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRoot {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub timestamp: i64,
    pub proposer: String,
    pub dynasty_root: String,
}

/// Block returned with its transactions filled in.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView {
    pub hash: String,
    pub parent_hash: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub height: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub nonce: u64,
    pub coinbase: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub timestamp: i64,
    pub chain_id: u32,
    #[serde(default)]
    pub state_root: String,
    #[serde(default)]
    pub txs_root: String,
    #[serde(default)]
    pub events_root: String,
    #[serde(default)]
    pub consensus_root: Option<ConsensusRoot>,
    #[serde(default)]
    pub miner: String,
    #[serde(rename = "randomSeed", default)]
    pub random_seed: String,
    #[serde(rename = "randomProof", default)]
    pub random_proof: String,
    #[serde(default)]
    pub is_finality: bool,
    #[serde(default)]
    pub transactions: Vec<TransactionView>,
}

impl BlockView {
    /// Block time as UTC, if the timestamp is in range.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}
