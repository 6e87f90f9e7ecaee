// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nebulas node client for the `/v1/user` HTTP API.

use base64ct::{Base64, Encoding};
use reqwest::{header::ACCEPT, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::amount::Amount;
use super::ledger::{self, LedgerRpc};
use super::types::*;
use crate::config::ClientConfig;
use crate::error::NebClientError;

const ACCOUNT_STATE_PATH: &str = "/v1/user/accountstate";
const NEB_STATE_PATH: &str = "/v1/user/nebstate";
const GAS_PRICE_PATH: &str = "/v1/user/getGasPrice";
const RAW_TRANSACTION_PATH: &str = "/v1/user/rawtransaction";
const BLOCK_BY_HEIGHT_PATH: &str = "/v1/user/getBlockByHeight";
const BLOCK_BY_HASH_PATH: &str = "/v1/user/getBlockByHash";
const TRANSACTION_RECEIPT_PATH: &str = "/v1/user/getTransactionReceipt";
const ESTIMATE_GAS_PATH: &str = "/v1/user/estimateGas";

/// Nebulas node client.
///
/// Every call is a single request; nothing is retried.
#[derive(Debug, Clone)]
pub struct NebClient {
    config: ClientConfig,
    http: Client,
}

impl NebClient {
    /// Create a new client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, NebClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, NebClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client for Nebulas mainnet.
    pub fn mainnet() -> Result<Self, NebClientError> {
        Self::new(ClientConfig::for_network(&NEBULAS_MAINNET)?)
    }

    /// Create a client for Nebulas testnet.
    pub fn testnet() -> Result<Self, NebClientError> {
        Self::new(ClientConfig::for_network(&NEBULAS_TESTNET)?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the balance, nonce and type of an account.
    pub async fn get_account_state(&self, address: &str) -> Result<AccountState, NebClientError> {
        self.post(ACCOUNT_STATE_PATH, &json!({ "address": address }))
            .await
    }

    /// Get one account state field as the node reported it.
    pub async fn get_account_state_field(
        &self,
        address: &str,
        field: AccountField,
    ) -> Result<String, NebClientError> {
        let state: Value = self
            .post(ACCOUNT_STATE_PATH, &json!({ "address": address }))
            .await?;
        match state.get(field.as_str()) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(Value::Null) | None => Err(NebClientError::InvalidResponse(format!(
                "account state has no `{field}`"
            ))),
            Some(other) => Ok(other.to_string()),
        }
    }

    /// Get the current chain state.
    pub async fn get_chain_state(&self) -> Result<NebState, NebClientError> {
        self.get(NEB_STATE_PATH).await
    }

    /// Get one chain state field as the node reported it.
    pub async fn get_chain_state_field(
        &self,
        field: ChainStateField,
    ) -> Result<Value, NebClientError> {
        let mut state: Value = self.get(NEB_STATE_PATH).await?;
        state
            .get_mut(field.as_str())
            .map(Value::take)
            .ok_or_else(|| {
                NebClientError::InvalidResponse(format!("chain state has no `{field}`"))
            })
    }

    /// Get the chain ID the node is running.
    pub async fn get_chain_id(&self) -> Result<u32, NebClientError> {
        Ok(self.get_chain_state().await?.chain_id)
    }

    /// Get the current gas price in wei.
    pub async fn get_gas_price(&self) -> Result<Amount, NebClientError> {
        let result: GasPriceResult = self.get(GAS_PRICE_PATH).await?;
        Ok(result.gas_price)
    }

    /// Broadcast a signed transaction (base64 of its protobuf encoding).
    ///
    /// # Returns
    /// The transaction hash.
    pub async fn send_raw_transaction(&self, data: &str) -> Result<String, NebClientError> {
        let result: SendRawTransactionResult = self
            .post(RAW_TRANSACTION_PATH, &json!({ "data": data }))
            .await?;

        tracing::info!(
            txhash = %result.txhash,
            contract_address = %result.contract_address,
            "Raw transaction submitted"
        );
        Ok(result.txhash)
    }

    /// Broadcast a signed transaction given as raw bytes.
    pub async fn send_raw_transaction_bytes(
        &self,
        payload: &[u8],
    ) -> Result<String, NebClientError> {
        self.send_raw_transaction(&Base64::encode_string(payload))
            .await
    }

    /// Get a block, with its transactions, by height or hash.
    pub async fn get_block(&self, block: &BlockId) -> Result<BlockView, NebClientError> {
        match block {
            BlockId::Height(height) => {
                self.post(
                    BLOCK_BY_HEIGHT_PATH,
                    &json!({ "height": height, "full_fill_transaction": true }),
                )
                .await
            }
            BlockId::Hash(hash) => {
                self.post(
                    BLOCK_BY_HASH_PATH,
                    &json!({ "hash": hash, "full_fill_transaction": true }),
                )
                .await
            }
        }
    }

    /// Get the receipt of a transaction by hash.
    pub async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<TransactionReceipt, NebClientError> {
        self.post(TRANSACTION_RECEIPT_PATH, &json!({ "hash": hash }))
            .await
    }

    /// Estimate the gas a transaction would use.
    pub async fn estimate_gas(
        &self,
        request: &EstimateGasRequest,
    ) -> Result<GasEstimate, NebClientError> {
        let estimate: GasEstimate = self.post(ESTIMATE_GAS_PATH, request).await?;
        if let Some(err) = estimate.execution_error() {
            tracing::warn!(from = %request.from, to = %request.to, error = %err, "Gas estimation reported an execution error");
        }
        Ok(estimate)
    }

    /// Nonce to use for the next transaction from `address`.
    ///
    /// See [`ledger::next_nonce`].
    pub async fn next_nonce(&self, address: &str, local_nonce: u64) -> Result<u64, NebClientError> {
        ledger::next_nonce(self, address, local_nonce, self.config.nonce_drift_warn).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, NebClientError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        self.decode(&url, response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, NebClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        self.decode(&url, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        url: &str,
        response: Response,
    ) -> Result<T, NebClientError> {
        let status = response.status();
        let body = response.text().await?;

        if self.config.debug {
            tracing::info!(%url, status = status.as_u16(), %body, "Node response");
        } else {
            tracing::trace!(%url, status = status.as_u16(), %body, "Node response");
        }

        // The node reports failures as an `error` envelope, usually with a
        // non-2xx status; anything else on a failed status is a transport problem.
        let envelope: RpcEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(NebClientError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        };

        if !status.is_success() && envelope.error.is_none() {
            return Err(NebClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        envelope.into_result()
    }
}

impl LedgerRpc for NebClient {
    async fn account_state(&self, address: &str) -> Result<AccountState, NebClientError> {
        self.get_account_state(address).await
    }

    async fn chain_state(&self) -> Result<NebState, NebClientError> {
        self.get_chain_state().await
    }

    async fn send_raw_transaction(&self, data: &str) -> Result<String, NebClientError> {
        NebClient::send_raw_transaction(self, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };

    const ADDRESS: &str = "n1Z6SbjLuAEXfhX1UJvXT6BB5osWYxVg3F3";
    const TX_HASH: &str = "8b98a5e4a27d2744a6295fe71e4f138d3e423ced11c81e201c12ac8379226ad1";

    /// Serve `app` on an ephemeral port and return a client pointed at it.
    async fn spawn_node(app: Router) -> NebClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        NebClient::new(ClientConfig::new(&format!("http://{addr}")).unwrap()).unwrap()
    }

    fn account_state_node(nonce: &'static str) -> Router {
        Router::new().route(
            ACCOUNT_STATE_PATH,
            post(move |Json(body): Json<Value>| async move {
                if body["address"] != ADDRESS {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "address: invalid address format" })),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "result": {
                            "balance": "1500000000000000000",
                            "nonce": nonce,
                            "type": 87,
                            "height": "200",
                            "pending": "0"
                        }
                    })),
                )
            }),
        )
    }

    fn receipt(status: i64) -> Value {
        json!({
            "hash": TX_HASH,
            "chainId": 1001,
            "from": ADDRESS,
            "to": "n1orSeSMj7nn8KHHN4JcQEw3r52TVExu63r",
            "value": "1000000000000000000",
            "nonce": "7",
            "timestamp": "1539161640",
            "type": "binary",
            "data": null,
            "gas_price": "1000000",
            "gas_limit": "200000",
            "contract_address": "",
            "status": status,
            "gas_used": "20000",
            "execute_error": "",
            "execute_result": "\"\"",
            "block_height": "8989"
        })
    }

    fn block(height: u64, hash: &str) -> Value {
        json!({
            "hash": hash,
            "parent_hash": "59f927c87d5d4ca6f7d3c2827c42f8ec60f0057146ae371cdfa1fba8d0514f5e",
            "height": height.to_string(),
            "nonce": "0",
            "coinbase": "n1NM2eETQG5Es7cCc7sh29NJr9cP94QZcXR",
            "timestamp": "1539161640",
            "chain_id": 1001,
            "miner": "n1FF1nz6tarkDVwWQkMnnwFPuPKUaQTdptE",
            "is_finality": false,
            "transactions": [receipt(1)]
        })
    }

    #[tokio::test]
    async fn get_account_state_decodes_result() {
        let client = spawn_node(account_state_node("12")).await;

        let state = client.get_account_state(ADDRESS).await.unwrap();
        assert_eq!(state.nonce, 12);
        assert_eq!(state.balance.to_nas().to_string(), "1.5");
        assert_eq!(state.height, Some(200));
    }

    #[tokio::test]
    async fn get_account_state_field_returns_raw_value() {
        let client = spawn_node(account_state_node("12")).await;

        let balance = client
            .get_account_state_field(ADDRESS, AccountField::Balance)
            .await
            .unwrap();
        assert_eq!(balance, "1500000000000000000");

        let account_type = client
            .get_account_state_field(ADDRESS, AccountField::Type)
            .await
            .unwrap();
        assert_eq!(account_type, "87");
    }

    #[tokio::test]
    async fn remote_error_is_passed_through() {
        let client = spawn_node(account_state_node("12")).await;

        let err = client.get_account_state("bogus").await.unwrap_err();
        assert_eq!(err.remote_message(), Some("address: invalid address format"));
    }

    #[tokio::test]
    async fn malformed_nonce_fails_at_decode() {
        let client = spawn_node(account_state_node("twelve")).await;

        let err = client.get_account_state(ADDRESS).await.unwrap_err();
        assert!(matches!(err, NebClientError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn non_json_failure_reports_status() {
        let app = Router::new().route(
            NEB_STATE_PATH,
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
        );
        let client = spawn_node(app).await;

        match client.get_chain_state().await.unwrap_err() {
            NebClientError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn chain_state_and_fields() {
        let app = Router::new().route(
            NEB_STATE_PATH,
            get(|| async {
                Json(json!({
                    "result": {
                        "chain_id": 1001,
                        "tail": "b10c1203d5ae6d4d069d5f520eb060f2f5fb74e942f391e7cadbc2b5148dfbcb",
                        "lib": "da30b4ed14affb62b3719fb5e6952d3733e84e53fe6e955f8e46da503300c985",
                        "height": "365",
                        "protocol_version": "/neb/1.0.0",
                        "synchronized": false,
                        "version": "1.1.0"
                    }
                }))
            }),
        );
        let client = spawn_node(app).await;

        let state = client.get_chain_state().await.unwrap();
        assert_eq!(state.height, 365);
        assert_eq!(LedgerRpc::chain_state(&client).await.unwrap(), state);
        assert_eq!(client.get_chain_id().await.unwrap(), 1001);

        let chain_id = client
            .get_chain_state_field(ChainStateField::ChainId)
            .await
            .unwrap();
        assert_eq!(chain_id, json!(1001));

        let synchronized = client
            .get_chain_state_field(ChainStateField::Synchronized)
            .await
            .unwrap();
        assert_eq!(synchronized, json!(false));
    }

    #[tokio::test]
    async fn gas_price_is_parsed_as_amount() {
        let app = Router::new().route(
            GAS_PRICE_PATH,
            get(|| async { Json(json!({ "result": { "gas_price": "20000000000" } })) }),
        );
        let client = spawn_node(app).await;

        assert_eq!(
            client.get_gas_price().await.unwrap(),
            Amount::from(20_000_000_000u64)
        );
    }

    #[tokio::test]
    async fn raw_transaction_bytes_are_base64_encoded() {
        let app = Router::new().route(
            RAW_TRANSACTION_PATH,
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "result": {
                        "txhash": format!("hash-of-{}", body["data"].as_str().unwrap_or_default()),
                        "contract_address": ""
                    }
                }))
            }),
        );
        let client = spawn_node(app).await;

        assert_eq!(
            client.send_raw_transaction("CiCrHtxyyIJks").await.unwrap(),
            "hash-of-CiCrHtxyyIJks"
        );
        assert_eq!(
            client.send_raw_transaction_bytes(&[1, 2, 3]).await.unwrap(),
            "hash-of-AQID"
        );
    }

    #[tokio::test]
    async fn get_block_by_height_and_hash() {
        let app = Router::new()
            .route(
                BLOCK_BY_HEIGHT_PATH,
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["full_fill_transaction"], true);
                    let height = body["height"].as_u64().unwrap_or_default();
                    Json(json!({ "result": block(height, "by-height") }))
                }),
            )
            .route(
                BLOCK_BY_HASH_PATH,
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["full_fill_transaction"], true);
                    let hash = body["hash"].as_str().unwrap_or_default().to_string();
                    Json(json!({ "result": block(42, &hash) }))
                }),
            );
        let client = spawn_node(app).await;

        let by_height = client.get_block(&BlockId::Height(8989)).await.unwrap();
        assert_eq!(by_height.height, 8989);
        assert_eq!(by_height.hash, "by-height");
        assert_eq!(by_height.transactions.len(), 1);

        let by_hash = client
            .get_block(&BlockId::Hash("95480cc6".to_string()))
            .await
            .unwrap();
        assert_eq!(by_hash.hash, "95480cc6");
        assert_eq!(by_hash.height, 42);
    }

    #[tokio::test]
    async fn transaction_receipt_lookup() {
        let app = Router::new().route(
            TRANSACTION_RECEIPT_PATH,
            post(|Json(body): Json<Value>| async move {
                if body["hash"] == TX_HASH {
                    (StatusCode::OK, Json(json!({ "result": receipt(1) })))
                } else {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "transaction not found" })),
                    )
                }
            }),
        );
        let client = spawn_node(app).await;

        let receipt = client.get_transaction_receipt(TX_HASH).await.unwrap();
        assert_eq!(receipt.status, TxStatus::Success);
        assert_eq!(receipt.block_height, Some(8989));

        let err = client.get_transaction_receipt("missing").await.unwrap_err();
        assert_eq!(err.remote_message(), Some("transaction not found"));
    }

    #[tokio::test]
    async fn estimate_gas_sends_node_field_names() {
        let app = Router::new().route(
            ESTIMATE_GAS_PATH,
            post(|Json(body): Json<Value>| async move {
                let expected = json!({
                    "from": ADDRESS,
                    "to": "n1orSeSMj7nn8KHHN4JcQEw3r52TVExu63r",
                    "value": "1000000000000000000",
                    "nonce": 8,
                    "gasPrice": "1000000",
                    "gasLimit": "200000"
                });
                if body == expected {
                    Json(json!({ "result": { "gas": "20000", "err": "" } }))
                } else {
                    Json(json!({ "error": format!("unexpected body {body}") }))
                }
            }),
        );
        let client = spawn_node(app).await;

        let request = EstimateGasRequest {
            from: ADDRESS.to_string(),
            to: "n1orSeSMj7nn8KHHN4JcQEw3r52TVExu63r".to_string(),
            value: Amount::from(1_000_000_000_000_000_000u64),
            nonce: 8,
            gas_price: Amount::from(1_000_000u64),
            gas_limit: 200_000,
        };
        let estimate = client.estimate_gas(&request).await.unwrap();
        assert_eq!(estimate.gas, 20000);
        assert_eq!(estimate.execution_error(), None);
    }

    #[tokio::test]
    async fn next_nonce_reconciles_with_chain() {
        let client = spawn_node(account_state_node("5")).await;

        assert_eq!(client.next_nonce(ADDRESS, 3).await.unwrap(), 6);
        assert_eq!(client.next_nonce(ADDRESS, 5).await.unwrap(), 6);
        assert_eq!(client.next_nonce(ADDRESS, 9).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn missing_result_is_invalid_response() {
        let app = Router::new().route(GAS_PRICE_PATH, get(|| async { Json(json!({})) }));
        let client = spawn_node(app).await;

        assert!(matches!(
            client.get_gas_price().await,
            Err(NebClientError::InvalidResponse(_))
        ));
    }
}
