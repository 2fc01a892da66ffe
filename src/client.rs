//! Client implementations for connecting to an Ethereum JSON-RPC endpoint
use crate::address::parse_address;
use crate::error::{Error, Result};
use crate::rpc::{
    parse_chain_id, GasPriceResponse, RpcRequest, RpcResponse, SendTransactionRequest,
    METHOD_ACCOUNTS, METHOD_CHAIN_ID, METHOD_GAS_PRICE, METHOD_SEND_TRANSACTION,
};
use crate::session::{SessionContext, SessionEvent, SessionState, WalletSession};
use crate::types::{network_name, utils::short_address, Amount};
use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use rand::random;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;

/// RPC client for a node or signer that manages the sending account.
///
/// `eth_sendTransaction` is signed by the remote side, so the endpoint must
/// hold (or proxy to) the key of the `from` account: a local dev node, a
/// signing proxy, or a wallet bridge.
#[derive(Clone)]
pub struct RpcClient {
    endpoint: String,
    http: reqwest::Client,
    auth: Option<String>,
}

impl RpcClient {
    /// Create a new RPC client without authentication.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            auth: None,
        }
    }

    /// Create a new RPC client with HTTP basic authentication.
    pub fn with_auth(endpoint: impl Into<String>, username: String, password: String) -> Self {
        use base64::Engine;
        let mut client = Self::new(endpoint);
        let credentials = format!("{}:{}", username, password);
        client.auth = Some(base64::engine::general_purpose::STANDARD.encode(credentials));
        client
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call a JSON-RPC method and deserialize the result into the requested type.
    ///
    /// This is the low-level method for making RPC calls. Prefer using the
    /// typed convenience methods when available.
    pub async fn call<T, P>(&self, method: &str, params: P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let params = serde_json::to_value(params)?;
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: random::<u64>(),
            method: method.to_string(),
            params,
        };

        let mut req = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .header("Content-Type", "application/json");

        if let Some(ref auth) = self.auth {
            req = req.header("Authorization", format!("Basic {}", auth));
        }

        let response = req.send().await?;

        if !response.status().is_success() {
            return Err(Error::Rpc(format!(
                "RPC request failed with status: {}",
                response.status()
            )));
        }

        let rpc_response: RpcResponse<T> = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(Error::Rpc(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| Error::Rpc("RPC response missing result".to_string()))
    }

    /// Chain id of the endpoint (`eth_chainId`).
    pub async fn chain_id(&self) -> Result<u64> {
        let raw: String = self.call(METHOD_CHAIN_ID, serde_json::json!([])).await?;
        parse_chain_id(&raw)
    }

    /// Accounts the endpoint can sign for (`eth_accounts`).
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        let raw: Vec<String> = self.call(METHOD_ACCOUNTS, serde_json::json!([])).await?;
        raw.iter().map(String::as_str).map(parse_address).collect()
    }

    /// Current gas price in wei (`eth_gasPrice`).
    pub async fn gas_price(&self) -> Result<Amount> {
        let price: GasPriceResponse = self.call(METHOD_GAS_PRICE, serde_json::json!([])).await?;
        Ok(price.into())
    }

    /// Submit a transaction for signing and broadcast (`eth_sendTransaction`).
    ///
    /// # Returns
    /// The transaction hash
    pub async fn send_transaction(&self, request: SendTransactionRequest) -> Result<TxHash> {
        self.call(METHOD_SEND_TRANSACTION, [request]).await
    }
}

/// A [`WalletSession`] backed by an [`RpcClient`]
pub struct RpcSession {
    client: RpcClient,
    state: RwLock<SessionState>,
}

impl RpcSession {
    /// Connect to the endpoint and pick the sending account.
    ///
    /// # Arguments
    /// * `client` - RPC client for the endpoint
    /// * `from` - Account to send from; must be one the endpoint manages.
    ///   Defaults to the first account.
    pub async fn connect(client: RpcClient, from: Option<Address>) -> Result<Self> {
        let chain_id = client.chain_id().await?;
        let accounts = client.accounts().await?;

        let account = match from {
            Some(from) if accounts.contains(&from) => from,
            Some(from) => {
                return Err(Error::InvalidParameter(format!(
                    "Account {} is not managed by {}",
                    from.to_checksum(None),
                    client.endpoint()
                )))
            }
            None => *accounts.first().ok_or(Error::NotConnected)?,
        };

        tracing::info!(
            "Connected to {} as {} on {}",
            client.endpoint(),
            short_address(&account),
            network_name(chain_id)
        );

        Ok(Self {
            client,
            state: RwLock::new(SessionState::connected(chain_id, account)),
        })
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    /// Apply a wallet notification to this session
    pub fn handle_event(&self, event: SessionEvent) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.apply(event);
    }

    /// Re-read the chain id from the endpoint
    pub async fn refresh_chain(&self) -> Result<u64> {
        let chain_id = self.client.chain_id().await?;
        self.handle_event(SessionEvent::ChainChanged(chain_id));
        Ok(chain_id)
    }
}

#[async_trait]
impl WalletSession for RpcSession {
    fn context(&self) -> Option<SessionContext> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).context()
    }

    async fn send_transaction(&self, request: SendTransactionRequest) -> Result<TxHash> {
        self.client.send_transaction(request).await
    }

    async fn gas_price(&self) -> Result<Amount> {
        self.client.gas_price().await
    }
}
