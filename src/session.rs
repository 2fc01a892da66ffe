//! Wallet session abstraction
//!
//! The orchestrator never talks to a wallet directly. It reads the connected
//! account and chain id from a [`WalletSession`] and asks it to submit
//! requests; the session owns signing, nonces and any timeouts.

use crate::error::Result;
use crate::rpc::SendTransactionRequest;
use crate::types::{network_name, Amount, Network};
use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;

/// The connected account and the chain it is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub chain_id: u64,
    pub account: Address,
}

impl SessionContext {
    pub fn network(&self) -> Option<Network> {
        Network::from_chain_id(self.chain_id)
    }

    pub fn network_name(&self) -> &'static str {
        network_name(self.chain_id)
    }
}

/// An authenticated, chain-aware channel that submits requests for one account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Current account and chain, or `None` when disconnected
    fn context(&self) -> Option<SessionContext>;

    /// Submit a native-value transfer and return its transaction hash
    async fn send_transaction(&self, request: SendTransactionRequest) -> Result<TxHash>;

    /// Current network gas price in wei per gas unit
    async fn gas_price(&self) -> Result<Amount>;
}

/// Notifications a wallet pushes to its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    Disconnected,
}

/// Tracks connection state as session events arrive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    chain_id: Option<u64>,
    account: Option<Address>,
}

impl SessionState {
    pub fn connected(chain_id: u64, account: Address) -> Self {
        Self {
            chain_id: Some(chain_id),
            account: Some(account),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn context(&self) -> Option<SessionContext> {
        Some(SessionContext {
            chain_id: self.chain_id?,
            account: self.account?,
        })
    }

    /// Apply a wallet event. An empty account list means the wallet disconnected.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(account) => self.account = Some(*account),
                None => self.disconnect(),
            },
            SessionEvent::ChainChanged(chain_id) => {
                tracing::info!("Chain changed to {} ({:#x})", network_name(chain_id), chain_id);
                self.chain_id = Some(chain_id);
            }
            SessionEvent::Disconnected => self.disconnect(),
        }
    }

    fn disconnect(&mut self) {
        tracing::info!("Wallet disconnected");
        self.chain_id = None;
        self.account = None;
    }
}
