//! # Batch Sender SDK
//!
//! A Rust SDK for sending native ETH to many recipients in one workflow on
//! Base, with a flat service fee sent to a fixed collector account.
//!
//! This SDK provides:
//! - Recipient list editing, validation and exact totals
//! - Service fee calculation (gas price × 21000 × transfer count)
//! - A batch orchestrator that submits transfers one by one through a wallet
//!   session and reports per-transfer results
//! - A JSON-RPC wallet session for nodes or signers that manage the sending account
//! - Two-column recipient import/export
//!
//! ## Features
//!
//! - **Exact amounts**: amounts are `U256` wei; decimal input is parsed
//!   exactly and never goes through floating point
//! - **Partial completion**: a failed transfer stops the batch and the outcome
//!   says which transfers went through
//! - **Non-fatal fees**: a missing gas price or failed fee transfer never fails
//!   the batch
//!
//! ## Example
//!
//! ```no_run
//! use batch_sender_sdk::client::{RpcClient, RpcSession};
//! use batch_sender_sdk::orchestrator::BatchOrchestrator;
//! use batch_sender_sdk::recipients::{RecipientEntry, RecipientList};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = RpcSession::connect(RpcClient::new("http://localhost:8545"), None).await?;
//!
//! let list = RecipientList::from_entries(vec![
//!     RecipientEntry::new("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", "0.1"),
//!     RecipientEntry::new("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359", "0.25"),
//! ]);
//!
//! let outcome = BatchOrchestrator::new().submit(&list, &session).await?;
//! println!("{}", outcome.summary());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod fees;
pub mod orchestrator;
pub mod progress;
pub mod records;
pub mod recipients;
pub mod rpc;
pub mod session;
pub mod types;

pub use error::{Error, Result};

/// Re-export commonly used types
pub use types::*;

/// Re-export utility functions
pub use types::utils;

/// Re-export fee calculation functions
pub use fees::{compute_fee, quote_fee, FeeQuote};

/// Re-export the batch API
pub use orchestrator::{BatchOrchestrator, BatchOutcome, BatchState, BatchStatus, FeeOutcome};
pub use recipients::{RecipientEntry, RecipientField, RecipientList, TransferIntent};
pub use session::{SessionContext, WalletSession};

/// Re-export import/export helpers
pub use records::*;
