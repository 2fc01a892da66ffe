use crate::recipients::ValidationError;
use thiserror::Error;

/// Error types for the Batch Sender SDK
#[derive(Error, Debug)]
pub enum Error {
    #[error("Wallet session is not connected")]
    NotConnected,

    #[error("Unsupported network (chain id {chain_id:#x}); switch to Base")]
    WrongNetwork { chain_id: u64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Recipient index {index} out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("A batch is already being submitted")]
    BatchInProgress,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Address parsing error: {0}")]
    Address(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

/// A transfer request the session refused or failed to acknowledge.
///
/// `index` is the position of the entry in the submitted list.
#[derive(Error, Debug)]
#[error("Transfer {index} failed: {cause}")]
pub struct TransferSubmissionError {
    pub index: usize,
    #[source]
    pub cause: Error,
}

/// Service fee failures. Both are non-fatal to a batch.
#[derive(Error, Debug)]
pub enum FeeError {
    #[error("Gas price quote failed: {0}")]
    Quote(#[source] Error),

    #[error("Fee transfer failed: {0}")]
    Submission(#[source] Error),
}
