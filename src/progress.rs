//! Progress events emitted while a batch runs
//!
//! The orchestrator reports every step to a [`ProgressReporter`]. Reporters
//! must not block: they are called inline between submissions.

use crate::types::{utils::short_address, Amount};
use alloy_primitives::{Address, TxHash};
use std::fmt;
use tokio::sync::mpsc;

/// One step of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Validating,
    Aborted { reason: String },
    /// Emitted before each transfer is handed to the session
    TransferStarted {
        index: usize,
        total: usize,
        to: Address,
        amount: Amount,
    },
    TransferSubmitted {
        index: usize,
        total: usize,
        tx_hash: TxHash,
    },
    TransferFailed {
        index: usize,
        total: usize,
        cause: String,
    },
    Cancelled { index: usize, total: usize },
    FeeStarted,
    FeeSubmitted { amount: Amount, tx_hash: TxHash },
    FeeSkipped { cause: String },
    Completed { succeeded: usize, total: usize },
}

impl ProgressEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Aborted { .. } | ProgressEvent::TransferFailed { .. }
        )
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Validating => write!(f, "Preparing transactions..."),
            ProgressEvent::Aborted { reason } => write!(f, "{}", reason),
            ProgressEvent::TransferStarted { index, total, to, .. } => {
                write!(f, "Sending to {}/{} ({})...", index + 1, total, short_address(to))
            }
            ProgressEvent::TransferSubmitted { index, total, tx_hash } => {
                write!(f, "Transfer {}/{} submitted: {}", index + 1, total, tx_hash)
            }
            ProgressEvent::TransferFailed { index, total, cause } => {
                write!(f, "Transfer {}/{} failed: {}", index + 1, total, cause)
            }
            ProgressEvent::Cancelled { index, total } => {
                write!(f, "Cancelled before transfer {}/{}", index + 1, total)
            }
            ProgressEvent::FeeStarted => write!(f, "Processing service fee..."),
            ProgressEvent::FeeSubmitted { amount, .. } => {
                write!(f, "Service fee: {} ETH", amount.format_ether(6))
            }
            ProgressEvent::FeeSkipped { cause } => {
                write!(f, "Service fee not collected: {}", cause)
            }
            ProgressEvent::Completed { succeeded, total } if succeeded == total => {
                write!(f, "All transactions sent! ({}/{})", succeeded, total)
            }
            ProgressEvent::Completed { succeeded, total } => {
                write!(f, "Batch stopped after {}/{} transfers", succeeded, total)
            }
        }
    }
}

/// Sink for progress events
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Aborted { .. } | ProgressEvent::TransferFailed { .. } => {
                tracing::error!("{}", event)
            }
            ProgressEvent::FeeSkipped { .. } | ProgressEvent::Cancelled { .. } => {
                tracing::warn!("{}", event)
            }
            ProgressEvent::TransferSubmitted { .. } => tracing::debug!("{}", event),
            _ => tracing::info!("{}", event),
        }
    }
}

/// Sends events over an unbounded channel to a presentation task
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: &ProgressEvent) {
        // receiver gone: nobody is listening any more
        let _ = self.tx.send(event.clone());
    }
}
