//! Batch submission
//!
//! [`BatchOrchestrator::submit`] turns a [`RecipientList`] into one native
//! transfer per entry followed by one service fee transfer, strictly in list
//! order and strictly one at a time:
//!
//! ```text
//! Idle -> Validating -> SubmittingTransfers -> SubmittingFee -> Completed
//!             |                                     |
//!             v                                     v
//!          Aborted                              FeeSkipped -> Completed
//! ```
//!
//! A failed transfer stops the batch. Transfers already submitted stay
//! submitted; the outcome lists them so the caller can retry the rest with
//! [`BatchOutcome::remaining`]. Fee failures never fail the batch.

use crate::error::{Error, FeeError, Result, TransferSubmissionError};
use crate::fees::compute_fee;
use crate::progress::{ProgressEvent, ProgressReporter, TracingReporter};
use crate::recipients::{RecipientList, TransferIntent};
use crate::rpc::SendTransactionRequest;
use crate::session::{SessionContext, WalletSession};
use crate::types::{network_name, utils::short_address, Amount, Network, GAS_PER_TRANSFER, SERVICE_FEE_COLLECTOR};
use alloy_primitives::TxHash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Where the orchestrator is in a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Validating,
    SubmittingTransfers { index: usize, total: usize },
    SubmittingFee,
    FeeSkipped,
    Completed,
    Aborted,
}

impl BatchState {
    /// True while a `submit` call is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            BatchState::Validating | BatchState::SubmittingTransfers { .. } | BatchState::SubmittingFee
        )
    }
}

/// Result of one attempted transfer
#[derive(Debug)]
pub struct TransferResult {
    pub intent: TransferIntent,
    pub result: std::result::Result<TxHash, TransferSubmissionError>,
}

impl TransferResult {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.result.as_ref().ok().copied()
    }
}

/// What happened to the service fee
#[derive(Debug)]
pub enum FeeOutcome {
    Collected { amount: Amount, tx_hash: TxHash },
    /// The fee was priced but its transfer failed
    Failed { amount: Amount, error: FeeError },
    /// No gas price was available, so no fee transfer was made
    Skipped { error: FeeError },
    /// Transfers did not all succeed; the fee step never ran
    NotAttempted,
}

impl FeeOutcome {
    pub fn is_collected(&self) -> bool {
        matches!(self, FeeOutcome::Collected { .. })
    }
}

/// How the transfer phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    TransferFailed { index: usize },
    Cancelled { index: usize },
}

/// Terminal record of one `submit` call
#[derive(Debug)]
pub struct BatchOutcome {
    pub context: SessionContext,
    pub status: BatchStatus,
    /// One entry per attempted transfer, in submission order
    pub transfers: Vec<TransferResult>,
    pub fee: FeeOutcome,
    intents: Vec<TransferIntent>,
}

impl BatchOutcome {
    /// Every transfer was submitted. Fee problems do not affect this.
    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Completed
    }

    pub fn succeeded(&self) -> usize {
        self.transfers.iter().filter(|t| t.is_ok()).count()
    }

    pub fn total(&self) -> usize {
        self.intents.len()
    }

    /// Entries that were not successfully submitted, in their original order
    pub fn remaining(&self) -> RecipientList {
        RecipientList::from(self.intents[self.succeeded()..].to_vec())
    }

    /// One-line status for display
    pub fn summary(&self) -> String {
        match (&self.status, &self.fee) {
            (BatchStatus::Completed, FeeOutcome::Collected { amount, .. }) => format!(
                "All transactions sent! Service fee: {} ETH",
                amount.format_ether(6)
            ),
            (BatchStatus::Completed, _) => "All transactions sent successfully!".to_string(),
            (BatchStatus::TransferFailed { index }, _) => format!(
                "Transfer {} of {} failed; {} sent before it",
                index + 1,
                self.total(),
                self.succeeded()
            ),
            (BatchStatus::Cancelled { index }, _) => format!(
                "Cancelled after {} of {} transfers",
                index,
                self.total()
            ),
        }
    }
}

/// Stops a running batch before its next transfer
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Held for the duration of one `submit` call.
///
/// A future dropped mid-run leaves the state busy; the guard puts it back to
/// `Idle`. Terminal states set by a finished run are left alone.
struct RunGuard<'a> {
    state: &'a Mutex<BatchState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_busy() {
            tracing::warn!("Batch abandoned in state {:?}; no further transfers will be sent", *state);
            *state = BatchState::Idle;
        }
    }
}

/// Drives batch submissions against a [`WalletSession`].
///
/// One orchestrator runs one batch at a time; a second `submit` while the
/// first is in flight fails with [`Error::BatchInProgress`].
pub struct BatchOrchestrator {
    reporter: Arc<dyn ProgressReporter>,
    state: Mutex<BatchState>,
    cancel: CancelHandle,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOrchestrator {
    /// Create an orchestrator that reports progress through `tracing`
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    pub fn with_reporter(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            state: Mutex::new(BatchState::Idle),
            cancel: CancelHandle::default(),
        }
    }

    pub fn state(&self) -> BatchState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle for stopping the current batch from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Validate `list` and the session, then submit every transfer and the service fee.
    ///
    /// # Returns
    /// * `Err` when nothing was submitted: session not connected, wrong
    ///   network, an invalid entry, or another batch still running.
    /// * `Ok(BatchOutcome)` once submission started, including partial runs.
    pub async fn submit<S>(&self, list: &RecipientList, session: &S) -> Result<BatchOutcome>
    where
        S: WalletSession + ?Sized,
    {
        let _run = self.begin()?;
        self.cancel.reset();
        self.emit(ProgressEvent::Validating);

        let (context, intents) = match Self::validate(list, session) {
            Ok(validated) => validated,
            Err(e) => {
                tracing::warn!("Batch aborted: {}", e);
                self.set_state(BatchState::Aborted);
                self.emit(ProgressEvent::Aborted {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        tracing::info!(
            "Submitting {} transfers totalling {} from {} on {}",
            intents.len(),
            intents.iter().map(|i| i.amount).sum::<Amount>(),
            short_address(&context.account),
            network_name(context.chain_id)
        );

        let (status, transfers) = self.submit_transfers(&context, &intents, session).await;

        let fee = if status == BatchStatus::Completed {
            self.collect_fee(&context, intents.len(), session).await
        } else {
            FeeOutcome::NotAttempted
        };

        let outcome = BatchOutcome {
            context,
            status,
            transfers,
            fee,
            intents,
        };

        self.set_state(BatchState::Completed);
        self.emit(ProgressEvent::Completed {
            succeeded: outcome.succeeded(),
            total: outcome.total(),
        });
        tracing::info!("{}", outcome.summary());

        Ok(outcome)
    }

    fn begin(&self) -> Result<RunGuard<'_>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_busy() {
            return Err(Error::BatchInProgress);
        }
        *state = BatchState::Validating;
        Ok(RunGuard { state: &self.state })
    }

    fn validate<S>(list: &RecipientList, session: &S) -> Result<(SessionContext, Vec<TransferIntent>)>
    where
        S: WalletSession + ?Sized,
    {
        let context = session.context().ok_or(Error::NotConnected)?;
        if Network::from_chain_id(context.chain_id).is_none() {
            return Err(Error::WrongNetwork {
                chain_id: context.chain_id,
            });
        }
        let intents = list.validate()?;
        Ok((context, intents))
    }

    async fn submit_transfers<S>(
        &self,
        context: &SessionContext,
        intents: &[TransferIntent],
        session: &S,
    ) -> (BatchStatus, Vec<TransferResult>)
    where
        S: WalletSession + ?Sized,
    {
        let total = intents.len();
        let mut results = Vec::with_capacity(total);

        for (index, intent) in intents.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!("Batch cancelled before transfer {}/{}", index + 1, total);
                self.emit(ProgressEvent::Cancelled { index, total });
                return (BatchStatus::Cancelled { index }, results);
            }

            self.set_state(BatchState::SubmittingTransfers { index, total });
            self.emit(ProgressEvent::TransferStarted {
                index,
                total,
                to: intent.address,
                amount: intent.amount,
            });

            let request = SendTransactionRequest::transfer(context.account, intent.address, intent.amount);
            match session.send_transaction(request).await {
                Ok(tx_hash) => {
                    tracing::debug!(
                        "Transfer {}/{} to {} submitted: {}",
                        index + 1,
                        total,
                        short_address(&intent.address),
                        tx_hash
                    );
                    self.emit(ProgressEvent::TransferSubmitted { index, total, tx_hash });
                    results.push(TransferResult {
                        intent: *intent,
                        result: Ok(tx_hash),
                    });
                }
                Err(cause) => {
                    self.emit(ProgressEvent::TransferFailed {
                        index,
                        total,
                        cause: cause.to_string(),
                    });
                    results.push(TransferResult {
                        intent: *intent,
                        result: Err(TransferSubmissionError { index, cause }),
                    });
                    return (BatchStatus::TransferFailed { index }, results);
                }
            }
        }

        (BatchStatus::Completed, results)
    }

    async fn collect_fee<S>(&self, context: &SessionContext, transfer_count: usize, session: &S) -> FeeOutcome
    where
        S: WalletSession + ?Sized,
    {
        self.set_state(BatchState::SubmittingFee);
        self.emit(ProgressEvent::FeeStarted);

        let gas_price = match session.gas_price().await {
            Ok(price) => price,
            Err(e) => {
                self.set_state(BatchState::FeeSkipped);
                let error = FeeError::Quote(e);
                self.emit(ProgressEvent::FeeSkipped {
                    cause: error.to_string(),
                });
                return FeeOutcome::Skipped { error };
            }
        };

        let amount = compute_fee(gas_price, GAS_PER_TRANSFER, transfer_count);
        let request = SendTransactionRequest::transfer(context.account, SERVICE_FEE_COLLECTOR, amount);
        match session.send_transaction(request).await {
            Ok(tx_hash) => {
                self.emit(ProgressEvent::FeeSubmitted { amount, tx_hash });
                FeeOutcome::Collected { amount, tx_hash }
            }
            Err(e) => {
                self.set_state(BatchState::FeeSkipped);
                let error = FeeError::Submission(e);
                self.emit(ProgressEvent::FeeSkipped {
                    cause: error.to_string(),
                });
                FeeOutcome::Failed { amount, error }
            }
        }
    }

    fn set_state(&self, next: BatchState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        tracing::trace!("Batch state {:?} -> {:?}", *state, next);
        *state = next;
    }

    fn emit(&self, event: ProgressEvent) {
        self.reporter.report(&event);
    }
}
