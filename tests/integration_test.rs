//! Integration tests for the Batch Sender SDK

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use batch_sender_sdk::progress::{ChannelReporter, ProgressEvent};
use batch_sender_sdk::records::{export_recipients, import_recipients};
use batch_sender_sdk::rpc::SendTransactionRequest;
use batch_sender_sdk::{
    Amount, BatchOrchestrator, BatchStatus, Error, FeeOutcome, RecipientList, SessionContext,
    WalletSession, BASE_SEPOLIA_CHAIN_ID, SERVICE_FEE_COLLECTOR,
};
use std::sync::{Arc, Mutex};

const RECIPIENTS_CSV: &str = "\
0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed, 0.1
0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359, 0.000000000000000001

0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB, 12.345678901234567891
";

/// In-memory wallet that records requests and can fail on a given call
struct ScriptedSession {
    account: Address,
    chain_id: u64,
    gas_price: Option<Amount>,
    fail_on_call: Option<usize>,
    sent: Mutex<Vec<SendTransactionRequest>>,
}

impl ScriptedSession {
    fn new() -> Self {
        Self {
            account: Address::repeat_byte(0x42),
            chain_id: BASE_SEPOLIA_CHAIN_ID,
            gas_price: Some(Amount::from(1_500_000_000u64)),
            fail_on_call: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<SendTransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSession for ScriptedSession {
    fn context(&self) -> Option<SessionContext> {
        Some(SessionContext {
            chain_id: self.chain_id,
            account: self.account,
        })
    }

    async fn send_transaction(&self, request: SendTransactionRequest) -> batch_sender_sdk::Result<TxHash> {
        let mut sent = self.sent.lock().unwrap();
        let call = sent.len() + 1;
        if self.fail_on_call == Some(call) {
            return Err(Error::Rpc("User rejected the request.".to_string()));
        }
        sent.push(request);
        Ok(TxHash::with_last_byte(call as u8))
    }

    async fn gas_price(&self) -> batch_sender_sdk::Result<Amount> {
        self.gas_price
            .ok_or_else(|| Error::Rpc("the method eth_gasPrice does not exist".to_string()))
    }
}

#[tokio::test]
async fn test_import_and_send_batch() {
    let list = RecipientList::from_entries(import_recipients(RECIPIENTS_CSV));
    assert_eq!(list.len(), 3);

    let session = ScriptedSession::new();
    let (reporter, mut events) = ChannelReporter::new();
    let orchestrator = BatchOrchestrator::with_reporter(Arc::new(reporter));

    let outcome = orchestrator.submit(&list, &session).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.succeeded(), 3);

    let sent = session.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|r| r.from == session.account));
    assert_eq!(sent[1].value, Amount::from(1u64).wei());
    assert_eq!(
        sent[2].value,
        Amount::parse_ether("12.345678901234567891").unwrap().wei()
    );
    assert_eq!(sent[3].to, SERVICE_FEE_COLLECTOR);
    assert_eq!(
        sent[3].value,
        Amount::from(1_500_000_000u64 * 21_000 * 3).wei()
    );
    assert!(outcome.fee.is_collected());
    assert_eq!(
        outcome.summary(),
        "All transactions sent! Service fee: 0.000094 ETH"
    );

    let mut progress = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ProgressEvent::TransferStarted { index, total, .. } = event {
            progress.push((index, total));
        }
    }
    assert_eq!(progress, vec![(0, 3), (1, 3), (2, 3)]);
}

#[tokio::test]
async fn test_partial_failure_then_retry_remaining() {
    let list = RecipientList::from_entries(import_recipients(RECIPIENTS_CSV));

    let mut session = ScriptedSession::new();
    session.fail_on_call = Some(2);
    let orchestrator = BatchOrchestrator::default();

    let outcome = orchestrator.submit(&list, &session).await.unwrap();
    assert_eq!(outcome.status, BatchStatus::TransferFailed { index: 1 });
    assert_eq!(outcome.succeeded(), 1);
    assert!(matches!(outcome.fee, FeeOutcome::NotAttempted));
    assert_eq!(session.sent().len(), 1);

    // caller-level retry with what is left
    let remaining = outcome.remaining();
    assert_eq!(remaining.len(), 2);

    let retry_session = ScriptedSession::new();
    let retry = orchestrator.submit(&remaining, &retry_session).await.unwrap();
    assert!(retry.is_success());
    let sent = retry_session.sent();
    assert_eq!(sent[0].value, Amount::from(1u64).wei());
    // fee covers only the retried transfers
    assert_eq!(sent[2].value, Amount::from(1_500_000_000u64 * 21_000 * 2).wei());
}

#[tokio::test]
async fn test_missing_gas_price_still_succeeds() {
    let list = RecipientList::from_entries(import_recipients(RECIPIENTS_CSV));
    let mut session = ScriptedSession::new();
    session.gas_price = None;

    let outcome = BatchOrchestrator::default().submit(&list, &session).await.unwrap();
    assert!(outcome.is_success());
    assert!(matches!(outcome.fee, FeeOutcome::Skipped { .. }));
    assert_eq!(session.sent().len(), 3);
}

#[tokio::test]
async fn test_wrong_network_sends_nothing() {
    let list = RecipientList::from_entries(import_recipients(RECIPIENTS_CSV));
    let mut session = ScriptedSession::new();
    session.chain_id = 1;

    let result = BatchOrchestrator::default().submit(&list, &session).await;
    assert!(matches!(result, Err(Error::WrongNetwork { chain_id: 1 })));
    assert!(session.sent().is_empty());
}

#[test]
fn test_export_import_round_trip() {
    let list = RecipientList::from_entries(import_recipients(RECIPIENTS_CSV));
    let again = RecipientList::from_entries(import_recipients(&export_recipients(&list)));
    assert_eq!(again, list);
    assert_eq!(again.total(), list.total());
}

#[test]
fn test_blocking_submit_of_blank_list_reports_first_entry() {
    let session = ScriptedSession::new();
    let result = tokio_test::block_on(BatchOrchestrator::default().submit(&RecipientList::new(), &session));
    match result {
        Err(Error::Validation(e)) => assert_eq!(e.index, 0),
        other => panic!("expected validation error, got {:?}", other.map(|o| o.status)),
    }
}
