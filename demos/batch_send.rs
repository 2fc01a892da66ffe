//! Batch send example: validate a list, quote the fee, then submit
//! everything through a JSON-RPC endpoint that manages the sending account.
use batch_sender_sdk::client::{RpcClient, RpcSession};
use batch_sender_sdk::fees::quote_fee;
use batch_sender_sdk::orchestrator::BatchOrchestrator;
use batch_sender_sdk::progress::ChannelReporter;
use batch_sender_sdk::recipients::{RecipientEntry, RecipientList};
use batch_sender_sdk::records::{export_recipients, DEFAULT_EXPORT_FILE};
use batch_sender_sdk::{Result, WalletSession};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let client = RpcClient::with_auth(
        "http://localhost:8545",
        "rpcuser".to_string(),
        "rpcpassword".to_string(),
    );
    let session = RpcSession::connect(client, None).await?;
    if let Some(context) = session.context() {
        println!("✓ Connected to {} as {}", context.network_name(), context.account);
    }

    let list = RecipientList::from_entries(vec![
        RecipientEntry::new("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", "0.01"),
        RecipientEntry::new("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359", "0.025"),
        RecipientEntry::new("0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB", "0.0005"),
    ]);
    println!("Total to send: {}", list.total());

    match quote_fee(&session, list.len()).await {
        Ok(quote) => println!("Service fee: {} ETH", quote.total.format_ether(6)),
        Err(e) => println!("⚠ Fee not available, batch will skip it: {}", e),
    }

    let (reporter, mut events) = ChannelReporter::new();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("  {}", event);
        }
    });

    let orchestrator = BatchOrchestrator::with_reporter(Arc::new(reporter));
    let outcome = orchestrator.submit(&list, &session).await?;
    drop(orchestrator);
    if let Err(e) = printer.await {
        tracing::warn!("Progress printer stopped: {}", e);
    }

    for transfer in &outcome.transfers {
        if let Some(hash) = transfer.tx_hash() {
            println!("✓ {} -> {}", transfer.intent.address, hash);
        }
    }
    println!("{}", outcome.summary());

    if !outcome.is_success() {
        println!("Save these to {} and retry:", DEFAULT_EXPORT_FILE);
        println!("{}", export_recipients(&outcome.remaining()));
    }

    Ok(())
}
