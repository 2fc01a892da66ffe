//! Batch CLI - Command-line interface for the Batch Sender SDK
//!
//! Checks recipient files, quotes the service fee, and sends batches of
//! native transfers through a JSON-RPC endpoint that manages the sending
//! account.

use anyhow::{bail, Context};
use batch_sender_sdk::client::{RpcClient, RpcSession};
use batch_sender_sdk::config::Settings;
use batch_sender_sdk::orchestrator::{BatchOrchestrator, FeeOutcome};
use batch_sender_sdk::progress::{ProgressEvent, ProgressReporter, TracingReporter};
use batch_sender_sdk::recipients::RecipientList;
use batch_sender_sdk::records::read_recipients_file;
use batch_sender_sdk::types::{network_name, Network};
use batch_sender_sdk::{address::parse_address, fees::quote_fee, WalletSession};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "batch-cli")]
#[command(about = "Send ETH to many addresses on Base in one batch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a recipients file and show the total
    Check {
        /// Recipients file (address,amount per line)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Quote the service fee for a number of transfers
    Fee {
        /// Number of transfers
        #[arg(short = 'n', long)]
        count: usize,
        #[command(flatten)]
        rpc: RpcArgs,
    },
    /// Send a batch
    Send {
        /// Recipients file (address,amount per line)
        #[arg(short, long)]
        file: PathBuf,
        /// Account to send from (defaults to the endpoint's first account)
        #[arg(long)]
        from: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        rpc: RpcArgs,
    },
    /// List accepted networks
    Networks,
}

#[derive(clap::Args)]
struct RpcArgs {
    /// RPC endpoint URL
    #[arg(short, long)]
    rpc_url: Option<String>,
    /// RPC username
    #[arg(long)]
    rpc_user: Option<String>,
    /// RPC password
    #[arg(long)]
    rpc_password: Option<String>,
}

impl RpcArgs {
    fn client(&self, settings: &Settings) -> anyhow::Result<RpcClient> {
        let url = self
            .rpc_url
            .clone()
            .or_else(|| settings.rpc_url.clone())
            .context("No RPC endpoint: pass --rpc-url or set rpc_url in the settings file")?;

        let credentials = match (&self.rpc_user, &self.rpc_password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => settings.credentials(),
        };

        Ok(match credentials {
            Some((user, pass)) => RpcClient::with_auth(url, user, pass),
            None => {
                println!("Warning: No RPC credentials provided. Using unauthenticated connection.");
                RpcClient::new(url)
            }
        })
    }
}

/// Prints user-facing status lines and mirrors them to `tracing`
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: &ProgressEvent) {
        if event.is_error() {
            eprintln!("✗ {}", event);
        } else if !matches!(event, ProgressEvent::TransferSubmitted { .. }) {
            println!("{}", event);
        }
        TracingReporter.report(event);
    }
}

fn load_recipients(file: &Path) -> anyhow::Result<RecipientList> {
    let entries = read_recipients_file(file)
        .with_context(|| format!("Failed to read recipients from {}", file.display()))?;
    if entries.is_empty() {
        bail!("No recipients found in {}", file.display());
    }
    println!("Imported {} recipients", entries.len());
    Ok(RecipientList::from_entries(entries))
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { settings.log_filter.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Check { file } => {
            let list = load_recipients(file)?;
            match list.validate() {
                Ok(intents) => {
                    println!("✓ All {} recipients are valid", intents.len());
                    println!("Total: {} ETH", list.total().format_ether(6));
                }
                Err(e) => {
                    eprintln!("✗ {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Fee { count, rpc } => {
            let client = rpc.client(&settings)?;
            let session = RpcSession::connect(client, None).await?;
            let quote = quote_fee(&session, *count).await?;
            println!("Gas price: {} wei", quote.gas_price.wei());
            println!(
                "Service fee for {} transfers: {} ETH",
                quote.transfer_count,
                quote.total.format_ether(6)
            );
        }
        Commands::Send { file, from, yes, rpc } => {
            let list = load_recipients(file)?;
            let from = from
                .as_deref()
                .map(parse_address)
                .transpose()?
                .or(settings.from_address()?);

            let client = rpc.client(&settings)?;
            let session = RpcSession::connect(client, from).await?;
            let context = session.context().ok_or(batch_sender_sdk::Error::NotConnected)?;

            println!("From: {}", context.account.to_checksum(None));
            println!("Network: {} ({:#x})", network_name(context.chain_id), context.chain_id);
            println!("Recipients: {}", list.len());
            println!("Total: {} ETH", list.total().format_ether(6));

            if !*yes && !confirm("Send this batch?")? {
                println!("Aborted");
                return Ok(());
            }

            let orchestrator = BatchOrchestrator::with_reporter(Arc::new(ConsoleReporter));
            let cancel = orchestrator.cancel_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Stopping after the current transfer...");
                    cancel.cancel();
                }
            });

            let outcome = orchestrator.submit(&list, &session).await?;

            println!();
            for transfer in &outcome.transfers {
                match &transfer.result {
                    Ok(hash) => println!(
                        "✓ {} {} ETH  {}",
                        transfer.intent.address.to_checksum(None),
                        transfer.intent.amount.to_ether_string(),
                        hash
                    ),
                    Err(e) => println!("✗ {}: {}", transfer.intent.address.to_checksum(None), e),
                }
            }
            if let FeeOutcome::Failed { error, .. } | FeeOutcome::Skipped { error } = &outcome.fee {
                println!("⚠ {}", error);
            }
            println!("{}", outcome.summary());

            if !outcome.is_success() {
                let remaining = outcome.remaining();
                eprintln!("{} recipients were not sent:", remaining.len());
                eprintln!("{}", batch_sender_sdk::records::export_recipients(&remaining));
                std::process::exit(1);
            }
        }
        Commands::Networks => {
            for network in Network::ALL {
                let kind = if network.is_testnet() { "testnet" } else { "mainnet" };
                println!("{:<14} {:#x} ({})", network.name(), network.chain_id(), kind);
            }
        }
    }

    Ok(())
}
