//! Custos demo — walks the full custody workflow against an in-memory ledger.
//!
//! Funds the wallet, submits a transfer request from a non-signer, collects
//! approvals until the quorum executes the transfer, then verifies the
//! final balances.

use anyhow::{bail, Context};
use clap::Parser;
use std::sync::{Arc, Mutex};
use tracing::info;

use custos_ledger::{InMemoryLedger, TokenLedger};
use custos_types::{AccountId, TokenAmount};
use custos_wallet::{ApprovalOutcome, AuthorizationWallet, SharedWallet, WalletEvent};

#[derive(Parser)]
#[command(name = "custos-demo", about = "Custos quorum-approval workflow demo")]
struct Cli {
    /// Signer account identifiers (comma-separated).
    #[arg(
        long,
        env = "CUSTOS_SIGNERS",
        value_delimiter = ',',
        default_value = "signer1,signer2,signer3"
    )]
    signers: Vec<String>,

    /// Distinct approvals required to execute a transfer.
    #[arg(long, env = "CUSTOS_THRESHOLD", default_value_t = 2)]
    threshold: usize,

    /// Amount minted to the treasury and transferred to the wallet up front.
    #[arg(long, env = "CUSTOS_FUND", default_value_t = 1000)]
    fund: u128,

    /// Amount the requestor asks the wallet to release.
    #[arg(long, env = "CUSTOS_AMOUNT", default_value_t = 100)]
    amount: u128,

    /// Recipient account identifier.
    #[arg(long, env = "CUSTOS_RECIPIENT", default_value = "recipient")]
    recipient: String,

    /// Requestor account identifier (need not be a signer).
    #[arg(long, env = "CUSTOS_REQUESTOR", default_value = "requestor")]
    requestor: String,

    /// Print the captured wallet events as JSON at the end.
    #[arg(long, env = "CUSTOS_JSON_EVENTS")]
    json_events: bool,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let treasury = AccountId::new("treasury");
    let wallet_account = AccountId::new("custody-wallet");
    let recipient = AccountId::new(cli.recipient);
    let requestor = AccountId::new(cli.requestor);
    let signers: Vec<AccountId> = cli.signers.iter().map(AccountId::new).collect();

    println!("Accounts:");
    println!("  wallet:    {wallet_account}");
    println!("  recipient: {recipient}");
    println!("  requestor: {requestor}");
    for signer in &signers {
        println!("  signer:    {signer}");
    }
    println!("---------------------------------");

    // Fund the wallet by an ordinary ledger transfer to its account.
    let mut ledger = InMemoryLedger::new();
    ledger.mint(&treasury, TokenAmount::new(cli.fund));
    ledger
        .transfer(&treasury, &wallet_account, TokenAmount::new(cli.fund))
        .context("funding the custody wallet")?;
    println!("Wallet funded with {} tokens", cli.fund);

    let wallet = AuthorizationWallet::new(
        wallet_account.clone(),
        ledger,
        signers.clone(),
        cli.threshold,
    )
    .context("constructing the authorization wallet")?;
    let shared = SharedWallet::new(wallet);

    let events: Arc<Mutex<Vec<WalletEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    shared.subscribe(Box::new(move |event| {
        sink.lock().unwrap().push(event.clone());
    }));

    // A non-signer proposes the transfer; the id comes back directly.
    let transfer_id = shared
        .request_transfer(&requestor, &recipient, TokenAmount::new(cli.amount))
        .context("submitting the transfer request")?;
    println!(
        "{requestor} requested {} tokens for {recipient}: {transfer_id}",
        cli.amount
    );
    println!("---------------------------------");

    // Approve until the quorum fires.
    for signer in &signers {
        info!(signer = %signer, %transfer_id, "approving");
        let outcome = shared
            .approve_transfer(signer, transfer_id)
            .with_context(|| format!("approval by {signer}"))?;
        match outcome {
            ApprovalOutcome::Pending { approvals } => {
                println!(
                    "{signer} approved ({approvals}/{} needed); transfer not yet executed",
                    cli.threshold
                );
                let balance =
                    shared.with_wallet(|w| w.ledger().balance_of(&recipient));
                println!("  recipient balance still {balance}");
            }
            ApprovalOutcome::Executed => {
                println!("{signer} approved; quorum reached, transfer executed");
                break;
            }
        }
    }
    println!("---------------------------------");

    let wallet_balance = shared.with_wallet(|w| w.ledger().balance_of(&wallet_account));
    let recipient_balance = shared.with_wallet(|w| w.ledger().balance_of(&recipient));
    println!("Final wallet balance:    {wallet_balance}");
    println!("Final recipient balance: {recipient_balance}");

    if cli.json_events {
        let events = events.lock().unwrap();
        println!("{}", serde_json::to_string_pretty(&*events)?);
    }

    if recipient_balance != TokenAmount::new(cli.amount) {
        bail!("recipient balance does not match the requested amount");
    }
    println!("Workflow demonstration successful");
    Ok(())
}
