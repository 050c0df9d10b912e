//! Pharos Auto Bot CLI
//!
//! Collects the daily task plan (flags first, interactive prompts for
//! anything omitted), loads wallets and proxies, probes the RPC node and
//! hands off to the scheduler.

use clap::Parser;
use pharos_auto_bot::chain::{ChainOps, PharosClient};
use pharos_auto_bot::config::Config;
use pharos_auto_bot::net::EgressPool;
use pharos_auto_bot::scheduler::{RpcConnector, Scheduler};
use pharos_auto_bot::tasks::{PlanInputs, TaskPlan};
use pharos_auto_bot::wallet::load_wallets;
use pharos_auto_bot::{Error, Result};
use std::io::Write;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pharos-bot")]
#[command(about = "Multi-wallet Pharos testnet automation bot")]
struct Cli {
    /// AquaFlux NFT mints per wallet
    #[arg(long)]
    mints: Option<String>,

    /// Four-leg swap cycles per wallet
    #[arg(long)]
    swaps: Option<String>,

    /// DVM liquidity deposits per wallet
    #[arg(long)]
    liquidity: Option<String>,

    /// X username receiving tips
    #[arg(long)]
    tip_to: Option<String>,

    /// Tips per wallet
    #[arg(long)]
    tips: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    println!("=== Pharos Auto Bot ===");

    let inputs = collect_inputs(&cli)?;
    let plan = TaskPlan::from_inputs(&inputs);
    if plan.is_empty() {
        // Malformed inputs disable features, never the run itself.
        tracing::warn!("no valid tasks configured; cycles will be idle");
    }

    let wallets = load_wallets();
    if wallets.is_empty() {
        return Err(Error::Config(
            "no wallets found; set PRIVATE_KEY_1, PRIVATE_KEY_2, ... in the environment".to_string(),
        ));
    }
    tracing::info!(count = wallets.len(), "wallets loaded");

    let pool = EgressPool::load();
    let config = Config::from_env();

    // Probe the node once before committing to the daily loop.
    let probe = PharosClient::connect(config.rpc.url(), &wallets[0])?;
    let block = ChainOps::new(probe, wallets[0].address())
        .check_connection()
        .await?;
    tracing::info!(block, rpc = config.rpc.url(), "connected to Pharos testnet");

    let connector = RpcConnector::new(config.rpc.url());
    let scheduler = Scheduler::new(connector, wallets, plan, pool);
    scheduler.run().await
}

/// Merge CLI flags with interactive prompts for anything omitted.
fn collect_inputs(cli: &Cli) -> Result<PlanInputs> {
    Ok(PlanInputs {
        mint_count: value_or_prompt(&cli.mints, "AquaFlux mints per wallet")?,
        swap_cycles: value_or_prompt(&cli.swaps, "Swap cycles per wallet")?,
        liquidity_count: value_or_prompt(&cli.liquidity, "Liquidity adds per wallet")?,
        tip_recipient: value_or_prompt(&cli.tip_to, "X username to tip")?,
        tip_count: value_or_prompt(&cli.tips, "Tips per wallet")?,
    })
}

fn value_or_prompt(flag: &Option<String>, label: &str) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value.clone());
    }
    print!("{label}: ");
    std::io::stdout()
        .flush()
        .map_err(|e| Error::Config(e.to_string()))?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| Error::Config(e.to_string()))?;
    Ok(line.trim().to_string())
}
