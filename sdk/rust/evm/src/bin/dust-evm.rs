//! Watches the bridged NFT contract for tokens minted from Wormhole messages.

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dust_bridging_evm::{
    events::{self, DEFAULT_HISTORY_BLOCKS},
    Minted,
};
use ethers::{
    providers::{Http, Provider},
    types::Address,
};
use log::{info, LevelFilter};
use serde_json::json;

#[derive(Parser)]
#[command(about = "Minted event history and listener for the dust bridged NFT contract")]
struct Cli {
    #[arg(
        long,
        short,
        default_value = "3",
        help = "Logging level, where 0..=1 RUST_LOG=error and 5.. is RUST_LOG=trace"
    )]
    log_level: u32,
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,
    #[arg(long, default_value = "0x2aC3ff0D83e936b65933f33c7A5D1dFFf8725645")]
    contract: Address,
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    #[command(about = "Print the Minted events of the most recent blocks")]
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_BLOCKS)]
        blocks: u64,
    },
    #[command(about = "Print Minted events as they are emitted")]
    Listen {
        #[arg(long, default_value = "2000", help = "Polling interval in milliseconds")]
        interval_ms: u64,
    },
}

fn print_minted(minted: &Minted) {
    let out = json!({
        "tokenId": minted.token_id.to_string(),
        "recipient": format!("{:?}", minted.recipient),
        "blockNumber": minted.block_number.map(|n| n.as_u64()),
        "blockHash": minted.block_hash.map(|h| format!("{h:?}")),
        "transactionHash": minted.transaction_hash.map(|h| format!("{h:?}")),
    });
    println!("{out}");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let provider = Provider::<Http>::try_from(cli.rpc_url.as_str())
        .with_context(|| format!("invalid RPC url {}", cli.rpc_url))?;

    match cli.action {
        Action::History { blocks } => {
            let minted = events::minted_history(&provider, cli.contract, blocks).await?;
            info!("found {} Minted events", minted.len());
            minted.iter().for_each(print_minted);
        }
        Action::Listen { interval_ms } => {
            info!("listening for Minted events on {:?}", cli.contract);
            events::listen_minted(
                &provider,
                cli.contract,
                Duration::from_millis(interval_ms),
                |minted| print_minted(&minted),
            )
            .await?;
        }
    }

    Ok(())
}

fn init_logging(verbosity: u32) {
    use LevelFilter::*;
    let filter = match verbosity {
        0..=1 => Error,
        2 => Warn,
        3 => Info,
        4 => Debug,
        _other => Trace,
    };

    env_logger::builder().filter_level(filter).init();
}
