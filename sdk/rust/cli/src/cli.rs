//! CLI options

use {
    clap::{
        Parser,
        Subcommand,
    },
    solana_program::pubkey::Pubkey,
    std::path::PathBuf,
};

#[derive(Parser)]
#[command(
    name = "dust-bridging",
    about = "Administer and use the dust bridging Solana program",
    version
)]
pub struct Cli {
    #[arg(
        short,
        long,
        default_value = "3",
        help = "Logging level, where 0..=1 RUST_LOG=error and 5.. is RUST_LOG=trace"
    )]
    pub log_level: u32,
    #[arg(long, short, help = "YAML file to read defaults from")]
    pub config: Option<PathBuf>,
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,
    #[arg(long, help = "mainnet or devnet")]
    pub network: Option<String>,
    #[arg(long)]
    pub collection_mint: Option<Pubkey>,
    #[arg(
        long,
        help = "Identity JSON file for the entity meant to cover transaction costs"
    )]
    pub payer: Option<String>,
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand)]
pub enum Action {
    /// Print the state of the instance
    Status,
    /// Create the instance of the collection
    Initialize {
        /// Zero disables whitelisting
        #[arg(long, default_value = "0")]
        collection_size: u16,
        /// Keypair of the collection's update authority
        #[arg(long)]
        update_authority: Option<String>,
    },
    /// Pause or resume bridging
    SetPaused {
        #[arg(action = clap::ArgAction::Set)]
        paused: bool,
        /// Keypair of the update authority or delegate
        #[arg(long)]
        authority: Option<String>,
    },
    /// Appoint a delegate, or remove it when none is given
    SetDelegate {
        #[arg(long)]
        delegate: Option<Pubkey>,
        /// Keypair of the update authority
        #[arg(long)]
        update_authority: Option<String>,
    },
    /// Burn an NFT and send it to an EVM address
    Burn {
        /// Token account holding the NFT
        #[arg(long, required_unless_present = "mint", conflicts_with = "mint")]
        token: Option<Pubkey>,
        /// Mint of the NFT, held in the owner's associated token account
        #[arg(long)]
        mint: Option<Pubkey>,
        #[arg(long)]
        evm_recipient: String,
        #[arg(long, default_value = "1")]
        batch_id: u32,
        /// Keypair of the NFT owner, defaults to the payer
        #[arg(long)]
        owner: Option<String>,
    },
    /// Whitelist the whole collection except for the ids in the exclusion files
    WhitelistBulk {
        /// JSON files listing token ids that must not bridge
        #[arg(long = "exclude")]
        exclude: Vec<PathBuf>,
        #[arg(long)]
        authority: Option<String>,
    },
    /// Whitelist individual token ids, one transaction each
    Whitelist {
        #[arg(required = true, value_delimiter = ',')]
        token_ids: Vec<u16>,
        #[arg(long)]
        authority: Option<String>,
    },
    /// Print the Wormhole message posted for a burned NFT
    Message {
        #[arg(long)]
        nft_mint: Pubkey,
    },
    /// Print the attributes from the JSON metadata of an NFT
    Attributes {
        /// Token account holding the NFT
        #[arg(long)]
        token: Pubkey,
    },
}
