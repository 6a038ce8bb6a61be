pub mod cli;
pub mod config;
pub mod exclusions;

use {
    anyhow::{
        anyhow,
        Context,
        Result,
    },
    clap::Parser,
    cli::{
        Action,
        Cli,
    },
    config::Config,
    dust_bridging_solana::{
        AccountSource,
        DustBridging,
        NftRef,
    },
    log::{
        info,
        warn,
        LevelFilter,
    },
    solana_client::rpc_client::RpcClient,
    solana_program::{
        instruction::Instruction,
        pubkey::Pubkey,
    },
    solana_sdk::{
        commitment_config::CommitmentConfig,
        signature::{
            read_keypair_file,
            Keypair,
            Signature,
            Signer,
        },
        transaction::Transaction,
    },
    std::{
        collections::BTreeSet,
        path::PathBuf,
    },
};

type Client = DustBridging<RpcClient>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = Some(rpc_url);
    }
    if let Some(network) = cli.network {
        config.network = network.parse()?;
    }
    if let Some(collection_mint) = cli.collection_mint {
        config.collection_mint = Some(collection_mint);
    }
    if let Some(payer) = cli.payer {
        config.payer = Some(payer);
    }

    let collection_mint = config
        .collection_mint
        .ok_or_else(|| anyhow!("no collection mint given, use --collection-mint or a config file"))?;
    let rpc_client = RpcClient::new_with_commitment(config.rpc_url(), CommitmentConfig::confirmed());
    let client = DustBridging::with_program_ids(
        rpc_client,
        config.program_id(),
        config.wormhole_id(),
        collection_mint,
    )?;
    info!("using instance {}", client.instance_address());

    match cli.action {
        Action::Status => handle_status(&client),
        Action::Initialize {
            collection_size,
            update_authority,
        } => {
            let payer = read_keypair(config.payer())?;
            let update_authority = read_keypair_or(update_authority, config.authority())?;
            let ix = client.create_initialize_instruction(payer.pubkey(), collection_size)?;
            send_ixs_in_tx(&client, &[ix], &payer, vec![&payer, &update_authority])?;
            Ok(())
        }
        Action::SetPaused { paused, authority } => {
            let payer = read_keypair(config.payer())?;
            let authority = read_keypair_or(authority, config.authority())?;
            let ix = client.create_set_paused_instruction(authority.pubkey(), paused)?;
            send_ixs_in_tx(&client, &[ix], &payer, vec![&payer, &authority])?;
            Ok(())
        }
        Action::SetDelegate {
            delegate,
            update_authority,
        } => {
            let payer = read_keypair(config.payer())?;
            let update_authority = read_keypair_or(update_authority, config.authority())?;
            let ix = client.create_set_delegate_instruction(delegate)?;
            send_ixs_in_tx(&client, &[ix], &payer, vec![&payer, &update_authority])?;
            Ok(())
        }
        Action::Burn {
            token,
            mint,
            evm_recipient,
            batch_id,
            owner,
        } => {
            let payer = read_keypair(config.payer())?;
            let owner = read_keypair_or(owner, config.payer())?;
            let token = nft_token(token, mint, owner.pubkey())?;
            // The token account is closed by the burn, so resolve the mint first.
            let nft = client.nft(&token)?;
            let nft_mint = nft.mint();
            info!("burning {} ({})", nft.metadata.name(), token);
            let ix = client.create_burn_and_send_instruction(
                payer.pubkey(),
                token,
                &evm_recipient,
                batch_id,
            )?;
            send_ixs_in_tx(&client, &[ix], &payer, vec![&payer, &owner])?;

            println!("nft mint: {}", nft_mint);
            println!(
                "message account: {}",
                Client::message_account_address(&client.program_id(), nft_mint)
            );
            Ok(())
        }
        Action::WhitelistBulk { exclude, authority } => {
            let authority = read_keypair_or(authority, config.authority())?;
            handle_whitelist_bulk(&client, &authority, &exclude)
        }
        Action::Whitelist {
            token_ids,
            authority,
        } => {
            let authority = read_keypair_or(authority, config.authority())?;
            handle_whitelist(&client, &authority, &token_ids)
        }
        Action::Message { nft_mint } => handle_message(&client, nft_mint),
        Action::Attributes { token } => {
            let attributes = client.nft_attributes(&token)?;
            println!("{}", serde_json::to_string_pretty(&attributes)?);
            Ok(())
        }
    }
}

/// The token account to burn from, given either directly or as the owner's holding of `mint`.
fn nft_token(token: Option<Pubkey>, mint: Option<Pubkey>, owner: Pubkey) -> Result<Pubkey> {
    match (token, mint) {
        (Some(token), _) => Ok(token),
        (None, Some(mint)) => Ok(Client::associated_token_address(owner, mint)),
        (None, None) => Err(anyhow!("either --token or --mint is required")),
    }
}

fn handle_status(client: &Client) -> Result<()> {
    println!("instance: {}", client.instance_address());
    match client.collection_metadata() {
        Ok(metadata) => println!("collection: {}", metadata.name()),
        Err(e) => warn!("could not read the collection metadata: {}", e),
    }
    if !client.is_initialized()? {
        println!("not initialized");
        return Ok(());
    }

    let instance = client.instance()?;
    println!("update authority: {}", instance.update_authority);
    match instance.delegate {
        Some(delegate) => println!("delegate: {}", delegate),
        None => println!("delegate: none"),
    }
    println!("paused: {}", instance.is_paused);
    if instance.whitelist_enabled() {
        let whitelisted = (0..instance.collection_size)
            .filter(|id| instance.is_whitelisted(*id))
            .count();
        println!(
            "whitelisted: {} of {}",
            whitelisted, instance.collection_size
        );
    } else {
        println!("whitelisting disabled");
    }
    println!("next sequence: {}", client.next_sequence()?);
    match client.wormhole_fee() {
        Ok(fee) => println!("wormhole fee: {} lamports", fee),
        Err(e) => warn!("could not read the wormhole fee: {}", e),
    }
    match client.fee_collector_balance() {
        Ok(balance) => println!("fee collector: {} lamports", balance),
        Err(e) => warn!("could not read the fee collector: {}", e),
    }
    Ok(())
}

/// Instructions whitelisting the collection except for the ids listed in `exclusion_files`.
fn whitelist_bulk_instructions<S: AccountSource>(
    client: &DustBridging<S>,
    authority: Pubkey,
    exclusion_files: &[PathBuf],
) -> Result<Vec<Instruction>> {
    let mut excluded = BTreeSet::new();
    for path in exclusion_files {
        let ids = exclusions::load(path)?;
        info!("{} ids excluded by {}", ids.len(), path.display());
        excluded.extend(ids);
    }

    let instance = client.instance()?;
    let whitelist = exclusions::whitelist(instance.collection_size, &excluded);
    Ok(client.create_whitelist_bulk_instructions(authority, &whitelist)?)
}

fn handle_whitelist_bulk(
    client: &Client,
    authority: &Keypair,
    exclusion_files: &[PathBuf],
) -> Result<()> {
    let ixs = whitelist_bulk_instructions(client, authority.pubkey(), exclusion_files)?;
    println!("{} instructions", ixs.len());

    // Each chunk fills a transaction on its own.
    for (i, ix) in ixs.into_iter().enumerate() {
        let signature = send_ixs_in_tx(client, &[ix], authority, vec![authority])?;
        println!("chunk {}: {}", i, signature);
    }
    Ok(())
}

/// Whitelists one id per transaction, never more than one in flight.
fn handle_whitelist(client: &Client, authority: &Keypair, token_ids: &[u16]) -> Result<()> {
    for id in token_ids {
        if client.is_nft_whitelisted(NftRef::TokenId(*id))? {
            println!("{} already whitelisted", id);
            continue;
        }
        let ix = client.create_whitelist_instruction(authority.pubkey(), &[*id])?;
        let signature = send_ixs_in_tx(client, &[ix], authority, vec![authority])?;
        println!("{} whitelisted {}", id, signature);
    }
    Ok(())
}

fn handle_message(client: &Client, nft_mint: Pubkey) -> Result<()> {
    let address = Client::message_account_address(&client.program_id(), nft_mint);
    let message = client
        .posted_message(nft_mint)
        .with_context(|| format!("no message at {}", address))?;
    println!("message account: {}", address);
    println!("emitter: {}", message.emitter());
    println!("sequence: {}", message.sequence);
    println!("batch id: {}", message.nonce);
    println!("submitted: {}", message.submission_time);

    match message.burn_message() {
        Ok(burn) => {
            println!("token id: {}", burn.token_id);
            println!("evm recipient: {}", burn.evm_recipient);
        }
        Err(e) => warn!("payload is not a burn message: {}", e),
    }
    Ok(())
}

fn send_ixs_in_tx(
    client: &Client,
    ixs: &[Instruction],
    payer: &Keypair,
    mut signers: Vec<&Keypair>,
) -> Result<Signature> {
    // The payer often doubles as the authority.
    signers.dedup_by_key(|k| k.pubkey());

    let rpc = client.source();
    let mut tx = Transaction::new_with_payer(ixs, Some(&payer.pubkey()));
    let recent_blockhash = rpc.get_latest_blockhash()?;
    tx.try_sign(&signers, recent_blockhash)?;
    info!("Transaction signed.");

    let signature = rpc.send_and_confirm_transaction_with_spinner(&tx)?;
    info!("Signature: {}", signature);
    Ok(signature)
}

fn read_keypair(path: &str) -> Result<Keypair> {
    read_keypair_file(&*shellexpand::tilde(path))
        .map_err(|e| anyhow!("failed to read keypair {}: {}", path, e))
}

fn read_keypair_or(path: Option<String>, default: &str) -> Result<Keypair> {
    read_keypair(path.as_deref().unwrap_or(default))
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

#[cfg(test)]
mod tests {
    use {
        super::*,
        dust_bridging_core::whitelist,
        dust_bridging_solana::{
            accounts::{
                Account,
                Instance,
                Metadata,
            },
            Network,
            METADATA_ID,
        },
        solana_sdk::account::Account as SolanaAccount,
        std::{
            collections::HashMap,
            fs,
        },
    };

    fn accounts(
        collection_mint: Pubkey,
        admin: Pubkey,
        collection_size: u16,
    ) -> HashMap<Pubkey, SolanaAccount> {
        let instance = Instance {
            bump: 255,
            update_authority: admin,
            collection_mint,
            collection_meta: Metadata::key(&METADATA_ID, collection_mint),
            delegate: None,
            is_paused: false,
            collection_size,
            whitelist: vec![0; whitelist::whitelist_bytes(collection_size)],
        };
        let mut accounts = HashMap::new();
        accounts.insert(
            Instance::key(&Network::Devnet.program_id(), collection_mint),
            SolanaAccount {
                data: instance.to_account_data().unwrap(),
                ..SolanaAccount::default()
            },
        );
        accounts
    }

    #[test]
    fn exclusion_files_feed_the_bulk_whitelist() {
        let collection_mint = Pubkey::new_unique();
        let admin = Pubkey::new_unique();
        let accounts = accounts(collection_mint, admin, 20);
        let client = DustBridging::new(&accounts, Network::Devnet, collection_mint).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("dead.json");
        let second = dir.path().join("listed.json");
        fs::write(&first, r#"[{"deadGodId": 1}, {"deadGodId": 10}]"#).unwrap();
        fs::write(&second, r#"[{"id": "DeGod #20"}, 3]"#).unwrap();

        let ixs = whitelist_bulk_instructions(&client, admin, &[first, second]).unwrap();
        assert_eq!(1, ixs.len());

        // sighash, offset, then the borsh encoded bitmap slice
        let data = &ixs[0].data[8..];
        assert_eq!([0, 0], data[..2]);
        assert_eq!([3, 0, 0, 0], data[2..6]);
        // ids 0, 3, 9 and 19 stay off the list
        assert_eq!([0b1111_0110, 0b1111_1101, 0b0000_0111], data[6..]);
    }

    #[test]
    fn missing_exclusion_file() {
        let collection_mint = Pubkey::new_unique();
        let admin = Pubkey::new_unique();
        let accounts = accounts(collection_mint, admin, 20);
        let client = DustBridging::new(&accounts, Network::Devnet, collection_mint).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = whitelist_bulk_instructions(&client, admin, &[dir.path().join("nope.json")])
            .unwrap_err();
        assert!(err.to_string().contains("failed to read exclusion list"));
    }

    #[test]
    fn burn_by_mint_uses_the_associated_account() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let token = Pubkey::new_unique();

        assert_eq!(token, nft_token(Some(token), None, owner).unwrap());
        assert_eq!(
            Client::associated_token_address(owner, mint),
            nft_token(None, Some(mint), owner).unwrap()
        );
        assert!(nft_token(None, None, owner).is_err());
    }
}
