//! Events emitted by the NFT contract and by the Wormhole core contract it publishes through.

use std::time::Duration;

use dust_bridging_core::{Address as WormholeAddress, Chain};
use ethers::{
    abi::{decode, ParamType, Token},
    providers::{JsonRpcClient, Middleware, Provider},
    types::{Address, Filter, Log, TransactionReceipt, H256, U256, U64},
    utils::keccak256,
};
use futures::StreamExt;
use log::{debug, info, warn};
use wormhole_sdk::vaa::Body;

use crate::Error;

pub const MINTED: &str = "Minted(uint256,address)";

/// Emitted by the Wormhole core contract for every published message.
pub const LOG_MESSAGE_PUBLISHED: &str = "LogMessagePublished(address,uint64,uint32,bytes,uint8)";

/// Window scanned by [`minted_history`] when the caller has no better idea.
pub const DEFAULT_HISTORY_BLOCKS: u64 = 10_000;

/// A token minted by `receiveAndMint` or `receiveAndMintBatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minted {
    pub token_id: U256,
    pub recipient: Address,
    pub block_number: Option<U64>,
    pub block_hash: Option<H256>,
    pub transaction_hash: Option<H256>,
}

impl Minted {
    pub fn topic() -> H256 {
        H256::from(keccak256(MINTED))
    }

    /// Decodes a `Minted` log. Parameters may be indexed or not, whatever the topic count says.
    pub fn from_log(log: &Log) -> Result<Self, Error> {
        if log.topics.first() != Some(&Self::topic()) {
            return Err(Error::UnexpectedLog(MINTED));
        }

        let params = [ParamType::Uint(256), ParamType::Address];
        let indexed = log.topics.len() - 1;
        if indexed > params.len() {
            return Err(Error::UnexpectedLog(MINTED));
        }

        let mut tokens = Vec::with_capacity(params.len());
        for (topic, param) in log.topics[1..].iter().zip(&params) {
            tokens.extend(decode(std::slice::from_ref(param), topic.as_bytes())?);
        }
        tokens.extend(decode(&params[indexed..], &log.data)?);

        let mut tokens = tokens.into_iter();
        let token_id = tokens
            .next()
            .and_then(Token::into_uint)
            .ok_or(Error::UnexpectedLog(MINTED))?;
        let recipient = tokens
            .next()
            .and_then(Token::into_address)
            .ok_or(Error::UnexpectedLog(MINTED))?;

        Ok(Self {
            token_id,
            recipient,
            block_number: log.block_number,
            block_hash: log.block_hash,
            transaction_hash: log.transaction_hash,
        })
    }
}

pub fn minted_filter(contract: Address) -> Filter {
    Filter::new().address(contract).event(MINTED)
}

/// `Minted` events of `contract` over the last `blocks` blocks, up to and including the current
/// one.
pub async fn minted_history<P: JsonRpcClient>(
    provider: &Provider<P>,
    contract: Address,
    blocks: u64,
) -> Result<Vec<Minted>, Error> {
    let current = provider.get_block_number().await?;
    let from = current.saturating_sub(U64::from(blocks));
    info!("fetching Minted events from block {from} to {current}");

    let filter = minted_filter(contract).from_block(from).to_block(current);
    provider
        .get_logs(&filter)
        .await?
        .iter()
        .map(Minted::from_log)
        .collect()
}

/// Polls for new `Minted` events and hands each to `on_minted` until the filter stream ends.
pub async fn listen_minted<P, F>(
    provider: &Provider<P>,
    contract: Address,
    interval: Duration,
    mut on_minted: F,
) -> Result<(), Error>
where
    P: JsonRpcClient,
    F: FnMut(Minted),
{
    let filter = minted_filter(contract);
    let mut stream = provider.watch(&filter).await?.interval(interval);
    debug!("watching {contract:?} every {interval:?}");

    while let Some(log) = stream.next().await {
        match Minted::from_log(&log) {
            Ok(minted) => on_minted(minted),
            Err(e) => warn!("skipping log {:?}: {e}", log.transaction_hash),
        }
    }
    Ok(())
}

/// Wormhole messages published through the core contract at `core` by the transaction behind
/// `receipt`, ready to be signed.
///
/// The body timestamp is the timestamp of the block the transaction landed in, which is what the
/// guardians observe.
pub async fn unsigned_messages<P: JsonRpcClient>(
    provider: &Provider<P>,
    receipt: &TransactionReceipt,
    core: Address,
    emitter_chain: Chain,
) -> Result<Vec<Body<Vec<u8>>>, Error> {
    let number = receipt
        .block_number
        .ok_or(Error::Pending(receipt.transaction_hash))?;
    let block = provider
        .get_block(number)
        .await?
        .ok_or(Error::MissingBlock(number.as_u64()))?;

    messages_from_logs(&receipt.logs, core, emitter_chain, block.timestamp.low_u32())
}

/// Pure part of [`unsigned_messages`]. Logs not emitted by `core` are ignored.
pub fn messages_from_logs(
    logs: &[Log],
    core: Address,
    emitter_chain: Chain,
    timestamp: u32,
) -> Result<Vec<Body<Vec<u8>>>, Error> {
    let topic = H256::from(keccak256(LOG_MESSAGE_PUBLISHED));
    logs.iter()
        .filter(|log| log.address == core && log.topics.first() == Some(&topic))
        .map(|log| {
            // sender is indexed, so it already sits left padded in the topic
            let sender = log
                .topics
                .get(1)
                .ok_or(Error::UnexpectedLog(LOG_MESSAGE_PUBLISHED))?;

            let mut tokens = decode(
                &[
                    ParamType::Uint(64),
                    ParamType::Uint(32),
                    ParamType::Bytes,
                    ParamType::Uint(8),
                ],
                &log.data,
            )?
            .into_iter();
            let malformed = || Error::UnexpectedLog(LOG_MESSAGE_PUBLISHED);
            let sequence = tokens.next().and_then(Token::into_uint).ok_or_else(malformed)?;
            let nonce = tokens.next().and_then(Token::into_uint).ok_or_else(malformed)?;
            let payload = tokens.next().and_then(Token::into_bytes).ok_or_else(malformed)?;
            let consistency = tokens.next().and_then(Token::into_uint).ok_or_else(malformed)?;

            Ok(Body {
                timestamp,
                nonce: nonce.low_u32(),
                emitter_chain,
                emitter_address: WormholeAddress(sender.0),
                sequence: sequence.low_u64(),
                consistency_level: consistency.low_u32() as u8,
                payload,
            })
        })
        .collect()
}
