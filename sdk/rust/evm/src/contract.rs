use std::sync::Arc;

use dust_bridging_core::{vaa, MigrationMessage};
use ethers::{
    abi::{parse_abi, Detokenize},
    contract::{Contract, ContractCall},
    providers::Middleware,
    types::{Address, Bytes, TransactionReceipt, U256},
    utils::id,
};
use log::debug;

use crate::Error;

const ABI: &[&str] = &[
    "function burnAndSend(uint256 tokenId, address recipient)",
    "function burnAndSend(uint256[] tokenIds, address recipient)",
    "function receiveAndMint(bytes mintVaa) payable",
    "function receiveAndMintBatch(bytes mintVaa) payable",
    "function forwardMessage(bytes mintVaa) payable",
    "function getAmountsOnMint() view returns (uint256 dustAmountOnMint, uint256 gasTokenAmountOnMint)",
    "function updateAmountsOnMint(uint256 dustAmountOnMint, uint256 gasTokenAmountOnMint)",
    "function balanceOf(address owner) view returns (uint256)",
    "function ownerOf(uint256 tokenId) view returns (address)",
    "function upgradeTo(address newImplementation)",
    "event Minted(uint256 tokenId, address receiver)",
];

const BURN_AND_SEND: &str = "burnAndSend(uint256,address)";
const BURN_AND_SEND_BATCH: &str = "burnAndSend(uint256[],address)";

/// Amounts the contract hands out alongside every minted NFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountsOnMint {
    /// DUST tokens transferred to the recipient.
    pub dust: U256,
    /// Gas tokens forwarded to the recipient, the caller has to attach them as call value.
    pub native: U256,
}

/// Client for the bridged NFT contract.
///
/// Transactions are returned as [`ContractCall`]s so callers can adjust gas or value before
/// dispatching them with [`send`], views are awaited directly.
#[derive(Debug)]
pub struct DustNft<M> {
    contract: Contract<M>,
}

impl<M: Middleware + 'static> DustNft<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self, Error> {
        let abi = parse_abi(ABI)?;
        Ok(Self {
            contract: Contract::new(address, abi, client),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Burns `token_id` and publishes a message minting it to `recipient` on the target chain.
    pub fn burn_and_send(
        &self,
        token_id: U256,
        recipient: Address,
    ) -> Result<ContractCall<M, ()>, Error> {
        Ok(self
            .contract
            .method_hash(id(BURN_AND_SEND), (token_id, recipient))?)
    }

    /// Batch variant of [`DustNft::burn_and_send`], the contract expects the ids in ascending
    /// order.
    pub fn burn_and_send_batch(
        &self,
        token_ids: &[U256],
        recipient: Address,
    ) -> Result<ContractCall<M, ()>, Error> {
        let mut token_ids = token_ids.to_vec();
        token_ids.sort_unstable();
        Ok(self
            .contract
            .method_hash(id(BURN_AND_SEND_BATCH), (token_ids, recipient))?)
    }

    /// Mints the single token carried by `vaa`. `value` must cover the native amount of
    /// [`DustNft::get_amounts_on_mint`].
    pub fn receive_and_mint(&self, vaa: &[u8], value: U256) -> Result<ContractCall<M, ()>, Error> {
        Ok(self
            .contract
            .method::<_, ()>("receiveAndMint", Bytes::from(vaa.to_vec()))?
            .value(value))
    }

    pub fn receive_and_mint_batch(
        &self,
        vaa: &[u8],
        value: U256,
    ) -> Result<ContractCall<M, ()>, Error> {
        Ok(self
            .contract
            .method::<_, ()>("receiveAndMintBatch", Bytes::from(vaa.to_vec()))?
            .value(value))
    }

    /// Picks the mint entry point matching the payload of `vaa`. The contract rejects a single
    /// token message on the batch entry point and vice versa.
    pub fn receive(&self, vaa: &[u8], value: U256) -> Result<ContractCall<M, ()>, Error> {
        let (_, body) = vaa::parse::<MigrationMessage>(vaa)?;
        if body.payload.is_batch() {
            debug!("minting batch of {} tokens", body.payload.token_ids.len());
            self.receive_and_mint_batch(vaa, value)
        } else {
            self.receive_and_mint(vaa, value)
        }
    }

    /// Relays a message received from Solana on to the next chain.
    pub fn forward_message(&self, vaa: &[u8]) -> Result<ContractCall<M, ()>, Error> {
        Ok(self
            .contract
            .method::<_, ()>("forwardMessage", Bytes::from(vaa.to_vec()))?)
    }

    pub async fn get_amounts_on_mint(&self) -> Result<AmountsOnMint, Error> {
        let (dust, native) = self
            .contract
            .method::<_, (U256, U256)>("getAmountsOnMint", ())?
            .call()
            .await?;
        Ok(AmountsOnMint { dust, native })
    }

    pub fn update_amounts_on_mint(
        &self,
        dust: U256,
        native: U256,
    ) -> Result<ContractCall<M, ()>, Error> {
        Ok(self
            .contract
            .method("updateAmountsOnMint", (dust, native))?)
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, Error> {
        Ok(self
            .contract
            .method::<_, U256>("balanceOf", owner)?
            .call()
            .await?)
    }

    pub async fn owner_of(&self, token_id: U256) -> Result<Address, Error> {
        Ok(self
            .contract
            .method::<_, Address>("ownerOf", token_id)?
            .call()
            .await?)
    }

    pub fn upgrade_to(&self, implementation: Address) -> Result<ContractCall<M, ()>, Error> {
        Ok(self.contract.method("upgradeTo", implementation)?)
    }
}

/// Submits `call` and waits for its receipt.
pub async fn send<M: Middleware + 'static, D: Detokenize>(
    call: ContractCall<M, D>,
) -> Result<TransactionReceipt, Error> {
    let pending = call.send().await?;
    let hash = pending.tx_hash();
    debug!("submitted transaction {hash:?}");
    pending.await?.ok_or(Error::Dropped(hash))
}

#[cfg(test)]
mod tests {
    use ethers::{
        abi::{decode, ParamType, Token},
        providers::{Http, Provider},
    };

    use super::*;

    fn nft() -> DustNft<Provider<Http>> {
        let provider = Provider::<Http>::try_from("http://localhost:8545").unwrap();
        DustNft::new(Address::repeat_byte(0x2a), Arc::new(provider)).unwrap()
    }

    fn calldata<D: Detokenize>(call: &ContractCall<Provider<Http>, D>) -> Vec<u8> {
        call.calldata().unwrap().to_vec()
    }

    #[test]
    fn overloads_use_their_own_selector() {
        let recipient = Address::repeat_byte(0x11);
        let single = nft().burn_and_send(U256::from(7), recipient).unwrap();
        let batch = nft().burn_and_send_batch(&[U256::from(7)], recipient).unwrap();

        assert_eq!(id(BURN_AND_SEND), calldata(&single)[..4]);
        assert_eq!(id(BURN_AND_SEND_BATCH), calldata(&batch)[..4]);
    }

    #[test]
    fn batch_ids_are_sorted() {
        let recipient = Address::repeat_byte(0x11);
        let ids = [U256::from(9), U256::from(2), U256::from(5)];
        let call = nft().burn_and_send_batch(&ids, recipient).unwrap();

        let tokens = decode(
            &[
                ParamType::Array(Box::new(ParamType::Uint(256))),
                ParamType::Address,
            ],
            &calldata(&call)[4..],
        )
        .unwrap();
        assert_eq!(
            Token::Array(vec![
                Token::Uint(U256::from(2)),
                Token::Uint(U256::from(5)),
                Token::Uint(U256::from(9)),
            ]),
            tokens[0]
        );
        assert_eq!(Token::Address(recipient), tokens[1]);
    }

    #[test]
    fn mint_attaches_value() {
        let call = nft().receive_and_mint(&[1, 2, 3], U256::from(420)).unwrap();
        assert_eq!(Some(&U256::from(420)), call.tx.value());
        assert_eq!(id("receiveAndMint(bytes)"), calldata(&call)[..4]);
    }

    #[test]
    fn receive_dispatches_on_payload() {
        use dust_bridging_core::{Address as WormholeAddress, Chain, EvmAddress};
        use wormhole_sdk::vaa::Body;

        let body = |payload| Body {
            timestamp: 1234567,
            nonce: 0,
            emitter_chain: Chain::Polygon,
            emitter_address: WormholeAddress([1; 32]),
            sequence: 1,
            consistency_level: 1,
            payload,
        };
        let recipient = EvmAddress([0x22; 20]);

        let single = vaa::assemble(0, vec![], &body(MigrationMessage::single(4, recipient))).unwrap();
        let batch = vaa::assemble(
            0,
            vec![],
            &body(MigrationMessage::batch(vec![4, 5], recipient).unwrap()),
        )
        .unwrap();

        let call = nft().receive(&single, U256::zero()).unwrap();
        assert_eq!(id("receiveAndMint(bytes)"), calldata(&call)[..4]);
        let call = nft().receive(&batch, U256::zero()).unwrap();
        assert_eq!(id("receiveAndMintBatch(bytes)"), calldata(&call)[..4]);
    }
}
