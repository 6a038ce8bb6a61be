//! Helpers for anvil forks of networks running the Wormhole core contract.

use std::sync::Arc;

use ethers::{
    abi::{encode, parse_abi, Token},
    contract::Contract,
    providers::{JsonRpcClient, Middleware, Provider},
    types::{Address, H256, U256},
    utils::keccak256,
};
use log::{debug, info};

use crate::Error;

const ABI: &[&str] = &[
    "function chainId() view returns (uint16)",
    "function messageFee() view returns (uint256)",
    "function getCurrentGuardianSetIndex() view returns (uint32)",
    "function getGuardianSet(uint32 index) view returns ((address[] keys, uint32 expirationTime))",
];

/// Storage slot of the `guardianSets` mapping in the core contract.
const GUARDIAN_SETS_SLOT: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianSet {
    pub keys: Vec<Address>,
    pub expiration_time: u32,
}

/// Read only view of the Wormhole core contract.
#[derive(Debug)]
pub struct WormholeCore<M> {
    contract: Contract<M>,
}

impl<M: Middleware + 'static> WormholeCore<M> {
    pub fn new(address: Address, client: Arc<M>) -> Result<Self, Error> {
        Ok(Self {
            contract: Contract::new(address, parse_abi(ABI)?, client),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Wormhole chain id of the network, not the EVM chain id.
    pub async fn chain_id(&self) -> Result<u16, Error> {
        Ok(self.contract.method::<_, u16>("chainId", ())?.call().await?)
    }

    pub async fn message_fee(&self) -> Result<U256, Error> {
        Ok(self
            .contract
            .method::<_, U256>("messageFee", ())?
            .call()
            .await?)
    }

    pub async fn current_guardian_set_index(&self) -> Result<u32, Error> {
        Ok(self
            .contract
            .method::<_, u32>("getCurrentGuardianSetIndex", ())?
            .call()
            .await?)
    }

    pub async fn guardian_set(&self, index: u32) -> Result<GuardianSet, Error> {
        let (keys, expiration_time) = self
            .contract
            .method::<_, (Vec<Address>, u32)>("getGuardianSet", index)?
            .call()
            .await?;
        Ok(GuardianSet {
            keys,
            expiration_time,
        })
    }
}

pub async fn impersonate<P: JsonRpcClient>(
    provider: &Provider<P>,
    account: Address,
) -> Result<(), Error> {
    debug!("impersonating {account:?}");
    provider
        .request::<_, serde_json::Value>("anvil_impersonateAccount", [account])
        .await?;
    Ok(())
}

pub async fn stop_impersonating<P: JsonRpcClient>(
    provider: &Provider<P>,
    account: Address,
) -> Result<(), Error> {
    debug!("no longer impersonating {account:?}");
    provider
        .request::<_, serde_json::Value>("anvil_stopImpersonatingAccount", [account])
        .await?;
    Ok(())
}

pub async fn set_storage_at<P: JsonRpcClient>(
    provider: &Provider<P>,
    account: Address,
    slot: H256,
    value: H256,
) -> Result<(), Error> {
    provider
        .request::<_, serde_json::Value>("anvil_setStorageAt", (account, slot, value))
        .await?;
    Ok(())
}

/// Slot holding the length of the key array of guardian set `index`. The keys themselves start
/// at `keccak256(slot)`.
pub fn guardian_set_slot(index: u32) -> H256 {
    let key = encode(&[
        Token::Uint(U256::from(index)),
        Token::Uint(U256::from(GUARDIAN_SETS_SLOT)),
    ]);
    H256::from(keccak256(key))
}

fn word(value: U256) -> H256 {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    H256(out)
}

fn address_word(address: Address) -> H256 {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(address.as_bytes());
    H256(out)
}

/// Replaces the current guardian set of `core` with the single key `guardian`, so VAAs signed by
/// [`crate::MockGuardians`] holding that key verify on the fork. Returns the overridden index.
pub async fn override_guardian_set<P: JsonRpcClient + 'static>(
    provider: &Provider<P>,
    core: &WormholeCore<Provider<P>>,
    guardian: Address,
) -> Result<u32, Error> {
    let index = core.current_guardian_set_index().await?;
    let slot = guardian_set_slot(index);

    let len = provider.get_storage_at(core.address(), slot, None).await?;
    let len = U256::from_big_endian(len.as_bytes());
    let keys = U256::from_big_endian(&keccak256(slot));
    info!("overriding guardian set {index} holding {len} keys");

    // clear every key but the first, it is overwritten below
    for i in 1..len.low_u64() {
        set_storage_at(provider, core.address(), word(keys + i), H256::zero()).await?;
    }
    set_storage_at(provider, core.address(), word(keys), address_word(guardian)).await?;
    set_storage_at(provider, core.address(), slot, word(U256::one())).await?;

    let set = core.guardian_set(index).await?;
    if set.keys != [guardian] {
        return Err(Error::GuardianSetMismatch {
            index,
            found: set.keys,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_layout() {
        // keccak256(abi.encode(uint32(0), uint256(2)))
        let mut preimage = [0u8; 64];
        preimage[63] = 2;
        assert_eq!(H256::from(keccak256(preimage)), guardian_set_slot(0));

        preimage[31] = 4;
        assert_eq!(H256::from(keccak256(preimage)), guardian_set_slot(4));
    }

    #[test]
    fn words_are_left_padded() {
        let guardian = Address::repeat_byte(0xbe);
        let padded = address_word(guardian);
        assert_eq!([0u8; 12], padded[..12]);
        assert_eq!(guardian.as_bytes(), &padded[12..]);

        assert_eq!(H256::from_low_u64_be(1), word(U256::one()));
    }

    // Every request has to be answered in order for the override to return the index.
    #[tokio::test]
    async fn override_rewrites_storage() {
        use ethers::types::Bytes;

        let (provider, mock) = Provider::mocked();
        let provider = Arc::new(provider);
        let core = WormholeCore::new(Address::repeat_byte(0xc0), provider.clone()).unwrap();
        let guardian = Address::repeat_byte(0xbe);

        // responses are consumed last pushed first
        let set = encode(&[Token::Tuple(vec![
            Token::Array(vec![Token::Address(guardian)]),
            Token::Uint(U256::zero()),
        ])]);
        mock.push::<Bytes, _>(Bytes::from(set)).unwrap();
        for _ in 0..3 {
            mock.push::<bool, _>(true).unwrap();
        }
        // two guardians, one key to clear
        mock.push::<H256, _>(H256::from_low_u64_be(2)).unwrap();
        mock.push::<Bytes, _>(Bytes::from(encode(&[Token::Uint(U256::from(4))])))
            .unwrap();

        let index = override_guardian_set(&provider, &core, guardian)
            .await
            .unwrap();
        assert_eq!(4, index);
    }
}
