//! Stand-ins for the guardian network and for foreign emitters, for use against local forks whose
//! guardian set was replaced with keys we hold (see [`crate::devnet::override_guardian_set`]).

use std::str::FromStr;

use dust_bridging_core::{
    vaa::{self, Payload},
    Address as WormholeAddress, Chain, EvmAddress,
};
use ethers::{
    signers::{LocalWallet, Signer},
    types::{Address, H256},
};
use wormhole_sdk::vaa::{Body, Signature};

use crate::Error;

pub struct MockGuardians {
    set_index: u32,
    keys: Vec<LocalWallet>,
}

impl MockGuardians {
    /// `keys` are hex encoded secp256k1 private keys, in guardian set order.
    pub fn new<S: AsRef<str>>(set_index: u32, keys: &[S]) -> Result<Self, Error> {
        let keys = keys
            .iter()
            .map(|k| LocalWallet::from_str(k.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { set_index, keys })
    }

    pub fn set_index(&self) -> u32 {
        self.set_index
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.iter().map(Signer::address).collect()
    }

    /// Signatures of the guardians at `indices` over `body`, ordered by guardian index.
    pub fn sign<P: Payload>(&self, body: &Body<P>, indices: &[u8]) -> Result<Vec<Signature>, Error> {
        let digest = vaa::body_digest(body)?;
        let hash = H256::from(digest.secp256k_hash);

        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();

        indices
            .into_iter()
            .map(|index| {
                let key = self
                    .keys
                    .get(usize::from(index))
                    .ok_or(Error::UnknownGuardian(index))?;
                let sig = key.sign_hash(hash)?;

                // r || s || recovery id, the contracts expect v without the 27 offset
                let mut signature = <[u8; 65]>::from(&sig);
                signature[64] = sig.v.saturating_sub(27) as u8;
                Ok(Signature { index, signature })
            })
            .collect()
    }

    /// Signs `body` with the guardians at `indices` and returns the encoded VAA.
    pub fn add_signatures<P: Payload>(&self, body: &Body<P>, indices: &[u8]) -> Result<Vec<u8>, Error> {
        let signatures = self.sign(body, indices)?;
        Ok(vaa::assemble(self.set_index, signatures, body)?)
    }
}

/// An emitter on a chain we do not run, publishing bodies with increasing sequences.
#[derive(Debug, Clone)]
pub struct MockEmitter {
    address: WormholeAddress,
    chain: Chain,
    sequence: u64,
}

impl MockEmitter {
    pub fn new(address: WormholeAddress, chain: Chain) -> Self {
        Self {
            address,
            chain,
            sequence: 0,
        }
    }

    pub fn from_evm(address: EvmAddress, chain: Chain) -> Self {
        Self::new(address.to_wormhole_address(), chain)
    }

    /// Next body to be signed. Sequences start at one.
    pub fn publish_message<P>(
        &mut self,
        nonce: u32,
        payload: P,
        consistency_level: u8,
        timestamp: u32,
    ) -> Body<P> {
        self.sequence += 1;
        Body {
            timestamp,
            nonce,
            emitter_chain: self.chain,
            emitter_address: self.address,
            sequence: self.sequence,
            consistency_level,
            payload,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use dust_bridging_core::MigrationMessage;
    use ethers::types::Signature as EthSignature;

    use super::*;

    // First anvil development account.
    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn body(emitter: &mut MockEmitter) -> Body<MigrationMessage> {
        let recipient = EvmAddress([0x22; 20]);
        emitter.publish_message(0, MigrationMessage::single(17, recipient), 1, 1234567)
    }

    #[test]
    fn guardian_address() {
        let guardians = MockGuardians::new(3, &[KEY]).unwrap();
        assert_eq!(vec![ADDRESS.parse::<Address>().unwrap()], guardians.addresses());
    }

    #[test]
    fn signature_recovers_guardian() {
        let guardians = MockGuardians::new(3, &[KEY]).unwrap();
        let mut emitter = MockEmitter::from_evm(EvmAddress([0x01; 20]), Chain::Solana);
        let body = body(&mut emitter);

        let signatures = guardians.sign(&body, &[0]).unwrap();
        assert_eq!(1, signatures.len());
        let mut raw = signatures[0].signature;
        assert!(raw[64] <= 1);

        raw[64] += 27;
        let sig = EthSignature::try_from(&raw[..]).unwrap();
        let digest = vaa::body_digest(&body).unwrap();
        let signer = sig.recover(H256::from(digest.secp256k_hash)).unwrap();
        assert_eq!(guardians.addresses()[0], signer);
    }

    #[test]
    fn signed_vaa_parses() {
        let guardians = MockGuardians::new(3, &[KEY, KEY]).unwrap();
        let mut emitter = MockEmitter::from_evm(EvmAddress([0x01; 20]), Chain::Solana);
        let body = body(&mut emitter);

        let signed = guardians.add_signatures(&body, &[1, 0, 1]).unwrap();
        let (header, parsed) = vaa::parse::<MigrationMessage>(&signed).unwrap();

        assert_eq!(3, header.guardian_set_index);
        assert_eq!(
            vec![0, 1],
            header.signatures.iter().map(|s| s.index).collect::<Vec<_>>()
        );
        assert_eq!(body, parsed);
    }

    #[test]
    fn unknown_guardian() {
        let guardians = MockGuardians::new(0, &[KEY]).unwrap();
        let mut emitter = MockEmitter::from_evm(EvmAddress::default(), Chain::Solana);
        assert!(matches!(
            guardians.sign(&body(&mut emitter), &[2]),
            Err(Error::UnknownGuardian(2))
        ));
    }

    #[test]
    fn sequences_increase() {
        let mut emitter = MockEmitter::from_evm(EvmAddress::default(), Chain::Polygon);
        assert_eq!(1, body(&mut emitter).sequence);
        assert_eq!(2, body(&mut emitter).sequence);
        assert_eq!(2, emitter.sequence());
    }
}
