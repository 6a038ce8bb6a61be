//! Payloads carried through Wormhole by the bridging contracts.
//!
//! The Solana program emits a [`BurnMessage`] for every burned NFT, Borsh encoded and therefore
//! little endian. The EVM contract speaks [`MigrationMessage`]s instead: big endian token ids
//! followed by the recipient, with more than one id making the message a batch.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{EvmAddress, Error};

/// Emitted by `burn_and_send` on Solana.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BurnMessage {
    pub token_id: u16,
    pub evm_recipient: EvmAddress,
}

impl BurnMessage {
    pub const LEN: usize = 2 + EvmAddress::LEN;

    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        Ok(borsh::to_vec(self)?)
    }

    /// Decodes a message, refusing trailing bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        if data.len() != Self::LEN {
            return Err(Error::InvalidMessageLength(data.len()));
        }
        Ok(Self::try_from_slice(data)?)
    }
}

/// Consumed by `receiveAndMint` (single id) and `receiveAndMintBatch` on the EVM side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationMessage {
    pub token_ids: Vec<u16>,
    pub recipient: EvmAddress,
}

impl MigrationMessage {
    /// The largest batch `burnAndSend` accepts.
    pub const MAX_BATCH_SIZE: usize = 30;

    pub fn single(token_id: u16, recipient: EvmAddress) -> Self {
        Self {
            token_ids: vec![token_id],
            recipient,
        }
    }

    pub fn batch(token_ids: Vec<u16>, recipient: EvmAddress) -> Result<Self, Error> {
        let msg = Self {
            token_ids,
            recipient,
        };
        msg.check_size()?;
        Ok(msg)
    }

    pub fn is_batch(&self) -> bool {
        self.token_ids.len() > 1
    }

    pub fn encoded_len(&self) -> usize {
        2 * self.token_ids.len() + EvmAddress::LEN
    }

    fn check_size(&self) -> Result<(), Error> {
        match self.token_ids.len() {
            0 => Err(Error::EmptyBatch),
            n if n > Self::MAX_BATCH_SIZE => Err(Error::BatchTooLarge(n)),
            _ => Ok(()),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        self.check_size()?;
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write(&mut out)?;
        Ok(out)
    }

    pub fn write<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        for id in &self.token_ids {
            w.write_all(&id.to_be_bytes())?;
        }
        w.write_all(self.recipient.as_bytes())
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let len = data.len();
        if len <= EvmAddress::LEN || (len - EvmAddress::LEN) % 2 != 0 {
            return Err(Error::InvalidMessageLength(len));
        }

        let (ids, recipient) = data.split_at(len - EvmAddress::LEN);
        let token_ids = ids
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();

        let mut address = [0u8; 20];
        address.copy_from_slice(recipient);

        let msg = Self {
            token_ids,
            recipient: EvmAddress(address),
        };
        msg.check_size()?;
        Ok(msg)
    }
}

impl From<BurnMessage> for MigrationMessage {
    fn from(msg: BurnMessage) -> Self {
        Self::single(msg.token_id, msg.evm_recipient)
    }
}

/// The EVM contract requires the ids of a batch burn to be in ascending order.
pub fn sort_token_ids(ids: &mut [u16]) {
    ids.sort_unstable();
}
