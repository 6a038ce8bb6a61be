use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use sha3::{Digest, Keccak256};

use crate::{Address, Error};

/// A 20 byte EVM account address.
///
/// Parsing follows the rules EVM tooling applies to user input: the `0x` prefix is optional, all
/// lower or all upper case hex is accepted as is, and mixed case input must carry a valid EIP-55
/// checksum.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct EvmAddress(pub [u8; 20]);

impl EvmAddress {
    pub const LEN: usize = 20;

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Wormhole addresses are 32 bytes, shorter addresses are left zero padded.
    pub fn to_wormhole_address(&self) -> Address {
        let mut padded = [0u8; 32];
        padded[12..].copy_from_slice(&self.0);
        Address(padded)
    }

    /// EIP-55 mixed case representation, including the `0x` prefix.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl From<[u8; 20]> for EvmAddress {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl FromStr for EvmAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 2 * Self::LEN || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidEvmAddress(s.to_owned()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| Error::InvalidEvmAddress(s.to_owned()))?;
        let address = Self(bytes);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *digits {
            return Err(Error::BadChecksum(s.to_owned()));
        }

        Ok(address)
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}
