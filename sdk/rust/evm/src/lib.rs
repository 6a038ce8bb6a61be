//! EVM side of dust bridging.
//!
//! Typed calls into the upgraded NFT contract, decoding of the events it and the Wormhole core
//! contract emit, and the helpers needed to drive a local fork: mock guardians that sign VAAs and
//! an anvil guardian set override so those VAAs verify.

pub mod contract;
pub mod devnet;
mod error;
pub mod errors;
pub mod events;
pub mod mock;

pub use {
    contract::{AmountsOnMint, DustNft},
    devnet::{GuardianSet, WormholeCore},
    error::Error,
    errors::RevertKind,
    events::Minted,
    mock::{MockEmitter, MockGuardians},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;
