//! The `core` crate provides the chain agnostic pieces of the dust bridging clients.
//!
//! Both the Solana and the EVM clients build on it. It includes:
//!
//! - EVM addresses as they are accepted from users and embedded in Wormhole messages.
//! - Token ID extraction from Metaplex metadata URIs.
//! - The whitelist bitmap used by the Solana program to gate which token IDs may bridge.
//! - Codecs for the messages emitted and consumed through Wormhole.
//! - Helpers for reading and assembling VAAs carrying those messages.

mod address;
mod error;
pub mod message;
mod token_id;
pub mod vaa;
pub mod whitelist;

pub use {
    address::EvmAddress,
    error::Error,
    message::{BurnMessage, MigrationMessage},
    token_id::token_id_from_uri,
    wormhole_sdk::{Address, Chain},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;
