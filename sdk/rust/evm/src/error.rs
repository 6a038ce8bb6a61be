use ethers::{
    abi::{AbiError, ParseError},
    contract::ContractError,
    providers::{Middleware, ProviderError},
    signers::WalletError,
    types::{Address, Bytes, TxHash},
};
use thiserror::Error;

use crate::errors::{self, RevertKind};

#[derive(Debug, Error)]
pub enum Error {
    // Contract Errors
    #[error("call reverted with {kind}")]
    Reverted { kind: RevertKind, data: Bytes },
    #[error("contract call failed: {0}")]
    Contract(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("transaction {0:?} was dropped before it was mined")]
    Dropped(TxHash),
    #[error("transaction {0:?} has not been included in a block")]
    Pending(TxHash),
    #[error("block {0} not found")]
    MissingBlock(u64),

    // Event Errors
    #[error("log does not match the {0} event")]
    UnexpectedLog(&'static str),

    // Devnet Errors
    #[error("guardian set {index} holds {found:?} after the override")]
    GuardianSetMismatch { index: u32, found: Vec<Address> },
    #[error("no mock guardian at index {0}")]
    UnknownGuardian(u8),

    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    AbiDecode(#[from] ethers::abi::Error),
    #[error(transparent)]
    AbiParse(#[from] ParseError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Core(#[from] dust_bridging_core::Error),
}

impl<M: Middleware + 'static> From<ContractError<M>> for Error {
    fn from(e: ContractError<M>) -> Self {
        match errors::revert_data(&e) {
            Some(data) => Error::Reverted {
                kind: RevertKind::classify(&data),
                data,
            },
            None => Error::Contract(Box::new(e)),
        }
    }
}

impl Error {
    /// Revert classification, `None` if the failure was not a revert.
    pub fn revert_kind(&self) -> Option<RevertKind> {
        match self {
            Error::Reverted { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
