//! Custom error reverts raised by the dust NFT contract.
//!
//! Solidity custom errors revert with the four byte selector of their signature followed by the
//! ABI encoded arguments. The contract only raises argument free errors, so the selector alone
//! identifies them.

use std::fmt;

use ethers::{
    contract::ContractError,
    providers::{JsonRpcError, Middleware, MiddlewareError, RpcError},
    types::{Bytes, Selector},
    utils::id,
};

/// Raised by the deprecated entry points of the old contract.
pub const DEPRECATED: &str = "Deprecated()";

/// Raised when a VAA payload does not match the entry point it was submitted to, for instance a
/// single token message handed to the batch mint.
pub const INVALID_MESSAGE_LENGTH: &str = "InvalidMessageLength()";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertKind {
    Deprecated,
    InvalidMessageLength,
    /// Any other revert, with its selector when the data carried one.
    Other(Option<Selector>),
}

impl RevertKind {
    pub fn classify(data: &[u8]) -> Self {
        match selector(data) {
            Some(s) if s == id(DEPRECATED) => RevertKind::Deprecated,
            Some(s) if s == id(INVALID_MESSAGE_LENGTH) => RevertKind::InvalidMessageLength,
            other => RevertKind::Other(other),
        }
    }
}

impl fmt::Display for RevertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertKind::Deprecated => f.write_str(DEPRECATED),
            RevertKind::InvalidMessageLength => f.write_str(INVALID_MESSAGE_LENGTH),
            RevertKind::Other(Some(s)) => write!(f, "unknown error 0x{}", hex::encode(s)),
            RevertKind::Other(None) => f.write_str("no error data"),
        }
    }
}

/// Leading four bytes of revert data.
pub fn selector(data: &[u8]) -> Option<Selector> {
    let mut out = [0u8; 4];
    out.copy_from_slice(data.get(..4)?);
    Some(out)
}

/// Revert data carried by a failed call, wherever in the middleware stack it surfaced.
///
/// `eth_call` failures usually come back as [`ContractError::Revert`], transactions rejected
/// during gas estimation as a JSON-RPC error response with the data attached.
pub fn revert_data<M: Middleware>(err: &ContractError<M>) -> Option<Bytes> {
    if let Some(data) = err.as_revert() {
        return Some(data.clone());
    }

    err.as_middleware_error()
        .and_then(MiddlewareError::as_error_response)
        .or_else(|| {
            err.as_provider_error()
                .and_then(RpcError::as_error_response)
        })
        .and_then(JsonRpcError::as_revert_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_selectors() {
        let mut data = id(DEPRECATED).to_vec();
        assert_eq!(RevertKind::Deprecated, RevertKind::classify(&data));

        // trailing bytes do not change the selector
        data.extend([0u8; 32]);
        assert_eq!(RevertKind::Deprecated, RevertKind::classify(&data));

        assert_eq!(
            RevertKind::InvalidMessageLength,
            RevertKind::classify(&id(INVALID_MESSAGE_LENGTH))
        );
    }

    #[test]
    fn classify_unknown() {
        let data = id("Error(string)");
        assert_eq!(RevertKind::Other(Some(data)), RevertKind::classify(&data));
        assert_eq!(RevertKind::Other(None), RevertKind::classify(&[0x01, 0x02]));
        assert_eq!(
            "unknown error 0x08c379a0",
            RevertKind::classify(&data).to_string()
        );
    }

    #[test]
    fn revert_from_contract_error() {
        let data = Bytes::from(id(INVALID_MESSAGE_LENGTH).to_vec());
        let err = ContractError::<ethers::providers::Provider<ethers::providers::Http>>::Revert(
            data.clone(),
        );

        assert_eq!(Some(data), revert_data(&err));

        let converted = crate::Error::from(err);
        assert_eq!(
            Some(RevertKind::InvalidMessageLength),
            converted.revert_kind()
        );
    }

    #[test]
    fn other_failures_keep_their_source() {
        use std::error::Error as _;
        type HttpProvider = ethers::providers::Provider<ethers::providers::Http>;

        let err = ContractError::<HttpProvider>::ContractNotDeployed;
        assert_eq!(None, revert_data(&err));

        let converted = crate::Error::from(err);
        assert!(matches!(converted, crate::Error::Contract(_)));
        assert_eq!(None, converted.revert_kind());
        let source = converted.source().unwrap();
        assert!(source.downcast_ref::<ContractError<HttpProvider>>().is_some());
    }
}
