use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Address Errors
    #[error("invalid EVM address: {0}")]
    InvalidEvmAddress(String),
    #[error("EVM address checksum mismatch: {0}")]
    BadChecksum(String),

    // Metadata Errors
    #[error("metadata uri has no path separator: {0}")]
    UriMissingSeparator(String),
    #[error("metadata uri does not end in .json: {0}")]
    UriMissingExtension(String),
    #[error("metadata uri does not carry a numeric token id: {0}")]
    UriInvalidTokenId(String),

    // Message Errors
    #[error("invalid message length {0}")]
    InvalidMessageLength(usize),
    #[error("message carries no token ids")]
    EmptyBatch,
    #[error("batch of {0} token ids does not fit a single message")]
    BatchTooLarge(usize),

    // Serialization Errors
    #[error(transparent)]
    Wormhole(#[from] serde_wormhole::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
