//! The whitelist bitmap kept in the instance account.
//!
//! Token id `n` is represented by bit `n % 8` of byte `n / 8`, least significant bit first. A
//! collection size of zero disables whitelisting entirely, in which case every token may bridge.

/// Largest slice a single `whitelist_bulk` instruction can carry while still fitting a transaction.
pub const WHITELIST_BULK_CHUNK_BYTES: usize = 990;

/// Number of bytes needed to hold the bitmap for `collection_size` tokens.
pub fn whitelist_bytes(collection_size: u16) -> usize {
    (usize::from(collection_size) + 7) / 8
}

/// Whether `token_id` is set in `bitmap`. Ids past the end of the bitmap are never whitelisted.
pub fn is_whitelisted(bitmap: &[u8], token_id: u16) -> bool {
    let id = usize::from(token_id);
    bitmap
        .get(id / 8)
        .map(|byte| byte & (1 << (id % 8)) != 0)
        .unwrap_or(false)
}

/// Sets the bit for `token_id`, returning false if it falls outside of `bitmap`.
pub fn set_whitelisted(bitmap: &mut [u8], token_id: u16) -> bool {
    let id = usize::from(token_id);
    match bitmap.get_mut(id / 8) {
        Some(byte) => {
            *byte |= 1 << (id % 8);
            true
        }
        None => false,
    }
}

pub fn pack(whitelist: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; (whitelist.len() + 7) / 8];
    for (id, _) in whitelist.iter().enumerate().filter(|(_, w)| **w) {
        bytes[id / 8] |= 1 << (id % 8);
    }
    bytes
}

/// A contiguous part of the bitmap, written by one `whitelist_bulk` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkChunk {
    /// Byte offset of `bytes` within the bitmap.
    pub offset: u16,
    pub bytes: Vec<u8>,
}

/// Packs `whitelist` and splits it into chunks of at most [`WHITELIST_BULK_CHUNK_BYTES`].
///
/// `whitelist` is indexed by token id, so its length can never exceed `u16::MAX + 1` and the
/// offsets always fit.
pub fn bulk_chunks(whitelist: &[bool]) -> Vec<BulkChunk> {
    pack(whitelist)
        .chunks(WHITELIST_BULK_CHUNK_BYTES)
        .enumerate()
        .map(|(i, bytes)| BulkChunk {
            offset: (i * WHITELIST_BULK_CHUNK_BYTES) as u16,
            bytes: bytes.to_vec(),
        })
        .collect()
}
