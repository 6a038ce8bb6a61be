//! Helpers for VAAs carrying bridging payloads.
//!
//! The envelope itself is handled by `wormhole_sdk`, this module only binds the payload codecs from
//! [`crate::message`] to it so that callers deal in typed bodies instead of raw bytes.

use serde_wormhole::RawMessage;
use wormhole_sdk::{
    vaa::{digest, Body, Digest, Header, Signature},
    Vaa,
};

use crate::{BurnMessage, Error, MigrationMessage};

/// Current VAA envelope version.
pub const VERSION: u8 = 1;

/// A payload that travels as the opaque tail of a VAA body.
pub trait Payload: Sized {
    fn encode(&self) -> Result<Vec<u8>, Error>;
    fn decode(data: &[u8]) -> Result<Self, Error>;
}

impl Payload for BurnMessage {
    fn encode(&self) -> Result<Vec<u8>, Error> {
        self.to_vec()
    }

    fn decode(data: &[u8]) -> Result<Self, Error> {
        Self::from_slice(data)
    }
}

impl Payload for MigrationMessage {
    fn encode(&self) -> Result<Vec<u8>, Error> {
        self.to_vec()
    }

    fn decode(data: &[u8]) -> Result<Self, Error> {
        Self::from_slice(data)
    }
}

/// Opaque payloads, as observed on chain before anyone decoded them.
impl Payload for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>, Error> {
        Ok(self.clone())
    }

    fn decode(data: &[u8]) -> Result<Self, Error> {
        Ok(data.to_vec())
    }
}

/// Splits a signed VAA into its header and a body with a decoded payload.
pub fn parse<P: Payload>(data: &[u8]) -> Result<(Header, Body<P>), Error> {
    let vaa: Vaa<&RawMessage> = serde_wormhole::from_slice(data)?;
    let (header, body) = vaa.into();
    let payload = P::decode(body.payload)?;
    Ok((header, body.with_payload(payload)))
}

/// Wire encoding of `body`, the bytes guardians hash and sign.
pub fn encode_body<P: Payload>(body: &Body<P>) -> Result<Vec<u8>, Error> {
    let payload = body.payload.encode()?;
    let raw = Body {
        timestamp: body.timestamp,
        nonce: body.nonce,
        emitter_chain: body.emitter_chain,
        emitter_address: body.emitter_address,
        sequence: body.sequence,
        consistency_level: body.consistency_level,
        payload: RawMessage::new(&payload),
    };
    Ok(serde_wormhole::to_vec(&raw)?)
}

pub fn body_digest<P: Payload>(body: &Body<P>) -> Result<Digest, Error> {
    Ok(digest(&encode_body(body)?)?)
}

/// Assembles a signed VAA from an already signed body.
pub fn assemble<P: Payload>(
    guardian_set_index: u32,
    signatures: Vec<Signature>,
    body: &Body<P>,
) -> Result<Vec<u8>, Error> {
    let header = Header {
        version: VERSION,
        guardian_set_index,
        signatures,
    };

    let mut out = serde_wormhole::to_vec(&header)?;
    out.extend(encode_body(body)?);
    Ok(out)
}
