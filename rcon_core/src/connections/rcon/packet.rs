//! Source RCON packet framing.
//!
//! Every packet on the wire is
//! `size:i32le | id:i32le | type:i32le | body | 0x00 | 0x00`
//! where `size` counts everything after itself.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::connections::errors::RconError;

pub const SERVERDATA_AUTH: i32 = 3;
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;
pub const SERVERDATA_EXECCOMMAND: i32 = 2;
pub const SERVERDATA_RESPONSE_VALUE: i32 = 0;

/// id + type + two terminating nul bytes.
const HEADER_AND_TERMINATORS: usize = 10;
/// Largest body a client may send.
pub const MAX_OUTGOING_BODY: usize = 4096 - HEADER_AND_TERMINATORS;
/// Servers split long output into packets well below this.
pub const MAX_INCOMING_SIZE: usize = 65_536 + HEADER_AND_TERMINATORS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

impl Packet {
    pub fn new(id: i32, kind: i32, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }
}

/// Codec for encoding/decoding RCON packets
#[derive(Debug, Default, Clone, Copy)]
pub struct RconCodec;

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = RconError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }
        let size = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        let size = usize::try_from(size)
            .map_err(|_| RconError::Protocol(format!("negative packet size {size}")))?;
        if !(HEADER_AND_TERMINATORS..=MAX_INCOMING_SIZE).contains(&size) {
            return Err(RconError::Protocol(format!("packet size {size} out of range")));
        }
        if src.len() < 4 + size {
            src.reserve(4 + size - src.len());
            return Ok(None);
        }

        src.advance(4);
        let mut frame = src.split_to(size);
        let id = frame.get_i32_le();
        let kind = frame.get_i32_le();
        let body_len = frame.len() - 2;
        if frame[body_len] != 0 || frame[body_len + 1] != 0 {
            return Err(RconError::Protocol("packet is missing its nul terminators".into()));
        }
        // Some servers pad the body with extra nuls; keep text up to the first one.
        let body = &frame[..body_len];
        let text_len = body.iter().position(|&b| b == 0).unwrap_or(body.len());
        let body = String::from_utf8_lossy(&body[..text_len]).into_owned();

        Ok(Some(Packet { id, kind, body }))
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = RconError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = packet.body.as_bytes();
        if body.len() > MAX_OUTGOING_BODY {
            return Err(RconError::CommandTooLong {
                len: body.len(),
                limit: MAX_OUTGOING_BODY,
            });
        }
        let size = body.len() + HEADER_AND_TERMINATORS;
        dst.reserve(4 + size);
        dst.put_i32_le(size as i32);
        dst.put_i32_le(packet.id);
        dst.put_i32_le(packet.kind);
        dst.put_slice(body);
        dst.put_u8(0);
        dst.put_u8(0);
        Ok(())
    }
}
