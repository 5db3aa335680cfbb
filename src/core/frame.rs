//! # Frame
//!
//! The command envelope shared by every Winny command.
//!
//! ## Wire Format
//! ```text
//! [Length(4, LE)] [Opcode(1)] [Payload(Length - 1)]
//! ```
//!
//! `Length` counts the opcode byte and the payload but never itself, so an
//! empty-payload command carries `Length = 1`.
//!
//! ## Responsibilities
//! - Parse and validate the 5-byte header
//! - Slice exactly the declared payload out of a buffer
//! - Wrap an encoded payload with its header

use crate::config::{HEADER_LEN, LENGTH_FIELD_LEN};
use crate::error::{constants, ProtocolError, Result};
use bytes::BufMut;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Opcode byte plus payload length
    pub total_length: u32,
    pub opcode: u8,
}

impl FrameHeader {
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.total_length as usize - 1
    }

    /// Bytes the whole frame occupies on the wire, length prefix included.
    #[inline]
    pub fn wire_len(&self) -> usize {
        LENGTH_FIELD_LEN + self.total_length as usize
    }
}

/// Parse the header at the start of `buf`.
pub fn decode_header(buf: &[u8]) -> Result<FrameHeader> {
    if buf.len() < HEADER_LEN {
        return Err(ProtocolError::Framing(format!(
            "{}: got {}",
            constants::ERR_HEADER_TOO_SHORT,
            buf.len()
        )));
    }

    let total_length = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if total_length == 0 {
        return Err(ProtocolError::Framing(constants::ERR_ZERO_LENGTH.into()));
    }

    Ok(FrameHeader {
        total_length,
        opcode: buf[LENGTH_FIELD_LEN],
    })
}

/// Validate the frame at the start of `buf` and slice out its payload.
///
/// With `header_only` only the header is checked and `None` is returned, so a
/// stream reader can learn the opcode and length before the payload arrives.
/// Bytes after the declared payload are left untouched.
pub fn decode(buf: &[u8], header_only: bool) -> Result<Option<&[u8]>> {
    if header_only {
        decode_header(buf)?;
        return Ok(None);
    }
    split(buf).map(|(_, payload)| Some(payload))
}

/// Header and payload of the frame at the start of `buf`.
pub fn split(buf: &[u8]) -> Result<(FrameHeader, &[u8])> {
    let header = decode_header(buf)?;

    let available = buf.len() - HEADER_LEN;
    if available < header.payload_len() {
        return Err(ProtocolError::Framing(format!(
            "{}: declared {}, available {available}",
            constants::ERR_PAYLOAD_TOO_SHORT,
            header.payload_len()
        )));
    }

    Ok((header, &buf[HEADER_LEN..HEADER_LEN + header.payload_len()]))
}

/// Build a frame from an opcode and an encoded payload.
pub fn encode(opcode: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let total_length = u32::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_add(1))
        .ok_or_else(|| {
            ProtocolError::FieldRange(format!(
                "{}: payload of {} bytes",
                constants::ERR_FIELD_TOO_LONG,
                payload.len()
            ))
        })?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.put_u32_le(total_length);
    out.put_u8(opcode);
    out.put_slice(payload);
    Ok(out)
}
