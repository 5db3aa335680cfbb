//! # Codec
//!
//! Tokio codec turning an encrypted Winny byte stream into [`Command`]s and
//! back.
//!
//! The cipher runs over the whole stream, length prefixes included, so inbound
//! bytes are decrypted exactly once as they arrive and kept in a plaintext
//! buffer until a complete frame is available. Each direction owns its own
//! [`CipherState`].
//!
//! ## Responsibilities
//! - Decrypt inbound bytes and cut them into frames
//! - Refuse declared lengths above the configured limit before buffering
//! - Encode and encrypt outbound commands

use crate::config::{CodecConfig, DEFAULT_MAX_FRAME_LENGTH, HEADER_LEN};
use crate::core::frame;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::handshake::InitBlock;
use crate::protocol::message::Command;
use crate::utils::cipher::CipherState;
use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace, warn};

#[derive(Debug)]
pub struct CommandCodec {
    inbound: CipherState,
    outbound: CipherState,
    plain: BytesMut,
    max_frame_length: u32,
}

impl CommandCodec {
    pub fn new(inbound: CipherState, outbound: CipherState) -> Self {
        Self {
            inbound,
            outbound,
            plain: BytesMut::new(),
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }

    pub fn with_config(inbound: CipherState, outbound: CipherState, config: &CodecConfig) -> Self {
        Self {
            max_frame_length: config.max_frame_length,
            ..Self::new(inbound, outbound)
        }
    }

    /// Codec for a connection whose init blocks have been exchanged.
    ///
    /// Our own block keys what we send; the peer's block keys what we read.
    pub fn from_init_blocks(local: &InitBlock, remote: &InitBlock) -> Self {
        Self::new(remote.cipher(), local.cipher())
    }

    /// Decrypted bytes not yet consumed by a complete frame.
    pub fn buffered(&self) -> usize {
        self.plain.len()
    }
}

impl Decoder for CommandCodec {
    type Item = Command;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Command>> {
        if !src.is_empty() {
            let mut chunk = src.split();
            self.inbound.apply(&mut chunk);
            self.plain.unsplit(chunk);
        }

        if self.plain.len() < HEADER_LEN {
            return Ok(None);
        }

        let header = frame::decode_header(&self.plain)?;
        if header.total_length > self.max_frame_length {
            warn!(
                declared = header.total_length,
                limit = self.max_frame_length,
                "rejecting oversized frame"
            );
            return Err(ProtocolError::Framing(format!(
                "{}: {} > {}",
                constants::ERR_FRAME_TOO_LARGE,
                header.total_length,
                self.max_frame_length
            )));
        }

        let wire_len = header.wire_len();
        if self.plain.len() < wire_len {
            self.plain.reserve(wire_len - self.plain.len());
            trace!(
                have = self.plain.len(),
                need = wire_len,
                "waiting for rest of frame"
            );
            return Ok(None);
        }

        let raw = self.plain.split_to(wire_len);
        match Command::decode(&raw) {
            Ok(command) => {
                debug!(opcode = %command.opcode(), len = wire_len, "decoded command");
                Ok(Some(command))
            }
            Err(e) => {
                warn!(opcode = header.opcode, error = %e, "failed to decode command");
                Err(e)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Command>> {
        match self.decode(src)? {
            Some(command) => Ok(Some(command)),
            None if self.plain.is_empty() => Ok(None),
            None => Err(ProtocolError::Framing(format!(
                "{}: stream ended with {} buffered bytes",
                constants::ERR_PAYLOAD_TOO_SHORT,
                self.plain.len()
            ))),
        }
    }
}

impl Encoder<Command> for CommandCodec {
    type Error = ProtocolError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<()> {
        let mut frame = command.encode()?;
        self.outbound.apply(&mut frame);
        dst.reserve(frame.len());
        dst.put_slice(&frame);
        debug!(opcode = %command.opcode(), len = frame.len(), "encoded command");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::protocol::session::{CloseReason, Speed};
    use crate::utils::conv::hex_decode;

    fn plain_pair() -> CommandCodec {
        CommandCodec::new(CipherState::new(b"in"), CipherState::new(b"out"))
    }

    #[test]
    fn test_low_version_vector() {
        let mut codec = CommandCodec::new(
            CipherState::new(&[0xD2, 0x46, 0xAD, 0x10]),
            CipherState::new(b"unused"),
        );
        let mut src = BytesMut::from(
            &hex_decode("dc9a1ef971aec34c8afd8be9887a7b2123bdaa769e8a63db015d").unwrap()[..],
        );

        let first = codec.decode(&mut src).unwrap();
        assert_eq!(first, Some(Command::Close(CloseReason::LowVersion)));
        // header frame declares 20 payload bytes, 16 arrived
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        assert_eq!(codec.buffered(), 21);
        assert!(src.is_empty());
    }

    #[test]
    fn test_encode_then_decode_across_codecs() {
        let mut sender = CommandCodec::new(CipherState::new(b"x"), CipherState::new(b"k1"));
        let mut receiver = CommandCodec::new(CipherState::new(b"k1"), CipherState::new(b"y"));

        let mut wire = BytesMut::new();
        sender.encode(Command::from(Speed { kbps: 120.0 }), &mut wire).unwrap();
        sender.encode(Command::from(CloseReason::Close), &mut wire).unwrap();
        assert_ne!(&wire[..4], &[5, 0, 0, 0]);

        // deliver one byte at a time
        let mut decoded = Vec::new();
        let bytes = wire.to_vec();
        let mut src = BytesMut::new();
        for b in bytes {
            src.put_u8(b);
            while let Some(command) = receiver.decode(&mut src).unwrap() {
                decoded.push(command);
            }
        }
        assert_eq!(
            decoded,
            vec![
                Command::Speed(Speed { kbps: 120.0 }),
                Command::Close(CloseReason::Close)
            ]
        );
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let config = CodecConfig {
            max_frame_length: 70_000,
        };
        let mut sender = plain_pair();
        let mut codec =
            CommandCodec::with_config(CipherState::new(b"out"), CipherState::new(b"in"), &config);

        // forge a header declaring a huge frame, encrypted like real traffic
        let mut header = vec![0xFF, 0xFF, 0xFF, 0x00, 13];
        sender.outbound.apply(&mut header);
        let mut src = BytesMut::from(&header[..]);
        assert!(matches!(
            codec.decode(&mut src),
            Err(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn test_eof_mid_frame() {
        let mut sender = plain_pair();
        let mut receiver =
            CommandCodec::new(CipherState::new(b"out"), CipherState::new(b"unused"));
        let mut wire = BytesMut::new();
        sender.encode(Command::from(Speed { kbps: 1.0 }), &mut wire).unwrap();
        wire.truncate(wire.len() - 2);

        assert_eq!(receiver.decode(&mut wire).unwrap(), None);
        assert!(matches!(
            receiver.decode_eof(&mut wire),
            Err(ProtocolError::Framing(_))
        ));
    }
}
