//! Session bootstrap.
//!
//! Before any command is exchanged each side sends a 6-byte init block of
//! random data. Bytes 2..6 of the block key the cipher for everything that
//! side sends afterwards, so a connection ends up with two independent
//! keystreams: one keyed by our block for outbound data and one keyed by the
//! peer's block for inbound data.
//!
//! The first command on each stream is a [`ProtocolHeader`]; see
//! [`opening_header`].

use crate::config::IdentityConfig;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::Command;
use crate::protocol::session::ProtocolHeader;
use crate::utils::cipher::CipherState;
use tracing::{debug, instrument};

pub const INIT_BLOCK_LEN: usize = 6;

/// The 6 bytes that open each direction of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitBlock([u8; INIT_BLOCK_LEN]);

impl InitBlock {
    /// Fresh random block for the local side.
    #[instrument]
    pub fn generate() -> Self {
        let block = Self(rand::random::<[u8; INIT_BLOCK_LEN]>());
        debug!(key = %crate::utils::conv::hex_encode(block.cipher_key()), "generated init block");
        block
    }

    pub fn from_bytes(bytes: [u8; INIT_BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    /// Read the peer's block from the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let bytes = buf
            .get(..INIT_BLOCK_LEN)
            .and_then(|head| <[u8; INIT_BLOCK_LEN]>::try_from(head).ok())
            .ok_or_else(|| {
                ProtocolError::Framing(format!(
                    "{}: init block needs {INIT_BLOCK_LEN} bytes, got {}",
                    constants::ERR_PAYLOAD_TOO_SHORT,
                    buf.len()
                ))
            })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; INIT_BLOCK_LEN] {
        &self.0
    }

    /// The part of the block used as cipher key.
    pub fn cipher_key(&self) -> &[u8] {
        &self.0[2..]
    }

    /// A cipher positioned at the start of the keystream this block selects.
    pub fn cipher(&self) -> CipherState {
        CipherState::new(self.cipher_key())
    }
}

/// First command a node sends once the init blocks are exchanged.
pub fn opening_header(identity: &IdentityConfig) -> Command {
    Command::ProtocolHeader(ProtocolHeader::local(identity))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::utils::conv::{hex_decode, hex_encode};

    #[test]
    fn test_cipher_keyed_by_tail() {
        let block = InitBlock::from_bytes([0xAA, 0xBB, 0xD2, 0x46, 0xAD, 0x10]);
        assert_eq!(block.cipher_key(), &[0xD2, 0x46, 0xAD, 0x10]);

        let ciphertext =
            hex_decode("dc9a1ef971aec34c8afd8be9887a7b2123bdaa769e8a63db015d").unwrap();
        let plain = block.cipher().crypt(&ciphertext);
        assert_eq!(
            hex_encode(&plain),
            "010000006115000000005f9c51446217f43658711c5eb7332084"
        );
    }

    #[test]
    fn test_leading_bytes_do_not_matter() {
        let a = InitBlock::from_bytes([0, 0, 1, 2, 3, 4]);
        let b = InitBlock::from_bytes([9, 9, 1, 2, 3, 4]);
        assert_eq!(a.cipher().crypt(b"winny"), b.cipher().crypt(b"winny"));
    }

    #[test]
    fn test_parse_requires_six_bytes() {
        assert!(matches!(
            InitBlock::parse(&[1, 2, 3, 4, 5]),
            Err(ProtocolError::Framing(_))
        ));
        let block = InitBlock::parse(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(block.as_bytes(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_generate_is_random() {
        let blocks: Vec<_> = (0..8).map(|_| InitBlock::generate()).collect();
        assert!(blocks.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_opening_header() {
        let command = opening_header(&IdentityConfig::default());
        assert_eq!(
            hex_encode(&command.encode().unwrap()),
            "1b000000005f9c51446217f43658711c5eb7332084e7bb9b559276f3d9c77f"
        );
    }
}
