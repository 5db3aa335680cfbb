//! Connection setup and teardown commands.
//!
//! After the cipher bootstrap both sides exchange a protocol header, their
//! line speed, the link type and their own node details. Close commands end
//! the connection and carry their reason in the opcode alone.

use crate::config::{IdentityConfig, PROTOCOL_HEADER_KEY};
use crate::core::reader::{short_len, Reader};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::WireCommand;
use crate::protocol::opcode::Opcode;
use crate::utils::cipher;
use bytes::BufMut;
use std::net::Ipv4Addr;

/// Number of clustering words every node reports
pub const CLUSTER_WORDS: usize = 3;

/// Command 00: application name and build, obfuscated under a fixed key.
///
/// The payload is `{minor:u32}{major}` passed through a fresh cipher keyed
/// with [`PROTOCOL_HEADER_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolHeader {
    pub minor_version: u32,
    pub major_version: Vec<u8>,
}

impl ProtocolHeader {
    /// Header announcing this node's identity.
    pub fn local(identity: &IdentityConfig) -> Self {
        Self {
            minor_version: identity.minor_version,
            major_version: identity.major_version.as_bytes().to_vec(),
        }
    }
}

impl WireCommand for ProtocolHeader {
    const OPCODE: Opcode = Opcode::ProtocolHeader;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let plain = cipher::crypt(&PROTOCOL_HEADER_KEY, payload);
        let mut r = Reader::new(&plain);
        let minor_version = r.u32_le()?;
        let major_version = r.bytes(r.remaining())?.to_vec();
        Ok(Self {
            minor_version,
            major_version,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut plain = Vec::with_capacity(4 + self.major_version.len());
        plain.put_u32_le(self.minor_version);
        plain.put_slice(&self.major_version);
        out.extend(cipher::crypt(&PROTOCOL_HEADER_KEY, &plain));
        Ok(())
    }
}

/// Command 01: line speed in KB/s.
///
/// Equality compares the raw bits, so a value that survives the wire
/// byte for byte compares equal, NaN included.
#[derive(Debug, Clone, Copy)]
pub struct Speed {
    pub kbps: f32,
}

impl PartialEq for Speed {
    fn eq(&self, other: &Self) -> bool {
        self.kbps.to_bits() == other.kbps.to_bits()
    }
}

impl Eq for Speed {}

impl WireCommand for Speed {
    const OPCODE: Opcode = Opcode::Speed;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            kbps: Reader::new(payload).f32_le()?,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.put_f32_le(self.kbps);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LinkType {
    Search = 0,
    Transfer = 1,
    BbsSearch = 2,
}

impl TryFrom<u8> for LinkType {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(LinkType::Search),
            1 => Ok(LinkType::Transfer),
            2 => Ok(LinkType::BbsSearch),
            other => Err(ProtocolError::FieldRange(format!(
                "{}: {other}",
                constants::ERR_UNKNOWN_LINK_TYPE
            ))),
        }
    }
}

/// Command 02: what this connection is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionType {
    pub link_type: LinkType,
    pub is_port0: bool,
    pub is_bad_port0: bool,
    pub is_bbs_link: bool,
}

impl WireCommand for ConnectionType {
    const OPCODE: Opcode = Opcode::ConnectionType;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        r.require(4)?;
        Ok(Self {
            link_type: LinkType::try_from(r.u8()?)?,
            is_port0: r.flag()?,
            is_bad_port0: r.flag()?,
            is_bbs_link: r.flag()?,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.put_u8(self.link_type as u8);
        out.put_u8(u8::from(self.is_port0));
        out.put_u8(u8::from(self.is_bad_port0));
        out.put_u8(u8::from(self.is_bbs_link));
        Ok(())
    }
}

fn read_words(r: &mut Reader<'_>, lens: [u8; CLUSTER_WORDS]) -> Result<[Vec<u8>; CLUSTER_WORDS]> {
    let mut words: [Vec<u8>; CLUSTER_WORDS] = Default::default();
    for (word, len) in words.iter_mut().zip(lens) {
        *word = r.bytes(usize::from(len))?.to_vec();
    }
    Ok(words)
}

/// Command 03: the sender's own endpoint, host name and clustering words.
///
/// Layout: `{addr:4}{port:u32}{host_len}{word_len x3}{host}{words}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    pub address: Ipv4Addr,
    pub port: u32,
    /// DDNS host name, empty when the node has none
    pub host: Vec<u8>,
    pub words: [Vec<u8>; CLUSTER_WORDS],
}

impl WireCommand for NodeDetails {
    const OPCODE: Opcode = Opcode::NodeDetails;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let address = r.ipv4()?;
        let port = r.u32_le()?;
        let host_len = r.u8()?;
        let word_lens = r.array::<CLUSTER_WORDS>()?;
        let host = r.bytes(usize::from(host_len))?.to_vec();
        let words = read_words(&mut r, word_lens)?;
        Ok(Self {
            address,
            port,
            host,
            words,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.put_slice(&self.address.octets());
        out.put_u32_le(self.port);
        out.put_u8(short_len("host", &self.host)?);
        for word in &self.words {
            out.put_u8(short_len("clustering word", word)?);
        }
        out.put_slice(&self.host);
        for word in &self.words {
            out.put_slice(word);
        }
        Ok(())
    }
}

/// Command 04: a third node the sender knows about.
///
/// Layout: `{addr:4}{sharing_port:u32}{bbs_port:u32}{is_bbs_node}{speed:u32}
/// {word_len x3}{words}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnotherNode {
    pub address: Ipv4Addr,
    pub sharing_port: u32,
    pub bbs_port: u32,
    pub is_bbs_node: bool,
    pub speed: u32,
    pub words: [Vec<u8>; CLUSTER_WORDS],
}

impl WireCommand for AnotherNode {
    const OPCODE: Opcode = Opcode::AnotherNode;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let address = r.ipv4()?;
        let sharing_port = r.u32_le()?;
        let bbs_port = r.u32_le()?;
        // only an exact 1 marks a BBS node
        let is_bbs_node = r.u8()? == 1;
        let speed = r.u32_le()?;
        let word_lens = r.array::<CLUSTER_WORDS>()?;
        let words = read_words(&mut r, word_lens)?;
        Ok(Self {
            address,
            sharing_port,
            bbs_port,
            is_bbs_node,
            speed,
            words,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.put_slice(&self.address.octets());
        out.put_u32_le(self.sharing_port);
        out.put_u32_le(self.bbs_port);
        out.put_u8(u8::from(self.is_bbs_node));
        out.put_u32_le(self.speed);
        for word in &self.words {
            out.put_u8(short_len("clustering word", word)?);
        }
        for word in &self.words {
            out.put_slice(word);
        }
        Ok(())
    }
}

/// Command 05: the port the sender's BBS listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BbsPort {
    pub port: u32,
}

impl WireCommand for BbsPort {
    const OPCODE: Opcode = Opcode::BbsPort;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            port: Reader::new(payload).u32_le()?,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.put_u32_le(self.port);
        Ok(())
    }
}

/// Commands 31-36 and 97.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    Close,
    ConnectedLimitation,
    WrongListeningPort,
    Reject,
    Slow,
    Liar,
    LowVersion,
}

impl CloseReason {
    pub fn opcode(self) -> Opcode {
        match self {
            CloseReason::Close => Opcode::Close,
            CloseReason::ConnectedLimitation => Opcode::ConnectedLimitation,
            CloseReason::WrongListeningPort => Opcode::WrongListeningPort,
            CloseReason::Reject => Opcode::Reject,
            CloseReason::Slow => Opcode::Slow,
            CloseReason::Liar => Opcode::Liar,
            CloseReason::LowVersion => Opcode::LowVersion,
        }
    }

    pub fn from_opcode(opcode: Opcode) -> Result<Self> {
        match opcode {
            Opcode::Close => Ok(CloseReason::Close),
            Opcode::ConnectedLimitation => Ok(CloseReason::ConnectedLimitation),
            Opcode::WrongListeningPort => Ok(CloseReason::WrongListeningPort),
            Opcode::Reject => Ok(CloseReason::Reject),
            Opcode::Slow => Ok(CloseReason::Slow),
            Opcode::Liar => Ok(CloseReason::Liar),
            Opcode::LowVersion => Ok(CloseReason::LowVersion),
            other => Err(ProtocolError::UnknownOpcode(other.as_u8())),
        }
    }
}
