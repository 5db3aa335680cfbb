//! # Commands
//!
//! [`Command`] is the closed set of Winny commands. Each variant wraps a
//! payload type implementing [`WireCommand`], which pairs a fixed opcode with
//! one decode and one encode routine. Decoding a frame is a single lookup on
//! the opcode byte.
//!
//! ## Layout policy
//! - Payloads shorter than their declared fields fail with `TruncatedRecord`
//! - Bytes after the last field are ignored, except for
//!   [`ConditionalDiffusionRequest`] whose size is fixed
//! - Encoding only fails with `FieldRange` for values the layout cannot carry

use crate::core::frame;
use crate::error::{ProtocolError, Result};
use crate::protocol::opcode::Opcode;
use crate::protocol::search::{ConditionalDiffusionRequest, DiffusionRequest, Query};
use crate::protocol::session::{
    AnotherNode, BbsPort, CloseReason, ConnectionType, NodeDetails, ProtocolHeader, Speed,
};
use crate::protocol::transfer::{FileRequest, FileResponse};

/// Payload layout of a single opcode.
pub trait WireCommand: Sized {
    const OPCODE: Opcode;

    /// Parse a payload (the bytes after the opcode).
    fn decode_payload(payload: &[u8]) -> Result<Self>;

    /// Append this command's payload to `out`.
    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()>;

    /// Complete frame, header included.
    fn to_frame(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.encode_payload(&mut payload)?;
        frame::encode(Self::OPCODE.as_u8(), &payload)
    }

    /// Parse a complete frame that must carry this command's opcode.
    fn from_frame(buf: &[u8]) -> Result<Self> {
        let (header, payload) = frame::split(buf)?;
        if header.opcode != Self::OPCODE.as_u8() {
            return Err(ProtocolError::Framing(format!(
                "expected opcode {}, found {}",
                Self::OPCODE,
                header.opcode
            )));
        }
        Self::decode_payload(payload)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ProtocolHeader(ProtocolHeader),
    Speed(Speed),
    ConnectionType(ConnectionType),
    NodeDetails(NodeDetails),
    AnotherNode(AnotherNode),
    BbsPort(BbsPort),
    DiffusionRequest(DiffusionRequest),
    FileRequest(FileRequest),
    ConditionalDiffusionRequest(ConditionalDiffusionRequest),
    Query(Query),
    FileResponse(FileResponse),
    Close(CloseReason),
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::ProtocolHeader(_) => ProtocolHeader::OPCODE,
            Command::Speed(_) => Speed::OPCODE,
            Command::ConnectionType(_) => ConnectionType::OPCODE,
            Command::NodeDetails(_) => NodeDetails::OPCODE,
            Command::AnotherNode(_) => AnotherNode::OPCODE,
            Command::BbsPort(_) => BbsPort::OPCODE,
            Command::DiffusionRequest(_) => DiffusionRequest::OPCODE,
            Command::FileRequest(_) => FileRequest::OPCODE,
            Command::ConditionalDiffusionRequest(_) => ConditionalDiffusionRequest::OPCODE,
            Command::Query(_) => Query::OPCODE,
            Command::FileResponse(_) => FileResponse::OPCODE,
            Command::Close(reason) => reason.opcode(),
        }
    }

    /// Decode the payload of a frame whose opcode is already known.
    pub fn decode_payload(opcode: u8, payload: &[u8]) -> Result<Self> {
        let command = match Opcode::try_from(opcode)? {
            Opcode::ProtocolHeader => {
                Command::ProtocolHeader(ProtocolHeader::decode_payload(payload)?)
            }
            Opcode::Speed => Command::Speed(Speed::decode_payload(payload)?),
            Opcode::ConnectionType => {
                Command::ConnectionType(ConnectionType::decode_payload(payload)?)
            }
            Opcode::NodeDetails => Command::NodeDetails(NodeDetails::decode_payload(payload)?),
            Opcode::AnotherNode => Command::AnotherNode(AnotherNode::decode_payload(payload)?),
            Opcode::BbsPort => Command::BbsPort(BbsPort::decode_payload(payload)?),
            Opcode::DiffusionRequest => {
                Command::DiffusionRequest(DiffusionRequest::decode_payload(payload)?)
            }
            Opcode::FileRequest => Command::FileRequest(FileRequest::decode_payload(payload)?),
            Opcode::ConditionalDiffusionRequest => Command::ConditionalDiffusionRequest(
                ConditionalDiffusionRequest::decode_payload(payload)?,
            ),
            Opcode::Query => Command::Query(Query::decode_payload(payload)?),
            Opcode::FileResponse => Command::FileResponse(FileResponse::decode_payload(payload)?),
            close => Command::Close(CloseReason::from_opcode(close)?),
        };
        Ok(command)
    }

    /// Decode the frame at the start of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (header, payload) = frame::split(buf)?;
        Self::decode_payload(header.opcode, payload)
    }

    /// Encode just the payload.
    pub fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Command::ProtocolHeader(c) => c.encode_payload(out),
            Command::Speed(c) => c.encode_payload(out),
            Command::ConnectionType(c) => c.encode_payload(out),
            Command::NodeDetails(c) => c.encode_payload(out),
            Command::AnotherNode(c) => c.encode_payload(out),
            Command::BbsPort(c) => c.encode_payload(out),
            Command::DiffusionRequest(c) => c.encode_payload(out),
            Command::FileRequest(c) => c.encode_payload(out),
            Command::ConditionalDiffusionRequest(c) => c.encode_payload(out),
            Command::Query(c) => c.encode_payload(out),
            Command::FileResponse(c) => c.encode_payload(out),
            // close commands carry no payload
            Command::Close(_) => Ok(()),
        }
    }

    /// Encode a complete frame.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.encode_payload(&mut payload)?;
        frame::encode(self.opcode().as_u8(), &payload)
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Command {
                fn from(value: $ty) -> Self {
                    Command::$ty(value)
                }
            }
        )*
    };
}

impl_from_payload!(
    ProtocolHeader,
    Speed,
    ConnectionType,
    NodeDetails,
    AnotherNode,
    BbsPort,
    DiffusionRequest,
    FileRequest,
    ConditionalDiffusionRequest,
    Query,
    FileResponse,
);

impl From<CloseReason> for Command {
    fn from(reason: CloseReason) -> Self {
        Command::Close(reason)
    }
}
