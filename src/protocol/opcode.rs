//! Command codes.
//!
//! One byte after the length prefix selects the payload layout. Codes
//! 31-36 and 97 all close the connection and differ only in the reason they
//! report.

use crate::error::ProtocolError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Opcode {
    // Session setup
    ProtocolHeader = 0,
    Speed = 1,
    ConnectionType = 2,
    NodeDetails = 3,
    AnotherNode = 4,
    BbsPort = 5,

    // Search and transfer
    DiffusionRequest = 10,
    FileRequest = 11,
    ConditionalDiffusionRequest = 12,
    Query = 13,
    FileResponse = 21,

    // Connection close
    Close = 31,
    ConnectedLimitation = 32,
    WrongListeningPort = 33,
    Reject = 34,
    Slow = 35,
    Liar = 36,
    LowVersion = 97,
}

impl Opcode {
    pub const ALL: [Opcode; 18] = [
        Opcode::ProtocolHeader,
        Opcode::Speed,
        Opcode::ConnectionType,
        Opcode::NodeDetails,
        Opcode::AnotherNode,
        Opcode::BbsPort,
        Opcode::DiffusionRequest,
        Opcode::FileRequest,
        Opcode::ConditionalDiffusionRequest,
        Opcode::Query,
        Opcode::FileResponse,
        Opcode::Close,
        Opcode::ConnectedLimitation,
        Opcode::WrongListeningPort,
        Opcode::Reject,
        Opcode::Slow,
        Opcode::Liar,
        Opcode::LowVersion,
    ];

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for the codes that terminate a connection.
    pub fn is_close(self) -> bool {
        matches!(
            self,
            Opcode::Close
                | Opcode::ConnectedLimitation
                | Opcode::WrongListeningPort
                | Opcode::Reject
                | Opcode::Slow
                | Opcode::Liar
                | Opcode::LowVersion
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::ProtocolHeader => "ProtocolHeader",
            Opcode::Speed => "Speed",
            Opcode::ConnectionType => "ConnectionType",
            Opcode::NodeDetails => "NodeDetails",
            Opcode::AnotherNode => "AnotherNode",
            Opcode::BbsPort => "BBSPort",
            Opcode::DiffusionRequest => "DiffusionRequest",
            Opcode::FileRequest => "FileRequest",
            Opcode::ConditionalDiffusionRequest => "ConditionalDiffusionRequest",
            Opcode::Query => "Query",
            Opcode::FileResponse => "FileResponse",
            Opcode::Close => "Close",
            Opcode::ConnectedLimitation => "ConnectedLimitation",
            Opcode::WrongListeningPort => "WrongListeningPort",
            Opcode::Reject => "Reject",
            Opcode::Slow => "Slow",
            Opcode::Liar => "Liar",
            Opcode::LowVersion => "LowVersion",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.as_u8() == code)
            .ok_or(ProtocolError::UnknownOpcode(code))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}
