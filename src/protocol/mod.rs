//! # Protocol Layer
//!
//! The Winny command catalog and the session logic around it.
//!
//! ## Components
//! - **Opcode**: one-byte command codes
//! - **Message**: the [`Command`] enum and the [`WireCommand`] trait
//! - **Session / Search / Transfer**: payload layouts grouped by purpose
//! - **KeyInfo**: shared-file record nested inside queries
//! - **Handshake**: init blocks that key each direction's cipher
//! - **Dispatcher**: opcode-keyed routing of decoded commands

pub mod dispatcher;
pub mod handshake;
pub mod keyinfo;
pub mod message;
pub mod opcode;
pub mod search;
pub mod session;
pub mod transfer;

pub use keyinfo::KeyInfo;
pub use message::{Command, WireCommand};
pub use opcode::Opcode;
pub use search::{ConditionalDiffusionRequest, DiffusionRequest, Query, ViaNode};
pub use session::{
    AnotherNode, BbsPort, CloseReason, ConnectionType, LinkType, NodeDetails, ProtocolHeader,
    Speed,
};
pub use transfer::{FileRequest, FileResponse};
