//! # Winny Protocol
//!
//! Wire codec for the Winny peer-to-peer overlay.
//!
//! The crate turns raw connection bytes into typed [`Command`] values and
//! back. It covers the length-prefixed frame, every command layout, the
//! legacy RC4-style stream cipher, the additive checksums and the `@` node
//! hash tokens peers use to exchange addresses.
//!
//! Sockets, peer ranking and retry logic live outside this crate: callers
//! feed bytes in and get commands out, or hand a command over and get bytes
//! ready to send.
//!
//! ## Layout
//! - Core: framing, payload reader, Tokio codec
//! - Protocol: opcodes, commands, KeyInfo records, session bootstrap, dispatch
//! - Node: endpoint addresses and their hash tokens
//! - Utils: cipher, checksums, conversions, logging
pub mod config;
pub mod error;

pub mod core;
pub mod node;
pub mod protocol;
pub mod utils;

pub use config::ProtocolConfig;
pub use core::codec::CommandCodec;
pub use error::{ProtocolError, Result};
pub use node::{NodeAddress, NodeHash};
pub use protocol::{Command, Opcode, WireCommand};
pub use utils::cipher::CipherState;
