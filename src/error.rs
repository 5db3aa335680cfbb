//! # Error Types
//!
//! Error handling for the Winny wire protocol.
//!
//! Every decode entry point returns either a fully valid typed value or one of
//! the variants below; no partially populated command ever reaches the caller.
//! Once a decode fails on a stream, frame boundaries can no longer be trusted
//! and the connection should be closed.
//!
//! ## Error Categories
//! - **Framing**: header too short, zero length, payload shorter than declared
//! - **Record**: truncated variable-length records, out-of-range field values
//! - **Text**: invalid hex, malformed dotted-quad addresses, malformed node tokens
//! - **Integrity**: checksum mismatches on obfuscated fields
//!
//! ## Example Usage
//! ```rust
//! use winny_protocol::error::{ProtocolError, Result};
//! use winny_protocol::utils::conv::address_to_bytes;
//!
//! fn parse(text: &str) -> Result<[u8; 4]> {
//!     address_to_bytes(text)
//! }
//!
//! assert!(matches!(parse("10.0.0"), Err(ProtocolError::AddressFormat(_))));
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Framing errors
    pub const ERR_HEADER_TOO_SHORT: &str = "Frame header requires 5 bytes";
    pub const ERR_ZERO_LENGTH: &str = "Frame length must count the opcode byte";
    pub const ERR_PAYLOAD_TOO_SHORT: &str = "Frame payload shorter than declared length";
    pub const ERR_FIXED_SIZE_MISMATCH: &str = "Payload size does not match fixed layout";
    pub const ERR_FRAME_TOO_LARGE: &str = "Declared frame length exceeds codec limit";

    /// Field range errors
    pub const ERR_UNKNOWN_LINK_TYPE: &str = "Unknown connection link type";
    pub const ERR_FIELD_TOO_LONG: &str = "Field exceeds its encodable length";
    pub const ERR_INTEGER_WIDTH: &str = "Integer field must be 1 to 8 bytes wide";

    /// Text errors
    pub const ERR_BAD_ADDRESS: &str = "Bad address format";
    pub const ERR_OCTET_RANGE: &str = "Address octet above 255";
    pub const ERR_TOKEN_TOO_SHORT: &str = "Node hash token is too short";
    pub const ERR_TOKEN_PREFIX: &str = "Node hash token must start with '@'";
    pub const ERR_TOKEN_NOT_TEXT: &str = "Node hash token does not decode to text";

    /// Dispatch errors
    pub const ERR_HANDLERS_POISONED: &str = "Handler registry lock poisoned";
}

// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Framing error: {0}")]
    Framing(String),

    #[error("Field out of range: {0}")]
    FieldRange(String),

    #[error("Truncated record: needed {needed} bytes, {available} available")]
    TruncatedRecord { needed: usize, available: usize },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Address format error: {0}")]
    AddressFormat(String),

    #[error("Token format error: {0}")]
    TokenFormat(String),

    #[error("Checksum mismatch: expected {expected:#06x}, computed {actual:#06x}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("Unknown opcode: {0}")]
    UnknownOpcode(u8),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
