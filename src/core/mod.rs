//! # Core Protocol Components
//!
//! Framing, bounds-checked payload reading and the stream codec.
//!
//! ## Components
//! - **Frame**: the 5-byte header shared by every command
//! - **Reader**: cursor over untrusted payload bytes
//! - **Codec**: Tokio codec that decrypts, frames and decodes a connection
//!
//! ## Wire Format
//! ```text
//! [Length(4, LE)] [Opcode(1)] [Payload(Length - 1)]
//! ```
//!
//! ## Security
//! - Declared lengths are checked against the codec limit before buffering
//! - Every slice is bounds-checked; short input fails, never panics

pub mod codec;
pub mod frame;
pub mod reader;

pub use codec::CommandCodec;
pub use frame::FrameHeader;
