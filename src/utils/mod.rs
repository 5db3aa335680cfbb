//! # Utility Modules
//!
//! Leaf building blocks shared by the envelope, the command catalog and the
//! node hash codec.
//!
//! ## Components
//! - **Conv**: hex, little-endian integers, C strings, dotted-quad addresses
//! - **Checksum**: 8/16/32-bit additive checksums
//! - **Cipher**: the RC4-style obfuscation stream
//! - **Logging**: structured logging configuration
//!
//! ## Security
//! - The cipher is legacy obfuscation and must not be relied on for secrecy
//! - Checksums only detect accidental corruption of obfuscated fields

pub mod checksum;
pub mod cipher;
pub mod conv;
pub mod logging;

pub use cipher::CipherState;
