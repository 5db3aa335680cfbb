//! Node hash tokens.
//!
//! A token is `"@"` followed by the hex of one checksum byte and the
//! ciphertext of an `"a.b.c.d:port"` string. The checksum byte both keys the
//! cipher (it replaces the first byte of [`NODE_HASH_KEY`]) and verifies the
//! decrypted text, so a corrupted token is detected rather than decoded into
//! a wrong address.

use crate::config::NODE_HASH_KEY;
use crate::error::{constants, ProtocolError, Result};
use crate::utils::checksum::sum8;
use crate::utils::cipher;
use crate::utils::conv::{hex_decode, hex_encode};
use std::fmt;
use std::str::FromStr;

/// `"@"` plus checksum byte plus the shortest address `"0.0.0.0:0"`, in hex.
pub const MIN_TOKEN_LEN: usize = 20;

fn hash_key(checksum: u8) -> [u8; 13] {
    let mut key = NODE_HASH_KEY;
    key[0] = checksum;
    key
}

/// Obfuscate address text into an `@` token.
///
/// ```
/// use winny_protocol::node::pack_hash;
/// assert_eq!(pack_hash("123.1.2.3:1234"), "@ba9582a383c7d6e79cd5d8c71f7347");
/// ```
pub fn pack_hash(address: &str) -> String {
    let checksum = sum8(address.as_bytes());
    let mut raw = Vec::with_capacity(1 + address.len());
    raw.push(checksum);
    raw.extend(cipher::crypt(&hash_key(checksum), address.as_bytes()));
    format!("@{}", hex_encode(&raw))
}

/// Recover the address text from an `@` token.
pub fn unpack_hash(token: &str) -> Result<String> {
    if token.len() < MIN_TOKEN_LEN {
        return Err(ProtocolError::TokenFormat(format!(
            "{}: {} characters",
            constants::ERR_TOKEN_TOO_SHORT,
            token.len()
        )));
    }
    let body = token
        .strip_prefix('@')
        .ok_or_else(|| ProtocolError::TokenFormat(constants::ERR_TOKEN_PREFIX.into()))?;
    if !body.is_ascii() {
        return Err(ProtocolError::TokenFormat(format!(
            "non-ASCII characters in '{token}'"
        )));
    }

    let as_token_error = |e: ProtocolError| ProtocolError::TokenFormat(e.to_string());
    let checksum = hex_decode(&body[..2]).map_err(as_token_error)?[0];
    let encoded = hex_decode(&body[2..]).map_err(as_token_error)?;

    let plain = cipher::crypt(&hash_key(checksum), &encoded);
    let actual = sum8(&plain);
    if actual != checksum {
        return Err(ProtocolError::ChecksumMismatch {
            expected: u16::from(checksum),
            actual: u16::from(actual),
        });
    }

    String::from_utf8(plain)
        .map_err(|_| ProtocolError::TokenFormat(constants::ERR_TOKEN_NOT_TEXT.into()))
}

/// A validated `@` token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHash(String);

impl NodeHash {
    pub fn pack(address: &str) -> Self {
        Self(pack_hash(address))
    }

    pub(crate) fn from_token_unchecked(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address text carried by this token.
    pub fn unpack(&self) -> Result<String> {
        unpack_hash(&self.0)
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeHash {
    type Err = ProtocolError;

    fn from_str(token: &str) -> Result<Self> {
        unpack_hash(token)?;
        Ok(Self(token.to_owned()))
    }
}
