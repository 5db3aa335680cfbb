//! Byte and value conversion helpers.
//!
//! All Winny integers travel little-endian. Text fields are raw bytes in the
//! sender's legacy encoding, so nothing here assumes UTF-8 except the
//! dotted-quad helpers.

use crate::error::{constants, ProtocolError, Result};

/// Encode bytes as lowercase hex, two digits per byte.
///
/// ```
/// use winny_protocol::utils::conv::hex_encode;
/// assert_eq!(hex_encode(b"Aa"), "4161");
/// ```
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string. Odd lengths and non-hex characters are rejected.
pub fn hex_decode(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| ProtocolError::Encoding(e.to_string()))
}

/// Prefix of `bytes` before the first zero byte, or all of it.
pub fn truncate_at_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

#[inline]
pub fn u32_to_le_bytes(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

/// Interpret 1 to 8 bytes as a little-endian unsigned integer.
///
/// The same routine decodes 2-byte port fields and 4-byte counters.
pub fn le_bytes_to_uint(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(ProtocolError::FieldRange(format!(
            "{}: got {}",
            constants::ERR_INTEGER_WIDTH,
            bytes.len()
        )));
    }
    Ok(bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Parse dotted-quad text into four octets.
pub fn address_to_bytes(text: &str) -> Result<[u8; 4]> {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return Err(ProtocolError::AddressFormat(format!(
            "{}: '{text}'",
            constants::ERR_BAD_ADDRESS
        )));
    }

    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(parts) {
        let value: u32 = part.parse().map_err(|_| {
            ProtocolError::AddressFormat(format!("{}: '{text}'", constants::ERR_BAD_ADDRESS))
        })?;
        *slot = u8::try_from(value).map_err(|_| {
            ProtocolError::AddressFormat(format!(
                "{}: octet {value} in '{text}'",
                constants::ERR_OCTET_RANGE
            ))
        })?;
    }
    Ok(octets)
}

pub fn bytes_to_address(octets: [u8; 4]) -> String {
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}
