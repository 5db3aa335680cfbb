//! # KeyInfo
//!
//! Descriptor of one shared file, carried in the tail of a query.
//!
//! ## Wire Format
//! ```text
//! [Sharing(4+2)] [BBS(4+2)] [Size(4)] [Hash(16)] [NameLen(1)]
//! [NameSum(2)] [Name(NameLen), encrypted] [Sign(11)]
//! [BbsSignLen(1)] [BbsSign] [TTL(2)] [Block(4)] [MTime(4)]
//! [Ignore(1)] [Version(1)]
//! ```
//!
//! The file name is encrypted with a one-byte key: the low byte of
//! `sum16(name)`. Both checksum bytes travel in clear ahead of it so a reader
//! can decrypt first and verify later.

use crate::core::reader::{check_len, short_len, Reader};
use crate::error::{ProtocolError, Result};
use crate::node::NodeAddress;
use crate::utils::checksum::sum16;
use crate::utils::cipher;
use crate::utils::conv::truncate_at_nul;
use bytes::BufMut;

pub const HASH_LEN: usize = 16;
pub const SIGN_LEN: usize = 11;

/// Record versions issued by known clients. Others are carried as-is.
pub const KNOWN_VERSIONS: [u8; 3] = [4, 5, 6];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub sharing: NodeAddress,
    pub bbs: NodeAddress,
    pub file_size: u32,
    /// File hash, trimmed at the first zero byte
    pub hash: Vec<u8>,
    /// Plaintext file name
    pub file_name: Vec<u8>,
    /// Tripcode of the sharing node, trimmed at the first zero byte
    pub sharing_sign: Vec<u8>,
    pub bbs_sign: Vec<u8>,
    pub ttl: u16,
    pub block_size: u32,
    /// Seconds since the Unix epoch
    pub modified_time: u32,
    pub ignore: bool,
    pub version: u8,
}

fn zero_padded(out: &mut Vec<u8>, field: &str, value: &[u8], width: usize) -> Result<()> {
    check_len(field, value, width)?;
    out.put_slice(value);
    out.put_bytes(0, width - value.len());
    Ok(())
}

impl KeyInfo {
    /// `sum16` of the plaintext file name.
    pub fn name_checksum(&self) -> u16 {
        sum16(&self.file_name)
    }

    /// Compare a checksum read off the wire against the decrypted name.
    pub fn verify_name_checksum(&self, stored: u16) -> Result<()> {
        let actual = self.name_checksum();
        if actual != stored {
            return Err(ProtocolError::ChecksumMismatch {
                expected: stored,
                actual,
            });
        }
        Ok(())
    }

    pub fn is_known_version(&self) -> bool {
        KNOWN_VERSIONS.contains(&self.version)
    }

    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Self::read_with_checksum(r).map(|(info, _)| info)
    }

    /// Read one record and also return the name checksum it carried.
    pub fn read_with_checksum(r: &mut Reader<'_>) -> Result<(Self, u16)> {
        let sharing = NodeAddress::read(r)?;
        let bbs = NodeAddress::read(r)?;
        let file_size = r.u32_le()?;
        let hash = truncate_at_nul(r.bytes(HASH_LEN)?).to_vec();
        let name_len = usize::from(r.u8()?);
        let stored = r.u16_le()?;
        let key = [stored.to_le_bytes()[0]];
        let file_name = cipher::crypt(&key, r.bytes(name_len)?);
        let sharing_sign = truncate_at_nul(r.bytes(SIGN_LEN)?).to_vec();
        let bbs_sign = r.short_bytes()?.to_vec();
        let ttl = r.u16_le()?;
        let block_size = r.u32_le()?;
        let modified_time = r.u32_le()?;
        let ignore = r.flag()?;
        let version = r.u8()?;

        let info = Self {
            sharing,
            bbs,
            file_size,
            hash,
            file_name,
            sharing_sign,
            bbs_sign,
            ttl,
            block_size,
            modified_time,
            ignore,
            version,
        };
        Ok((info, stored))
    }

    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let name_len = short_len("file name", &self.file_name)?;
        let bbs_sign_len = short_len("bbs sign", &self.bbs_sign)?;
        let checksum = self.name_checksum().to_le_bytes();

        self.sharing.write(out);
        self.bbs.write(out);
        out.put_u32_le(self.file_size);
        zero_padded(out, "hash", &self.hash, HASH_LEN)?;
        out.put_u8(name_len);
        out.put_slice(&checksum);
        out.put_slice(&cipher::crypt(&checksum[..1], &self.file_name));
        zero_padded(out, "sharing sign", &self.sharing_sign, SIGN_LEN)?;
        out.put_u8(bbs_sign_len);
        out.put_slice(&self.bbs_sign);
        out.put_u16_le(self.ttl);
        out.put_u32_le(self.block_size);
        out.put_u32_le(self.modified_time);
        out.put_u8(u8::from(self.ignore));
        out.put_u8(self.version);
        Ok(())
    }

    /// Decode a single record; trailing bytes are ignored.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::read(&mut Reader::new(buf))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::utils::conv::{hex_decode, hex_encode};

    const GOLDEN: &str = "c0a80101a00fc0a80102a10fe8030000666363336232326265623463323432630326018f7b1e78797a00000000000000000358595a64007800000009185c440006";

    fn sample() -> KeyInfo {
        KeyInfo {
            sharing: NodeAddress::new([192, 168, 1, 1], 4000),
            bbs: NodeAddress::new([192, 168, 1, 2], 4001),
            file_size: 1000,
            hash: b"fcc3b22beb4c242c".to_vec(),
            file_name: b"abc".to_vec(),
            sharing_sign: b"xyz".to_vec(),
            bbs_sign: b"XYZ".to_vec(),
            ttl: 100,
            block_size: 120,
            modified_time: 1_146_886_153,
            ignore: false,
            version: 6,
        }
    }

    #[test]
    fn test_golden_encode_decode() {
        let info = sample();
        assert_eq!(hex_encode(&info.encode().unwrap()), GOLDEN);
        assert_eq!(KeyInfo::decode(&hex_decode(GOLDEN).unwrap()).unwrap(), info);
    }

    #[test]
    fn test_stored_checksum_matches_name() {
        let bytes = hex_decode(GOLDEN).unwrap();
        let (info, stored) = KeyInfo::read_with_checksum(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(stored, 0x0126);
        assert!(info.verify_name_checksum(stored).is_ok());
        assert!(info.is_known_version());
    }

    #[test]
    fn test_tampered_name_fails_verification() {
        let mut bytes = hex_decode(GOLDEN).unwrap();
        // first encrypted name byte
        bytes[35] ^= 0x01;
        let (info, stored) = KeyInfo::read_with_checksum(&mut Reader::new(&bytes)).unwrap();
        assert_ne!(info.file_name, b"abc".to_vec());
        assert!(matches!(
            info.verify_name_checksum(stored),
            Err(ProtocolError::ChecksumMismatch { expected: 0x0126, .. })
        ));
    }

    #[test]
    fn test_name_checksum_with_zero_low_byte() {
        let mut info = sample();
        info.file_name = vec![0x80, 0x80];
        assert_eq!(info.name_checksum(), 0x0100);

        let bytes = info.encode().unwrap();
        assert_eq!(&bytes[33..35], &[0x00, 0x01]);
        assert_eq!(&bytes[35..37], &cipher::crypt(&[0], &[0x80, 0x80])[..]);

        let (decoded, stored) = KeyInfo::read_with_checksum(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, info);
        assert!(decoded.verify_name_checksum(stored).is_ok());
    }

    #[test]
    fn test_unknown_version_passes_through() {
        let mut info = sample();
        info.version = 9;
        let decoded = KeyInfo::decode(&info.encode().unwrap()).unwrap();
        assert_eq!(decoded.version, 9);
        assert!(!decoded.is_known_version());
    }

    #[test]
    fn test_truncated_record() {
        let bytes = hex_decode(GOLDEN).unwrap();
        for cut in [0, 5, 20, 38, 40, 55, bytes.len() - 1] {
            assert!(
                matches!(
                    KeyInfo::decode(&bytes[..cut]),
                    Err(ProtocolError::TruncatedRecord { .. })
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_oversized_fields_rejected() {
        let mut info = sample();
        info.hash = vec![b'a'; HASH_LEN + 1];
        assert!(matches!(info.encode(), Err(ProtocolError::FieldRange(_))));

        let mut info = sample();
        info.sharing_sign = vec![b's'; SIGN_LEN + 1];
        assert!(matches!(info.encode(), Err(ProtocolError::FieldRange(_))));

        let mut info = sample();
        info.file_name = vec![b'n'; 256];
        assert!(matches!(info.encode(), Err(ProtocolError::FieldRange(_))));
    }
}
