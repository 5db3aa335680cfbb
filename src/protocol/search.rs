//! Search commands: diffusion requests and queries.

use crate::core::reader::{check_len, short_len, Reader};
use crate::error::{constants, ProtocolError, Result};
use crate::node::NodeAddress;
use crate::protocol::keyinfo::{KeyInfo, SIGN_LEN};
use crate::protocol::message::WireCommand;
use crate::protocol::opcode::Opcode;
use crate::utils::conv::truncate_at_nul;
use bytes::BufMut;

/// Command 10: ask the peer to diffuse its keys. Carries nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffusionRequest;

impl WireCommand for DiffusionRequest {
    const OPCODE: Opcode = Opcode::DiffusionRequest;

    fn decode_payload(_payload: &[u8]) -> Result<Self> {
        Ok(DiffusionRequest)
    }

    fn encode_payload(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

pub const CONDITIONAL_KEYWORD_LEN: usize = 255;
pub const CONDITIONAL_SIGN_LEN: usize = 17;
pub const CONDITIONAL_PAYLOAD_LEN: usize = CONDITIONAL_KEYWORD_LEN + CONDITIONAL_SIGN_LEN + 4;

/// Command 12: diffusion restricted to a keyword and a tripcode.
///
/// Both text fields sit zero-padded inside fixed-width slots, so the payload
/// is always exactly [`CONDITIONAL_PAYLOAD_LEN`] bytes. Decoding drops every
/// zero byte in a slot, not just the padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalDiffusionRequest {
    pub keyword: Vec<u8>,
    pub sign: Vec<u8>,
    pub query_id: u32,
}

impl WireCommand for ConditionalDiffusionRequest {
    const OPCODE: Opcode = Opcode::ConditionalDiffusionRequest;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() != CONDITIONAL_PAYLOAD_LEN {
            return Err(ProtocolError::Framing(format!(
                "{}: {} payload is {} bytes (expected {CONDITIONAL_PAYLOAD_LEN})",
                constants::ERR_FIXED_SIZE_MISMATCH,
                Self::OPCODE,
                payload.len()
            )));
        }
        let mut r = Reader::new(payload);
        let keyword = strip_nul(r.bytes(CONDITIONAL_KEYWORD_LEN)?);
        let sign = strip_nul(r.bytes(CONDITIONAL_SIGN_LEN)?);
        let query_id = r.u32_le()?;
        Ok(Self {
            keyword,
            sign,
            query_id,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        // one slot byte is kept for the terminator
        check_len("keyword", &self.keyword, CONDITIONAL_KEYWORD_LEN - 1)?;
        check_len("sign", &self.sign, CONDITIONAL_SIGN_LEN - 1)?;
        out.put_slice(&self.keyword);
        out.put_bytes(0, CONDITIONAL_KEYWORD_LEN - self.keyword.len());
        out.put_slice(&self.sign);
        out.put_bytes(0, CONDITIONAL_SIGN_LEN - self.sign.len());
        out.put_u32_le(self.query_id);
        Ok(())
    }
}

fn strip_nul(slot: &[u8]) -> Vec<u8> {
    slot.iter().copied().filter(|&b| b != 0).collect()
}

/// A relay hop recorded in a query's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViaNode {
    pub address: NodeAddress,
}

impl From<NodeAddress> for ViaNode {
    fn from(address: NodeAddress) -> Self {
        Self { address }
    }
}

/// Command 13: a keyword search, or the answer to one.
///
/// Layout: `{is_response}{is_diffusion}{is_downstream}{is_bbs}{query_id:u32}
/// {keyword_len}{keyword}{sign:11}{via_count:u8}{via x 6}{key_count:u16}
/// {KeyInfo...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub is_response: bool,
    pub is_diffusion: bool,
    pub is_downstream: bool,
    pub is_bbs: bool,
    pub query_id: u32,
    pub keyword: Vec<u8>,
    /// Tripcode filter, trimmed at the first zero byte
    pub sign: Vec<u8>,
    pub via_nodes: Vec<ViaNode>,
    pub keys: Vec<KeyInfo>,
}

impl Query {
    /// Whether `address` already appears on the relay path.
    pub fn has_visited(&self, address: &NodeAddress) -> bool {
        self.via_nodes.iter().any(|via| via.address == *address)
    }
}

impl WireCommand for Query {
    const OPCODE: Opcode = Opcode::Query;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let is_response = r.flag()?;
        let is_diffusion = r.flag()?;
        let is_downstream = r.flag()?;
        let is_bbs = r.flag()?;
        let query_id = r.u32_le()?;
        let keyword = r.short_bytes()?.to_vec();
        let sign = truncate_at_nul(r.bytes(SIGN_LEN)?).to_vec();

        let via_count = usize::from(r.u8()?);
        // counts are untrusted: prove the bytes exist before allocating
        r.require(via_count * 6)?;
        let mut via_nodes = Vec::with_capacity(via_count);
        for _ in 0..via_count {
            via_nodes.push(ViaNode {
                address: NodeAddress::read(&mut r)?,
            });
        }

        let key_count = usize::from(r.u16_le()?);
        let mut keys = Vec::with_capacity(key_count.min(r.remaining() / MIN_KEYINFO_LEN));
        for _ in 0..key_count {
            keys.push(KeyInfo::read(&mut r)?);
        }

        Ok(Self {
            is_response,
            is_diffusion,
            is_downstream,
            is_bbs,
            query_id,
            keyword,
            sign,
            via_nodes,
            keys,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        let keyword_len = short_len("keyword", &self.keyword)?;
        check_len("sign", &self.sign, SIGN_LEN)?;
        let via_count = u8::try_from(self.via_nodes.len()).map_err(|_| {
            ProtocolError::FieldRange(format!(
                "{}: {} via nodes (maximum: 255)",
                constants::ERR_FIELD_TOO_LONG,
                self.via_nodes.len()
            ))
        })?;
        let key_count = u16::try_from(self.keys.len()).map_err(|_| {
            ProtocolError::FieldRange(format!(
                "{}: {} keys (maximum: 65535)",
                constants::ERR_FIELD_TOO_LONG,
                self.keys.len()
            ))
        })?;

        out.put_u8(u8::from(self.is_response));
        out.put_u8(u8::from(self.is_diffusion));
        out.put_u8(u8::from(self.is_downstream));
        out.put_u8(u8::from(self.is_bbs));
        out.put_u32_le(self.query_id);
        out.put_u8(keyword_len);
        out.put_slice(&self.keyword);
        out.put_slice(&self.sign);
        out.put_bytes(0, SIGN_LEN - self.sign.len());
        out.put_u8(via_count);
        for via in &self.via_nodes {
            via.address.write(out);
        }
        out.put_u16_le(key_count);
        for key in &self.keys {
            key.write(out)?;
        }
        Ok(())
    }
}

/// Smallest encoded KeyInfo: every variable-length field empty.
const MIN_KEYINFO_LEN: usize = 6 + 6 + 4 + 16 + 1 + 2 + 11 + 1 + 2 + 4 + 4 + 1 + 1;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::utils::conv::{hex_decode, hex_encode};

    #[test]
    fn test_diffusion_request_golden() {
        let frame = DiffusionRequest.to_frame().unwrap();
        assert_eq!(hex_encode(&frame), "010000000a");
        assert_eq!(DiffusionRequest::from_frame(&frame).unwrap(), DiffusionRequest);
    }

    #[test]
    fn test_conditional_diffusion_golden() {
        let command = ConditionalDiffusionRequest {
            keyword: b"Abc".to_vec(),
            sign: b"Xyz".to_vec(),
            query_id: 20,
        };
        let frame = command.to_frame().unwrap();
        let mut expected = hex_decode("150100000c416263").unwrap();
        expected.resize(5 + CONDITIONAL_KEYWORD_LEN, 0);
        expected.extend_from_slice(b"Xyz");
        expected.resize(5 + CONDITIONAL_KEYWORD_LEN + CONDITIONAL_SIGN_LEN, 0);
        expected.extend_from_slice(&[0x14, 0, 0, 0]);
        assert_eq!(frame, expected);
        assert_eq!(ConditionalDiffusionRequest::from_frame(&frame).unwrap(), command);
    }

    #[test]
    fn test_conditional_diffusion_exact_size() {
        let mut payload = vec![0u8; CONDITIONAL_PAYLOAD_LEN];
        assert!(ConditionalDiffusionRequest::decode_payload(&payload).is_ok());
        payload.push(0);
        assert!(matches!(
            ConditionalDiffusionRequest::decode_payload(&payload),
            Err(ProtocolError::Framing(_))
        ));
        payload.truncate(CONDITIONAL_PAYLOAD_LEN - 1);
        assert!(matches!(
            ConditionalDiffusionRequest::decode_payload(&payload),
            Err(ProtocolError::Framing(_))
        ));
    }

    #[test]
    fn test_conditional_diffusion_keeps_terminator() {
        let command = ConditionalDiffusionRequest {
            keyword: vec![b'k'; CONDITIONAL_KEYWORD_LEN],
            sign: Vec::new(),
            query_id: 0,
        };
        assert!(matches!(
            command.to_frame(),
            Err(ProtocolError::FieldRange(_))
        ));
    }

    #[test]
    fn test_conditional_diffusion_drops_inner_zeros() {
        let mut payload = vec![0u8; CONDITIONAL_PAYLOAD_LEN];
        payload[..4].copy_from_slice(b"a\0b\0");
        payload[CONDITIONAL_KEYWORD_LEN..CONDITIONAL_KEYWORD_LEN + 3].copy_from_slice(b"\0xy");
        let decoded = ConditionalDiffusionRequest::decode_payload(&payload).unwrap();
        assert_eq!(decoded.keyword, b"ab".to_vec());
        assert_eq!(decoded.sign, b"xy".to_vec());
    }

    fn sample_key() -> KeyInfo {
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
    fn test_query_golden() {
        let via = NodeAddress::new([192, 168, 1, 1], 4000);
        let query = Query {
            is_diffusion: true,
            query_id: 300,
            keyword: b"abc".to_vec(),
            sign: b"xyz".to_vec(),
            via_nodes: vec![via.into()],
            keys: vec![sample_key()],
            ..Default::default()
        };
        let frame = query.to_frame().unwrap();
        assert_eq!(
            hex_encode(&frame),
            concat!(
                "620000000d000100002c0100000361626378797a000000000000000001c0a80101a00f0100",
                "c0a80101a00fc0a80102a10fe8030000666363336232326265623463323432630326018f7b1e",
                "78797a00000000000000000358595a64007800000009185c440006"
            )
        );
        let decoded = Query::from_frame(&frame).unwrap();
        assert_eq!(decoded, query);
        assert!(decoded.has_visited(&via));
    }

    #[test]
    fn test_query_adversarial_counts() {
        // 255 via nodes declared, none present
        let mut payload = vec![0, 0, 0, 0, 1, 0, 0, 0, 0];
        payload.extend_from_slice(&[0; SIGN_LEN]);
        payload.push(0xFF);
        assert!(matches!(
            Query::decode_payload(&payload),
            Err(ProtocolError::TruncatedRecord { needed: 1530, .. })
        ));

        // no via nodes, 65535 keys declared, none present
        payload.pop();
        payload.extend_from_slice(&[0, 0xFF, 0xFF]);
        assert!(matches!(
            Query::decode_payload(&payload),
            Err(ProtocolError::TruncatedRecord { .. })
        ));
    }

    #[test]
    fn test_query_empty_lists() {
        let query = Query {
            is_response: true,
            query_id: 7,
            ..Default::default()
        };
        let frame = query.to_frame().unwrap();
        assert_eq!(Query::from_frame(&frame).unwrap(), query);
    }

    #[test]
    fn test_min_keyinfo_len() {
        let key = KeyInfo {
            hash: Vec::new(),
            file_name: Vec::new(),
            sharing_sign: Vec::new(),
            bbs_sign: Vec::new(),
            ..sample_key()
        };
        assert_eq!(key.encode().unwrap().len(), MIN_KEYINFO_LEN);
    }
}
