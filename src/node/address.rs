use crate::core::reader::Reader;
use crate::error::{constants, ProtocolError, Result};
use crate::node::hash::{pack_hash, unpack_hash, NodeHash};
use crate::utils::conv::{address_to_bytes, bytes_to_address};
use bytes::BufMut;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

/// IPv4 endpoint as carried inside commands, text form `"a.b.c.d:port"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeAddress {
    pub octets: [u8; 4],
    pub port: u16,
}

impl NodeAddress {
    pub fn new(octets: [u8; 4], port: u16) -> Self {
        Self { octets, port }
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.octets)
    }

    /// Obfuscated `@` token for this endpoint.
    pub fn to_hash(&self) -> NodeHash {
        NodeHash::from_token_unchecked(pack_hash(&self.to_string()))
    }

    /// Accept either `"a.b.c.d:port"` or an `@` node hash token.
    pub fn parse_any(text: &str) -> Result<Self> {
        if text.starts_with('@') {
            unpack_hash(text)?.parse()
        } else {
            text.parse()
        }
    }

    /// Read the 6-byte wire form: four octets then a little-endian port.
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.require(6)?;
        let octets = r.array::<4>()?;
        let port = r.u16_le()?;
        Ok(Self { octets, port })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.put_slice(&self.octets);
        out.put_u16_le(self.port);
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", bytes_to_address(self.octets), self.port)
    }
}

impl FromStr for NodeAddress {
    type Err = ProtocolError;

    fn from_str(text: &str) -> Result<Self> {
        let (host, port) = text.rsplit_once(':').ok_or_else(|| {
            ProtocolError::AddressFormat(format!("{}: '{text}'", constants::ERR_BAD_ADDRESS))
        })?;
        let port = port.parse::<u16>().map_err(|_| {
            ProtocolError::AddressFormat(format!(
                "{}: port in '{text}'",
                constants::ERR_BAD_ADDRESS
            ))
        })?;
        Ok(Self {
            octets: address_to_bytes(host)?,
            port,
        })
    }
}

impl From<SocketAddrV4> for NodeAddress {
    fn from(addr: SocketAddrV4) -> Self {
        Self {
            octets: addr.ip().octets(),
            port: addr.port(),
        }
    }
}

impl From<NodeAddress> for SocketAddrV4 {
    fn from(addr: NodeAddress) -> Self {
        SocketAddrV4::new(addr.ip(), addr.port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_text_roundtrip() {
        let addr: NodeAddress = "192.168.1.1:4000".parse().unwrap();
        assert_eq!(addr.octets, [192, 168, 1, 1]);
        assert_eq!(addr.port, 4000);
        assert_eq!(addr.to_string(), "192.168.1.1:4000");
    }

    #[test]
    fn test_rejects_bad_text() {
        for bad in ["192.168.1.1", "192.168.1.1:", "192.168.1.1:70000", "1.2.3:80", "x:1"] {
            assert!(
                matches!(bad.parse::<NodeAddress>(), Err(ProtocolError::AddressFormat(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_any_accepts_tokens() {
        let plain = NodeAddress::parse_any("123.1.2.3:1234").unwrap();
        let hashed = NodeAddress::parse_any("@ba9582a383c7d6e79cd5d8c71f7347").unwrap();
        assert_eq!(plain, hashed);
        assert_eq!(plain.to_hash().as_str(), "@ba9582a383c7d6e79cd5d8c71f7347");
    }

    #[test]
    fn test_wire_form() {
        let addr = NodeAddress::new([192, 168, 1, 1], 4000);
        let mut out = Vec::new();
        addr.write(&mut out);
        assert_eq!(out, [0xC0, 0xA8, 0x01, 0x01, 0xA0, 0x0F]);
        assert_eq!(NodeAddress::read(&mut Reader::new(&out)).unwrap(), addr);
        assert!(NodeAddress::read(&mut Reader::new(&out[..5])).is_err());
    }

    #[test]
    fn test_socket_addr_conversion() {
        let sock = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 7), 6881);
        let addr = NodeAddress::from(sock);
        assert_eq!(SocketAddrV4::from(addr), sock);
    }
}
