//! Bounds-checked cursor over an untrusted payload.
//!
//! Every read either yields exactly the requested bytes or fails with
//! [`ProtocolError::TruncatedRecord`]; the cursor never panics on short input.

use crate::error::{constants, ProtocolError, Result};
use crate::utils::conv::le_bytes_to_uint;
use std::net::Ipv4Addr;

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fail unless at least `needed` bytes are left.
    pub fn require(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(ProtocolError::TruncatedRecord {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.require(len)?;
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Up to `max` bytes, fewer if the payload ends first.
    pub fn bytes_up_to(&mut self, max: usize) -> &'a [u8] {
        let len = max.min(self.remaining());
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        out
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn flag(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(le_bytes_to_uint(self.bytes(2)?)? as u16)
    }

    pub fn u32_le(&mut self) -> Result<u32> {
        Ok(le_bytes_to_uint(self.bytes(4)?)? as u32)
    }

    pub fn f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array::<4>()?))
    }

    pub fn ipv4(&mut self) -> Result<Ipv4Addr> {
        Ok(Ipv4Addr::from(self.array::<4>()?))
    }

    /// A length byte followed by that many bytes.
    pub fn short_bytes(&mut self) -> Result<&'a [u8]> {
        let len = usize::from(self.u8()?);
        self.bytes(len)
    }
}

/// Fail with `FieldRange` when `value` is longer than `max` bytes.
pub(crate) fn check_len(field: &str, value: &[u8], max: usize) -> Result<()> {
    if value.len() > max {
        return Err(ProtocolError::FieldRange(format!(
            "{}: {field} is {} bytes (maximum: {max})",
            constants::ERR_FIELD_TOO_LONG,
            value.len()
        )));
    }
    Ok(())
}

/// Length of a field carried behind a one-byte length prefix.
pub(crate) fn short_len(field: &str, value: &[u8]) -> Result<u8> {
    check_len(field, value, usize::from(u8::MAX))?;
    Ok(value.len() as u8)
}
