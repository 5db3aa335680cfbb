//! Block transfer commands.

use crate::config::FILE_DATA_LIMIT;
use crate::core::reader::{check_len, Reader};
use crate::error::Result;
use crate::protocol::message::WireCommand;
use crate::protocol::opcode::Opcode;
use bytes::BufMut;

pub const FILE_HASH_LEN: usize = 16;

/// Task id, block start and hash in front of cached data.
pub const CACHE_HEADER_LEN: usize = 8 + FILE_HASH_LEN;

/// Command 11: ask for one block range of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRequest {
    pub task_id: u32,
    pub block_begin: u32,
    pub block_size: u32,
    pub hash: [u8; FILE_HASH_LEN],
    pub file_size: u32,
}

impl WireCommand for FileRequest {
    const OPCODE: Opcode = Opcode::FileRequest;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        r.require(12 + FILE_HASH_LEN + 4)?;
        Ok(Self {
            task_id: r.u32_le()?,
            block_begin: r.u32_le()?,
            block_size: r.u32_le()?,
            hash: r.array()?,
            file_size: r.u32_le()?,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        out.put_u32_le(self.task_id);
        out.put_u32_le(self.block_begin);
        out.put_u32_le(self.block_size);
        out.put_slice(&self.hash);
        out.put_u32_le(self.file_size);
        Ok(())
    }
}

/// Command 21: one block of file data.
///
/// The data runs to the end of the payload and never exceeds
/// [`FILE_DATA_LIMIT`] bytes; anything past the limit is ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResponse {
    pub task_id: u32,
    pub block_begin: u32,
    pub hash: [u8; FILE_HASH_LEN],
    pub file_data: Vec<u8>,
}

impl FileResponse {
    /// Layout of a block as kept in the download cache: task id, block
    /// start and hash, then the data zero-padded to [`FILE_DATA_LIMIT`].
    pub fn cache_block(&self) -> Vec<u8> {
        let mut block = Vec::with_capacity(CACHE_HEADER_LEN + FILE_DATA_LIMIT);
        block.put_u32_le(self.task_id);
        block.put_u32_le(self.block_begin);
        block.put_slice(&self.hash);
        block.put_slice(&self.file_data);
        let padding = FILE_DATA_LIMIT.saturating_sub(self.file_data.len());
        block.put_bytes(0, padding);
        block
    }
}

impl WireCommand for FileResponse {
    const OPCODE: Opcode = Opcode::FileResponse;

    fn decode_payload(payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let task_id = r.u32_le()?;
        let block_begin = r.u32_le()?;
        let hash = r.array()?;
        let file_data = r.bytes_up_to(FILE_DATA_LIMIT).to_vec();
        Ok(Self {
            task_id,
            block_begin,
            hash,
            file_data,
        })
    }

    fn encode_payload(&self, out: &mut Vec<u8>) -> Result<()> {
        check_len("file data", &self.file_data, FILE_DATA_LIMIT)?;
        out.put_u32_le(self.task_id);
        out.put_u32_le(self.block_begin);
        out.put_slice(&self.hash);
        out.put_slice(&self.file_data);
        Ok(())
    }
}
