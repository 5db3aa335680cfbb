//! # Node Identity
//!
//! Peer endpoints and their printable obfuscated form.
//!
//! Peer-list management exchanges nodes either as plain `"a.b.c.d:port"`
//! text or as `@` hash tokens; both resolve to a [`NodeAddress`].

pub mod address;
pub mod hash;

pub use address::NodeAddress;
pub use hash::{pack_hash, unpack_hash, NodeHash};
