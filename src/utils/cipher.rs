//! # Stream Cipher
//!
//! RC4-style keystream generator used by Winny to obfuscate the session
//! stream, the protocol header, key-information file names and node hash
//! tokens. It offers no confidentiality and is kept only for wire
//! compatibility.
//!
//! ## Keying quirks
//! - Keys are C strings: bytes from the first zero onward are dropped.
//! - A key whose first byte is zero becomes that single zero byte.
//! - An empty key skips the key schedule entirely and leaves the identity
//!   permutation in place. The keystream is still generated from that table,
//!   so `crypt` is not a passthrough.
//!
//! ## State
//! A [`CipherState`] advances with every byte it processes and is never reset
//! between calls. A connection keeps one instance per direction and threads it
//! through every frame in that direction.

use std::fmt;

/// Keyed permutation plus the two running indices.
pub struct CipherState {
    table: [u8; 256],
    x: u8,
    y: u8,
}

impl CipherState {
    /// Run the key schedule for `key`.
    pub fn new(key: &[u8]) -> Self {
        let key = match key.iter().position(|&b| b == 0) {
            Some(0) => &key[..1],
            Some(end) => &key[..end],
            None => key,
        };

        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        if !key.is_empty() {
            let mut j: u8 = 0;
            for i in 0..256 {
                j = j.wrapping_add(key[i % key.len()]).wrapping_add(table[i]);
                table.swap(i, usize::from(j));
            }
        }

        Self { table, x: 0, y: 0 }
    }

    /// XOR `buf` with the next `buf.len()` keystream bytes.
    pub fn apply(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            self.x = self.x.wrapping_add(1);
            let sx = self.table[usize::from(self.x)];
            self.y = self.y.wrapping_add(sx);
            let sy = self.table[usize::from(self.y)];
            self.table[usize::from(self.y)] = sx;
            self.table[usize::from(self.x)] = sy;
            *byte ^= self.table[usize::from(sx.wrapping_add(sy))];
        }
    }

    /// Encrypt or decrypt `input`, continuing the keystream.
    pub fn crypt(&mut self, input: &[u8]) -> Vec<u8> {
        let mut out = input.to_vec();
        self.apply(&mut out);
        out
    }
}

impl fmt::Debug for CipherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherState")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

/// One-shot crypt under a freshly keyed state.
pub fn crypt(key: &[u8], input: &[u8]) -> Vec<u8> {
    CipherState::new(key).crypt(input)
}
