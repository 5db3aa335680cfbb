#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;
use winny_protocol::{CipherState, CommandCodec};

fuzz_target!(|data: &[u8]| {
    // Fuzz the stream codec with arbitrary chunking of an encrypted stream
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = usize::from(split).min(rest.len());
    let mut codec = CommandCodec::new(CipherState::new(b"fuzz"), CipherState::new(b"unused"));

    for chunk in [&rest[..at], &rest[at..]] {
        let mut src = BytesMut::from(chunk);
        while let Ok(Some(_)) = codec.decode(&mut src) {}
    }
});
