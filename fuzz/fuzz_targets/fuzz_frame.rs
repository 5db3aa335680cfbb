#![no_main]

use libfuzzer_sys::fuzz_target;
use winny_protocol::Command;

fuzz_target!(|data: &[u8]| {
    // Fuzz command decoding - test for panics, crashes, out-of-bounds reads
    if let Ok(command) = Command::decode(data) {
        // anything that decodes must encode again
        let _ = command.encode();
    }
});
