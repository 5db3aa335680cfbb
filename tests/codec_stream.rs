//! Stream codec over in-memory duplex pipes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::{Decoder, Encoder, Framed, FramedRead};
use winny_protocol::config::{CodecConfig, IdentityConfig};
use winny_protocol::protocol::handshake::{opening_header, InitBlock};
use winny_protocol::protocol::*;
use winny_protocol::utils::cipher::CipherState;
use winny_protocol::utils::conv::hex_decode;
use winny_protocol::{CommandCodec, ProtocolError};

#[test]
fn test_captured_refusal_decodes_one_command() {
    let remote = InitBlock::from_bytes([0x00, 0x00, 0xD2, 0x46, 0xAD, 0x10]);
    let local = InitBlock::from_bytes([0x00; 6]);
    let mut codec = CommandCodec::from_init_blocks(&local, &remote);

    let mut src = BytesMut::from(
        &hex_decode("dc9a1ef971aec34c8afd8be9887a7b2123bdaa769e8a63db015d").unwrap()[..],
    );
    assert_eq!(
        codec.decode(&mut src).unwrap(),
        Some(Command::Close(CloseReason::LowVersion))
    );
    assert_eq!(codec.decode(&mut src).unwrap(), None);
}

#[tokio::test]
async fn test_session_over_duplex() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let client_block = InitBlock::generate();
    let server_block = InitBlock::generate();

    let mut client = Framed::new(
        client_io,
        CommandCodec::from_init_blocks(&client_block, &server_block),
    );
    let mut server = Framed::new(
        server_io,
        CommandCodec::from_init_blocks(&server_block, &client_block),
    );

    let identity = IdentityConfig::default();
    client.send(opening_header(&identity)).await.unwrap();
    client.send(Command::from(Speed { kbps: 120.0 })).await.unwrap();
    client
        .send(Command::from(ConnectionType {
            link_type: LinkType::Search,
            is_port0: false,
            is_bad_port0: false,
            is_bbs_link: false,
        }))
        .await
        .unwrap();

    let header = server.next().await.unwrap().unwrap();
    assert_eq!(header, opening_header(&identity));
    assert_eq!(
        server.next().await.unwrap().unwrap(),
        Command::Speed(Speed { kbps: 120.0 })
    );
    assert!(matches!(
        server.next().await.unwrap().unwrap(),
        Command::ConnectionType(_)
    ));

    server.send(Command::from(CloseReason::ConnectedLimitation)).await.unwrap();
    assert_eq!(
        client.next().await.unwrap().unwrap(),
        Command::Close(CloseReason::ConnectedLimitation)
    );
}

#[tokio::test]
async fn test_large_response_split_across_writes() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let mut encoder = CommandCodec::new(CipherState::new(b"r"), CipherState::new(b"w"));
    let mut inbound = FramedRead::new(
        reader,
        CommandCodec::new(CipherState::new(b"w"), CipherState::new(b"unused")),
    );

    let response = FileResponse {
        task_id: 9,
        block_begin: 0,
        hash: [0x42; 16],
        file_data: (0..65_536u32).map(|i| i as u8).collect(),
    };
    let mut wire = BytesMut::new();
    encoder.encode(Command::from(response.clone()), &mut wire).unwrap();

    let sender = tokio::spawn(async move {
        for chunk in wire.chunks(777) {
            writer.write_all(chunk).await.unwrap();
        }
    });

    let received = inbound.next().await.unwrap().unwrap();
    sender.await.unwrap();
    assert_eq!(received, Command::FileResponse(response));
}

#[tokio::test]
async fn test_oversized_frame_ends_stream() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let config = CodecConfig {
        max_frame_length: 70_000,
    };
    let mut inbound = FramedRead::new(
        reader,
        CommandCodec::with_config(CipherState::new(b"k"), CipherState::new(b"x"), &config),
    );

    let mut header = vec![0x00, 0x00, 0x10, 0x00, 13];
    CipherState::new(b"k").apply(&mut header);
    writer.write_all(&header).await.unwrap();

    let result = inbound.next().await.unwrap();
    assert!(matches!(result, Err(ProtocolError::Framing(_))));
}
