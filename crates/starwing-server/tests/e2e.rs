//! End-to-end UDP scenarios against a live server on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use starwing_engine::prelude::GameMode;
use starwing_proto::{decode, encode, Header, Packet};
use starwing_server::GameServer;
use tokio::net::UdpSocket;
use tokio::time::timeout;

async fn start_server(game: GameMode) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let server = GameServer::new("127.0.0.1", 0, game)
        .await
        .expect("bind on an ephemeral port");
    let addr = server.local_addr().expect("bound socket has an address");
    let handle = tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, handle)
}

async fn client() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.expect("client bind")
}

async fn recv_packet(socket: &UdpSocket) -> (Header, Packet) {
    let mut buf = vec![0u8; 8192];
    let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for a server packet")
        .expect("recv failed");
    decode(&buf[..len]).expect("server sent a malformed packet")
}

/// Skips snapshots and other traffic until an assignment arrives.
async fn join(socket: &UdpSocket, server: SocketAddr, username: &str) -> u8 {
    let packet = Packet::Join {
        username: username.to_owned(),
    };
    socket
        .send_to(&encode(&packet, 1, 0), server)
        .await
        .expect("send join");
    for _ in 0..50 {
        if let (_, Packet::PlayerIdAssign { player_id }) = recv_packet(socket).await {
            return player_id;
        }
    }
    panic!("no PLAYER_ID_ASSIGNMENT received");
}

#[tokio::test]
async fn join_input_and_snapshot_flow() {
    let (server, handle) = start_server(GameMode::RType).await;
    let alice = client().await;

    assert_eq!(join(&alice, server, "Alice").await, 0);

    // A truncated datagram must be dropped without any visible effect.
    alice
        .send_to(&[0x01, 0, 0, 0, 0, 0], server)
        .await
        .expect("send truncated datagram");

    // Hold RIGHT.
    let press = Packet::Input {
        player_id: 0,
        key_code: 3,
        action: 1,
    };
    alice
        .send_to(&encode(&press, 2, 0), server)
        .await
        .expect("send input");

    // Watch snapshots for a while: they keep flowing and the player's x
    // advances under the held key.
    let mut snapshots = 0u32;
    let mut first_x: Option<f32> = None;
    let mut last_x: Option<f32> = None;
    while snapshots < 10 {
        if let (_, Packet::Snapshot { entities }) = recv_packet(&alice).await {
            snapshots += 1;
            if let Some(entity) = entities.first() {
                if first_x.is_none() {
                    first_x = Some(entity.x);
                }
                last_x = Some(entity.x);
            }
        }
    }

    assert!(snapshots >= 10);
    let (first_x, last_x) = (first_x.expect("snapshot carried the player"), last_x.unwrap());
    assert!(
        last_x > first_x,
        "player did not move right: {first_x} -> {last_x}"
    );

    handle.abort();
}

#[tokio::test]
async fn fifth_join_is_refused_with_255() {
    let (server, handle) = start_server(GameMode::RType).await;

    let mut sockets = Vec::new();
    for expected in 0..4u8 {
        let socket = client().await;
        assert_eq!(join(&socket, server, "player").await, expected);
        sockets.push(socket);
    }

    let late = client().await;
    assert_eq!(join(&late, server, "late").await, 255);

    handle.abort();
}

#[tokio::test]
async fn repeat_join_returns_the_same_id() {
    let (server, handle) = start_server(GameMode::RType).await;
    let socket = client().await;

    assert_eq!(join(&socket, server, "Alice").await, 0);
    assert_eq!(join(&socket, server, "Alice").await, 0);

    handle.abort();
}

#[tokio::test]
async fn ping_is_echoed_with_matching_header() {
    let (server, handle) = start_server(GameMode::FlappyByte).await;
    let socket = client().await;

    socket
        .send_to(&encode(&Packet::Ping, 0x0707, 0x11223344), server)
        .await
        .expect("send ping");

    for _ in 0..50 {
        let (header, packet) = recv_packet(&socket).await;
        if packet == Packet::PingResponse {
            assert_eq!(header.packet_id, 0x0707);
            assert_eq!(header.timestamp, 0x11223344);
            handle.abort();
            return;
        }
    }
    panic!("no PING_RESPONSE received");
}
