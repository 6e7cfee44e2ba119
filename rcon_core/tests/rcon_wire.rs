use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use rcon_core::connections::rcon::packet::{
    Packet, RconCodec, SERVERDATA_AUTH, SERVERDATA_AUTH_RESPONSE, SERVERDATA_EXECCOMMAND,
    SERVERDATA_RESPONSE_VALUE,
};
use rcon_core::connections::rcon::packet::MAX_OUTGOING_BODY;
use rcon_core::{
    ConsoleSession, Endpoint, RconError, RemoteClient, SessionError, SessionState,
    SourceRconClient, SourceRconConnector,
};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

mod common;

const PASSWORD: &str = "letmein";

fn reply_for(command: &str) -> Vec<&'static str> {
    match command {
        "ping" => vec!["pong\n"],
        "cvarlist" => vec!["part one|", "part two"],
        "status" => vec!["hostname: fake"],
        _ => vec![""],
    }
}

/// Serves a single connection the way a Source dedicated server does,
/// including the junk packet that follows every mirrored empty packet.
async fn spawn_fake_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut framed = Framed::new(stream, RconCodec);
        while let Some(Ok(packet)) = framed.next().await {
            let replies = match packet.kind {
                SERVERDATA_AUTH => {
                    let id = if packet.body == PASSWORD { packet.id } else { -1 };
                    vec![
                        Packet::new(packet.id, SERVERDATA_RESPONSE_VALUE, ""),
                        Packet::new(id, SERVERDATA_AUTH_RESPONSE, ""),
                    ]
                }
                SERVERDATA_EXECCOMMAND => reply_for(&packet.body)
                    .into_iter()
                    .map(|chunk| Packet::new(packet.id, SERVERDATA_RESPONSE_VALUE, chunk))
                    .collect(),
                SERVERDATA_RESPONSE_VALUE => vec![
                    Packet::new(packet.id, SERVERDATA_RESPONSE_VALUE, ""),
                    Packet::new(packet.id, SERVERDATA_RESPONSE_VALUE, "\u{0}\u{1}\u{0}\u{0}"),
                ],
                _ => Vec::new(),
            };
            for reply in replies {
                if framed.send(reply).await.is_err() {
                    return;
                }
            }
        }
    });
    addr
}

#[tokio::test]
async fn authenticates_and_joins_multi_packet_responses() {
    common::init_test_logging();
    let addr = spawn_fake_server().await;
    let mut client = SourceRconClient::new(Endpoint::new("127.0.0.1", addr.port(), PASSWORD));

    assert_eq!(client.execute("ping").await.unwrap(), "pong\n");
    assert_eq!(
        client.execute("cvarlist").await.unwrap(),
        "part one|part two"
    );
    // The junk packet left over from the previous call must not leak in.
    assert_eq!(client.execute("status").await.unwrap(), "hostname: fake");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    common::init_test_logging();
    let addr = spawn_fake_server().await;
    let mut client = SourceRconClient::new(Endpoint::new("127.0.0.1", addr.port(), "nope"));

    let err = client.execute("ping").await.unwrap_err();

    assert!(matches!(err, RconError::AuthRejected(_)));
    assert!(err.invalidates_session());
}

#[tokio::test]
async fn refused_connection_is_transient() {
    common::init_test_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let mut client = SourceRconClient::new(Endpoint::new("127.0.0.1", port, PASSWORD));

    let err = client.execute("ping").await.unwrap_err();

    assert!(matches!(err, RconError::Io(_)));
    assert!(!err.invalidates_session());
}

#[tokio::test]
async fn overlong_command_keeps_the_session_connected() {
    common::init_test_logging();
    let addr = spawn_fake_server().await;
    let mut session = ConsoleSession::new(Box::new(SourceRconConnector));
    session
        .connect_endpoint(Endpoint::new("127.0.0.1", addr.port(), PASSWORD))
        .await
        .unwrap();

    let long = "say ".repeat(1200);
    let err = session.dispatch(&long).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Transient(RconError::CommandTooLong { len: 4800, limit: MAX_OUTGOING_BODY })
    ));
    assert_eq!(session.state(), SessionState::Connected);
    // Nothing was framed, so the same socket still answers.
    assert_eq!(session.dispatch("status").await.unwrap(), "hostname: fake");
}
