//! End-to-end server flow over a real WebSocket client.

use std::time::Duration;

use futures_util::StreamExt;

use tuio_core::{Config, SimError, SimEvent};
use tuio_runtime::SimServer;
use tuio_wire::{decode_packet, OscArg, OscBundle, OscPacket, ALIVE_ADDR, TOKEN_ADDR};

fn decode(data: &[u8]) -> OscBundle {
    match decode_packet(data).unwrap() {
        OscPacket::Bundle(bundle) => bundle,
        OscPacket::Message(_) => panic!("expected bundle"),
    }
}

#[tokio::test]
async fn test_start_broadcast_stop() {
    let config = Config {
        port: 43413,
        fps: 30,
        ..Config::default()
    };
    let server = SimServer::with_config(config).unwrap();
    server.start().await.unwrap();
    assert!(matches!(
        server.start().await,
        Err(SimError::AlreadyRunning)
    ));

    let mut events = server.subscribe();
    let (mut ws, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:43413")
        .await
        .unwrap();

    match tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap()
    {
        SimEvent::ClientConnected {
            connected_clients, ..
        } => assert_eq!(connected_clients, 1),
        other => panic!("unexpected first event {other:?}"),
    }

    let id = server.create(1, 0.5, 0.5).unwrap();

    // Frames tick as soon as a client is registered; keep reading until
    // one carries the new token.
    let bundle = loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if !msg.is_binary() {
            continue;
        }
        let data = msg.into_data();
        let bundle = decode(&data);
        if bundle.messages_with_addr(TOKEN_ADDR).count() == 1 {
            break bundle;
        }
    };

    let tok = bundle.messages_with_addr(TOKEN_ADDR).next().unwrap();
    assert_eq!(tok.args[0], OscArg::Int(id.as_i32()));
    let alive = bundle.messages_with_addr(ALIVE_ADDR).next().unwrap();
    assert_eq!(alive.args, vec![OscArg::Int(id.as_i32())]);

    // A frame-sent notification reached the observer interface
    let saw_frame = loop {
        match tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
        {
            Ok(SimEvent::FrameSent { object_count, .. }) if object_count == 1 => break true,
            Ok(_) => continue,
            Err(_) => break false,
        }
    };
    assert!(saw_frame);

    server.stop().unwrap();
    assert!(!server.status().running);

    // The connection winds down once its handle is dropped
    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) => break,
                Some(Ok(msg)) if msg.is_close() => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok());

    // A fresh start on a new port begins a fresh registry
    server.set_port(43415).unwrap();
    server.start().await.unwrap();
    assert_eq!(server.status().connected_clients, 0);
    server.stop().unwrap();
}

#[tokio::test]
async fn test_status_tracks_lifecycle() {
    let config = Config {
        port: 43414,
        ..Config::default()
    };
    let server = SimServer::with_config(config).unwrap();
    assert!(!server.status().running);

    server.start().await.unwrap();
    assert!(server.status().running);

    let (ws, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:43414")
        .await
        .unwrap();
    let connected = tokio::time::timeout(Duration::from_secs(5), async {
        while server.status().connected_clients != 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(connected.is_ok());

    server.stop().unwrap();
    let status = server.status();
    assert!(!status.running);
    assert_eq!(status.connected_clients, 0);
    drop(ws);
}
