//! Discovery sessions against simulated heaters on loopback.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tsmart::schema::{discovery, RecordBuf, DISCOVERY_RESPONSE};
use tsmart::{
    encode_discovery_request, CancelToken, DeviceHandler, Discovery, DiscoveryConfig,
    TSmartError,
};

const CAPTURED_REPLY: &str =
    "01000020000d2a9b005445534c4100000000000000000000000000000000000000000000000000000064e3";

/// Replies to every discovery request with `reply`, counting requests.
async fn heater(reply: Vec<u8>) -> (SocketAddr, Arc<AtomicUsize>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();

    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        while let Ok((n, peer)) = socket.recv_from(&mut buf).await {
            if buf[..n] == encode_discovery_request()[..] {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket.send_to(&reply, peer).await;
            }
        }
    });

    (addr, count)
}

fn config(target: SocketAddr) -> DiscoveryConfig {
    DiscoveryConfig::default()
        .with_target(target)
        .with_local_port(0)
        .with_interval(Duration::from_millis(150))
}

#[tokio::test]
async fn test_discover_captured_reply() {
    let (target, requests) = heater(hex::decode(CAPTURED_REPLY).unwrap()).await;
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();

    let mut session = Discovery::new(config(target)).with_handler(DeviceHandler::sync(move |_| {
        handler_calls.fetch_add(1, Ordering::SeqCst);
    }));
    let devices = session.discover().await.unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].ip_address, "127.0.0.1");
    assert_eq!(devices[0].device_id, "9B2A0D");
    assert_eq!(devices[0].device_name, "TESLA");
}

#[tokio::test]
async fn test_rounds_setting() {
    let reply = RecordBuf::new(&DISCOVERY_RESPONSE)
        .put_u32(discovery::DEVICE_ID, 0x0042)
        .put_bytes(discovery::DEVICE_NAME, b"GARAGE")
        .finish();
    let (target, requests) = heater(reply).await;

    let devices = Discovery::new(config(target).with_rounds(3))
        .discover()
        .await
        .unwrap();

    assert_eq!(requests.load(Ordering::SeqCst), 3);
    assert_eq!(devices[0].device_id, "0042");
}

#[tokio::test]
async fn test_repeat_discover_keeps_session_list() {
    let (target, _) = heater(hex::decode(CAPTURED_REPLY).unwrap()).await;
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();

    let mut session = Discovery::new(config(target).with_rounds(1)).with_handler(
        DeviceHandler::sync(move |_| {
            handler_calls.fetch_add(1, Ordering::SeqCst);
        }),
    );
    session.discover().await.unwrap();
    let devices = session.discover().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancel_before_first_round() {
    let (target, _) = heater(hex::decode(CAPTURED_REPLY).unwrap()).await;
    let token = CancelToken::new();
    token.cancel();

    let devices = Discovery::new(config(target))
        .with_cancel_token(token)
        .discover()
        .await
        .unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_local_port_in_use() {
    // A socket without address reuse keeps the port exclusive.
    let holder = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
    let port = holder.local_addr().unwrap().port();

    let err = Discovery::new(config("127.0.0.1:9".parse().unwrap()).with_local_port(port))
        .discover()
        .await
        .unwrap_err();
    assert!(matches!(err, TSmartError::Connection { .. }));
}
