// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! `RouterOS` driver against an in-process fake router

use network_telemetry_exporter::{
    ConnectionPool, DeviceError, DeviceFacts, DriverRegistry, FactClient, Getter, Host,
    ROUTEROS_PLATFORM, RouterOsClient, encode_word, read_length, render_device,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn read_sentence(stream: &mut TcpStream) -> Option<Vec<String>> {
    let mut words = Vec::new();
    loop {
        let len = read_length(stream).await.ok()?;
        if len == 0 {
            return Some(words);
        }
        let mut buf = vec![0u8; len];
        stream.read_exact(&mut buf).await.ok()?;
        words.push(String::from_utf8(buf).ok()?);
    }
}

async fn write_sentence(stream: &mut TcpStream, words: &[&str]) {
    let mut buf = Vec::new();
    for w in words {
        buf.extend_from_slice(&encode_word(w));
    }
    buf.push(0);
    stream.write_all(&buf).await.unwrap();
}

/// Serves sessions until the test ends; returns the address and a session counter
async fn spawn_fake_router(reject_login: bool) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let sessions = Arc::new(AtomicUsize::new(0));

    let counter = sessions.clone();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                while let Some(words) = read_sentence(&mut stream).await {
                    match words.first().map(String::as_str) {
                        Some("/login") if reject_login => {
                            write_sentence(
                                &mut stream,
                                &["!trap", "=message=invalid user name or password (6)"],
                            )
                            .await;
                            write_sentence(&mut stream, &["!done"]).await;
                        }
                        Some("/login") => write_sentence(&mut stream, &["!done"]).await,
                        Some("/interface/print") => {
                            write_sentence(
                                &mut stream,
                                &["!re", "=name=ether1", "=rx-byte=1000", "=tx-error=2"],
                            )
                            .await;
                            write_sentence(&mut stream, &["!done"]).await;
                        }
                        Some("/routing/bgp/session/print") => {
                            write_sentence(
                                &mut stream,
                                &[
                                    "!re",
                                    "=remote.address=10.0.0.1",
                                    "=established=true",
                                    "=prefix-count=5",
                                ],
                            )
                            .await;
                            write_sentence(&mut stream, &["!done"]).await;
                        }
                        _ => {
                            write_sentence(&mut stream, &["!trap", "=message=no such command"])
                                .await;
                            write_sentence(&mut stream, &["!done"]).await;
                        }
                    }
                }
            });
        }
    });

    (addr, sessions)
}

fn host_at(addr: SocketAddr) -> Host {
    Host {
        name: "r1".to_string(),
        address: addr.to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        platform: ROUTEROS_PLATFORM.to_string(),
    }
}

#[tokio::test]
async fn test_fetch_facts_renders_router_output() {
    let (addr, _) = spawn_fake_router(false).await;
    let client = RouterOsClient::with_pool(Arc::new(ConnectionPool::new()));

    let raw = client
        .fetch_facts(&host_at(addr), &Getter::POLLED)
        .await
        .unwrap();
    let facts = DeviceFacts::try_from(raw).unwrap();

    assert_eq!(
        render_device("r1", &facts),
        concat!(
            "network_device_interface_counter {net_device=\"r1\", interface=\"ether1\", direction=\"rx\", metric=\"octets\"} 1000\n",
            "network_device_interface_counter {net_device=\"r1\", interface=\"ether1\", direction=\"tx\", metric=\"errors\"} 2\n",
            "bgp_session_up {net_device=\"r1\", peer=\"10.0.0.1\"} 1\n",
            "bgp_prefixes {net_device=\"r1\", peer=\"10.0.0.1\", metric=\"received_prefixes\"} 5\n",
        )
    );
}

#[tokio::test]
async fn test_session_reused_across_cycles() {
    let (addr, sessions) = spawn_fake_router(false).await;
    let pool = Arc::new(ConnectionPool::new());
    let client = RouterOsClient::with_pool(pool.clone());
    let host = host_at(addr);

    for _ in 0..3 {
        tokio::time::timeout(Duration::from_secs(5), client.fetch_facts(&host, &Getter::POLLED))
            .await
            .expect("fetch should not hang")
            .unwrap();
    }

    assert_eq!(sessions.load(Ordering::SeqCst), 1);
    assert_eq!(pool.idle_count().await, 1);
}

#[tokio::test]
async fn test_rejected_login_is_auth_error() {
    let (addr, _) = spawn_fake_router(true).await;
    let pool = Arc::new(ConnectionPool::new());
    let client = RouterOsClient::with_pool(pool.clone());

    let err = client
        .fetch_facts(&host_at(addr), &Getter::POLLED)
        .await
        .unwrap_err();

    assert!(matches!(err, DeviceError::Auth(ref msg) if msg.contains("invalid user name")));
    assert_eq!(pool.idle_count().await, 0);
}

#[tokio::test]
async fn test_unreachable_router_is_connectivity_error() {
    // Bind then drop to get a port with nothing listening
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let client = RouterOsClient::with_pool(Arc::new(ConnectionPool::new()));

    let err = client
        .fetch_facts(&host_at(addr), &Getter::POLLED)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "connectivity");
}

#[tokio::test]
async fn test_registry_dispatches_by_platform() {
    let (addr, _) = spawn_fake_router(false).await;
    let registry = DriverRegistry::new().register(
        ROUTEROS_PLATFORM,
        Arc::new(RouterOsClient::with_pool(Arc::new(ConnectionPool::new()))),
    );

    let mut host = host_at(addr);
    assert!(registry.fetch_facts(&host, &Getter::POLLED).await.is_ok());

    host.platform = "eos".to_string();
    let err = registry
        .fetch_facts(&host, &Getter::POLLED)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "protocol");
}
