//! End-to-end transfers: a real `Client` against a real `Listener` on loopback.
//!
//! Both halves run in the same task via `tokio::join!`.  After the listener
//! completes it keeps answering for a moment so a sender whose final ack was
//! lost can still finish.

mod common;

use std::time::Duration;

use common::{ephemeral, pattern, MemorySinks, Recording};
use udp_arq::simulator::{Simulator, SimulatorConfig};
use udp_arq::{Client, ClientConfig, Listener, SendSummary, TimerConfig, Transport, TransferSummary};

const WAIT: Duration = Duration::from_secs(20);

fn fast(timeout_ms: u64) -> ClientConfig {
    ClientConfig {
        chunk_size: 1024,
        timer: TimerConfig {
            retransmit_timeout: Duration::from_millis(timeout_ms),
            max_retries: None,
        },
    }
}

/// Run one transfer of `source` from `client` to `listener`.
async fn run<C: Transport, S: Transport>(
    client: &Client<C>,
    listener: &mut Listener<S>,
    sinks: &mut MemorySinks,
    source: &[u8],
) -> (SendSummary, TransferSummary<Vec<u8>>) {
    let receive = async {
        let summary = listener.accept(sinks).await.expect("accept failed");
        let _ = tokio::time::timeout(Duration::from_millis(500), listener.accept(sinks)).await;
        summary
    };
    let (sent, received) = tokio::time::timeout(WAIT, async {
        tokio::join!(client.send(source), receive)
    })
    .await
    .expect("transfer timed out");
    (sent.expect("send failed"), received)
}

#[tokio::test]
async fn file_split_into_full_and_partial_frames() {
    let server = Recording::new(ephemeral().await);
    let server_addr = server.inner.local_addr;
    let mut listener = Listener::new(server);
    let client = Client::new(ephemeral().await, server_addr, fast(250)).unwrap();
    let mut sinks = MemorySinks::default();
    let source = pattern(2500);

    let (sent, received) = run(&client, &mut listener, &mut sinks, &source).await;

    assert_eq!(received.sink, source);
    assert_eq!(sent.bytes, 2500);
    assert_eq!(sent.frames, 4);
    assert_eq!(
        listener.transport().frames(),
        vec![(0, 1024), (1, 1024), (2, 452), (3, 0)]
    );
}

#[tokio::test]
async fn empty_source_sends_only_end_marker() {
    let server = Recording::new(ephemeral().await);
    let server_addr = server.inner.local_addr;
    let mut listener = Listener::new(server);
    let client = Client::new(ephemeral().await, server_addr, fast(250)).unwrap();
    let mut sinks = MemorySinks::default();

    let (sent, received) = run(&client, &mut listener, &mut sinks, &[]).await;

    assert!(received.sink.is_empty());
    assert_eq!(received.end_seq, 0);
    assert_eq!(sent.frames, 1);
    assert_eq!(listener.transport().frames(), vec![(0, 0)]);
}

#[tokio::test]
async fn exact_multiple_of_chunk_size() {
    let server = ephemeral().await;
    let server_addr = server.local_addr;
    let mut listener = Listener::new(server);
    let client = Client::new(ephemeral().await, server_addr, fast(250)).unwrap();
    let mut sinks = MemorySinks::default();
    let source = pattern(3 * 1024);

    let (sent, received) = run(&client, &mut listener, &mut sinks, &source).await;

    assert_eq!(received.sink, source);
    assert_eq!(sent.frames, 4);
    assert_eq!(received.end_seq, 3);
}

#[tokio::test]
async fn small_chunks() {
    let server = ephemeral().await;
    let server_addr = server.local_addr;
    let mut listener = Listener::new(server);
    let config = ClientConfig {
        chunk_size: 7,
        ..fast(250)
    };
    let client = Client::new(ephemeral().await, server_addr, config).unwrap();
    let mut sinks = MemorySinks::default();
    let source = b"the quick brown fox jumps over the lazy dog".to_vec();

    let (sent, received) = run(&client, &mut listener, &mut sinks, &source).await;

    assert_eq!(received.sink, source);
    assert_eq!(sent.frames, 8); // 6 full, 1 partial, end marker
}

async fn lossy_transfer(seed: u64, len: usize) {
    let faults = SimulatorConfig {
        loss_rate: 0.25,
        reorder_rate: 0.15,
        duplicate_rate: 0.2,
        seed,
    };
    let server = ephemeral().await;
    let server_addr = server.local_addr;
    let mut listener = Listener::new(Simulator::new(server, faults.clone()));
    let client_sim = Simulator::new(
        ephemeral().await,
        SimulatorConfig {
            seed: seed.wrapping_add(1),
            ..faults
        },
    );
    let client = Client::new(client_sim, server_addr, fast(15)).unwrap();
    let mut sinks = MemorySinks::default();
    let source = pattern(len);

    let (sent, received) = run(&client, &mut listener, &mut sinks, &source).await;

    assert_eq!(received.sink, source, "seed {seed}: output differs");
    assert_eq!(sent.bytes, len as u64);
    assert_eq!(sinks.opened.len(), 1, "seed {seed}: extra session opened");
    let stats = client.transport().stats();
    assert!(stats.sent > sent.frames, "seed {seed}: faults never forced a retry");
}

#[tokio::test]
async fn lossy_network_delivers_exact_bytes() {
    lossy_transfer(7, 20 * 1024 + 123).await;
}

#[tokio::test]
async fn lossy_network_other_seeds() {
    for seed in [1, 42, 1234] {
        lossy_transfer(seed, 6 * 1024 + 5).await;
    }
}
