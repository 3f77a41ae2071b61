//! Entry point for `udp-arq`.
//!
//! Parses CLI arguments and dispatches into either **send** or **receive**
//! mode.  All protocol work is delegated to library modules; `main.rs` owns
//! only process setup (logging, signal handling, argument parsing, files).

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use udp_arq::{Client, ClientConfig, FileSinks, Listener, Socket, TimerConfig};

/// Reliable file transfer over UDP (stop-and-wait ARQ).
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Send a file to a receiver.
    Send {
        /// Destination IP (receiver or relay).
        #[arg(long, default_value = "127.0.0.1")]
        target_ip: IpAddr,
        /// Destination port.
        #[arg(long, default_value_t = 12000)]
        target_port: u16,
        /// Path of the file to send.
        #[arg(long)]
        file: PathBuf,
        /// Milliseconds to wait for an ack before retransmitting.
        #[arg(long, default_value_t = 250)]
        timeout_ms: u64,
        /// Payload bytes per frame (1..=1024).
        #[arg(long, default_value_t = udp_arq::MAX_PAYLOAD)]
        chunk_size: usize,
        /// Give up after this many retransmissions of one frame (default: never).
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Receive transfers, one output file per sender.
    Receive {
        /// Port to listen on.
        #[arg(long, default_value_t = 12001)]
        port: u16,
        /// Directory for received files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Extension of received files.
        #[arg(long, default_value = "jpg")]
        extension: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let cli = Cli::parse();

    match cli.mode {
        Mode::Send {
            target_ip,
            target_port,
            file,
            timeout_ms,
            chunk_size,
            max_retries,
        } => {
            let config = ClientConfig {
                chunk_size,
                timer: TimerConfig {
                    retransmit_timeout: Duration::from_millis(timeout_ms),
                    max_retries,
                },
            };
            send(SocketAddr::new(target_ip, target_port), &file, config).await
        }
        Mode::Receive {
            port,
            output_dir,
            extension,
        } => receive(port, FileSinks::new(output_dir, extension)).await,
    }
}

async fn send(peer: SocketAddr, path: &Path, config: ClientConfig) -> Result<()> {
    if !path.exists() {
        bail!("file '{}' not found", path.display());
    }
    let source = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening '{}'", path.display()))?;

    let local: SocketAddr = if peer.is_ipv4() {
        "0.0.0.0:0".parse()?
    } else {
        "[::]:0".parse()?
    };
    let socket = Socket::bind(local).await.context("binding UDP socket")?;

    log::info!("Sending file '{}' to {peer}", path.display());
    let client = Client::new(socket, peer, config)?;
    let summary = client
        .send(source)
        .await
        .with_context(|| format!("sending '{}' to {peer}", path.display()))?;

    log::info!(
        "File transmission complete: {} bytes, {} retransmissions",
        summary.bytes,
        summary.retransmissions
    );
    Ok(())
}

async fn receive(port: u16, mut sinks: FileSinks) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let socket = Socket::bind(addr)
        .await
        .with_context(|| format!("binding UDP port {port}"))?;
    log::info!("Server listening on {addr}");
    log::info!(
        "Each transfer is saved as {}",
        sinks.dir.join(format!("received_<ip>_<port>.{}", sinks.extension)).display()
    );

    let mut listener = Listener::new(socket);
    tokio::select! {
        result = listener.serve(&mut sinks) => result.context("receiving")?,
        _ = tokio::signal::ctrl_c() => log::info!("Server stopped manually"),
    }
    log::info!("Server socket closed");
    Ok(())
}
