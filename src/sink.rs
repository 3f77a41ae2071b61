//! Where received streams go.
//!
//! A receiver opens one sink per session, on the first frame from a new
//! sender.  [`SinkFactory`] is that seam; [`FileSinks`] is the file-backed
//! policy used by the binary, naming each output after the sender's address.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncWrite, BufWriter};

/// Opens a fresh sink for each sender.
#[allow(async_fn_in_trait)]
pub trait SinkFactory {
    type Sink: AsyncWrite + Unpin;

    async fn open(&mut self, peer: SocketAddr) -> io::Result<Self::Sink>;
}

/// Writes each transfer to `<dir>/received_<ip>_<port>.<extension>`.
#[derive(Debug, Clone)]
pub struct FileSinks {
    pub dir: PathBuf,
    pub extension: String,
}

impl FileSinks {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn path_for(&self, peer: SocketAddr) -> PathBuf {
        self.dir.join(output_file_name(peer, &self.extension))
    }
}

impl SinkFactory for FileSinks {
    type Sink = BufWriter<File>;

    async fn open(&mut self, peer: SocketAddr) -> io::Result<Self::Sink> {
        let path = self.path_for(peer);
        let file = File::create(&path).await?;
        log::info!("[sink] writing transfer from {peer} to {}", path.display());
        Ok(BufWriter::new(file))
    }
}

/// Deterministic output name for one sender.
///
/// Separators in the IP (`.` for v4, `:` for v6) become underscores so the
/// name is a single path component on every platform.
pub fn output_file_name(peer: SocketAddr, extension: &str) -> String {
    let ip: String = peer
        .ip()
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if extension.is_empty() {
        format!("received_{ip}_{}", peer.port())
    } else {
        format!("received_{ip}_{}.{extension}", peer.port())
    }
}
