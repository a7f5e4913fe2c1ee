pub mod protocol;

pub use protocol::{LineParser, LinkError, WatchMessage};

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Messages buffered between the read task and the consumer.
const CHANNEL_DEPTH: usize = 64;

/// Client for the watch message stream.
///
/// Reads newline-framed app messages from a TCP bridge (or stdin), parses
/// them in a background task, and hands them out in arrival order. Every
/// parsed message is acknowledged by transaction id when the transport is
/// writable.
pub struct WatchLink {
    message_rx: mpsc::Receiver<WatchMessage>,
    _task: tokio::task::JoinHandle<()>,
}

impl WatchLink {
    /// Connect to a watch bridge at `addr` and start reading.
    pub async fn connect(addr: &str) -> Result<Self> {
        tracing::info!(%addr, "Connecting to watch bridge");

        let stream = TcpStream::connect(addr).await?;
        tracing::info!("Connected to watch bridge");

        let (reader, writer) = stream.into_split();
        Ok(Self::spawn(reader, Some(writer)))
    }

    /// Read messages from stdin. No acks are sent.
    pub fn stdin() -> Self {
        tracing::info!("Reading watch messages from stdin");
        Self::spawn(tokio::io::stdin(), None::<tokio::io::Stdout>)
    }

    /// Drive the link from any byte source, acking into `ack` if given.
    pub fn spawn<R, W>(reader: R, ack: Option<W>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (message_tx, message_rx) = mpsc::channel(CHANNEL_DEPTH);
        let task = tokio::spawn(link_read_loop(reader, ack, message_tx));
        Self {
            message_rx,
            _task: task,
        }
    }

    /// Next message from the watch. `None` once the link has closed.
    pub async fn recv(&mut self) -> Option<WatchMessage> {
        self.message_rx.recv().await
    }
}

/// Background task: read bytes, parse lines, ack and forward messages.
async fn link_read_loop<R, W>(
    mut reader: R,
    mut ack: Option<W>,
    message_tx: mpsc::Sender<WatchMessage>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut parser = LineParser::new();
    let mut buf = [0u8; 4096];
    let mut message_count: u64 = 0;

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                tracing::warn!("Watch link closed");
                break;
            }
            Ok(n) => {
                parser.push_data(&buf[..n]);

                // Drain all complete lines.
                while let Some(result) = parser.next_message() {
                    match result {
                        Ok(message) => {
                            if let Some(writer) = ack.as_mut() {
                                let line = format!("ACK {}\n", message.transaction_id);
                                if let Err(e) = writer.write_all(line.as_bytes()).await {
                                    tracing::warn!(?e, "Failed to ack message, disabling acks");
                                    ack = None;
                                }
                            }
                            message_count += 1;
                            if message_count % 1000 == 0 {
                                tracing::debug!(message_count, "Watch messages received");
                            }
                            if message_tx.send(message).await.is_err() {
                                tracing::debug!("Message consumer dropped, stopping link");
                                return;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(%e, "Skipping malformed watch message");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(?e, "Watch link read error");
                break;
            }
        }
    }
}
