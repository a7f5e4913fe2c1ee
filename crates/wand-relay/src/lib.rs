pub mod reading;

pub use reading::{reading_for, Reading};

use anyhow::Result;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Relay connection is closed")]
    Closed,
}

/// Destination for telemetry readings.
pub trait TelemetrySink: Send {
    fn publish(&self, reading: Reading) -> Result<(), RelayError>;
}

impl TelemetrySink for Box<dyn TelemetrySink> {
    fn publish(&self, reading: Reading) -> Result<(), RelayError> {
        (**self).publish(reading)
    }
}

/// Sink that only logs. Used when no relay endpoint is configured.
#[derive(Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn publish(&self, reading: Reading) -> Result<(), RelayError> {
        tracing::info!(
            feed = %reading.feed,
            stream = %reading.stream,
            value = reading.value,
            "Telemetry reading (not relayed)"
        );
        Ok(())
    }
}

/// Client forwarding readings to a telemetry bridge as JSON lines.
///
/// `publish` never blocks: readings are queued and written by a background
/// task. Once the task stops (connection lost), publishing fails.
pub struct RelayClient {
    reading_tx: mpsc::UnboundedSender<Reading>,
    _task: tokio::task::JoinHandle<()>,
}

impl RelayClient {
    /// Connect to the telemetry bridge at `addr`.
    pub async fn connect(addr: &str) -> Result<Self> {
        tracing::info!(%addr, "Connecting to telemetry relay");

        let stream = TcpStream::connect(addr).await?;
        tracing::info!("Connected to telemetry relay");

        Ok(Self::spawn(stream))
    }

    /// Relay into any byte sink.
    pub fn spawn<W>(writer: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (reading_tx, reading_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(relay_write_loop(writer, reading_rx));
        Self {
            reading_tx,
            _task: task,
        }
    }
}

impl TelemetrySink for RelayClient {
    fn publish(&self, reading: Reading) -> Result<(), RelayError> {
        self.reading_tx.send(reading).map_err(|_| RelayError::Closed)
    }
}

/// Background task: serialize queued readings and write them out.
async fn relay_write_loop<W>(mut writer: W, mut reading_rx: mpsc::UnboundedReceiver<Reading>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(reading) = reading_rx.recv().await {
        let mut line = match serde_json::to_string(&reading) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(?e, "Failed to encode reading");
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::error!(?e, "Telemetry relay write error");
            break;
        }
        if let Err(e) = writer.flush().await {
            tracing::error!(?e, "Telemetry relay flush error");
            break;
        }
        tracing::debug!(stream = %reading.stream, value = reading.value, "Reading relayed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    #[tokio::test]
    async fn readings_are_written_as_json_lines() {
        let (cloud, host) = tokio::io::duplex(1024);
        let client = RelayClient::spawn(host);

        client
            .publish(Reading::new("feed-1", "amb-temp", 100_000_000))
            .unwrap();
        client
            .publish(Reading::new("feed-1", "amb-temp", 200_000_000))
            .unwrap();

        let mut lines = BufReader::new(cloud).lines();
        let first: Reading = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let second: Reading =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();

        assert_eq!(first.feed, "feed-1");
        assert_eq!(first.value, 100_000_000);
        assert_eq!(second.value, 200_000_000);
    }

    #[tokio::test]
    async fn publish_fails_after_connection_drops() {
        let (cloud, host) = tokio::io::duplex(64);
        let client = RelayClient::spawn(host);
        drop(cloud);

        // The first write hits the closed pipe and stops the task.
        let _ = client.publish(Reading::new("f", "s", 1));
        for _ in 0..100 {
            if client.reading_tx.is_closed() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            client.publish(Reading::new("f", "s", 2)),
            Err(RelayError::Closed)
        ));
    }

    #[test]
    fn log_sink_accepts_everything() {
        assert!(LogSink.publish(Reading::new("f", "s", 3)).is_ok());
    }
}
