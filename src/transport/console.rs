use super::{contact_key, InboundMessage, Transport, TransportEvent};
use crate::error::{transport_error, BotResult};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Line-oriented transport on stdin/stdout for running the bot locally
///
/// Inbound messages are typed as `<address>: <body>`. Outbound messages are
/// written to stdout. Any all-digit address counts as registered.
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    /// Start reading stdin and return the transport with its event stream
    pub fn connect() -> (Self, mpsc::Receiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);

        tokio::spawn(async move {
            read_stdin(event_tx).await;
        });

        (Self, event_rx)
    }
}

async fn read_stdin(event_tx: mpsc::Sender<TransportEvent>) {
    if event_tx.send(TransportEvent::Ready).await.is_err() {
        return;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_console_line(&line) {
                    Some(message) => {
                        if event_tx.send(TransportEvent::Message(message)).await.is_err() {
                            break;
                        }
                    }
                    None => warn!("Ignoring console line without '<address>: <body>' shape"),
                }
            }
            Ok(None) => {
                let _ = event_tx
                    .send(TransportEvent::Disconnected("stdin closed".to_string()))
                    .await;
                break;
            }
            Err(e) => {
                let _ = event_tx
                    .send(TransportEvent::Disconnected(format!("stdin error: {}", e)))
                    .await;
                break;
            }
        }
    }
}

/// Parse `<address>: <body>` into an inbound message
pub fn parse_console_line(line: &str) -> Option<InboundMessage> {
    let (from, body) = line.split_once(':')?;
    let from = from.trim();
    if from.is_empty() {
        return None;
    }
    Some(InboundMessage::new(from, body.trim()))
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_message(&self, address: &str, text: &str) -> BotResult<()> {
        info!("Sending message to {}", address);
        let mut stdout = tokio::io::stdout();
        let line = format!("[to {}]\n{}\n", address, text);
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| transport_error(&format!("Failed to write message: {}", e)))?;
        stdout.flush().await?;
        Ok(())
    }

    async fn is_registered_address(&self, address: &str) -> BotResult<bool> {
        let key = contact_key(address);
        Ok(!key.is_empty() && key.chars().all(|c| c.is_ascii_digit()))
    }
}
