//! Push-event reader for the daemon's `/events` WebSocket.
//!
//! Each text frame is decoded and normalized here, so the core only ever
//! sees canonical `Update`s.  Undecodable frames are logged and skipped.
//! When the socket closes or errors the reader reports `StreamLost` and
//! stops; there is no reconnect.

use futures_util::StreamExt;
use spotterm_proto::protocol::RawEvent;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::CoreEvent;
use crate::normalize;
use crate::update::Update;

pub type EventSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("cannot connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}

pub async fn connect(url: &str) -> Result<EventSocket, StreamError> {
    let (socket, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|source| StreamError::Connect {
            url: url.to_string(),
            source,
        })?;
    info!("stream: connected to {}", url);
    Ok(socket)
}

/// Decode one text frame into an update.  `None` for malformed JSON,
/// malformed payloads and event kinds that carry no state.
pub fn decode_frame(text: &str) -> Option<Update> {
    match RawEvent::decode(text) {
        Ok(raw) => normalize::event(&raw),
        Err(e) => {
            warn!("stream: undecodable frame: {} ({:.80})", e, text);
            None
        }
    }
}

/// Forward updates into the intake until the socket ends or shutdown.
pub async fn run_reader(
    mut socket: EventSocket,
    intake: mpsc::Sender<CoreEvent>,
    shutdown: CancellationToken,
) {
    let lost = loop {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => break None,
            msg = socket.next() => msg,
        };

        let update = match msg {
            None => break Some("event stream closed".to_string()),
            Some(Err(e)) => break Some(format!("event stream error: {}", e)),
            Some(Ok(Message::Close(frame))) => {
                break Some(match frame {
                    Some(f) => format!("event stream closed by daemon: {}", f.reason),
                    None => "event stream closed by daemon".to_string(),
                })
            }
            Some(Ok(Message::Text(text))) => decode_frame(&text),
            Some(Ok(other)) => {
                debug!("stream: ignoring non-text frame {:?}", other);
                None
            }
        };

        if let Some(update) = update {
            debug!("stream: {}", update.label());
            let sent = tokio::select! {
                _ = shutdown.cancelled() => break None,
                sent = intake.send(CoreEvent::Update(update)) => sent,
            };
            if sent.is_err() {
                break None;
            }
        }
    };

    if let Some(reason) = lost {
        warn!("stream: {}", reason);
        let _ = intake.send(CoreEvent::StreamLost(reason)).await;
    }
    let _ = socket.close(None).await;
    info!("stream: reader stopped");
}
