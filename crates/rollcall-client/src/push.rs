//! Push channel.
//!
//! One long-lived WebSocket per viewing session. A reader task forwards each
//! text frame over a channel; the session decodes and applies them one at a
//! time. The channel guarantees nothing about delivery: frames may be lost,
//! duplicated or reordered, and nothing is replayed after a reconnect.
//! Reconnection is left to the caller.

use futures_util::StreamExt;
use rollcall_proto::{AttendanceUpdate, PushMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use crate::PushError;

/// Frames buffered between the reader task and the session.
const FRAME_BUFFER: usize = 64;

/// Whether frames can still arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// The source is open.
    Connected,
    /// The source ended or [`PushChannel::stop`] was called.
    Closed,
}

/// Receiving end of the push connection.
pub struct PushChannel {
    frames: mpsc::Receiver<String>,
    /// Abort handle of the reader task, if this channel owns one.
    abort_handle: Option<tokio::task::AbortHandle>,
    state: ConnectionState,
}

impl PushChannel {
    /// Open a WebSocket to `url` and start reading.
    ///
    /// # Errors
    ///
    /// [`PushError::Connection`] if the handshake fails.
    pub async fn connect(url: &str) -> Result<Self, PushError> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| PushError::Connection(format!("{url}: {e}")))?;

        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        let handle = tokio::spawn(run_reader(stream, tx));
        tracing::info!(%url, "push channel connected");

        Ok(Self { frames: rx, abort_handle: Some(handle.abort_handle()), state: ConnectionState::Connected })
    }

    /// Channel fed by an in-process source, such as
    /// [`MemoryBackend::subscribe`](crate::MemoryBackend::subscribe).
    pub fn from_receiver(frames: mpsc::Receiver<String>) -> Self {
        Self { frames, abort_handle: None, state: ConnectionState::Connected }
    }

    /// Next raw frame. `None` once the source is closed.
    pub async fn recv_frame(&mut self) -> Option<String> {
        if self.state == ConnectionState::Closed {
            return None;
        }

        let frame = self.frames.recv().await;
        if frame.is_none() {
            tracing::info!("push channel closed");
            self.state = ConnectionState::Closed;
        }
        frame
    }

    /// Next well-formed attendance update, skipping anything else. `None`
    /// once the source is closed.
    pub async fn recv(&mut self) -> Option<AttendanceUpdate> {
        loop {
            let frame = self.recv_frame().await?;
            if let Some(update) = decode_frame(&frame) {
                return Some(update);
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Stop the reader task. Frames already buffered are discarded.
    pub fn stop(&mut self) {
        if let Some(handle) = self.abort_handle.take() {
            handle.abort();
        }
        self.frames.close();
        self.state = ConnectionState::Closed;
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(handle) = self.abort_handle.take() {
            handle.abort();
        }
    }
}

/// Decode a frame into an attendance update.
///
/// Anything else (invalid JSON, unknown `type`, wrong field types) is logged
/// and dropped. Never fails the channel.
pub fn decode_frame(frame: &str) -> Option<AttendanceUpdate> {
    match PushMessage::decode(frame) {
        Ok(PushMessage::UpdateAttendees(update)) => Some(update),
        Err(e) => {
            tracing::debug!(error = %e, "dropping push frame");
            None
        },
    }
}

/// Forward text frames from the socket until it closes or the receiver goes.
async fn run_reader(
    mut stream: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    frames: mpsc::Sender<String>,
) {
    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    tracing::debug!("dropping non-UTF-8 binary push frame");
                    continue;
                },
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "push connection lost");
                break;
            },
        };

        if frames.send(text).await.is_err() {
            break;
        }
    }

    tracing::debug!("push reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_update_and_drops_the_rest() {
        let update = decode_frame(r#"{"type":"updateAttendees","eventId":"e1","count":5}"#).unwrap();
        assert_eq!(update.event_id.as_str(), "e1");
        assert_eq!(update.count, 5);

        assert_eq!(decode_frame("not json"), None);
        assert_eq!(decode_frame(r#"{"type":"other"}"#), None);
        assert_eq!(decode_frame(r#"{"eventId":"e1","count":5}"#), None);
    }

    #[tokio::test]
    async fn recv_skips_bad_frames_and_reports_close() {
        let (tx, rx) = mpsc::channel(8);
        let mut channel = PushChannel::from_receiver(rx);

        tx.send("garbage".to_owned()).await.unwrap();
        tx.send(r#"{"type":"updateAttendees","eventId":7,"count":2}"#.to_owned()).await.unwrap();
        drop(tx);

        let update = channel.recv().await.unwrap();
        assert_eq!(update.event_id.as_str(), "7");
        assert_eq!(channel.state(), ConnectionState::Connected);

        assert_eq!(channel.recv().await, None);
        assert_eq!(channel.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn stop_closes_channel() {
        let (tx, rx) = mpsc::channel(8);
        let mut channel = PushChannel::from_receiver(rx);
        tx.send(r#"{"type":"updateAttendees","eventId":"a","count":1}"#.to_owned()).await.unwrap();

        channel.stop();

        assert_eq!(channel.state(), ConnectionState::Closed);
        assert_eq!(channel.recv().await, None);
        assert!(tx.is_closed());
    }
}
