use dash_logging::dash_job;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::api::endpoint;
use crate::{ChannelEnd, ChannelError, ClientSettings, Sentinel};

/// Pushed by the server when a job finished successfully.
pub const DONE_SENTINEL: &str = "done";
/// Pushed by the server when a job failed.
pub const ERROR_SENTINEL: &str = "error";
/// Sent back once after a sentinel, right before closing.
pub const ACK_TOKEN: &str = "ack";

/// Waits for the server to signal that a job reached a terminal state.
#[async_trait::async_trait]
pub trait JobNotifier: Send + Sync {
    async fn wait_for_completion(&self, job_id: &str) -> Result<ChannelEnd, ChannelError>;
}

/// One WebSocket per job at `{ws_base}/ws/{job_id}`.
#[derive(Debug, Clone)]
pub struct WebSocketNotifier {
    ws_base: Url,
}

impl WebSocketNotifier {
    pub fn new(settings: &ClientSettings) -> Result<Self, ChannelError> {
        let base = settings
            .base()
            .map_err(|err| ChannelError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            ws_base: websocket_base(base)?,
        })
    }

    pub fn channel_url(&self, job_id: &str) -> Result<Url, ChannelError> {
        endpoint(&self.ws_base, &["ws", job_id])
            .map_err(|err| ChannelError::InvalidUrl(err.to_string()))
    }
}

/// Maps `http` to `ws` and `https` to `wss`; websocket urls pass through.
fn websocket_base(mut base: Url) -> Result<Url, ChannelError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChannelError::InvalidUrl(format!("unsupported scheme {other}"))),
    };
    base.set_scheme(scheme)
        .map_err(|()| ChannelError::InvalidUrl(format!("cannot switch {base} to {scheme}")))?;
    Ok(base)
}

fn parse_sentinel(text: &str) -> Option<Sentinel> {
    match text.trim() {
        DONE_SENTINEL => Some(Sentinel::Done),
        ERROR_SENTINEL => Some(Sentinel::Error),
        _ => None,
    }
}

#[async_trait::async_trait]
impl JobNotifier for WebSocketNotifier {
    async fn wait_for_completion(&self, job_id: &str) -> Result<ChannelEnd, ChannelError> {
        let url = self.channel_url(job_id)?;
        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|err| ChannelError::Connect(err.to_string()))?;
        dash_job!(info, job_id, "channel open at {}", url);

        let (mut sink, mut stream) = ws_stream.split();
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match parse_sentinel(&text) {
                    Some(sentinel) => {
                        dash_job!(info, job_id, "received {:?}, acknowledging", sentinel);
                        sink.send(Message::Text(ACK_TOKEN.to_string()))
                            .await
                            .map_err(|err| ChannelError::Protocol(err.to_string()))?;
                        if let Err(err) = sink.close().await {
                            dash_job!(debug, job_id, "close after ack failed: {}", err);
                        }
                        return Ok(ChannelEnd::Signalled(sentinel));
                    }
                    None => dash_job!(debug, job_id, "ignoring frame {:?}", text),
                },
                Ok(Message::Close(frame)) => {
                    dash_job!(warn, job_id, "server closed channel: {:?}", frame);
                    return Ok(ChannelEnd::ClosedByServer);
                }
                // Ping/pong are answered by tungstenite; binary frames carry nothing for us.
                Ok(_) => {}
                Err(err) => return Err(ChannelError::Protocol(err.to_string())),
            }
        }

        dash_job!(warn, job_id, "channel stream ended");
        Ok(ChannelEnd::ClosedByServer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_url_follows_base_scheme() {
        let plain = WebSocketNotifier::new(&ClientSettings::default()).unwrap();
        assert_eq!(
            plain.channel_url("job-7").unwrap().as_str(),
            "ws://127.0.0.1:8000/ws/job-7"
        );

        let secure = WebSocketNotifier::new(&ClientSettings {
            base_url: "https://exams.example.com/app/".to_string(),
            ..ClientSettings::default()
        })
        .unwrap();
        assert_eq!(
            secure.channel_url("job-7").unwrap().as_str(),
            "wss://exams.example.com/app/ws/job-7"
        );
    }

    #[test]
    fn sentinels_are_exact_tokens() {
        assert_eq!(parse_sentinel("done"), Some(Sentinel::Done));
        assert_eq!(parse_sentinel(" error\n"), Some(Sentinel::Error));
        assert_eq!(parse_sentinel("progress 40%"), None);
    }
}
