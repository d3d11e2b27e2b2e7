//! REST client for the go-librespot control API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use spotterm_proto::protocol::{
    RepeatContextBody, RepeatTrackBody, SeekBody, ShuffleBody, Status, VolumeBody,
};
use thiserror::Error;
use tracing::debug;

use crate::dispatch::ControlRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path} returned {code}: {body}")]
    Status {
        path: &'static str,
        code: StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct PlayerClient {
    http: Client,
    base_url: String,
}

impl PlayerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PlayerError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /status`.  An idle daemon answers 204, which maps to the default
    /// (stopped, no track) status.
    pub async fn status(&self) -> Result<Status, PlayerError> {
        let resp = self.http.get(self.url("/status")).send().await?;
        match resp.status() {
            StatusCode::NO_CONTENT => Ok(Status::default()),
            code if code.is_success() => Ok(resp.json().await?),
            code => Err(PlayerError::Status {
                path: "/status",
                code,
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    pub async fn play_pause(&self) -> Result<(), PlayerError> {
        self.post("/player/playpause", None::<&()>).await
    }

    pub async fn next(&self) -> Result<(), PlayerError> {
        self.post("/player/next", None::<&()>).await
    }

    pub async fn prev(&self) -> Result<(), PlayerError> {
        self.post("/player/prev", None::<&()>).await
    }

    pub async fn set_volume(&self, percent: u8) -> Result<(), PlayerError> {
        let body = VolumeBody {
            volume: percent as i32,
            relative: false,
        };
        self.post("/player/volume", Some(&body)).await
    }

    pub async fn seek(&self, position_ms: u64) -> Result<(), PlayerError> {
        let body = SeekBody {
            position: position_ms,
            relative: false,
        };
        self.post("/player/seek", Some(&body)).await
    }

    pub async fn set_shuffle(&self, on: bool) -> Result<(), PlayerError> {
        let body = ShuffleBody {
            shuffle_context: on,
        };
        self.post("/player/shuffle_context", Some(&body)).await
    }

    pub async fn set_repeat_context(&self, on: bool) -> Result<(), PlayerError> {
        let body = RepeatContextBody { repeat_context: on };
        self.post("/player/repeat_context", Some(&body)).await
    }

    pub async fn set_repeat_track(&self, on: bool) -> Result<(), PlayerError> {
        let body = RepeatTrackBody { repeat_track: on };
        self.post("/player/repeat_track", Some(&body)).await
    }

    pub async fn send(&self, req: &ControlRequest) -> Result<(), PlayerError> {
        match *req {
            ControlRequest::PlayPause => self.play_pause().await,
            ControlRequest::Next => self.next().await,
            ControlRequest::Previous => self.prev().await,
            ControlRequest::SetVolume(v) => self.set_volume(v).await,
            ControlRequest::Seek(ms) => self.seek(ms).await,
            ControlRequest::SetShuffle(on) => self.set_shuffle(on).await,
            ControlRequest::SetRepeatContext(on) => self.set_repeat_context(on).await,
            ControlRequest::SetRepeatTrack(on) => self.set_repeat_track(on).await,
        }
    }

    async fn post<B: Serialize>(
        &self,
        path: &'static str,
        body: Option<&B>,
    ) -> Result<(), PlayerError> {
        let mut req = self.http.post(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        let code = resp.status();
        debug!("player: POST {} -> {}", path, code);
        if code.is_success() {
            Ok(())
        } else {
            Err(PlayerError::Status {
                path,
                code,
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}

/// Loopback HTTP server standing in for the daemon's REST API.
#[cfg(test)]
pub(crate) mod stub_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// One captured request: request line and body.
    pub type Seen = (String, String);

    /// Loopback HTTP stub answering every request with `status` + `body`.
    pub async fn stub(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<Seen>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    break;
                };
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    let (head_end, content_len) = loop {
                        let n = sock.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                            let len = head
                                .lines()
                                .find_map(|l| l.strip_prefix("content-length:"))
                                .and_then(|v| v.trim().parse::<usize>().ok())
                                .unwrap_or(0);
                            break (pos + 4, len);
                        }
                    };
                    while buf.len() < head_end + content_len {
                        let n = sock.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }
                    let text = String::from_utf8_lossy(&buf).to_string();
                    let request_line = text.lines().next().unwrap_or_default().to_string();
                    let req_body = text[head_end..].to_string();
                    let _ = tx.send((request_line, req_body)).await;

                    let resp = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = sock.write_all(resp.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        (format!("http://{}", addr), rx)
    }
}

#[cfg(test)]
mod tests {
    use super::stub_server::stub;
    use super::*;

    #[tokio::test]
    async fn test_status_no_content_is_idle() {
        let (url, mut seen) = stub("204 No Content", "").await;
        let client = PlayerClient::new(url).unwrap();
        assert_eq!(client.status().await.unwrap(), Status::default());
        assert_eq!(seen.recv().await.unwrap().0, "GET /status HTTP/1.1");
    }

    #[tokio::test]
    async fn test_status_parses_body() {
        let (url, _seen) = stub(
            "200 OK",
            r#"{"stopped":false,"paused":true,"volume":30,"volume_steps":100,"track":{"uri":"spotify:track:1","name":"One","duration":1000}}"#,
        )
        .await;
        let client = PlayerClient::new(format!("{}/", url)).unwrap();
        let status = client.status().await.unwrap();
        assert!(status.paused);
        assert_eq!(status.volume, 30);
        assert_eq!(status.track.map(|t| t.name), Some("One".to_string()));
    }

    #[tokio::test]
    async fn test_control_requests_hit_expected_endpoints() {
        let (url, mut seen) = stub("200 OK", "").await;
        let client = PlayerClient::new(url).unwrap();

        client.send(&ControlRequest::SetVolume(55)).await.unwrap();
        let (line, body) = seen.recv().await.unwrap();
        assert_eq!(line, "POST /player/volume HTTP/1.1");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["volume"], 55);
        assert_eq!(json["relative"], false);

        client.send(&ControlRequest::Seek(92_000)).await.unwrap();
        let (line, body) = seen.recv().await.unwrap();
        assert_eq!(line, "POST /player/seek HTTP/1.1");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["position"], 92_000);

        client.send(&ControlRequest::SetRepeatTrack(true)).await.unwrap();
        let (line, body) = seen.recv().await.unwrap();
        assert_eq!(line, "POST /player/repeat_track HTTP/1.1");
        assert!(body.contains("\"repeat_track\":true"));

        client.send(&ControlRequest::PlayPause).await.unwrap();
        let (line, body) = seen.recv().await.unwrap();
        assert_eq!(line, "POST /player/playpause HTTP/1.1");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (url, _seen) = stub("500 Internal Server Error", "boom").await;
        let client = PlayerClient::new(url).unwrap();
        match client.next().await {
            Err(PlayerError::Status { path, code, body }) => {
                assert_eq!(path, "/player/next");
                assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
