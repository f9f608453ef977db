// src/analysis/producer.rs
use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use super::error::AnalysisError;
use super::types::Coordinates;

/// Encoded image bytes plus the file extension that matches them
#[derive(Debug, Clone)]
pub struct ProducedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

/// Turns a location into a change-detection image.
///
/// Implementations run on the analysis worker thread and may block.
pub trait ImageProducer: Send + Sync {
    fn produce(&self, location: Coordinates) -> Result<ProducedImage, AnalysisError>;

    /// Whether results are synthetic placeholders
    fn is_demo(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
struct DetectRequest {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Calls the change-detection backend over HTTP
pub struct RemoteProducer {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RemoteProducer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

/// User-facing message for a non-success response
pub fn failure_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("Server error: {}", status))
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some(ct) if ct.starts_with("image/png") => "png",
        _ => "jpg",
    }
}

impl ImageProducer for RemoteProducer {
    fn produce(&self, location: Coordinates) -> Result<ProducedImage, AnalysisError> {
        debug!(endpoint = %self.endpoint, lat = location.lat, lng = location.lng, "requesting change map");

        let response = self.client
            .post(&self.endpoint)
            .json(&DetectRequest { lat: location.lat, lng: location.lng })
            .send()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        let content_type = response.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = failure_message(status.as_u16(), &body);
            warn!(status = status.as_u16(), %message, "change detection request failed");
            return Err(AnalysisError::Server { status: status.as_u16(), message });
        }

        Ok(ProducedImage {
            bytes: body.to_vec(),
            extension: extension_for(content_type.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves one canned HTTP response and hands back the request body
    fn serve_once(response: Vec<u8>) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/detect-change", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let body_start = loop {
                let n = stream.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break buf.len();
                }
            };
            let headers = String::from_utf8_lossy(&buf[..body_start]).to_lowercase();
            let content_length = headers.lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < body_start + content_length {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&buf[body_start..]).into_owned()
        });

        (url, handle)
    }

    fn producer(url: &str) -> RemoteProducer {
        RemoteProducer::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn generic_message_without_json_body() {
        assert_eq!(failure_message(500, b""), "Server error: 500");
        assert_eq!(failure_message(502, b"<html>bad gateway</html>"), "Server error: 502");
        assert_eq!(failure_message(500, br#"{"details":"x"}"#), "Server error: 500");
    }

    #[test]
    fn server_supplied_message_wins() {
        assert_eq!(
            failure_message(500, br#"{"error":"Change detection script failed."}"#),
            "Change detection script failed."
        );
    }

    #[test]
    fn status_500_surfaces_generic_message() {
        let (url, server) = serve_once(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
        );
        let err = producer(&url).produce(Coordinates::new(10.0, 20.0)).unwrap_err();
        let request_body = server.join().unwrap();

        assert_eq!(err.to_string(), "Server error: 500");
        let sent: serde_json::Value = serde_json::from_str(&request_body).unwrap();
        assert_eq!(sent["lat"], 10.0);
        assert_eq!(sent["lng"], 20.0);
    }

    #[test]
    fn json_error_is_surfaced() {
        let body = br#"{"error":"bad location"}"#;
        let mut response = format!(
            "HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        ).into_bytes();
        response.extend_from_slice(body);
        let (url, server) = serve_once(response);

        let err = producer(&url).produce(Coordinates::new(0.0, 0.0)).unwrap_err();
        server.join().unwrap();
        assert_eq!(err, AnalysisError::Server { status: 400, message: "bad location".into() });
    }

    #[test]
    fn success_returns_image_bytes() {
        let body = b"\x89PNGfake";
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        ).into_bytes();
        response.extend_from_slice(body);
        let (url, server) = serve_once(response);

        let image = producer(&url).produce(Coordinates::new(1.0, 2.0)).unwrap();
        server.join().unwrap();
        assert_eq!(image.bytes, body.to_vec());
        assert_eq!(image.extension, "png");
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/detect-change", listener.local_addr().unwrap());
        drop(listener);

        let err = producer(&url).produce(Coordinates::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }
}
