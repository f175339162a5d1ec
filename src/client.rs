//! Minimal HTTP client for the render route
//!
//! Talks HTTP/1.1 directly over a `TcpStream`; the exchange is one request,
//! one fully-buffered response, connection closed. Enough for a single-route
//! service without pulling in a client stack.

use crate::error::{Error, Result};
use crate::render::RenderOptions;
use bytes::Bytes;
use serde_json::json;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const ROUTE: &str = "/api/generate-qr";

/// Client for a running QR render service
#[derive(Debug, Clone)]
pub struct RenderClient {
    addr: SocketAddr,
}

impl RenderClient {
    /// Create a client pointing at the given service address
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// POST a payload to the render route and return the PNG bytes.
    ///
    /// Non-success statuses become [`Error::Server`] carrying the message
    /// from the JSON error body.
    pub async fn render(&self, data: &str, options: RenderOptions) -> Result<Bytes> {
        let body = serde_json::to_vec(&json!({
            "data": data,
            "size": options.size,
        }))?;

        let mut stream = TcpStream::connect(self.addr).await.map_err(Error::Io)?;

        let mut request = Vec::with_capacity(256 + body.len());
        request.extend_from_slice(format!("POST {} HTTP/1.1\r\n", ROUTE).as_bytes());
        request.extend_from_slice(format!("Host: {}\r\n", self.addr).as_bytes());
        request.extend_from_slice(b"Content-Type: application/json\r\n");
        request.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        request.extend_from_slice(b"Connection: close\r\n\r\n");
        request.extend_from_slice(&body);

        stream.write_all(&request).await.map_err(Error::Io)?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.map_err(Error::Io)?;

        parse_response(&response)
    }
}

/// Split a buffered HTTP response into status and body, surfacing the
/// server's JSON error message on non-200 statuses.
fn parse_response(response: &[u8]) -> Result<Bytes> {
    let head_end = response
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or_else(|| Error::Http("truncated response".to_string()))?;

    let head = String::from_utf8_lossy(&response[..head_end]);
    let status_line = head
        .lines()
        .next()
        .ok_or_else(|| Error::Http("empty response".to_string()))?;
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| Error::Http(format!("bad status line: {status_line}")))?;

    let body = &response[head_end + 4..];

    if status == 200 {
        return Ok(Bytes::copy_from_slice(body));
    }

    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| "Failed to generate QR code".to_string());

    Err(Error::Server { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 3\r\n\r\nabc";
        let body = parse_response(raw).unwrap();
        assert_eq!(&body[..], b"abc");
    }

    #[test]
    fn test_parse_error_response() {
        let raw = b"HTTP/1.1 400 Bad Request\r\nContent-Type: application/json\r\n\r\n{\"error\":\"QR data is required\"}";
        let err = parse_response(raw).unwrap_err();
        match err {
            Error::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "QR data is required");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_truncated_response() {
        assert!(parse_response(b"HTTP/1.1 200 OK\r\n").is_err());
    }
}
