//! QR render HTTP service
//!
//! A single-route HTTP/1.1 endpoint: `POST /api/generate-qr` takes a JSON
//! body and answers with raw PNG bytes. Each connection is handled on its
//! own task with no shared mutable state between requests.

use crate::error::{Error, Result};
use crate::metrics;
use crate::payload::ContentKind;
use crate::render::{DEFAULT_SIZE, QrRenderer, RenderOptions};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tracing::{info, warn};

const ROUTE: &str = "/api/generate-qr";
const MAX_HEAD_BYTES: usize = 8 * 1024;
const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON body accepted by the render route.
///
/// `color` and `bg_color` are accepted for wire compatibility but not applied;
/// the palette is fixed black-on-white.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    data: Option<String>,
    #[allow(dead_code)]
    color: Option<String>,
    #[allow(dead_code)]
    bg_color: Option<String>,
    size: Option<u32>,
}

/// The QR render service bound to a local address
pub struct RenderServer {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl RenderServer {
    /// Bind the service to the given address without accepting yet.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let std_listener = std::net::TcpListener::bind(addr).map_err(Error::Io)?;
        std_listener.set_nonblocking(true).map_err(Error::Io)?;
        let local_addr = std_listener.local_addr().map_err(Error::Io)?;
        let listener = TcpListener::from_std(std_listener).map_err(Error::Io)?;

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// The address the service actually bound to (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop on the current task until the process exits.
    pub async fn run(self) -> Result<()> {
        info!(addr = %self.local_addr, "QR render service listening");

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    time::sleep(Duration::from_millis(250)).await;
                    continue;
                }
            };

            let peer = addr;
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream).await {
                    tracing::debug!(peer = %peer, error = %err, "connection closed");
                }
            });
        }
    }

    /// Spawn the accept loop onto the runtime and return immediately.
    pub fn spawn(self) {
        tokio::spawn(async move {
            if let Err(err) = self.run().await {
                tracing::error!(error = %err, "render service error");
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream) -> Result<()> {
    let request = read_request(&mut stream).await?;

    let response = if request.path != ROUTE {
        json_response(404, &json!({ "error": "Not found" }))
    } else if request.method != "POST" {
        json_response(405, &json!({ "error": "Method not allowed" }))
    } else {
        handle_generate(&request.body)
    };

    stream.write_all(&response).await.map_err(Error::Io)?;
    stream.shutdown().await.map_err(Error::Io)?;
    Ok(())
}

/// Route handler: parse the JSON body, render, frame the response.
///
/// 400 when `data` is missing or empty, 500 on encoder failure with the
/// cause logged server-side only.
fn handle_generate(body: &[u8]) -> Vec<u8> {
    let request: GenerateRequest = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "rejecting malformed request body");
            return json_response(400, &json!({ "error": "QR data is required" }));
        }
    };

    let data = match request.data {
        Some(ref data) if !data.is_empty() => data,
        _ => {
            return json_response(400, &json!({ "error": "QR data is required" }));
        }
    };

    let options = RenderOptions {
        size: request.size.unwrap_or(DEFAULT_SIZE),
    };

    let kind = ContentKind::sniff(data);
    let started = Instant::now();
    match QrRenderer::new().render_png(data, options) {
        Ok(rendered) => {
            metrics::record(started.elapsed(), true, kind);
            info!(
                kind = %kind,
                bytes = rendered.len(),
                size = options.size,
                "rendered QR code"
            );
            png_response(&rendered.png)
        }
        Err(err) => {
            metrics::record(started.elapsed(), false, kind);
            tracing::error!(error = %err, "QR render failed");
            json_response(500, &json!({ "error": "Failed to generate QR code" }))
        }
    }
}

struct ParsedRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

/// Read one HTTP/1.1 request: head until the blank line, then the body per
/// Content-Length. Oversized heads and bodies are rejected outright.
async fn read_request(stream: &mut TcpStream) -> Result<ParsedRequest> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_HEAD_BYTES {
            return Err(Error::Http("request head too large".to_string()));
        }
        let read = stream.read(&mut chunk).await.map_err(Error::Io)?;
        if read == 0 {
            return Err(Error::Http("connection closed mid-request".to_string()));
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| Error::Http("empty request".to_string()))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| Error::Http("missing method".to_string()))?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| Error::Http("missing path".to_string()))?
        .to_string();

    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::Http("invalid Content-Length".to_string()))?;
            }
        }
    }
    if content_length > MAX_BODY_BYTES {
        return Err(Error::Http("request body too large".to_string()));
    }

    let mut body = buffer[head_end + 4..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.map_err(Error::Io)?;
        if read == 0 {
            return Err(Error::Http("connection closed mid-body".to_string()));
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(ParsedRequest { method, path, body })
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "HTTP/1.1 200 OK\r\n",
        400 => "HTTP/1.1 400 Bad Request\r\n",
        404 => "HTTP/1.1 404 Not Found\r\n",
        405 => "HTTP/1.1 405 Method Not Allowed\r\n",
        _ => "HTTP/1.1 500 Internal Server Error\r\n",
    }
}

fn json_response(status: u16, body: &serde_json::Value) -> Vec<u8> {
    let payload = body.to_string().into_bytes();
    frame_response(status, "application/json", &payload)
}

fn png_response(png: &[u8]) -> Vec<u8> {
    frame_response(200, "image/png", png)
}

fn frame_response(status: u16, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut response = Vec::with_capacity(128 + body.len());
    response.extend_from_slice(status_line(status).as_bytes());
    response.extend_from_slice(b"Connection: close\r\n");
    response.extend_from_slice(b"Cache-Control: no-store\r\n");
    response.extend_from_slice(b"Content-Type: ");
    response.extend_from_slice(content_type.as_bytes());
    response.extend_from_slice(b"\r\n");
    let length_header = format!("Content-Length: {}\r\n\r\n", body.len());
    response.extend_from_slice(length_header.as_bytes());
    response.extend_from_slice(body);
    response
}
