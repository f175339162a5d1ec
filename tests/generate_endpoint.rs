use std::net::SocketAddr;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use qrstudio::server::RenderServer;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

fn spawn_server() -> SocketAddr {
    let server = RenderServer::bind("127.0.0.1:0".parse().unwrap()).expect("bind server");
    let addr = server.local_addr();
    server.spawn();
    addr
}

async fn post_generate(addr: SocketAddr, body: &Value) -> (u16, Vec<(String, String)>, Vec<u8>) {
    let payload = body.to_string();
    let request = format!(
        "POST /api/generate-qr HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.expect("read response");

    let head_end = response
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .expect("complete response head");
    let head = String::from_utf8_lossy(&response[..head_end]).into_owned();
    let body = response[head_end + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status: u16 = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status code");

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    (status, headers, body)
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_data_returns_400_with_structured_error() {
    let addr = spawn_server();

    let (status, headers, body) = post_generate(addr, &json!({})).await;

    assert_eq!(status, 400);
    assert_eq!(header(&headers, "content-type"), Some("application/json"));

    let payload: Value = serde_json::from_slice(&body).expect("parse error body");
    assert_eq!(payload["error"], "QR data is required");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn valid_request_returns_png_with_exact_content_length() {
    let addr = spawn_server();

    let (status, headers, body) = post_generate(addr, &json!({ "data": "hello", "size": 400 })).await;

    assert_eq!(status, 200);
    assert_eq!(header(&headers, "content-type"), Some("image/png"));
    assert!(!body.is_empty(), "expected a non-empty PNG body");
    assert_eq!(&body[..8], &PNG_SIGNATURE, "body is not a PNG");

    let content_length: usize = header(&headers, "content-length")
        .expect("content-length header")
        .parse()
        .expect("numeric content-length");
    assert_eq!(content_length, body.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn identical_requests_produce_identical_bytes() {
    let addr = spawn_server();
    let request = json!({ "data": "WIFI:T:WPA;S:Home;P:pw;;", "size": 300 });

    let (_, _, first) = post_generate(addr, &request).await;
    let (_, _, second) = post_generate(addr, &request).await;

    assert!(!first.is_empty());
    assert_eq!(first, second, "renderer must be deterministic");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn color_hints_are_accepted_but_not_applied() {
    let addr = spawn_server();

    let (_, _, plain) = post_generate(addr, &json!({ "data": "hello" })).await;
    let (status, _, tinted) = post_generate(
        addr,
        &json!({ "data": "hello", "color": "#FF0000", "bgColor": "#00FF00" }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(plain, tinted, "palette is fixed black-on-white");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_path_returns_404() {
    let addr = spawn_server();

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /nope HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .expect("write request");

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.expect("read response");
    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 404"), "unexpected status: {text}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_method_on_route_returns_405() {
    let addr = spawn_server();

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /api/generate-qr HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .expect("write request");

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.expect("read response");
    let text = String::from_utf8_lossy(&response);
    assert!(text.starts_with("HTTP/1.1 405"), "unexpected status: {text}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn render_client_round_trip() {
    use qrstudio::render::RenderOptions;
    use qrstudio::RenderClient;

    let addr = spawn_server();
    let client = RenderClient::new(addr);

    let png = client
        .render("https://example.com", RenderOptions { size: 300 })
        .await
        .expect("render through client");
    assert_eq!(&png[..8], &PNG_SIGNATURE);

    let err = client
        .render("", RenderOptions { size: 300 })
        .await
        .expect_err("empty data must be rejected");
    let message = err.to_string();
    assert!(
        message.contains("QR data is required"),
        "unexpected error: {message}"
    );
}
