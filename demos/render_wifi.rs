//! Compose a WiFi payload and save it as a QR code PNG
//!
//! Usage: cargo run --example render_wifi

use qrstudio::{QrContent, QrRenderer, RenderOptions, Security, WifiNetwork};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let content = QrContent::Wifi(WifiNetwork {
        ssid: "GuestNet".to_string(),
        password: "let me in".to_string(),
        security: Security::Wpa,
    });

    let data = content.compose();
    println!("Payload: {data}");

    let renderer = QrRenderer::new();
    let rendered = renderer.render_png(&data, RenderOptions { size: 400 })?;
    std::fs::write("wifi_qr.png", &rendered.png)?;

    println!(
        "✓ QR code generated and saved to wifi_qr.png ({} bytes)",
        rendered.len()
    );

    Ok(())
}
