//! QR Studio - QR payload composition and PNG rendering
//!
//! This library composes type-specific QR payload strings (WiFi credentials,
//! UPI payment links, calendar events, URLs, plain text) and renders them to
//! PNG images, either in-process or through a small HTTP render service.
//!
//! # Features
//!
//! - **Payload grammars**: WiFi `WIFI:T:...` strings, `upi://pay` deep links,
//!   iCalendar `VEVENT` blocks, with the escaping each format requires
//! - **Rendering**: high error-correction PNG output via the `qrcode` crate
//! - **Render service**: a single-route HTTP endpoint returning raw PNG bytes
//! - **Async-first**: built on Tokio for the service and client paths
//!
//! # Example
//!
//! ```no_run
//! use qrstudio::{QrContent, QrRenderer, RenderOptions, Security, WifiNetwork};
//!
//! fn main() -> qrstudio::Result<()> {
//!     let content = QrContent::Wifi(WifiNetwork {
//!         ssid: "HomeNet".to_string(),
//!         password: "hunter2".to_string(),
//!         security: Security::Wpa,
//!     });
//!
//!     let renderer = QrRenderer::new();
//!     let rendered = renderer.render_png(&content.compose(), RenderOptions::default())?;
//!     std::fs::write("wifi.png", &rendered.png)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod payload;
pub mod render;
pub mod server;
pub mod session;

// Re-exports for convenience
pub use error::{Error, Result};

pub use client::RenderClient;
pub use config::{LogRotation, LoggingOptions, QrStudioConfig, RenderDefaults, ServerOptions};
pub use payload::{CalendarEvent, ContentKind, QrContent, Security, UpiPayment, WifiNetwork};
pub use render::{QrRenderer, RenderOptions, RenderedPng};
pub use server::RenderServer;
pub use session::{GeneratorSession, Preview, RenderBackend, SessionState};
