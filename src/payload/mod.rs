//! QR payload composition
//!
//! Each content type has a small grammar that turns form-style fields into
//! the single text string handed to the renderer. Composition is pure; an
//! empty result means generation is blocked upstream, never encoded.

mod event;
mod payment;
mod wifi;

pub use event::CalendarEvent;
pub use payment::UpiPayment;
pub use wifi::{Security, WifiNetwork};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type tag, used for filenames and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// WiFi credentials
    Wifi,
    /// UPI payment deep link
    Payment,
    /// iCalendar event
    Event,
    /// Raw URL
    Url,
    /// Plain text
    Text,
}

impl ContentKind {
    /// Classify a composed payload string by its leading grammar.
    ///
    /// Used server-side, where only the raw text crosses the wire, to label
    /// metrics without trusting the client to say what it sent.
    pub fn sniff(data: &str) -> ContentKind {
        if data.starts_with("WIFI:") {
            ContentKind::Wifi
        } else if data.starts_with("upi://") {
            ContentKind::Payment
        } else if data.starts_with("BEGIN:VCALENDAR") {
            ContentKind::Event
        } else if data.starts_with("http://") || data.starts_with("https://") {
            ContentKind::Url
        } else {
            ContentKind::Text
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::Wifi => "wifi",
            ContentKind::Payment => "payment",
            ContentKind::Event => "event",
            ContentKind::Url => "url",
            ContentKind::Text => "text",
        };
        f.write_str(label)
    }
}

/// A typed QR payload before composition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QrContent {
    /// WiFi credentials
    Wifi(WifiNetwork),
    /// UPI payment request
    Payment(UpiPayment),
    /// Calendar event
    Event(CalendarEvent),
    /// Raw URL, passed through verbatim with no validation
    Url(String),
    /// Plain text, passed through verbatim
    Text(String),
}

impl QrContent {
    /// The content type tag for this payload
    pub fn kind(&self) -> ContentKind {
        match self {
            QrContent::Wifi(_) => ContentKind::Wifi,
            QrContent::Payment(_) => ContentKind::Payment,
            QrContent::Event(_) => ContentKind::Event,
            QrContent::Url(_) => ContentKind::Url,
            QrContent::Text(_) => ContentKind::Text,
        }
    }

    /// Compose the QR payload string for this content.
    ///
    /// An empty string means required fields are missing and generation must
    /// be blocked before any render is attempted.
    pub fn compose(&self) -> String {
        match self {
            QrContent::Wifi(network) => network.compose(),
            QrContent::Payment(payment) => payment.compose(),
            QrContent::Event(event) => event.compose(),
            QrContent::Url(url) => url.clone(),
            QrContent::Text(text) => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_passes_through_verbatim() {
        let content = QrContent::Url("https://example.com".to_string());
        assert_eq!(content.compose(), "https://example.com");
    }

    #[test]
    fn test_url_is_not_trimmed_or_validated() {
        let content = QrContent::Url("  not a url ".to_string());
        assert_eq!(content.compose(), "  not a url ");
    }

    #[test]
    fn test_text_passes_through_verbatim() {
        let content = QrContent::Text("hello\nworld".to_string());
        assert_eq!(content.compose(), "hello\nworld");
    }

    #[test]
    fn test_sniff_classifies_grammars() {
        assert_eq!(ContentKind::sniff("WIFI:T:WPA;S:x;P:y;;"), ContentKind::Wifi);
        assert_eq!(ContentKind::sniff("upi://pay?pa=a%40b"), ContentKind::Payment);
        assert_eq!(ContentKind::sniff("BEGIN:VCALENDAR\r\n"), ContentKind::Event);
        assert_eq!(ContentKind::sniff("https://example.com"), ContentKind::Url);
        assert_eq!(ContentKind::sniff("just words"), ContentKind::Text);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ContentKind::Wifi.to_string(), "wifi");
        assert_eq!(ContentKind::Payment.to_string(), "payment");
        assert_eq!(
            QrContent::Event(CalendarEvent::default()).kind(),
            ContentKind::Event
        );
    }
}
