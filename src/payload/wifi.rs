//! WiFi network credential payloads
//!
//! Composes the `WIFI:T:<auth>;S:<ssid>;P:<password>;;` string understood by
//! phone camera apps and most QR scanners.

use serde::{Deserialize, Serialize};
use std::fmt;

/// WiFi security type carried in the `T:` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Security {
    /// WPA / WPA2 / WPA3 personal
    #[serde(rename = "WPA")]
    Wpa,
    /// Legacy WEP
    #[serde(rename = "WEP")]
    Wep,
    /// Open network, no password
    #[serde(rename = "nopass")]
    Open,
}

impl Default for Security {
    fn default() -> Self {
        Security::Wpa
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Security::Wpa => f.write_str("WPA"),
            Security::Wep => f.write_str("WEP"),
            Security::Open => f.write_str("nopass"),
        }
    }
}

/// WiFi credentials to embed in a QR code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiNetwork {
    /// Network name (SSID)
    pub ssid: String,
    /// Network password; ignored for open networks
    pub password: String,
    /// Security type
    pub security: Security,
}

impl WifiNetwork {
    /// Compose the WiFi QR payload string.
    ///
    /// Returns an empty string when the SSID is empty; callers treat that as
    /// a blocked generation rather than encoding a useless code.
    pub fn compose(&self) -> String {
        if self.ssid.is_empty() {
            return String::new();
        }

        let ssid = escape_field(&self.ssid);
        match self.security {
            Security::Open => format!("WIFI:T:nopass;S:{};;", ssid),
            other => {
                let password = escape_field(&self.password);
                format!("WIFI:T:{};S:{};P:{};;", other, ssid, password)
            }
        }
    }
}

/// Escape the characters reserved by the WiFi QR grammar.
///
/// Backslash must be handled first so escaped semicolons are not re-escaped.
fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '\\' | ';' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
