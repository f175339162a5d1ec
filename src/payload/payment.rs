//! UPI payment deep-link payloads
//!
//! Composes `upi://pay?pa=<payee>&am=<amount>&tn=<note>` deep links. Query
//! values are percent-encoded so payee handles and free-text notes survive
//! the URI grammar.

use serde::{Deserialize, Serialize};

/// UPI payment request to embed in a QR code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpiPayment {
    /// UPI payee address, e.g. `merchant@bank`
    pub payee_id: String,
    /// Payment amount as entered; empty to let the payer choose
    pub amount: String,
    /// Free-text transaction note
    pub note: String,
}

impl UpiPayment {
    /// Compose the UPI deep-link payload string.
    ///
    /// Returns an empty string when the payee address is empty.
    pub fn compose(&self) -> String {
        if self.payee_id.is_empty() {
            return String::new();
        }

        let mut uri = format!("upi://pay?pa={}", percent_encode(&self.payee_id));
        if !self.amount.is_empty() {
            uri.push_str("&am=");
            uri.push_str(&percent_encode(&self.amount));
        }
        if !self.note.is_empty() {
            uri.push_str("&tn=");
            uri.push_str(&percent_encode(&self.note));
        }
        uri
    }
}

/// Percent-encode a query value per RFC 3986 unreserved set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            other => {
                out.push('%');
                out.push_str(&format!("{:02X}", other));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payment_link() {
        let payment = UpiPayment {
            payee_id: "merchant@bank".to_string(),
            amount: "150.00".to_string(),
            note: "Lunch order".to_string(),
        };
        assert_eq!(
            payment.compose(),
            "upi://pay?pa=merchant%40bank&am=150.00&tn=Lunch%20order"
        );
    }

    #[test]
    fn test_optional_fields_omitted_when_empty() {
        let payment = UpiPayment {
            payee_id: "alice@upi".to_string(),
            amount: String::new(),
            note: String::new(),
        };
        assert_eq!(payment.compose(), "upi://pay?pa=alice%40upi");
    }

    #[test]
    fn test_empty_payee_blocks_composition() {
        let payment = UpiPayment {
            payee_id: String::new(),
            amount: "99".to_string(),
            note: "unused".to_string(),
        };
        assert_eq!(payment.compose(), "");
    }
}
