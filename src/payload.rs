// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Blob Payloads
//!
//! The plaintext JSON carried inside an encrypted blob. The payload's type
//! and preference key travel inside the ciphertext, so the server cannot
//! distinguish blob types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A redeemable access ticket.
///
/// Tickets are opaque to the sync layer apart from their identity field;
/// any extra fields are preserved verbatim through merge and re-encryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Stable identity of the ticket.
    pub finalized_ticket: String,
    /// Remaining ticket fields, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Ticket {
    /// Creates a ticket with no extra fields (mainly for tests).
    pub fn new(finalized_ticket: impl Into<String>) -> Self {
        Ticket {
            finalized_ticket: finalized_ticket.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Returns the ticket's stable identity.
    pub fn id(&self) -> &str {
        &self.finalized_ticket
    }
}

/// Decrypted content of a blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    /// A full ticket set for one logical item (active or archive).
    Tickets {
        /// The tickets in the set.
        data: Vec<Ticket>,
    },
    /// A single scalar preference value.
    Preference {
        /// The preference's logical id.
        key: String,
        /// The preference value, any JSON-serializable shape.
        value: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tickets_payload_wire_shape() {
        let payload = Payload::Tickets {
            data: vec![Ticket::new("t1")],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "tickets");
        assert_eq!(json["data"][0]["finalized_ticket"], "t1");
    }

    #[test]
    fn test_preference_payload_wire_shape() {
        let payload = Payload::Preference {
            key: "theme".into(),
            value: json!("dark"),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "preference");
        assert_eq!(json["key"], "theme");
        assert_eq!(json["value"], "dark");
    }

    #[test]
    fn test_ticket_extra_fields_preserved() {
        let json = json!({
            "finalized_ticket": "t1",
            "issued_at": 1700000000,
            "label": "promo"
        });
        let ticket: Ticket = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(ticket.id(), "t1");
        assert_eq!(serde_json::to_value(&ticket).unwrap(), json);
    }
}
