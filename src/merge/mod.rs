// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Merge Engine
//!
//! Deterministic reducers combining a remote decrypted payload with local
//! state. Ticket merges are commutative and idempotent at the id-set level
//! so devices converge regardless of pull order or duplication; preferences
//! are last-write-wins.
//!
//! Core invariant (consumed wins): a ticket present in any device's archive
//! must never remain in any device's active set after a full sync.

use std::collections::HashSet;

use serde_json::Value;

use crate::payload::Ticket;

/// Local ticket state: the two logical sets a ticket can live in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketState {
    /// Tickets not yet consumed.
    pub active: Vec<Ticket>,
    /// Tickets already consumed.
    pub archive: Vec<Ticket>,
}

impl TicketState {
    /// Creates empty ticket state.
    pub fn new(active: Vec<Ticket>, archive: Vec<Ticket>) -> Self {
        TicketState { active, archive }
    }

    fn archived_ids(&self) -> HashSet<String> {
        self.archive.iter().map(|t| t.id().to_string()).collect()
    }

    fn active_ids(&self) -> HashSet<String> {
        self.active.iter().map(|t| t.id().to_string()).collect()
    }
}

/// Merges a pulled archive (consumed) ticket set into local state.
///
/// Every remote ticket not already consumed locally is appended to the
/// archive; afterwards any active ticket whose id is now consumed is
/// removed. A ticket may have been consumed on another device after this
/// device pulled it as active, so the removal pass is what upholds the
/// consumed-wins invariant.
pub fn merge_archive(state: &mut TicketState, remote: &[Ticket]) {
    let mut consumed = state.archived_ids();

    for ticket in remote {
        if consumed.insert(ticket.id().to_string()) {
            state.archive.push(ticket.clone());
        }
    }

    state.active.retain(|t| !consumed.contains(t.id()));
}

/// Merges a pulled active ticket set into local state.
///
/// A remote ticket is added only if it is neither already active nor
/// already consumed locally; a locally-consumed ticket is never
/// resurrected by a stale remote copy.
pub fn merge_active(state: &mut TicketState, remote: &[Ticket]) {
    let consumed = state.archived_ids();
    let mut active = state.active_ids();

    for ticket in remote {
        if consumed.contains(ticket.id()) {
            continue;
        }
        if active.insert(ticket.id().to_string()) {
            state.active.push(ticket.clone());
        }
    }
}

/// Merges a pulled preference value: last write wins.
///
/// The server response defines "latest" by virtue of being returned for
/// the `since` cursor, so the remote value unconditionally replaces local.
pub fn merge_preference(_local: Option<Value>, remote: Value) -> Value {
    remote
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickets(ids: &[&str]) -> Vec<Ticket> {
        ids.iter().map(|id| Ticket::new(*id)).collect()
    }

    fn ids(set: &[Ticket]) -> Vec<&str> {
        set.iter().map(Ticket::id).collect()
    }

    #[test]
    fn test_archive_merge_consumes_active_ticket() {
        // Scenario A: active=[t1], remote archive=[t1]
        let mut state = TicketState::new(tickets(&["t1"]), vec![]);
        merge_archive(&mut state, &tickets(&["t1"]));
        assert!(state.active.is_empty());
        assert_eq!(ids(&state.archive), vec!["t1"]);
    }

    #[test]
    fn test_active_merge_skips_locally_consumed() {
        // Scenario B: remote active=[t1,t2], local archive=[t2]
        let mut state = TicketState::new(vec![], tickets(&["t2"]));
        merge_active(&mut state, &tickets(&["t1", "t2"]));
        assert_eq!(ids(&state.active), vec!["t1"]);
        assert_eq!(ids(&state.archive), vec!["t2"]);
    }

    #[test]
    fn test_archive_merge_idempotent() {
        let mut state = TicketState::new(tickets(&["t1", "t2"]), tickets(&["t3"]));
        let remote = tickets(&["t1", "t3", "t4"]);

        merge_archive(&mut state, &remote);
        let once = state.clone();
        merge_archive(&mut state, &remote);

        assert_eq!(state, once);
        assert_eq!(ids(&state.active), vec!["t2"]);
        assert_eq!(ids(&state.archive), vec!["t3", "t1", "t4"]);
    }

    #[test]
    fn test_active_merge_idempotent() {
        let mut state = TicketState::default();
        let remote = tickets(&["t1", "t2"]);

        merge_active(&mut state, &remote);
        let once = state.clone();
        merge_active(&mut state, &remote);

        assert_eq!(state, once);
        assert_eq!(ids(&state.active), vec!["t1", "t2"]);
    }

    #[test]
    fn test_merge_order_converges() {
        // Apply active-then-archive and archive-then-active; the surviving
        // id sets must match.
        let remote_active = tickets(&["t1", "t2"]);
        let remote_archive = tickets(&["t2", "t3"]);

        let mut a = TicketState::default();
        merge_active(&mut a, &remote_active);
        merge_archive(&mut a, &remote_archive);

        let mut b = TicketState::default();
        merge_archive(&mut b, &remote_archive);
        merge_active(&mut b, &remote_active);

        let set = |s: &[Ticket]| {
            s.iter()
                .map(|t| t.id().to_string())
                .collect::<std::collections::HashSet<_>>()
        };
        assert_eq!(set(&a.active), set(&b.active));
        assert_eq!(set(&a.archive), set(&b.archive));
        assert_eq!(ids(&a.active), vec!["t1"]);
    }

    #[test]
    fn test_archive_merge_preserves_extra_fields() {
        let remote: Vec<Ticket> = serde_json::from_value(serde_json::json!([
            { "finalized_ticket": "t1", "redeemed_at": 1700000000 }
        ]))
        .unwrap();

        let mut state = TicketState::default();
        merge_archive(&mut state, &remote);
        assert_eq!(state.archive[0].extra["redeemed_at"], 1700000000);
    }

    #[test]
    fn test_preference_last_write_wins() {
        let merged = merge_preference(
            Some(serde_json::json!("light")),
            serde_json::json!("dark"),
        );
        assert_eq!(merged, serde_json::json!("dark"));
    }
}
