// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session delivery cursor with same-millisecond deduplication.
//!
//! Store timestamps have millisecond granularity, so multiple events can
//! share a `created_at`. Queries use an inclusive lower bound to avoid
//! permanently skipping ties, and the cursor tracks which ids it has already
//! admitted at the current timestamp. The id set is cleared every time the
//! timestamp strictly advances, which bounds its size to one tick's worth of
//! events.

use std::collections::HashSet;

use confab_core::Event;

/// Delivery position of one stream session.
///
/// Owned exclusively by its session; never persisted. A reconnecting client
/// gets a fresh cursor starting at the current wall clock.
#[derive(Debug, Clone)]
pub struct Cursor {
    last_seen_created_at: i64,
    seen_ids: HashSet<String>,
}

impl Cursor {
    /// A cursor that will admit events created at or after `start_ms`.
    pub fn starting_at(start_ms: i64) -> Self {
        Self {
            last_seen_created_at: start_ms,
            seen_ids: HashSet::new(),
        }
    }

    /// The inclusive lower bound for the next store query.
    pub fn last_seen_created_at(&self) -> i64 {
        self.last_seen_created_at
    }

    /// Decide whether `event` should be delivered, updating the cursor.
    ///
    /// Both discovery paths (bus and poll) feed through this single method, so
    /// an event reaches the client exactly once no matter which path observed
    /// it first.
    pub fn admit(&mut self, event: &Event) -> bool {
        if event.created_at < self.last_seen_created_at {
            // Should not occur given the inclusive query; defensive invariant.
            return false;
        }
        if event.created_at > self.last_seen_created_at {
            self.last_seen_created_at = event.created_at;
            self.seen_ids.clear();
        }
        self.seen_ids.insert(event.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confab_core::EventKind;
    use proptest::prelude::*;

    fn event(id: &str, created_at: i64) -> Event {
        Event {
            id: id.to_string(),
            conversation_id: "c1".to_string(),
            kind: EventKind::Message,
            created_at,
            payload: serde_json::Value::Null,
        }
    }

    #[test]
    fn admits_new_events_and_advances() {
        let mut cursor = Cursor::starting_at(1_000);

        assert!(cursor.admit(&event("a", 1_000)));
        assert!(cursor.admit(&event("b", 1_005)));
        assert_eq!(cursor.last_seen_created_at(), 1_005);
    }

    #[test]
    fn drops_events_before_the_cursor() {
        let mut cursor = Cursor::starting_at(1_000);
        assert!(!cursor.admit(&event("old", 999)));
    }

    #[test]
    fn deduplicates_within_the_same_millisecond() {
        let mut cursor = Cursor::starting_at(1_000);

        assert!(cursor.admit(&event("a", 1_000)));
        assert!(cursor.admit(&event("b", 1_000)));
        assert!(!cursor.admit(&event("a", 1_000)));
        assert!(!cursor.admit(&event("b", 1_000)));
    }

    #[test]
    fn seen_ids_reset_when_timestamp_advances() {
        let mut cursor = Cursor::starting_at(1_000);

        assert!(cursor.admit(&event("a", 1_000)));
        assert!(cursor.admit(&event("b", 1_001)));
        // Same id again at the old timestamp: below the cursor now, dropped.
        assert!(!cursor.admit(&event("a", 1_000)));
        // A different id at the current timestamp is still admitted once.
        assert!(cursor.admit(&event("c", 1_001)));
        assert!(!cursor.admit(&event("c", 1_001)));
    }

    #[test]
    fn ties_spanning_a_polling_cycle_are_each_delivered_once() {
        // Two events share a created_at; the second poll re-returns both
        // because the query bound is inclusive.
        let mut cursor = Cursor::starting_at(500);

        let first_page = [event("m1", 1_000)];
        let second_page = [event("m1", 1_000), event("m2", 1_000)];

        let delivered_first: Vec<_> = first_page
            .iter()
            .filter(|e| cursor.admit(e))
            .map(|e| e.id.clone())
            .collect();
        let delivered_second: Vec<_> = second_page
            .iter()
            .filter(|e| cursor.admit(e))
            .map(|e| e.id.clone())
            .collect();

        assert_eq!(delivered_first, vec!["m1"]);
        assert_eq!(delivered_second, vec!["m2"]);
    }

    proptest! {
        /// For any non-decreasing event sequence containing ties, feeding
        /// every event twice (as overlapping polls do) admits each unique id
        /// exactly once, in non-decreasing timestamp order.
        #[test]
        fn each_id_admitted_exactly_once(gaps in prop::collection::vec(0i64..3, 1..40)) {
            let mut created_at = 1_000i64;
            let mut events = Vec::new();
            for (i, gap) in gaps.iter().enumerate() {
                created_at += gap;
                events.push(event(&format!("id-{i}"), created_at));
            }

            let mut cursor = Cursor::starting_at(1_000);
            let mut admitted = Vec::new();
            for e in &events {
                if cursor.admit(e) {
                    admitted.push(e.clone());
                }
                // Duplicate delivery of the same event never re-admits.
                prop_assert!(!cursor.admit(e));
            }

            let admitted_ids: HashSet<_> = admitted.iter().map(|e| e.id.clone()).collect();
            prop_assert_eq!(admitted_ids.len(), events.len());
            prop_assert!(admitted.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        }
    }
}
