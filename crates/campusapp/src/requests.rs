//! Request supersession.
//!
//! Two loads of the same collection can be in flight at once (a refresh
//! triggered while the previous one is still running). Without coordination
//! the slower, older response can land last and overwrite newer state.
//!
//! [`RequestTracker`] hands out a [`Ticket`] per request, keyed by purpose
//! (`"load:gallery"`, `"load:emails"`, ...). Starting a new request for the
//! same purpose bumps that purpose's generation; when a response arrives,
//! [`RequestTracker::accept`] only lets it through if its ticket is still the
//! latest. Older responses are dropped and logged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    purpose: String,
    generation: u64,
}

impl Ticket {
    pub fn purpose(&self) -> &str {
        &self.purpose
    }
}

/// Shared between clones; cloning yields a handle to the same generations.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    generations: Arc<Mutex<HashMap<String, u64>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `purpose`, superseding any earlier one.
    pub fn begin(&self, purpose: &str) -> Ticket {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let generation = generations.entry(purpose.to_string()).or_insert(0);
        *generation += 1;
        Ticket {
            purpose: purpose.to_string(),
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        generations.get(&ticket.purpose) == Some(&ticket.generation)
    }

    /// Pass `value` through if `ticket` is still the latest for its purpose.
    pub fn accept<T>(&self, ticket: &Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(
                purpose = %ticket.purpose,
                generation = ticket.generation,
                "discarding superseded response"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn latest_ticket_wins() {
        let tracker = RequestTracker::new();
        let first = tracker.begin("load:gallery");
        let second = tracker.begin("load:gallery");

        assert_eq!(tracker.accept(&first, "stale"), None);
        assert_eq!(tracker.accept(&second, "fresh"), Some("fresh"));
    }

    #[test]
    fn purposes_are_independent() {
        let tracker = RequestTracker::new();
        let gallery = tracker.begin("load:gallery");
        let _emails = tracker.begin("load:emails");
        assert!(tracker.is_current(&gallery));
    }

    #[test]
    fn out_of_order_arrival_across_threads_keeps_newest() {
        let tracker = RequestTracker::new();
        let (tx, rx) = mpsc::channel();

        let old = tracker.begin("load:guidance");
        let new = tracker.begin("load:guidance");

        // The newer request answers first, the older one afterwards.
        for (ticket, value) in [(new, "new"), (old, "old")] {
            let tracker = tracker.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                if let Some(v) = tracker.accept(&ticket, value) {
                    tx.send(v).unwrap();
                }
            })
            .join()
            .unwrap();
        }
        drop(tx);

        let applied: Vec<&str> = rx.iter().collect();
        assert_eq!(applied, vec!["new"]);
    }
}
