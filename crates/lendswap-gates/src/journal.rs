//! Append-only event journal.

use lendswap_types::{Event, EventKind, Result};

/// Ordered, append-only list of committed [`Event`]s.
#[derive(Debug, Default, Clone)]
pub struct EventJournal {
    events: Vec<Event>,
}

impl EventJournal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; its sequence is the journal length before the push.
    pub fn record(&mut self, timestamp: u64, kind: EventKind) -> &Event {
        let sequence = self.events.len() as u64;
        tracing::debug!(sequence, event = %kind, "Event recorded");
        self.events.push(Event {
            sequence,
            timestamp,
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Events with `sequence >= from`, for incremental indexers.
    #[must_use]
    pub fn since(&self, from: u64) -> &[Event] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.events.len());
        &self.events[start..]
    }

    /// Newline-delimited JSON export.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}
