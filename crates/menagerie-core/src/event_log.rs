//! Record of dispatched events.
//!
//! The [`EventLog`] captures every dispatch made during a battle or purchase
//! phase when [`EngineConfig::record_events`](crate::config::EngineConfig)
//! is set. It never affects resolution; it exists for replays, tests and
//! debugging.
//!
//! Records are opened when a dispatch starts, so nested events appear after
//! the event that caused them.

use serde::{Deserialize, Serialize};

use crate::board::{PetId, Side};
use crate::definition::Trigger;

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The event.
    pub trigger: Trigger,
    /// The notified side.
    pub side: Side,
    /// The pet that caused it.
    pub source: Option<PetId>,
    /// Pets whose abilities were checked, in walk order.
    pub notified: Vec<PetId>,
    /// Dispatch nesting depth, 1 for top-level events.
    pub depth: usize,
}

/// Append-only log of [`EventRecord`]s.
///
/// # Example
///
/// ```
/// use menagerie_core::board::Side;
/// use menagerie_core::definition::Trigger;
/// use menagerie_core::event_log::{EventLog, EventRecord};
///
/// let mut log = EventLog::new(true);
/// let slot = log.open(EventRecord {
///     trigger: Trigger::StartOfBattle,
///     side: Side::A,
///     source: None,
///     notified: Vec::new(),
///     depth: 1,
/// });
/// assert_eq!(slot, Some(0));
/// assert_eq!(log.take_events().len(), 1);
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    enabled: bool,
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log. A disabled log ignores every record.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            records: Vec::new(),
        }
    }

    /// Returns true if records are kept.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends a record and returns its slot, or `None` when disabled.
    pub fn open(&mut self, record: EventRecord) -> Option<usize> {
        if !self.enabled {
            return None;
        }
        self.records.push(record);
        Some(self.records.len() - 1)
    }

    /// Fills in the pets notified by the event in `slot`.
    pub fn set_notified(&mut self, slot: usize, notified: Vec<PetId>) {
        if let Some(record) = self.records.get_mut(slot) {
            record.notified = notified;
        }
    }

    /// Returns the records in dispatch order.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Drains and returns all records.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
