// File: src/store.rs
use crate::model::EventRecord;
use crate::model::merge::reconcile;
use std::collections::HashMap;

/// In-memory event collection, unique by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStore {
    events: Vec<EventRecord>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a loaded snapshot.
    ///
    /// Duplicate ids collapse into one record: it keeps the position of the
    /// first occurrence and the content of the last.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let mut events: Vec<EventRecord> = Vec::with_capacity(records.len());
        let mut index: HashMap<String, usize> = HashMap::new();
        for rec in records {
            match index.get(&rec.id) {
                Some(&i) => {
                    log::debug!("Duplicate id {} in snapshot, keeping the later copy", rec.id);
                    events[i] = rec;
                }
                None => {
                    index.insert(rec.id.clone(), events.len());
                    events.push(rec);
                }
            }
        }
        Self { events }
    }

    /// Applies a batch of candidates with non-destructive field semantics.
    pub fn reconcile(&mut self, candidates: Vec<EventRecord>) {
        let existing = std::mem::take(&mut self.events);
        self.events = reconcile(existing, candidates);
    }

    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
