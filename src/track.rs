use crate::midi::Event;
use std::collections::BTreeMap;

mod cursor;
pub use cursor::*;

mod tempo;
pub use tempo::*;

mod timeline;
pub use timeline::*;

/// An ordered store of events, keyed by tick and then by insertion order.
///
/// A track with a non-zero `max_events` behaves as a sliding window: once it
/// grows past that size the earliest events are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    events: BTreeMap<(u64, u64), Event>,
    next_seq: u64,
    max_events: usize,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(max_events: usize) -> Self {
        Track {
            max_events,
            ..Self::default()
        }
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    pub fn add_event(&mut self, event: Event) {
        let key = (event.tick, self.next_seq);
        self.next_seq += 1;
        self.events.insert(key, event);
        if self.max_events > 0 {
            while self.events.len() > self.max_events {
                self.events.pop_first();
            }
        }
    }

    /// All events with `start <= tick < end`, in tick order.
    pub fn find_events_in_range(&self, start: u64, end: u64) -> impl Iterator<Item = &Event> + '_ {
        let end = end.max(start);
        self.events.range((start, 0)..(end, 0)).map(|(_, evt)| evt)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first_tick(&self) -> Option<u64> {
        self.events.keys().next().map(|(tick, _)| *tick)
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.events.keys().next_back().map(|(tick, _)| *tick)
    }
}
