use super::{Division, Tempo};
use crate::midi::{Event, EventKind};
use log::warn;
use std::time::Duration;

/// Every tempo change of a piece, sorted by tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    changes: Vec<(u64, Tempo)>,
}

impl Default for TempoMap {
    fn default() -> Self {
        TempoMap {
            changes: vec![(0, Tempo::default())],
        }
    }
}

impl TempoMap {
    /// Builds the map from events in timeline order. When several changes
    /// share a tick the last one wins.
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut map = TempoMap::default();
        for event in events {
            if let EventKind::SetTempo { micros_per_quarter } = event.kind {
                match Tempo::from_micros(micros_per_quarter) {
                    Some(tempo) => map.insert(event.tick, tempo),
                    None => warn!("Ignoring zero tempo at tick {}", event.tick),
                }
            }
        }
        map
    }

    fn insert(&mut self, tick: u64, tempo: Tempo) {
        let idx = self.changes.partition_point(|(t, _)| *t <= tick);
        if idx > 0 && self.changes[idx - 1].0 == tick {
            self.changes[idx - 1].1 = tempo;
        } else {
            self.changes.insert(idx, (tick, tempo));
        }
    }

    fn segment(&self, position: f64) -> usize {
        self.changes
            .partition_point(|(t, _)| *t as f64 <= position)
            .saturating_sub(1)
    }

    pub fn tempo_at(&self, tick: u64) -> Tempo {
        self.changes[self.segment(tick as f64)].1
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Moves `position` forward by `seconds` of playback, switching tempo at
    /// every change crossed on the way.
    pub fn advance(&self, division: Division, position: f64, seconds: f64) -> f64 {
        let mut position = position;
        let mut remaining = seconds;
        while remaining > 0.0 {
            let idx = self.segment(position);
            let ticks_per_second = division.ticks_per_second(self.changes[idx].1);
            if let Some((boundary, _)) = self.changes.get(idx + 1) {
                let boundary = *boundary as f64;
                let needed = (boundary - position) / ticks_per_second;
                if needed <= remaining {
                    position = boundary;
                    remaining -= needed;
                    continue;
                }
            }
            position += remaining * ticks_per_second;
            break;
        }
        position
    }
}

/// Fractional playback position along a tempo map.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PlayCursor {
    position: f64,
}

impl PlayCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        self.position.floor() as u64
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn advance(&mut self, map: &TempoMap, division: Division, elapsed: Duration, speed: f64) {
        let seconds = elapsed.as_secs_f64() * speed.max(0.0);
        self.position = map.advance(division, self.position, seconds);
    }

    /// Caps the position at `tick`.
    pub fn clamp(&mut self, tick: u64) {
        self.position = self.position.min(tick as f64);
    }

    pub fn seek(&mut self, tick: u64) {
        self.position = tick as f64;
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
    }
}
