use super::InputError;
use crate::midi::{decode, Event, Header, MidiFile};
use crate::track::{Division, PlayCursor, Tempo, TempoMap, Timeline};

use log::info;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A fully decoded MIDI file played back against real time.
#[derive(Debug, Clone)]
pub struct FileInput {
    header: Header,
    timeline: Timeline,
    tempo_map: TempoMap,
    cursor: PlayCursor,
    end_tick: u64,
}

impl FileInput {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        info!("Decoding {}", path.display());
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        let file = decode(bytes)?;
        Ok(Self::from_file(file))
    }

    pub fn from_file(file: MidiFile) -> Self {
        let MidiFile { header, tracks } = file;
        let timeline = Timeline::new(tracks);
        let tempo_map = TempoMap::from_events(timeline.iter());
        let end_tick = timeline.last_tick().unwrap_or(0);
        info!(
            "Loaded {} events over {} tracks, ending at tick {}",
            timeline.len(),
            timeline.tracks().len(),
            end_tick
        );
        FileInput {
            header,
            timeline,
            tempo_map,
            cursor: PlayCursor::new(),
            end_tick,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn division(&self) -> Division {
        self.header.division
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn current_tick(&self) -> u64 {
        self.cursor.tick()
    }

    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo_map.tempo_at(self.current_tick())
    }

    pub fn is_finished(&self) -> bool {
        self.current_tick() >= self.end_tick
    }

    pub fn find_events_in_range(&self, start: u64, end: u64) -> Vec<&Event> {
        self.timeline.find_events_in_range(start, end)
    }

    pub fn update(&mut self, elapsed: Duration, speed: f64) {
        self.cursor
            .advance(&self.tempo_map, self.header.division, elapsed, speed);
        self.cursor.clamp(self.end_tick);
    }

    pub fn seek(&mut self, tick: u64) {
        self.cursor.seek(tick.min(self.end_tick));
    }

    pub fn rewind(&mut self) {
        self.cursor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::two_track_file;

    #[test]
    fn test_file_playback() {
        let mut input = FileInput::from_bytes(&two_track_file()).unwrap();
        assert_eq!(480, input.end_tick());
        assert_eq!(0, input.current_tick());
        assert!(!input.is_finished());
        assert_eq!(3, input.find_events_in_range(0, 1).len());
        assert_eq!(5, input.find_events_in_range(0, 481).len());

        // 480 ticks per quarter at 120 bpm is 960 ticks per second.
        input.update(Duration::from_millis(250), 1.0);
        assert_eq!(240, input.current_tick());
        input.update(Duration::from_millis(250), 2.0);
        assert_eq!(480, input.current_tick());
        assert!(input.is_finished());
        input.update(Duration::from_secs(1), 1.0);
        assert_eq!(480, input.current_tick());

        input.seek(100);
        assert_eq!(100, input.current_tick());
        input.rewind();
        assert_eq!(0, input.current_tick());
    }

    #[test]
    fn test_bad_file() {
        match FileInput::from_bytes(b"RIFF") {
            Err(InputError::Decode(_)) => {}
            other => panic!("Expected a decode error, got {:?}", other.map(|_| ())),
        }
    }
}
