use crate::color::Color;
use crate::input::{InputError, MidiInput};
use crate::midi::{EventKind, MidiChannel, MidiNote, Velocity};
use crate::runtime::{PlaybackMode, Reader, TickContext};
use crate::selector::NoteInfo;

use log::{debug, info, trace};
use std::time::Duration;

/// What a renderer or synthesizer needs to hear about.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PlaybackSignal {
    NoteOn {
        channel: MidiChannel,
        key: MidiNote,
        velocity: Velocity,
        color: Color,
        tick: u64,
    },
    NoteOff {
        channel: MidiChannel,
        key: MidiNote,
        tick: u64,
    },
    /// Sent once, when a finite input reaches its end.
    Finished,
}

/// Drives an input and a config interpreter from the same clock.
pub struct Player {
    input: MidiInput,
    reader: Reader,
    next_tick: u64,
    finished: bool,
}

impl Player {
    pub fn new(input: impl Into<MidiInput>, reader: Reader) -> Self {
        Player {
            input: input.into(),
            reader,
            next_tick: 0,
            finished: false,
        }
    }

    pub fn input(&self) -> &MidiInput {
        &self.input
    }

    pub fn reader(&self) -> &Reader {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut Reader {
        &mut self.reader
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Moves a file input to `tick`. Events before it are not replayed.
    pub fn seek(&mut self, tick: u64) {
        if let MidiInput::File(file) = &mut self.input {
            file.seek(tick);
            self.next_tick = file.current_tick();
            self.finished = file.is_finished();
            debug!("Seeked to tick {}", self.next_tick);
        }
    }

    /// Advances playback by `elapsed` and returns the signals for every event
    /// passed on the way. Reaching a tick fires the events stamped at it.
    pub fn update(
        &mut self,
        elapsed: Duration,
        mode: PlaybackMode,
    ) -> Result<Vec<PlaybackSignal>, InputError> {
        let speed = self.reader.scene().playback_speed();
        self.input.update(elapsed, speed)?;

        let tick = self.input.current_tick();
        let at_end = self.input.is_finished();
        let upper = self.input.settled_until();

        let mut signals = Vec::new();
        if upper > self.next_tick {
            let scene = self.reader.scene();
            for event in self.input.find_events_in_range(self.next_tick, upper) {
                match &event.kind {
                    EventKind::NoteOn(on) => {
                        let info = NoteInfo {
                            channel: on.channel(),
                            key: on.note(),
                            tick: event.tick,
                        };
                        signals.push(PlaybackSignal::NoteOn {
                            channel: on.channel(),
                            key: on.note(),
                            velocity: on.vel(),
                            color: scene.resolve_color(&info),
                            tick: event.tick,
                        });
                    }
                    EventKind::NoteOff(off) => signals.push(PlaybackSignal::NoteOff {
                        channel: off.channel(),
                        key: off.note(),
                        tick: event.tick,
                    }),
                    other => trace!("Skipping {:?} at tick {}", other, event.tick),
                }
            }
            self.next_tick = upper;
        }

        let division = self.input.division();
        self.reader.update(TickContext {
            tick,
            ticks_per_quarter_note: division.ticks_per_quarter_note(),
            ticks_per_second: division.ticks_per_second(self.input.tempo()),
            end_tick: self.input.end_tick(),
            mode,
        });

        if at_end && !self.finished {
            info!("Playback finished at tick {}", tick);
            self.finished = true;
            signals.push(PlaybackSignal::Finished);
        }
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configlang::Schema;
    use crate::input::FileInput;
    use crate::midi::two_track_file;

    fn player(script: &str) -> Player {
        let input = FileInput::from_bytes(&two_track_file()).unwrap();
        let mut reader = Reader::new();
        reader.load(script, &Schema::standard()).unwrap();
        Player::new(input, reader)
    }

    #[test]
    fn test_file_to_the_end() {
        let red = Color::rgba(255, 0, 0, 255);
        let mut player = player("note_color [key=60] 255 0 0 255\non end { title \"done\" }");

        let signals = player.update(Duration::from_millis(0), PlaybackMode::Play).unwrap();
        assert_eq!(1, signals.len());
        match signals[0] {
            PlaybackSignal::NoteOn {
                key,
                velocity,
                color,
                tick,
                ..
            } => {
                assert_eq!(60, key.as_u8());
                assert_eq!(100, velocity.as_u8());
                assert_eq!(red, color);
                assert_eq!(0, tick);
            }
            other => panic!("expected a note on, got {:?}", other),
        }
        assert_eq!("midivis", player.reader().scene().title());

        let signals = player.update(Duration::from_millis(100), PlaybackMode::Play).unwrap();
        assert!(signals.is_empty());

        let signals = player.update(Duration::from_secs(1), PlaybackMode::Play).unwrap();
        assert_eq!(2, signals.len());
        assert!(matches!(
            signals[0],
            PlaybackSignal::NoteOff { tick: 480, .. }
        ));
        assert_eq!(PlaybackSignal::Finished, signals[1]);
        assert!(player.is_finished());
        assert_eq!("done", player.reader().scene().title());

        let signals = player.update(Duration::from_secs(1), PlaybackMode::Play).unwrap();
        assert!(signals.is_empty());
    }

    #[test]
    fn test_playback_speed_and_seek() {
        let mut player = player("playback_speed 2");
        player.update(Duration::from_millis(125), PlaybackMode::Play).unwrap();
        assert_eq!(240, player.input().current_tick());

        player.seek(10);
        let signals = player.update(Duration::from_millis(0), PlaybackMode::Play).unwrap();
        assert!(signals.is_empty());
        assert!(!player.is_finished());
    }
}
