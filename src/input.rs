use crate::midi::{DecodeError, Event};
use crate::track::{Division, Tempo};
use std::time::Duration;
use thiserror::*;

mod device;
pub use device::*;

mod file;
pub use file::*;

#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("MIDI decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("MIDI device failed: {0}")]
    DeviceFailed(String),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum InputState {
    /// A file was decoded and can be played.
    Ready,
    /// The device thread has not opened its stream yet.
    Connecting,
    Streaming,
    Failed(String),
}

/// A source of timed MIDI events.
pub enum MidiInput {
    File(FileInput),
    Device(DeviceInput),
}

impl MidiInput {
    pub fn state(&self) -> InputState {
        match self {
            MidiInput::File(_) => InputState::Ready,
            MidiInput::Device(dev) => dev.state().clone(),
        }
    }

    pub fn current_tick(&self) -> u64 {
        match self {
            MidiInput::File(file) => file.current_tick(),
            MidiInput::Device(dev) => dev.current_tick(),
        }
    }

    /// Exclusive end of the ticks whose events are all known. A file knows
    /// its events at the current tick; live events drained so far are all
    /// stamped below the clock.
    pub fn settled_until(&self) -> u64 {
        match self {
            MidiInput::File(file) => file.current_tick().saturating_add(1),
            MidiInput::Device(dev) => dev.current_tick(),
        }
    }

    pub fn division(&self) -> Division {
        match self {
            MidiInput::File(file) => file.division(),
            MidiInput::Device(dev) => dev.division(),
        }
    }

    pub fn ticks_per_quarter_note(&self) -> f64 {
        self.division().ticks_per_quarter_note()
    }

    pub fn ticks_per_second(&self, tempo: Tempo) -> f64 {
        self.division().ticks_per_second(tempo)
    }

    /// Tempo in effect at the current tick.
    pub fn tempo(&self) -> Tempo {
        match self {
            MidiInput::File(file) => file.tempo(),
            MidiInput::Device(_) => Tempo::default(),
        }
    }

    /// The last tick of the piece; live input has none.
    pub fn end_tick(&self) -> Option<u64> {
        match self {
            MidiInput::File(file) => Some(file.end_tick()),
            MidiInput::Device(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            MidiInput::File(file) => file.is_finished(),
            MidiInput::Device(_) => false,
        }
    }

    pub fn find_events_in_range(&self, start: u64, end: u64) -> Vec<&Event> {
        match self {
            MidiInput::File(file) => file.find_events_in_range(start, end),
            MidiInput::Device(dev) => dev.find_events_in_range(start, end).collect(),
        }
    }

    /// Advances the input. `speed` scales file playback and is ignored by
    /// live input, which moves exactly one tick per call.
    pub fn update(&mut self, elapsed: Duration, speed: f64) -> Result<(), InputError> {
        match self {
            MidiInput::File(file) => {
                file.update(elapsed, speed);
                Ok(())
            }
            MidiInput::Device(dev) => dev.update(),
        }
    }
}

impl From<FileInput> for MidiInput {
    fn from(inner: FileInput) -> Self {
        MidiInput::File(inner)
    }
}

impl From<DeviceInput> for MidiInput {
    fn from(inner: DeviceInput) -> Self {
        MidiInput::Device(inner)
    }
}
