use crate::model::NoteClass;
use thiserror::*;

mod controller;
pub use controller::*;

mod decoder;
pub use decoder::*;
#[cfg(test)]
pub(crate) use decoder::tests::two_track_file;

mod meta;
pub use meta::*;

mod notes;
pub use notes::*;

mod stream;
pub use stream::*;

mod vlq;
pub use vlq::*;

/// Reasons a MIDI byte stream can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("unexpected end of data")]
    UnexpectedEof,
    #[error("no MThd header chunk found")]
    MissingHeader,
    #[error("duplicate MThd header chunk")]
    DuplicateHeader,
    #[error("MTrk chunk found before the MThd header chunk")]
    TrackBeforeHeader,
    #[error("header chunk is {0} bytes long, expected at least 6")]
    ShortHeader(usize),
    #[error("invalid file format {0}: expected 0, 1 or 2")]
    InvalidFormat(u16),
    #[error("format 0 holds a single track, but the header declares {0}")]
    MultiTrackFormat0(u16),
    #[error("invalid time division {0:#06x}")]
    InvalidDivision(u16),
    #[error("invalid status byte {0:#04x}")]
    InvalidStatus(u8),
    #[error("value out of range: expected number in the range [{min}..={max}], found {found}.")]
    OutOfRange { found: u8, min: u8, max: u8 },
    #[error("variable-length quantity does not fit in 64 bits")]
    VlqOverflow,
    #[error("meta event of {0} bytes exceeds the stream limit")]
    OversizedMeta(u64),
}

/// A decode failure along with the byte offset it was detected at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} (at byte {offset})")]
pub struct DecodeError {
    pub offset: usize,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub const fn new(offset: usize, kind: DecodeErrorKind) -> Self {
        Self { offset, kind }
    }
}

const fn data_byte(raw: u8) -> Result<u8, DecodeErrorKind> {
    if raw > 127 {
        Err(DecodeErrorKind::OutOfRange {
            found: raw,
            min: 0,
            max: 127,
        })
    } else {
        Ok(raw)
    }
}

pub const fn parse_channel(raw: u8) -> MidiChannel {
    MidiChannel { raw: raw & 0xF }
}

pub const fn parse_note(raw: u8) -> Result<MidiNote, DecodeErrorKind> {
    match data_byte(raw) {
        Ok(raw) => Ok(MidiNote { raw }),
        Err(e) => Err(e),
    }
}

pub const fn parse_vel(raw: u8) -> Result<Velocity, DecodeErrorKind> {
    match data_byte(raw) {
        Ok(value) => Ok(Velocity { value }),
        Err(e) => Err(e),
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default, Debug, Hash)]
pub struct Velocity {
    value: u8,
}

impl Velocity {
    pub const fn as_u8(&self) -> u8 {
        self.value
    }
    pub const fn from_raw(raw: u8) -> Option<Velocity> {
        if raw > 127 {
            None
        } else {
            Some(Velocity { value: raw })
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Default, Debug, Hash)]
pub struct MidiChannel {
    raw: u8,
}

impl MidiChannel {
    pub const fn as_u8(&self) -> u8 {
        self.raw
    }
    pub const fn from_raw(raw: u8) -> Option<MidiChannel> {
        if raw >= 16 {
            None
        } else {
            Some(MidiChannel { raw })
        }
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct MidiNote {
    raw: u8,
}

impl MidiNote {
    pub const fn from_raw(raw: u8) -> Option<MidiNote> {
        if raw >= 128 {
            None
        } else {
            Some(MidiNote { raw })
        }
    }
    pub const fn as_u8(self) -> u8 {
        self.raw
    }
    pub const fn note(&self) -> NoteClass {
        NoteClass::from_u8(self.raw % 12)
    }
    /// MIDI octave number, where key 0 sits in octave 0.
    pub const fn octave(&self) -> u8 {
        self.raw / 12
    }
    pub const fn is_black(&self) -> bool {
        self.note().is_black()
    }
    /// Position of this key among the white keys of the full 128-key range,
    /// or `None` for black keys.
    pub const fn white_index(&self) -> Option<u32> {
        match self.note().white_position() {
            Some(pos) => Some(self.octave() as u32 * 7 + pos as u32),
            None => None,
        }
    }
    /// Position of this key among the black keys of the full 128-key range,
    /// or `None` for white keys.
    pub const fn black_index(&self) -> Option<u32> {
        match self.note().black_position() {
            Some(pos) => Some(self.octave() as u32 * 5 + pos as u32),
            None => None,
        }
    }
}

/// A decoded MIDI event placed on the timeline.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Event {
    pub tick: u64,
    pub kind: EventKind,
}

impl Event {
    pub const fn new(tick: u64, kind: EventKind) -> Self {
        Self { tick, kind }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    NoteOn(NoteOn),
    NoteOff(NoteOff),
    SetTempo { micros_per_quarter: u32 },
    EndOfTrack,
    TimeSignature(TimeSignature),
    Text { kind: TextKind, bytes: Vec<u8> },
    ControlChange {
        channel: MidiChannel,
        control: ControlTarget,
        value: u8,
    },
    ProgramChange { channel: MidiChannel, program: u8 },
    /// Placeholder for an event that was framed correctly but carried an
    /// unusable value.
    Invalid,
}

impl From<NoteOff> for EventKind {
    fn from(inner: NoteOff) -> Self {
        EventKind::NoteOff(inner)
    }
}

impl From<NoteOn> for EventKind {
    fn from(inner: NoteOn) -> Self {
        EventKind::NoteOn(inner)
    }
}
