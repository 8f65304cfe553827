use super::{
    data_byte, parse_channel, parse_note, parse_vel, ControlTarget, DecodeErrorKind, EventKind,
    MidiChannel, MidiNote, Velocity, CONTROLLER_COUNT,
};
use log::error;

/// Upper nibble of a channel voice message status byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum ChannelMessageTag {
    NoteOff = 0x80,
    NoteOn = 0x90,
    PolyAftertouch = 0xA0,
    ControlChange = 0xB0,
    ProgramChange = 0xC0,
    ChannelPressure = 0xD0,
    PitchWheel = 0xE0,
}

impl ChannelMessageTag {
    pub const fn from_status(status: u8) -> Option<Self> {
        match status & 0xF0 {
            0x80 => Some(ChannelMessageTag::NoteOff),
            0x90 => Some(ChannelMessageTag::NoteOn),
            0xA0 => Some(ChannelMessageTag::PolyAftertouch),
            0xB0 => Some(ChannelMessageTag::ControlChange),
            0xC0 => Some(ChannelMessageTag::ProgramChange),
            0xD0 => Some(ChannelMessageTag::ChannelPressure),
            0xE0 => Some(ChannelMessageTag::PitchWheel),
            _ => None,
        }
    }

    /// Number of data bytes following the status byte.
    pub const fn data_len(self) -> usize {
        match self {
            ChannelMessageTag::ProgramChange | ChannelMessageTag::ChannelPressure => 1,
            _ => 2,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct NoteOn {
    channel: MidiChannel,
    note: MidiNote,
    vel: Velocity,
}

impl NoteOn {
    pub const fn new(channel: MidiChannel, note: MidiNote, vel: Velocity) -> Self {
        Self { channel, note, vel }
    }
    pub const fn channel(&self) -> MidiChannel {
        self.channel
    }
    pub const fn note(&self) -> MidiNote {
        self.note
    }
    pub const fn vel(&self) -> Velocity {
        self.vel
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct NoteOff {
    channel: MidiChannel,
    note: MidiNote,
    vel: Velocity,
}

impl NoteOff {
    pub const fn new(channel: MidiChannel, note: MidiNote, vel: Velocity) -> Self {
        Self { channel, note, vel }
    }
    pub const fn channel(&self) -> MidiChannel {
        self.channel
    }
    pub const fn note(&self) -> MidiNote {
        self.note
    }
    pub const fn vel(&self) -> Velocity {
        self.vel
    }
}

/// Decodes the data bytes of a channel voice message.
///
/// `data` must hold exactly [`ChannelMessageTag::data_len`] bytes. Messages
/// that are understood but carry nothing the timeline needs (aftertouch,
/// channel pressure, pitch wheel) produce `Ok(None)`.
pub fn parse_channel_message(
    status: u8,
    data: &[u8],
) -> Result<Option<EventKind>, DecodeErrorKind> {
    let tag = ChannelMessageTag::from_status(status).ok_or(DecodeErrorKind::InvalidStatus(status))?;
    if data.len() < tag.data_len() {
        return Err(DecodeErrorKind::UnexpectedEof);
    }
    let channel = parse_channel(status);
    let kind = match tag {
        ChannelMessageTag::NoteOn | ChannelMessageTag::NoteOff => {
            let note = parse_note(data[0])?;
            let vel = parse_vel(data[1])?;
            if tag == ChannelMessageTag::NoteOn && vel.as_u8() > 0 {
                Some(NoteOn::new(channel, note, vel).into())
            } else {
                Some(NoteOff::new(channel, note, vel).into())
            }
        }
        ChannelMessageTag::ControlChange => {
            let number = data[0];
            if number >= CONTROLLER_COUNT {
                error!(
                    "Controller number {} on channel {} is out of range; event marked invalid",
                    number,
                    channel.as_u8()
                );
                return Ok(Some(EventKind::Invalid));
            }
            let value = data_byte(data[1])?;
            Some(EventKind::ControlChange {
                channel,
                control: ControlTarget::from_number(number),
                value,
            })
        }
        ChannelMessageTag::ProgramChange => Some(EventKind::ProgramChange {
            channel,
            program: data_byte(data[0])?,
        }),
        ChannelMessageTag::PolyAftertouch
        | ChannelMessageTag::ChannelPressure
        | ChannelMessageTag::PitchWheel => None,
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::Controller;

    #[test]
    fn test_note_messages() {
        let on = parse_channel_message(0x91, &[60, 100]).unwrap().unwrap();
        match on {
            EventKind::NoteOn(on) => {
                assert_eq!(1, on.channel().as_u8());
                assert_eq!(60, on.note().as_u8());
                assert_eq!(100, on.vel().as_u8());
            }
            other => panic!("Expected NoteOn, got {:?}", other),
        }

        let silent = parse_channel_message(0x90, &[60, 0]).unwrap().unwrap();
        assert!(matches!(silent, EventKind::NoteOff(_)), "{:?}", silent);

        assert_eq!(
            Err(DecodeErrorKind::OutOfRange {
                found: 0x80,
                min: 0,
                max: 127
            }),
            parse_channel_message(0x80, &[0x80, 0])
        );
    }

    #[test]
    fn test_control_messages() {
        let sustain = parse_channel_message(0xB0, &[0x40, 127]).unwrap();
        assert_eq!(
            Some(EventKind::ControlChange {
                channel: MidiChannel::from_raw(0).unwrap(),
                control: ControlTarget::Controller(Controller::Sustain),
                value: 127,
            }),
            sustain
        );
        assert_eq!(
            Some(EventKind::Invalid),
            parse_channel_message(0xB0, &[0x90, 1]).unwrap()
        );
        assert_eq!(None, parse_channel_message(0xE0, &[0, 64]).unwrap());
        assert_eq!(None, parse_channel_message(0xD0, &[12]).unwrap());
        assert_eq!(
            Err(DecodeErrorKind::InvalidStatus(0xF0)),
            parse_channel_message(0xF0, &[])
        );
    }
}
